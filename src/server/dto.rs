use serde::{Deserialize, Serialize};

use crate::domain::gate::AccessLevel;
use crate::types::{ConnectionTarget, ModuleKind, ModuleRef, Role, Token, Visibility};

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub code: String,
    /// Module to bind in the same step as the claim.
    #[serde(default)]
    pub module: Option<ModuleRef>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExistsParams {
    #[serde(default)]
    pub card_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub friend_id: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl CreateConnectionRequest {
    /// Exactly one of `card_id` and `friend_id` must be present.
    pub fn target(self) -> Option<ConnectionTarget> {
        match (self.card_id, self.friend_id) {
            (Some(card_id), None) => Some(ConnectionTarget::Card(card_id)),
            (None, Some(friend_id)) => Some(ConnectionTarget::Friend(friend_id)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserTokenRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub metadata: Token,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionTagRequest {
    pub tag_uid: String,
    pub public_code: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub kind: ModuleKind,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub level1_password: Option<String>,
    #[serde(default)]
    pub level2_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessLevelResponse {
    pub card_id: String,
    pub level: AccessLevel,
}

#[derive(Debug, Serialize)]
pub struct ViewCountResponse {
    pub card_id: String,
    pub view_count: i64,
}

#[derive(Debug, Serialize)]
pub struct VerifiedResponse {
    pub card_id: String,
    pub verified: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}
