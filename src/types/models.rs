use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModuleKind, ModuleRef, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// The fields every module kind shares, regardless of which table it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub kind: ModuleKind,
    pub owner_id: String,
    pub title: String,
    /// The tag currently exposing this module, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Module {
    #[must_use]
    pub fn module_ref(&self) -> ModuleRef {
        ModuleRef::new(self.kind, self.id.clone())
    }
}

/// A business card module. Passwords are card-scoped plaintext and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(skip)]
    pub level1_password: Option<String>,
    #[serde(skip)]
    pub level2_password: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Card {
    #[must_use]
    pub fn as_module(&self) -> Module {
        Module {
            id: self.id.clone(),
            kind: ModuleKind::Card,
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            tag_id: self.tag_id.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Saved,
    /// Legacy value left behind by older clients; never written by this service.
    Pending,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Saved => "saved",
            ConnectionStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<ConnectionStatus> {
        match s {
            "saved" => Some(ConnectionStatus::Saved),
            "pending" => Some(ConnectionStatus::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Option<Visibility> {
        match s {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

/// What a connection points at: a card, or another user directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionTarget {
    #[serde(rename = "card_id")]
    Card(String),
    #[serde(rename = "friend_id")]
    Friend(String),
}

/// A saved contact, owned exclusively by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub target: ConnectionTarget,
    pub status: ConnectionStatus,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}
