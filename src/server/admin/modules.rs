use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::CreateModuleRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_card_password, validate_title};
use crate::types::{Card, Module, ModuleKind};

/// Creates a module of any kind for an existing user. Only cards accept passwords.
pub async fn create_module(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateModuleRequest>,
) -> impl IntoResponse {
    let title = req.title.trim();
    validate_title(title)?;

    state
        .store
        .get_user(&req.owner_id)
        .api_err("Failed to get user")?
        .or_not_found("Owner not found")?;

    let has_passwords = req.password.is_some()
        || req.level1_password.is_some()
        || req.level2_password.is_some();

    let module = match req.kind {
        ModuleKind::Card => {
            validate_card_password(req.password.as_deref(), "password")?;
            validate_card_password(req.level1_password.as_deref(), "level1_password")?;
            validate_card_password(req.level2_password.as_deref(), "level2_password")?;

            let card = Card {
                id: Uuid::new_v4().to_string(),
                owner_id: req.owner_id,
                title: title.to_string(),
                tag_id: None,
                password: req.password,
                level1_password: req.level1_password,
                level2_password: req.level2_password,
                view_count: 0,
                created_at: Utc::now(),
            };
            state
                .store
                .create_card(&card)
                .api_err("Failed to create card")?;
            card.as_module()
        }
        kind if has_passwords => {
            return Err(ApiError::bad_request(format!(
                "{kind} modules do not support passwords"
            )));
        }
        kind => {
            let module = Module {
                id: Uuid::new_v4().to_string(),
                kind,
                owner_id: req.owner_id,
                title: title.to_string(),
                tag_id: None,
                created_at: Utc::now(),
            };
            state
                .store
                .create_module(&module)
                .api_err("Failed to create module")?;
            module
        }
    };

    tracing::info!(module = %module.module_ref(), owner_id = %module.owner_id, admin_id = %admin.user_id, "created module");
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(module))))
}
