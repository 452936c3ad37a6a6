use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::domain::{binder, registry};
use crate::server::AppState;
use crate::server::dto::ClaimRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::ModuleRef;

pub async fn list_tags(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let tags = registry::list_owned(state.store.as_ref(), &auth.caller)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tags)))
}

/// Claims a tag by its printed code, binding a module too when one is given.
pub async fn claim_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClaimRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let tag = match &req.module {
        Some(module) => registry::claim_and_bind(store, &auth.caller, &req.code, module)?,
        None => registry::claim_only(store, &auth.caller, &req.code)?,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn release_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tag = registry::self_release(state.store.as_ref(), &auth.caller, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn bind_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(module): Json<ModuleRef>,
) -> impl IntoResponse {
    let tag = binder::bind(state.store.as_ref(), &auth.caller, &id, &module)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn unbind_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tag = binder::unbind_owned(state.store.as_ref(), &auth.caller, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}
