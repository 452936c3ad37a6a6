use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::domain::registry;
use crate::server::AppState;
use crate::server::dto::{PaginationParams, ProvisionTagRequest, SetActiveRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};

pub async fn provision_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProvisionTagRequest>,
) -> impl IntoResponse {
    let tag = registry::provision(state.store.as_ref(), &admin, &req.tag_uid, &req.public_code)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(tag))))
}

/// Full tag records, owner included. Only admins see these.
pub async fn list_tags(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let tags = state
        .store
        .list_tags(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list tags")?;

    let (tags, next_cursor, has_more) =
        paginate(tags, DEFAULT_PAGE_SIZE as usize, |t| t.id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(tags, next_cursor, has_more)))
}

pub async fn get_tag(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tag = state
        .store
        .get_tag(&id)
        .api_err("Failed to get tag")?
        .or_not_found("Tag not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn set_active(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> impl IntoResponse {
    let tag = registry::set_active(state.store.as_ref(), &admin, &id, req.active)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn unclaim_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tag = registry::admin_unclaim(state.store.as_ref(), &admin, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}

pub async fn unlink_tag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tag = registry::admin_unlink(state.store.as_ref(), &admin, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tag)))
}
