use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::domain::gate;
use crate::server::AppState;
use crate::server::dto::{
    AccessLevelResponse, PasswordRequest, VerifiedResponse, ViewCountResponse,
};
use crate::server::response::{ApiError, ApiResponse};

pub async fn gate_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let info = gate::gate_info(state.store.as_ref(), &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(info)))
}

pub async fn verify_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PasswordRequest>,
) -> impl IntoResponse {
    gate::verify_basic(state.store.as_ref(), &id, &req.password)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(VerifiedResponse {
        card_id: id,
        verified: true,
    })))
}

pub async fn verify_level(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PasswordRequest>,
) -> impl IntoResponse {
    let level = gate::verify_tiered(state.store.as_ref(), &id, &req.password)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AccessLevelResponse {
        card_id: id,
        level,
    })))
}

pub async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let view_count = gate::record_view(state.store.as_ref(), &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ViewCountResponse {
        card_id: id,
        view_count,
    })))
}
