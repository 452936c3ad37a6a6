use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{MaybeUser, RequireUser};
use crate::domain::ledger;
use crate::server::AppState;
use crate::server::dto::{CreateConnectionRequest, ExistsParams};
use crate::server::response::{ApiError, ApiResponse};

/// Anonymous callers and a missing `card_id` get `exists: false` rather than an error.
pub async fn connection_exists(
    maybe_user: Option<MaybeUser>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExistsParams>,
) -> impl IntoResponse {
    let caller = maybe_user.map(|MaybeUser(caller)| caller);
    let card_id = params.card_id.as_deref().unwrap_or("");
    let lookup = ledger::exists(state.store.as_ref(), caller.as_ref(), card_id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(lookup)))
}

pub async fn create_connection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateConnectionRequest>,
) -> impl IntoResponse {
    let visibility = req.visibility;
    let target = req
        .target()
        .ok_or_else(|| ApiError::bad_request("Provide exactly one of card_id or friend_id"))?;

    let (connection, created) =
        ledger::save(state.store.as_ref(), &auth.caller, target, visibility)?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok::<_, ApiError>((status, Json(ApiResponse::success(connection))))
}

pub async fn list_connections(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connections = ledger::list(state.store.as_ref(), &auth.caller)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(connections)))
}

pub async fn delete_connection(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    ledger::remove(state.store.as_ref(), &auth.caller, &id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
