use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::domain::registry::{self, TagKey};
use crate::server::AppState;
use crate::server::dto::LookupParams;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::TagSnapshot;

/// Resolves a scanned tag by `?code=` or `?uid=`. The code wins when both are sent.
pub async fn lookup_tag(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> impl IntoResponse {
    let key = match (params.code.as_deref(), params.uid.as_deref()) {
        (Some(code), _) => Some(TagKey::Code(code)),
        (None, Some(uid)) => Some(TagKey::Uid(uid)),
        (None, None) => None,
    };

    let snapshot = match key {
        Some(key) => registry::lookup(state.store.as_ref(), key)?,
        None => TagSnapshot::missing(),
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(snapshot)))
}
