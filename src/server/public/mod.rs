//! Routes reachable without a token: what an NFC scan or a card viewer needs.

mod cards;
mod tags;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tags/lookup", get(tags::lookup_tag))
        .route("/cards/{id}/gate", get(cards::gate_info))
        .route("/cards/{id}/verify", post(cards::verify_password))
        .route("/cards/{id}/verify-level", post(cards::verify_level))
        .route("/cards/{id}/views", post(cards::record_view))
}
