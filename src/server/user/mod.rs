mod connections;
mod tags;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Tags the caller owns
        .route("/tags", get(tags::list_tags))
        .route("/tags/claim", post(tags::claim_tag))
        .route("/tags/{id}/release", post(tags::release_tag))
        .route(
            "/tags/{id}/binding",
            put(tags::bind_tag).delete(tags::unbind_tag),
        )
        // Saved connections
        .route(
            "/connections",
            get(connections::list_connections).post(connections::create_connection),
        )
        .route("/connections/exists", get(connections::connection_exists))
        .route("/connections/{id}", delete(connections::delete_connection))
}
