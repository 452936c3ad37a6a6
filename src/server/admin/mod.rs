mod modules;
mod tags;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // User routes
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/tokens", post(users::create_user_token))
        // Tag routes
        .route("/tags", post(tags::provision_tag).get(tags::list_tags))
        .route("/tags/{id}", get(tags::get_tag))
        .route("/tags/{id}/active", put(tags::set_active))
        .route("/tags/{id}/unclaim", post(tags::unclaim_tag))
        .route("/tags/{id}/unlink", post(tags::unlink_tag))
        // Module routes
        .route("/modules", post(modules::create_module))
}
