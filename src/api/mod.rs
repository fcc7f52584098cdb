//! HTTP routes for the JSON API.
pub mod health;
pub mod users;

use axum::{Extension, Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::SharedState;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{id}", get(users::get_user))
        .layer(Extension(state))
        // UI may be served from another origin in development
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
