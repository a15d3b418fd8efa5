use super::error::ApiError;
use super::handlers;
use super::state::AppState;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Versioned mount point of the JSON API.
pub const API_PREFIX: &str = "/api-1.0.0";

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/people", get(handlers::api::list_people))
        .route("/people/", get(handlers::api::list_people))
        .route(
            "/people/by-discord/:discord_id",
            get(handlers::api::get_person_by_discord_id),
        )
        .route(
            "/people/:person_id",
            get(handlers::api::get_person).put(handlers::api::update_person),
        )
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health))
}

pub async fn not_found() -> impl IntoResponse {
    ApiError::NotFound
}
