pub mod messages;
pub mod participants;
pub mod state;

pub use state::AppState;

use std::time::Duration;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Health check
        .route("/health", get(health))

        // Presence endpoints
        .route(
            "/participants",
            post(participants::register).get(participants::list),
        )
        .route("/status", post(participants::status))

        // Message endpoints
        .route("/messages", post(messages::send).get(messages::list))
        .route("/messages/{id}", delete(messages::remove).put(messages::edit))

        // Add request timeout
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
