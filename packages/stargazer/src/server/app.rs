//! Application setup and router configuration.

use std::sync::Arc;

use axum::{extract::Extension, http::Method, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::intake::IntakePolicy;
use crate::server::routes::{health_handler, repository_handler};
use crate::traits::queue::WorkQueue;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn WorkQueue>,
    pub policy: IntakePolicy,
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/repositories/:owner/:name", get(repository_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
