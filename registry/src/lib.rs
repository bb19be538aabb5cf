pub mod canon;
pub mod config;
pub mod handlers;
pub mod models;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use storage::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Build the service router. Startup owns the returned value; no routes are
/// registered anywhere else.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::repositories::register_repository)
                .fallback(handlers::repositories::not_implemented),
        )
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
