use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::aggregator::Aggregator;

pub mod handlers;
pub mod models;

pub fn create_router(aggregator: Arc<Aggregator>, static_dir: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/api/search", get(handlers::search_handler))
        .route("/api/debug", get(handlers::debug_handler))
        .route("/api/debug-raw", get(handlers::debug_raw_handler))
        .route("/api/debug-dom", get(handlers::debug_dom_handler))
        .with_state(aggregator)
        // Static file serving for the UI
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}
