//! HTTP routes.

mod api;

pub use api::ApiError;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(api::get_stats))
        .route("/api/health", get(api::get_health))
        .route("/api/nodes", get(api::get_nodes).post(api::add_node))
        .route("/api/links", get(api::get_links))
        .route("/api/connect", post(api::connect))
        .route("/api/transfer", post(api::transfer))
        .route("/api/heal", post(api::heal))
        .route("/api/hazards", get(api::get_hazards))
        .route("/api/actions", get(api::get_actions))
        .route("/api/ccps", get(api::get_ccps))
        .route("/api/advance", post(api::advance))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
