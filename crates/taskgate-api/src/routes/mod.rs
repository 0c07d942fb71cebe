//! API routes

mod api;
mod health;
pub mod metrics;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<MetricsHandle>>,
    cors: CorsLayer,
) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Login and protected resources
        .merge(api::routes(&state))
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(cors)
}
