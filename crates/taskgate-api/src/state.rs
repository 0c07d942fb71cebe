//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use taskgate_auth::JwtManager;
use taskgate_db::Store;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt: Arc<JwtManager>) -> Self {
        Self { store, jwt }
    }
}
