//! CORS policy

use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;

/// Preflight cache lifetime
const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// Build the CORS layer from the configured origin list
///
/// `"*"` allows any origin (without credentials). An empty list allows
/// same-origin requests only.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, ApiError> {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(CORS_MAX_AGE);

    if allowed_origins.is_empty() {
        return Ok(base);
    }

    if allowed_origins.iter().any(|o| o == "*") {
        return Ok(base.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| ApiError::BadRequest(format!("Invalid CORS origin: {}", o)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(base.allow_origin(origins).allow_credentials(true))
}
