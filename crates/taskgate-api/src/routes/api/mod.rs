//! Application API routes
//!
//! Login is public. Everything else passes the authentication stage first;
//! user and role administration additionally requires the admin role.

pub mod auth;
pub mod preferences;
pub mod roles;
pub mod tasks;
pub mod types;
pub mod users;
mod validation;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
};
use taskgate_auth::{Permission, auth_middleware, require_admin, require_permission};

use crate::state::AppState;

/// Create API routes with the authorization gate applied
pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(users::routes())
        .merge(roles::routes())
        .route_layer(middleware::from_fn(require_admin));

    let tasks = tasks::routes().route_layer(middleware::from_fn(
        |request: Request, next: Next| require_permission(Permission::ManageTasks, request, next),
    ));

    let preferences = preferences::routes().route_layer(middleware::from_fn(
        |request: Request, next: Next| {
            require_permission(Permission::ManagePreferences, request, next)
        },
    ));

    let protected = Router::new()
        .merge(admin)
        .merge(tasks)
        .merge(preferences)
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    Router::new().merge(auth::routes()).merge(protected)
}
