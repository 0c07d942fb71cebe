//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use taskgate_db::UserRole;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};
use crate::permissions::{Permission, RolePermissions};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from JWT claims. Claims naming an unknown role or a
    /// non-numeric subject are rejected.
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let role = UserRole::from_str(&claims.role).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            id,
            username: claims.username.clone(),
            role,
        })
    }
}

const BEARER_PREFIX: &str = "Bearer ";

/// Extract bearer token from authorization header. The scheme name is
/// matched case-insensitively.
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .split_at_checked(BEARER_PREFIX.len())
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware
///
/// Validates the bearer token from the Authorization header and adds the
/// resulting [`AuthUser`] to the request extensions. Requests without a valid
/// token are rejected with 401.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt_manager.validate_token(token).inspect_err(|e| {
        warn!("Rejected token for {} {}: {}", request.method(), request.uri().path(), e);
    })?;
    let user = AuthUser::from_claims(&claims)?;

    debug!("Authenticated user: {} ({})", user.username, user.role);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Middleware requiring the authenticated user's role to grant `permission`
///
/// Must run after [`auth_middleware`].
pub async fn require_permission(
    permission: Permission,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuthHeader)?;

    if !user.role.has_permission(permission) {
        warn!(
            "User {} ({}) lacks {:?} for {}",
            user.username,
            user.role,
            permission,
            request.uri().path()
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Middleware to require admin role
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    require_permission(Permission::ManageUsers, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Json, Router, middleware};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    fn app(jwt: Arc<JwtManager>) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn(require_admin));

        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .route_layer(middleware::from_fn_with_state(jwt, auth_middleware))
    }

    fn request(uri: &str, auth: Option<String>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(extract_bearer_token("bearer abc").unwrap(), "abc");
        assert_eq!(extract_bearer_token("BEARER abc").unwrap(), "abc");
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("Bear").is_err());
        assert!(extract_bearer_token("Bearé abc").is_err());
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let response = app(jwt).oneshot(request("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let token = jwt.generate_token(1, "admin", UserRole::Admin).unwrap();
        let response = app(jwt)
            .oneshot(request("/me", Some(format!("Token {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let issued = Utc::now() - Duration::hours(25);
        let token = jwt
            .generate_token_at(1, "admin", UserRole::Admin, issued)
            .unwrap();
        let response = app(jwt)
            .oneshot(request("/me", Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_user() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let token = jwt.generate_token(5, "alice", UserRole::User).unwrap();
        let response = app(jwt)
            .oneshot(request("/me", Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let user: AuthUser = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_lowercase_scheme_accepted() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let token = jwt.generate_token(5, "alice", UserRole::User).unwrap();
        let response = app(jwt)
            .oneshot(request("/me", Some(format!("bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_user_role_forbidden_on_admin_route() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let token = jwt.generate_token(5, "alice", UserRole::User).unwrap();
        let response = app(jwt)
            .oneshot(request("/admin", Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_role_allowed_on_admin_route() {
        let jwt = Arc::new(JwtManager::new("secret", 24));
        let token = jwt.generate_token(1, "root", UserRole::Admin).unwrap();
        let response = app(jwt)
            .oneshot(request("/admin", Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
