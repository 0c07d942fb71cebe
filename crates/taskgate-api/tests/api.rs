//! End-to-end tests for the HTTP surface, driven through `oneshot`

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use std::sync::Arc;
use taskgate_api::{AppState, MetricsHandle, cors_layer, create_router};
use taskgate_auth::{JwtManager, hash_password};
use taskgate_db::{Database, NewUser, Store, UserRole};
use tempfile::TempDir;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";
const ALLOWED_ORIGIN: &str = "http://localhost:5173";

struct TestApp {
    _dir: TempDir,
    router: Router,
    db: Database,
    admin_id: i64,
    user_id: i64,
}

async fn setup() -> TestApp {
    setup_with(None, &[]).await
}

async fn setup_with(metrics: Option<Arc<MetricsHandle>>, origins: &[String]) -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}/api.db", dir.path().display());
    let db = Database::new(&url).await.unwrap();

    let admin = db
        .insert_user(NewUser {
            username: "admin".to_string(),
            password_hash: hash_password("admin-password").unwrap(),
            role_id: UserRole::Admin.id(),
        })
        .await
        .unwrap();
    let user = db
        .insert_user(NewUser {
            username: "alice".to_string(),
            password_hash: hash_password("alice-password").unwrap(),
            role_id: UserRole::User.id(),
        })
        .await
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(db.clone());
    let jwt = Arc::new(JwtManager::new(TEST_SECRET, 24));
    let router = create_router(
        AppState::new(store, jwt),
        metrics,
        cors_layer(origins).unwrap(),
    );

    TestApp {
        _dir: dir,
        router,
        db,
        admin_id: admin.id,
        user_id: user.id,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;

    for path in ["/health", "/healthz"] {
        let (status, body) = send(&app, "GET", path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }
}

#[tokio::test]
async fn test_login_returns_token() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "alice-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_in"], 24 * 3600);

    let verifier = JwtManager::new(TEST_SECRET, 24);
    let claims = verifier
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.user_id, app.user_id);
    assert_eq!(claims.sub, app.user_id.to_string());
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, "user");

    let admin_token = login(&app, "admin", "admin-password").await;
    let claims = verifier.validate_token(&admin_token).unwrap();
    assert_eq!(claims.user_id, app.admin_id);
    assert_eq!(claims.role, "admin");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup().await;

    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "not-her-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "nobody", "password": "whatever-password" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_login_rejects_malformed_body() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup().await;

    let (status, body) = send(&app, "GET", "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/tasks", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = setup().await;
    let user_token = login(&app, "alice", "alice-password").await;
    let admin_token = login(&app, "admin", "admin-password").await;

    let (status, _) = send(&app, "GET", "/api/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/roles", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = setup().await;
    let token = login(&app, "admin", "admin-password").await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "username": "bob", "password": "bob-password", "role_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "user");
    let bob_id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "username": "bob", "password": "other-password", "role_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "username": "carol", "password": "carol-password", "role_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(&token),
        Some(json!({ "role_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "bob");
    assert_eq!(updated["role"], "admin");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", bob_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{}", bob_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = setup().await;
    let token = login(&app, "admin", "admin-password").await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", app.admin_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.db.get_user_by_id(app.admin_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let app = setup().await;
    let token = login(&app, "admin", "admin-password").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", app.admin_id),
        Some(&token),
        Some(json!({ "role_id": UserRole::User.id() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let admin = app.db.get_user_by_id(app.admin_id).await.unwrap().unwrap();
    assert_eq!(admin.role, UserRole::Admin);

    // Renaming oneself is still allowed
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", app.admin_id),
        Some(&token),
        Some(json!({ "username": "root", "role_id": UserRole::Admin.id() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "root");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = setup().await;
    let token = login(&app, "alice", "alice-password").await;

    let (status, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "write report", "user_id": app.user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["done"], false);
    let task_id = task["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", task_id),
        Some(&token),
        Some(json!({ "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["done"], true);
    assert_eq!(updated["title"], "write report");

    let (status, tasks) = send(&app, "GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/tasks/{}", task_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/tasks/{}", task_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_validation() {
    let app = setup().await;
    let token = login(&app, "alice", "alice-password").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "", "user_id": app.user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "orphan", "user_id": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_task() {
    let app = setup().await;
    let token = login(&app, "alice", "alice-password").await;

    let (status, body) = send(&app, "DELETE", "/api/tasks/424242", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "DELETE", "/api/tasks/not-a-number", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preference_upsert() {
    let app = setup().await;
    let token = login(&app, "alice", "alice-password").await;

    for value in ["light", "dark"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/user-preferences",
            Some(&token),
            Some(json!({ "key": "theme", "value": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], value);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/user-preferences/theme",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "dark");
    assert_eq!(body["user_id"], app.user_id);
}

#[tokio::test]
async fn test_preferences_are_per_user() {
    let app = setup().await;
    let alice = login(&app, "alice", "alice-password").await;
    let admin = login(&app, "admin", "admin-password").await;

    send(
        &app,
        "POST",
        "/api/user-preferences",
        Some(&alice),
        Some(json!({ "key": "language", "value": "fr" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/user-preferences/language",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = setup_with(Some(Arc::new(handle)), &[]).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
    assert!(content_type.contains("version=0.0.4"));
}

#[tokio::test]
async fn test_metrics_endpoint_absent_without_handle() {
    let app = setup().await;

    let (status, _) = send(&app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn preflight(app: &TestApp, origin: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/tasks")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_cors_preflight_from_allowed_origin() {
    let app = setup_with(None, &[ALLOWED_ORIGIN.to_string()]).await;

    let response = preflight(&app, ALLOWED_ORIGIN).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ALLOWED_ORIGIN
    );
    let allowed_methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed_methods.contains("DELETE"));
}

#[tokio::test]
async fn test_cors_preflight_from_other_origin() {
    let app = setup_with(None, &[ALLOWED_ORIGIN.to_string()]).await;

    let response = preflight(&app, "https://evil.example.com").await;

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
