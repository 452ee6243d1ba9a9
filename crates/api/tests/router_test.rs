//! Router behaviour: authentication, permissions and request validation.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use webbudget_api::{AppState, create_router};
use webbudget_core::auth::hash_password;
use webbudget_db::entities::{cost_centers, users};
use webbudget_shared::{JwtConfig, JwtService};

fn state_with(db: MockDatabase) -> AppState {
    AppState {
        db: Arc::new(db.into_connection()),
        jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
    }
}

fn empty_state() -> AppState {
    state_with(MockDatabase::new(DatabaseBackend::Postgres))
}

fn app(state: AppState) -> Router {
    create_router(state, Duration::from_secs(5))
}

fn token(state: &AppState, permissions: &[&str]) -> String {
    let permissions: Vec<String> = permissions.iter().map(ToString::to_string).collect();
    state
        .jwt_service
        .issue(Uuid::now_v7(), "Tester", &permissions)
        .unwrap()
        .access_token
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let response = app(empty_state())
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[rstest]
#[case("/api/v1/wallets")]
#[case("/api/v1/movements")]
#[case("/api/v1/auth/me")]
#[tokio::test]
async fn test_protected_routes_require_token(#[case] uri: &str) {
    let response = app(empty_state())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "missing_token");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let response = app(empty_state())
        .oneshot(
            Request::builder()
                .uri("/api/v1/cards")
                .header(AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let expired = JwtService::new(JwtConfig {
        access_token_expires_minutes: -10,
        ..JwtConfig::default()
    })
    .issue(Uuid::now_v7(), "Tester", &["wallet:access".to_string()])
    .unwrap()
    .access_token;

    let response = app(empty_state())
        .oneshot(json_request("GET", "/api/v1/wallets", Some(&expired), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "token_expired");
}

#[tokio::test]
async fn test_listing_needs_access_permission() {
    let state = empty_state();
    let token = token(&state, &["card:access"]);

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/v1/wallets")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "forbidden");
    assert!(body["message"].as_str().unwrap().contains("wallet:access"));
}

#[tokio::test]
async fn test_creating_needs_add_permission() {
    let state = empty_state();
    let token = token(&state, &["cost-center:access", "cost-center:update"]);

    let response = app(state)
        .oneshot(json_request(
            "POST",
            "/api/v1/cost-centers",
            Some(&token),
            r#"{"name":"Home"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_payload_is_rejected_before_the_database() {
    let state = empty_state();
    let token = token(&state, &["cost-center:add"]);

    let response = app(state)
        .oneshot(json_request(
            "POST",
            "/api/v1/cost-centers",
            Some(&token),
            r#"{"name":""}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn test_missing_record_is_404() {
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cost_centers::Model>::new()]),
    );
    let token = token(&state, &["cost-center:detail"]);

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/cost-centers/{}", Uuid::now_v7()))
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()]),
    );

    let response = app(state)
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            r#"{"email":"nobody@example.com","password":"whatever1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let now = chrono::Utc::now().into();
    let user = users::Model {
        id: Uuid::now_v7(),
        name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: hash_password("correct-horse").unwrap(),
        blocked: false,
        group_id: None,
        created_at: now,
        updated_at: now,
    };
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![user]]),
    );

    let response = app(state)
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            r#"{"email":"admin@example.com","password":"battery-staple"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let state = empty_state();
    let token = token(&state, &[]);

    let response = app(state)
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/refresh",
            None,
            &format!(r#"{{"refresh_token":"{token}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}
