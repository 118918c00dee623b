mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use tower::ServiceExt;

use common::spawn_app;
use mlw_auth::jwt::issue_token;
use mlw_core::models::ids::UserId;

#[tokio::test]
async fn health_needs_no_token() {
    let app = spawn_app().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;
    for uri in ["/surveys/", "/surveys/1/", "/survey-comments/?surveyId=1"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = spawn_app().await;
    let token = issue_token(b"someone-else", UserId(1), 60, None).unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/surveys/")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/surveys/")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
