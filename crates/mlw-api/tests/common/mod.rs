#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use mlw_api::state::{AppState, Pagination};
use mlw_auth::jwt::{issue_token, TokenVerifier};
use mlw_core::models::ids::UserId;
use mlw_storage::media::MediaRoot;

pub const SECRET: &[u8] = b"integration-secret";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media: tempfile::TempDir,
}

pub async fn spawn_app() -> TestApp {
    let pool = mlw_storage::pool::connect_in_memory().await.unwrap();
    let media = tempfile::tempdir().unwrap();

    let state = AppState {
        pool: pool.clone(),
        media: MediaRoot::new(media.path()),
        verifier: TokenVerifier::hs256(SECRET, None),
        pagination: Pagination {
            default_size: 2,
            max_size: 10,
        },
    };

    TestApp {
        router: mlw_api::router(state),
        pool,
        media,
    }
}

impl TestApp {
    /// Send a request as `user` (or anonymously) and decode the JSON reply.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = user {
            let token = issue_token(SECRET, user, 300, None).unwrap();
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: UserId) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: UserId, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    /// Create a survey and return its JSON.
    pub async fn create_survey(&self, owner: UserId, body: Value) -> Value {
        let (status, json) = self.post("/surveys/", owner, body).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json
    }
}
