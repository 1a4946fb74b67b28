#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tasklist::{
    ServerConfig,
    auth::PublicPaths,
    clock::ManualClock,
    create_app,
    db::Database,
    jwt::{TokenCodec, TokenLifetimes},
};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

/// An app over an in-memory database with a hand-driven clock.
pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub clock: ManualClock,
    /// Codec sharing the app's secret and clock.
    pub jwt: TokenCodec,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    /// Access token from a renewal's `Authorization` response header.
    pub fn renewed_token(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_public_paths(PublicPaths::default()).await
    }

    pub async fn with_public_paths(public_paths: PublicPaths) -> Self {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let clock = ManualClock::starting_now();
        let lifetimes = TokenLifetimes::default();
        let config = ServerConfig {
            db: db.clone(),
            jwt_secret: TEST_SECRET.to_vec(),
            lifetimes,
            public_paths,
            clock: Arc::new(clock.clone()),
        };
        let jwt = TokenCodec::new(TEST_SECRET)
            .with_lifetimes(lifetimes)
            .with_clock(Arc::new(clock.clone()));

        Self {
            app: create_app(&config),
            db,
            clock,
            jwt,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn signup(&self, username: &str, password: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/users/signup",
            &serde_json::json!({ "username": username, "password": password }),
        ))
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/users/login",
            &serde_json::json!({ "username": username, "password": password }),
        ))
        .await
    }

    /// Sign up and log in. Returns (access_token, refresh_token).
    pub async fn register(&self, username: &str) -> (String, String) {
        let response = self.signup(username, "password123").await;
        assert_eq!(response.status, StatusCode::CREATED);

        let response = self.login(username, "password123").await;
        assert_eq!(response.status, StatusCode::OK);

        (
            response.json["access_token"].as_str().unwrap().to_string(),
            response.json["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Move the clock past the access token lifetime.
    pub fn expire_access_tokens(&self) {
        self.clock.advance(self.jwt.lifetimes().access_secs);
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request carrying the given credentials.
pub fn authed_request(
    method: &str,
    uri: &str,
    access: Option<&str>,
    refresh: Option<&str>,
    body: Option<&Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(access) = access {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", access));
    }
    if let Some(refresh) = refresh {
        builder = builder.header("Refresh-Token", refresh);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
