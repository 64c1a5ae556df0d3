//! Shared helpers for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use folio_api::config::ApiConfig;
use folio_api::{AppState, router};
use folio_core::auth::jwt::JwtSecret;
use folio_core::auth::password::hash_password;
use folio_core::models::auth::{Identity, NewIdentity};
use folio_core::store::UserStore;
use folio_core::store::memory::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut ApiConfig)) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let store = Arc::new(MemoryStore::new());
        let mut config = ApiConfig::for_secret(JwtSecret::new(SECRET).unwrap());
        tweak(&mut config);
        let state = AppState::new(store.clone(), config).unwrap();
        Self { store, state }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn add_user(&self, email: &str, name: &str, password: &str, is_admin: bool) -> Identity {
        self.store
            .create_user(NewIdentity {
                email: email.into(),
                name: name.into(),
                password_hash: hash_password(password).unwrap(),
                is_admin,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, identity: &Identity) -> String {
        self.state.tokens.issue(identity).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router().oneshot(req).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, json)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}
