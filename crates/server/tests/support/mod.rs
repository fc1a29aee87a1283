#![allow(dead_code)]

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth::{CookieSettings, ServerState}};
use service::auth::{repository::{mock::MockAuthRepository, AuthRepository}, AuthService, TokenIssuer};
use service::mock::MockInventory;
use service::product::{repository::ProductRepository, ProductService};
use service::stock::{
    reconciler::QuantityReconciler, repository::StockLedgerRepository, StockInService, StockOutService,
};

/// Router over in-memory repositories; no database needed.
pub fn build_app() -> Router {
    let inv = Arc::new(MockInventory::default());
    let products: Arc<dyn ProductRepository> = inv.clone();
    let ledger: Arc<dyn StockLedgerRepository> = inv.clone();
    let reconciler: Arc<dyn QuantityReconciler> = inv;
    let users: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
    let tokens = Arc::new(TokenIssuer::new("test-access-secret", 900, "test-refresh-secret", 604_800));
    let fast = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(1024, 1, 1, None).unwrap());

    let state = ServerState {
        auth: Arc::new(AuthService::new(users, tokens).with_hasher(fast)),
        cookies: CookieSettings { secure: false, max_age_secs: 604_800 },
        products: Arc::new(ProductService::new(products)),
        stock_in: Arc::new(StockInService::new(ledger.clone(), reconciler.clone())),
        stock_out: Arc::new(StockOutService::new(ledger, reconciler)),
    };
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Value of the `refresh_token` cookie set by this response, if any.
    pub fn refresh_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("refresh_token="))
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    }

    pub fn set_cookie(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    TestResponse { status, headers, body }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

/// JSON content type with an arbitrary (possibly malformed) body.
pub fn raw_request(method: &str, uri: &str, token: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    empty("GET", uri, token)
}

pub fn empty(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn with_refresh_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, format!("refresh_token={}", cookie))
        .body(Body::empty())
        .unwrap()
}

/// Register a fresh user; returns (access token, refresh cookie value).
pub async fn register(app: &Router, email: &str) -> (String, String) {
    let resp = send(
        app,
        json_request("POST", "/api/auth/register", None, json!({"email": email, "password": "S3curePass!", "name": "Tester"})),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "register failed: {}", resp.body);
    let access = resp.body["access_token"].as_str().unwrap().to_string();
    let refresh = resp.refresh_cookie().unwrap();
    (access, refresh)
}
