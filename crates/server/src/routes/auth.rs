use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use common::types::Message;
use service::auth::{
    domain::{AuthSession, Claims, LoginInput, RegisterInput},
    repository::AuthRepository,
    AuthService,
};
use service::product::{repository::ProductRepository, ProductService};
use service::stock::{reconciler::QuantityReconciler, repository::StockLedgerRepository, StockInService, StockOutService};

use crate::errors::{ApiJson, JsonApiError};

pub const REFRESH_COOKIE: &str = "refresh_token";

pub type DynProductService = ProductService<dyn ProductRepository>;
pub type DynStockInService = StockInService<dyn StockLedgerRepository, dyn QuantityReconciler>;
pub type DynStockOutService = StockOutService<dyn StockLedgerRepository, dyn QuantityReconciler>;
pub type DynAuthService = AuthService<dyn AuthRepository>;

/// Attributes of the refresh-token cookie.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<DynAuthService>,
    pub cookies: CookieSettings,
    pub products: Arc<DynProductService>,
    pub stock_in: Arc<DynStockInService>,
    pub stock_out: Arc<DynStockOutService>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenOutput {
    pub access_token: String,
}

fn refresh_cookie(settings: &CookieSettings, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(settings.secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(settings.max_age_secs));
    cookie
}

fn issue(state: &ServerState, jar: CookieJar, session: AuthSession) -> (CookieJar, Json<AccessTokenOutput>) {
    let jar = jar.add(refresh_cookie(&state.cookies, session.tokens.refresh_token));
    (jar, Json(AccessTokenOutput { access_token: session.tokens.access_token }))
}

#[utoipa::path(
    post, path = "/api/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 200, description = "Registered; refresh cookie set", body = crate::openapi::AccessTokenResponse),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Conflict", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): ApiJson<RegisterInput>,
) -> Result<(CookieJar, Json<AccessTokenOutput>), JsonApiError> {
    let session = state.auth.register(input).await?;
    Ok(issue(&state, jar, session))
}

#[utoipa::path(
    post, path = "/api/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in; refresh cookie set", body = crate::openapi::AccessTokenResponse),
        (status = 403, description = "Access Denied", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<AccessTokenOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(issue(&state, jar, session))
}

#[utoipa::path(
    post, path = "/api/auth/refresh", tag = "auth",
    responses(
        (status = 200, description = "Rotated; new refresh cookie set", body = crate::openapi::AccessTokenResponse),
        (status = 401, description = "No refresh cookie", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Access Denied", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessTokenOutput>), JsonApiError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| JsonApiError::unauthorized("missing refresh token"))?;
    let session = state.auth.refresh_with_token(&presented).await?;
    Ok(issue(&state, jar, session))
}

#[utoipa::path(
    post, path = "/api/auth/logout", tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out; refresh cookie cleared", body = crate::openapi::MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Message>), JsonApiError> {
    state.auth.logout(claims.sub).await?;
    let mut removal = Cookie::from(REFRESH_COOKIE);
    removal.set_path("/");
    Ok((jar.remove(removal), Json(Message::new("logged out"))))
}

#[utoipa::path(
    get, path = "/api/auth/me", tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Claims of the presented access token", body = crate::openapi::ClaimsResponse),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn me(Extension(claims): Extension<Claims>) -> Json<Claims> {
    Json(claims)
}

/// Bearer-token guard for protected routes: verifies the access token and
/// hands its claims to handlers as a request extension.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();
    let token = match req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("expected Authorization: Bearer <token>"));
            }
        },
        None => {
            warn!(path = %path, "missing Authorization header");
            return Err(JsonApiError::unauthorized("missing bearer token"));
        }
    };

    match state.auth.tokens().verify_access(&token) {
        Ok(claims) => {
            debug!(path = %path, user_id = %claims.sub, "bearer_verified");
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(e.into())
        }
    }
}
