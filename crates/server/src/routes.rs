use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod auth;
pub mod products;
pub mod stock;

use auth::ServerState;
use stock::{stock_in, stock_out};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

/// Build the full application router: public auth endpoints, bearer-guarded
/// inventory endpoints under `/api`, plus health, metrics and docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public_auth = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/products", get(products::list).post(products::create))
        .route("/products/summary", get(products::summary))
        .route("/products/by-product-id/:product_id", get(products::get_by_product_id))
        .route("/products/:id", get(products::get).patch(products::update).delete(products::delete))
        .route("/stock-in", get(stock_in::list).post(stock_in::create))
        .route("/stock-in/by-reference/:reference", get(stock_in::get_by_reference))
        .route("/stock-in/:id", get(stock_in::get).delete(stock_in::delete))
        .route("/stock-out", get(stock_out::list).post(stock_out::create))
        .route("/stock-out/by-reference/:reference", get(stock_out::get_by_reference))
        .route("/stock-out/:id", get(stock_out::get).delete(stock_out::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    let api = public_auth.merge(protected);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
