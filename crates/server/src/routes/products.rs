use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use models::product;
use service::product::domain::{InventorySummary, NewProduct, ProductPatch, ProductQuery};

use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
use crate::routes::auth::ServerState;

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    security(("bearer" = [])),
    params(
        ("category" = Option<String>, Query, description = "Exact category"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on productId, name or description"),
        ("status" = Option<String>, Query, description = "all | in-stock | low-stock | out-of-stock")
    ),
    responses(
        (status = 200, description = "Products; low-stock by quantity, otherwise by name", body = [crate::openapi::ProductResponse]),
        (status = 400, description = "Unknown status", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<product::Model>>, JsonApiError> {
    let rows = state.products.list(&query).await?;
    info!(count = rows.len(), status = ?query.status, "list products");
    Ok(Json(rows))
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    security(("bearer" = [])),
    request_body = crate::openapi::CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductResponse),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Duplicate productId", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<product::Model>), JsonApiError> {
    let created = state.products.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/products/summary", tag = "products",
    security(("bearer" = [])),
    responses((status = 200, description = "Dashboard figures", body = crate::openapi::SummaryResponse))
)]
pub async fn summary(State(state): State<ServerState>) -> Result<Json<InventorySummary>, JsonApiError> {
    Ok(Json(state.products.summary().await?))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "products",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductResponse),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.products.find_one(id).await?))
}

#[utoipa::path(
    get, path = "/api/products/by-product-id/{productId}", tag = "products",
    security(("bearer" = [])),
    params(("productId" = String, Path, description = "External product code")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductResponse),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get_by_product_id(
    State(state): State<ServerState>,
    WithRejection(Path(product_id), _): ApiPath<String>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.products.find_by_product_id(&product_id).await?))
}

#[utoipa::path(
    patch, path = "/api/products/{id}", tag = "products",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = crate::openapi::UpdateProductRequest,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductResponse),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Duplicate productId", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(patch), _): ApiJson<ProductPatch>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.products.update(id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/products/{id}", tag = "products",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product", body = crate::openapi::ProductResponse),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.products.remove(id).await?))
}
