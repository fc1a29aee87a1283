//! Stock-in and stock-out ledger endpoints. Both ledgers share one shape, so
//! the handlers live side by side in `stock_in` and `stock_out`.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub product_id: Option<Uuid>,
}

pub mod stock_in {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        Json,
    };
    use axum_extra::extract::WithRejection;
    use uuid::Uuid;

    use models::stock_in;
    use service::stock::domain::{NewStockIn, StockInWithProduct};

    use super::LedgerQuery;
    use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
    use crate::routes::auth::ServerState;

    #[utoipa::path(
        get, path = "/api/stock-in", tag = "stock-in",
        security(("bearer" = [])),
        params(("productId" = Option<Uuid>, Query, description = "Only this product's receipts")),
        responses((status = 200, description = "Receipts, newest first", body = [crate::openapi::StockInResponse]))
    )]
    pub async fn list(
        State(state): State<ServerState>,
        WithRejection(Query(q), _): ApiQuery<LedgerQuery>,
    ) -> Result<Json<Vec<StockInWithProduct>>, JsonApiError> {
        let rows = match q.product_id {
            Some(pid) => state.stock_in.find_by_product(pid).await?,
            None => state.stock_in.find_all().await?,
        };
        Ok(Json(rows))
    }

    #[utoipa::path(
        post, path = "/api/stock-in", tag = "stock-in",
        security(("bearer" = [])),
        request_body = crate::openapi::CreateStockInRequest,
        responses(
            (status = 201, description = "Recorded; product quantity incremented", body = crate::openapi::StockInResponse),
            (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
            (status = 404, description = "Unknown product", body = crate::openapi::ErrorResponse),
            (status = 409, description = "Duplicate reference", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn create(
        State(state): State<ServerState>,
        WithRejection(Json(input), _): ApiJson<NewStockIn>,
    ) -> Result<(StatusCode, Json<stock_in::Model>), JsonApiError> {
        let created = state.stock_in.create(input).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    #[utoipa::path(
        get, path = "/api/stock-in/{id}", tag = "stock-in",
        security(("bearer" = [])),
        params(("id" = Uuid, Path, description = "Stock-in ID")),
        responses(
            (status = 200, description = "OK", body = crate::openapi::StockInResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn get(
        State(state): State<ServerState>,
        WithRejection(Path(id), _): ApiPath<Uuid>,
    ) -> Result<Json<StockInWithProduct>, JsonApiError> {
        Ok(Json(state.stock_in.find_one(id).await?))
    }

    #[utoipa::path(
        get, path = "/api/stock-in/by-reference/{reference}", tag = "stock-in",
        security(("bearer" = [])),
        params(("reference" = String, Path, description = "Receipt reference")),
        responses(
            (status = 200, description = "OK", body = crate::openapi::StockInResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn get_by_reference(
        State(state): State<ServerState>,
        WithRejection(Path(reference), _): ApiPath<String>,
    ) -> Result<Json<StockInWithProduct>, JsonApiError> {
        Ok(Json(state.stock_in.find_by_reference(&reference).await?))
    }

    #[utoipa::path(
        delete, path = "/api/stock-in/{id}", tag = "stock-in",
        security(("bearer" = [])),
        params(("id" = Uuid, Path, description = "Stock-in ID")),
        responses(
            (status = 200, description = "Removed; product quantity decremented", body = crate::openapi::StockInResponse),
            (status = 400, description = "Stock already consumed", body = crate::openapi::ErrorResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn delete(
        State(state): State<ServerState>,
        WithRejection(Path(id), _): ApiPath<Uuid>,
    ) -> Result<Json<StockInWithProduct>, JsonApiError> {
        Ok(Json(state.stock_in.remove(id).await?))
    }
}

pub mod stock_out {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        Json,
    };
    use axum_extra::extract::WithRejection;
    use uuid::Uuid;

    use models::stock_out;
    use service::stock::domain::{NewStockOut, StockOutWithProduct};

    use super::LedgerQuery;
    use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
    use crate::routes::auth::ServerState;

    #[utoipa::path(
        get, path = "/api/stock-out", tag = "stock-out",
        security(("bearer" = [])),
        params(("productId" = Option<Uuid>, Query, description = "Only this product's issues")),
        responses((status = 200, description = "Issues, newest first", body = [crate::openapi::StockOutResponse]))
    )]
    pub async fn list(
        State(state): State<ServerState>,
        WithRejection(Query(q), _): ApiQuery<LedgerQuery>,
    ) -> Result<Json<Vec<StockOutWithProduct>>, JsonApiError> {
        let rows = match q.product_id {
            Some(pid) => state.stock_out.find_by_product(pid).await?,
            None => state.stock_out.find_all().await?,
        };
        Ok(Json(rows))
    }

    #[utoipa::path(
        post, path = "/api/stock-out", tag = "stock-out",
        security(("bearer" = [])),
        request_body = crate::openapi::CreateStockOutRequest,
        responses(
            (status = 201, description = "Recorded; product quantity decremented", body = crate::openapi::StockOutResponse),
            (status = 400, description = "Validation Error or insufficient stock", body = crate::openapi::ErrorResponse),
            (status = 404, description = "Unknown product", body = crate::openapi::ErrorResponse),
            (status = 409, description = "Duplicate reference", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn create(
        State(state): State<ServerState>,
        WithRejection(Json(input), _): ApiJson<NewStockOut>,
    ) -> Result<(StatusCode, Json<stock_out::Model>), JsonApiError> {
        let created = state.stock_out.create(input).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    #[utoipa::path(
        get, path = "/api/stock-out/{id}", tag = "stock-out",
        security(("bearer" = [])),
        params(("id" = Uuid, Path, description = "Stock-out ID")),
        responses(
            (status = 200, description = "OK", body = crate::openapi::StockOutResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn get(
        State(state): State<ServerState>,
        WithRejection(Path(id), _): ApiPath<Uuid>,
    ) -> Result<Json<StockOutWithProduct>, JsonApiError> {
        Ok(Json(state.stock_out.find_one(id).await?))
    }

    #[utoipa::path(
        get, path = "/api/stock-out/by-reference/{reference}", tag = "stock-out",
        security(("bearer" = [])),
        params(("reference" = String, Path, description = "Issue reference")),
        responses(
            (status = 200, description = "OK", body = crate::openapi::StockOutResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn get_by_reference(
        State(state): State<ServerState>,
        WithRejection(Path(reference), _): ApiPath<String>,
    ) -> Result<Json<StockOutWithProduct>, JsonApiError> {
        Ok(Json(state.stock_out.find_by_reference(&reference).await?))
    }

    #[utoipa::path(
        delete, path = "/api/stock-out/{id}", tag = "stock-out",
        security(("bearer" = [])),
        params(("id" = Uuid, Path, description = "Stock-out ID")),
        responses(
            (status = 200, description = "Removed; product restocked", body = crate::openapi::StockOutResponse),
            (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
        )
    )]
    pub async fn delete(
        State(state): State<ServerState>,
        WithRejection(Path(id), _): ApiPath<Uuid>,
    ) -> Result<Json<StockOutWithProduct>, JsonApiError> {
        Ok(Json(state.stock_out.remove(id).await?))
    }
}
