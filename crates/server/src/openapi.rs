use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ErrorResponse { pub status_code: u16, pub error: String, pub message: String }

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub password: String, pub name: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct AccessTokenResponse { pub access_token: String }

#[derive(ToSchema)]
pub struct ClaimsResponse {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    /// `ADMIN` or `STAFF`
    pub role: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Decimal amounts travel as strings, e.g. `"12.50"`.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub description: Option<String>,
    pub price: String,
    pub min_stock: i32,
    pub quantity: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub description: Option<String>,
    pub price: String,
    pub min_stock: Option<i32>,
    pub initial_stock: Option<i32>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// `null` clears the description
    pub description: Option<String>,
    pub price: Option<String>,
    pub min_stock: Option<i32>,
    /// Direct correction of the on-hand count
    pub quantity: Option<i32>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_products: u64,
    pub low_stock: u64,
    pub out_of_stock: u64,
    pub total_quantity: i64,
    pub total_value: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateStockInRequest {
    pub reference: String,
    /// RFC 3339; defaults to now
    pub date: Option<String>,
    pub supplier: String,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub product_id: Uuid,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StockInResponse {
    pub id: Uuid,
    pub reference: String,
    pub date: String,
    pub supplier: String,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub product_id: Uuid,
    pub product: Option<ProductResponse>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateStockOutRequest {
    pub reference: String,
    /// RFC 3339; defaults to now
    pub date: Option<String>,
    pub department: String,
    pub requester: String,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub product_id: Uuid,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StockOutResponse {
    pub id: Uuid,
    pub reference: String,
    pub date: String,
    pub department: String,
    pub requester: String,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub product_id: Uuid,
    pub product: Option<ProductResponse>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::products::list,
        crate::routes::products::create,
        crate::routes::products::summary,
        crate::routes::products::get,
        crate::routes::products::get_by_product_id,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::stock::stock_in::list,
        crate::routes::stock::stock_in::create,
        crate::routes::stock::stock_in::get,
        crate::routes::stock::stock_in::get_by_reference,
        crate::routes::stock::stock_in::delete,
        crate::routes::stock::stock_out::list,
        crate::routes::stock::stock_out::create,
        crate::routes::stock::stock_out::get,
        crate::routes::stock::stock_out::get_by_reference,
        crate::routes::stock::stock_out::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            AccessTokenResponse,
            ClaimsResponse,
            ProductResponse,
            CreateProductRequest,
            UpdateProductRequest,
            SummaryResponse,
            CreateStockInRequest,
            StockInResponse,
            CreateStockOutRequest,
            StockOutResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "products"),
        (name = "stock-in"),
        (name = "stock-out")
    )
)]
pub struct ApiDoc;
