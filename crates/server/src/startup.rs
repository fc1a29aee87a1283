use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth::{CookieSettings, ServerState}};
use service::{
    auth::{repo::SeaOrmAuthRepository, repository::AuthRepository, AuthService, TokenIssuer},
    product::{repository::{ProductRepository, SeaOrmProductRepository}, ProductService},
    stock::{
        reconciler::{QuantityReconciler, SeaOrmQuantityReconciler},
        repository::{SeaOrmStockLedgerRepository, StockLedgerRepository},
        StockInService, StockOutService,
    },
};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the SeaORM repositories behind the service layer.
pub fn build_state(db: DatabaseConnection, cfg: &configs::AuthConfig) -> ServerState {
    let tokens = Arc::new(TokenIssuer::from_config(cfg));
    let users: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository::new(db.clone()));
    let products: Arc<dyn ProductRepository> = Arc::new(SeaOrmProductRepository::new(db.clone()));
    let ledger: Arc<dyn StockLedgerRepository> = Arc::new(SeaOrmStockLedgerRepository::new(db.clone()));
    let reconciler: Arc<dyn QuantityReconciler> = Arc::new(SeaOrmQuantityReconciler::new(db));
    ServerState {
        auth: Arc::new(AuthService::new(users, tokens)),
        cookies: CookieSettings { secure: cfg.cookie_secure, max_age_secs: cfg.refresh_ttl_secs },
        products: Arc::new(ProductService::new(products)),
        stock_in: Arc::new(StockInService::new(ledger.clone(), reconciler.clone())),
        stock_out: Arc::new(StockOutService::new(ledger, reconciler)),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_or_env()?;

    // DB connection + schema
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    models::db::test_connection(&db).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = build_state(db, &cfg.auth);
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
