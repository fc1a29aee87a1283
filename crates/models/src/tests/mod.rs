/// Database connection tests
pub mod db_tests;



use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Connect and migrate, or `None` when no database is configured for this run.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip: SKIP_DB_TESTS set or DATABASE_URL missing");
        return None;
    }
    let mut cfg = crate::db::DatabaseConfig::from_env();
    cfg.min_connections = 1;
    cfg.connect_timeout = std::time::Duration::from_secs(5);
    let db = match crate::db::connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}
