use crate::db::{test_connection, DatabaseConfig};
use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use super::setup_test_db;

#[test]
fn config_maps_seconds_to_durations() {
    let mut c = configs::DatabaseConfig::default();
    c.url = "postgres://localhost/inv".into();
    c.connect_timeout_secs = 7;
    let cfg = DatabaseConfig::from(&c);
    assert_eq!(cfg.connect_timeout, std::time::Duration::from_secs(7));
    assert_eq!(cfg.max_connections, 10);
    assert_eq!(cfg.url, "postgres://localhost/inv");
}

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    test_connection(&db).await?;
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}
