use crate::{connection::prepare_database, migrations::run_migrations};
use parley_config::DatabaseConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub async fn create_test_db() -> (SqlitePool, TempDir) {
    create_test_db_with_connections(1).await
}

pub async fn create_test_db_with_connections(max_connections: u32) -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections,
    };

    let pool = prepare_database(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    (pool, temp_dir)
}
