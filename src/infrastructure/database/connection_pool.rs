use crate::shared::config::DatabaseConfig;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;

#[derive(Clone)]
pub struct ConnectionPool {
    pool: Arc<SqlitePool>,
}

impl ConnectionPool {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// A private in-memory database with a unique shared-cache name, so every
    /// pooled connection sees the same data and parallel tests stay isolated.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let name = uuid::Uuid::new_v4().simple().to_string();
        let url = format!("sqlite:file:comunidade-{name}?mode=memory&cache=shared");
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect(&url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
