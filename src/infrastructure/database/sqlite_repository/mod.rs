use super::ConnectionPool;
use super::Repository;
use crate::infrastructure::realtime::ChangeHub;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

mod comments;
mod likes;
mod mapper;
mod posts;
mod profiles;
mod queries;

/// Store adapter over the managed backend's relational collections. Every
/// committed mutation is published to the change hub, mirroring the hosted
/// store's table-level notifications.
pub struct SqliteRepository {
    pool: ConnectionPool,
    hub: Arc<ChangeHub>,
}

impl SqliteRepository {
    pub fn new(pool: ConnectionPool, hub: Arc<ChangeHub>) -> Self {
        Self { pool, hub }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }
}
