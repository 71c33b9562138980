use crate::config::DatabaseConfig;
use crate::error::StoreError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    fn options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
    }

    /// Connects eagerly and fails fast when the database is unreachable.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let db = Self {
            pool: Self::options(config).connect(&config.url).await?,
        };
        db.ping().await?;
        debug!("Database pool ready (max {} connections)", config.pool_max_size);

        Ok(db)
    }

    /// Pool that opens connections on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Ok(Self {
            pool: Self::options(config).connect_lazy(&config.url)?,
        })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
