//! Storage layer: connection pool, the `UserStore` seam, and its backends.
pub mod memory;
pub mod schema;
pub mod user_repo;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Connection, MySqlConnection, MySqlPool};
use sqlx::mysql::MySqlPoolOptions;
use thiserror::Error;
use tracing::info;

use crate::config::DbConfig;
use user_repo::User;

pub type Db = MySqlPool;

/// Open the bounded pool after proving the server is reachable.
///
/// The first connection is made directly rather than through the pool, so an
/// unreachable server fails at once with the driver's own error instead of
/// being retried until the acquire timeout. Callers treat failure as fatal.
pub async fn init_db(config: &DbConfig) -> anyhow::Result<Db> {
    let options = config.connect_options();
    let conn = MySqlConnection::connect_with(&options)
        .await
        .with_context(|| format!("failed to connect to mysql at {}", config.display_target()))?;
    conn.close().await?;

    let pool = MySqlPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy_with(options);

    info!(
        target = %config.display_target(),
        pool_size = config.pool_size,
        "connected to mysql"
    );
    Ok(pool)
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same unique key (email) already exists.
    #[error("duplicate key")]
    DuplicateKey,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the HTTP layer and the schema initializer need from storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the `users` table if it does not exist yet.
    async fn ensure_schema(&self) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<i64>;

    /// Every user, newest first.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Insert a user and return the id assigned by storage.
    async fn insert(&self, name: &str, email: &str) -> StoreResult<i64>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;
}
