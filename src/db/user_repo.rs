//! MySQL-backed repository for rows in the `users` table.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use super::{StoreError, StoreResult, UserStore};

/// Application-level representation of a stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// `UserStore` over a shared MySQL pool. Each call checks a connection out
/// for exactly one statement.
#[derive(Clone)]
pub struct MySqlUserStore {
    db: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(db: MySqlPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.db).await?;
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(cnt.0)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn insert(&self, name: &str, email: &str) -> StoreResult<i64> {
        let res = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(name)
            .bind(email)
            .execute(&self.db)
            .await
            .map_err(map_insert_error)?;

        i64::try_from(res.last_insert_id())
            .map_err(|e| StoreError::Storage(sqlx::Error::Decode(Box::new(e))))
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

/// Unique-constraint violations become `DuplicateKey`; everything else stays
/// a storage error.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    let duplicate = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if duplicate {
        StoreError::DuplicateKey
    } else {
        StoreError::Storage(err)
    }
}
