//! Startup schema creation and sample data seeding.
use tracing::{error, info};

use super::{StoreResult, UserStore};

/// Rows inserted, in order, into an empty table.
pub const SAMPLE_USERS: [(&str, &str); 2] = [
    ("John Doe", "john@example.com"),
    ("Jane Smith", "jane@example.com"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded,
    AlreadyPopulated,
}

/// Create the table if needed and seed it when it holds no rows at all.
pub async fn ensure_schema_and_seed(store: &dyn UserStore) -> StoreResult<SeedOutcome> {
    store.ensure_schema().await?;

    if store.count().await? > 0 {
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    for (name, email) in SAMPLE_USERS {
        store.insert(name, email).await?;
    }
    Ok(SeedOutcome::Seeded)
}

/// Startup wrapper: failures are logged and the server keeps starting.
pub async fn initialize(store: &dyn UserStore) -> Option<SeedOutcome> {
    match ensure_schema_and_seed(store).await {
        Ok(SeedOutcome::Seeded) => {
            info!(count = SAMPLE_USERS.len(), "sample data inserted");
            Some(SeedOutcome::Seeded)
        }
        Ok(outcome) => Some(outcome),
        Err(err) => {
            error!("schema initialization error: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use crate::db::memory::MemoryUserStore;
    use crate::db::user_repo::User;
    use async_trait::async_trait;

    #[tokio::test]
    async fn fresh_store_gets_exactly_the_sample_rows() {
        let store = MemoryUserStore::new();

        let outcome = ensure_schema_and_seed(&store).await.unwrap();

        assert_eq!(outcome, SeedOutcome::Seeded);
        let mut emails: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        emails.sort();
        assert_eq!(emails, vec!["jane@example.com", "john@example.com"]);
    }

    #[tokio::test]
    async fn second_startup_does_not_duplicate() {
        let store = MemoryUserStore::new();

        initialize(&store).await;
        let outcome = initialize(&store).await;

        assert_eq!(outcome, Some(SeedOutcome::AlreadyPopulated));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn any_existing_row_skips_seeding() {
        let store = MemoryUserStore::new();
        store.insert("Ada", "ada@example.com").await.unwrap();

        let outcome = ensure_schema_and_seed(&store).await.unwrap();

        assert_eq!(outcome, SeedOutcome::AlreadyPopulated);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    struct BrokenSchema;

    #[async_trait]
    impl UserStore for BrokenSchema {
        async fn ensure_schema(&self) -> StoreResult<()> {
            Err(StoreError::Storage(sqlx::Error::PoolTimedOut))
        }
        async fn count(&self) -> StoreResult<i64> {
            unreachable!("count after failed schema creation")
        }
        async fn list(&self) -> StoreResult<Vec<User>> {
            unreachable!()
        }
        async fn insert(&self, _name: &str, _email: &str) -> StoreResult<i64> {
            unreachable!()
        }
        async fn find_by_id(&self, _id: i64) -> StoreResult<Option<User>> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn schema_failure_is_logged_not_fatal() {
        assert_eq!(initialize(&BrokenSchema).await, None);
    }
}
