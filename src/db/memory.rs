//! In-memory user store used as a test double for the MySQL backend.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::user_repo::User;
use super::{StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: Vec<User>,
}

/// Mirrors the MySQL table semantics: auto-increment ids that are never
/// reused and a unique email column.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        let table = self.table.read().await;
        Ok(table.rows.len() as i64)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let table = self.table.read().await;
        let mut users = table.rows.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn insert(&self, name: &str, email: &str) -> StoreResult<i64> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateKey);
        }
        table.last_id += 1;
        let id = table.last_id;
        table.rows.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_increase_and_duplicates_are_rejected() {
        let store = MemoryUserStore::new();

        let a = store.insert("Ada", "ada@example.com").await.unwrap();
        let b = store.insert("Grace", "grace@example.com").await.unwrap();
        assert!(b > a);

        let err = store.insert("Ada again", "ada@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey));
        assert_eq!(store.count().await.unwrap(), 2);

        let c = store.insert("Linus", "linus@example.com").await.unwrap();
        assert!(c > b);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryUserStore::new();
        let first = store.insert("First", "first@example.com").await.unwrap();
        let second = store.insert("Second", "second@example.com").await.unwrap();

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn find_by_id_misses_unknown_ids() {
        let store = MemoryUserStore::new();
        let id = store.insert("Ada", "ada@example.com").await.unwrap();

        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().name, "Ada");
        assert!(store.find_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_same_table() {
        let store = MemoryUserStore::new();
        let handle = store.clone();
        handle.insert("Ada", "ada@example.com").await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
