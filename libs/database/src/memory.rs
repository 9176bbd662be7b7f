use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::id::RecordId;
use crate::record::{Record, RecordStore, StoreError, StoreResult};

/// In-memory implementation of [`RecordStore`].
///
/// A single `RwLock` write guard spans every mutating operation, so the
/// constraint check and the write form one transaction: a concurrent
/// conflicting writer blocks until the first commits, then fails its own
/// constraint check with `StoreError::Constraint`.
#[derive(Debug, Clone)]
pub struct MemoryStore<R: Record> {
    rows: Arc<RwLock<HashMap<RecordId, R>>>,
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// First record matching the predicate, scanned under a read lock.
    pub async fn find_one<F>(&self, pred: F) -> Option<R>
    where
        F: Fn(&R) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().find(|r| pred(r)).cloned()
    }

    /// Paginated scan of records matching the predicate.
    ///
    /// Results are ordered by id for a stable window; the contract promises
    /// no ordering beyond store-default.
    pub async fn filter_page<F>(&self, offset: usize, limit: usize, pred: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        let rows = self.rows.read().await;
        let mut matched: Vec<R> = rows.values().filter(|r| pred(r)).cloned().collect();
        matched.sort_by(|a, b| a.id().cmp(b.id()));
        matched.into_iter().skip(offset).take(limit).collect()
    }

    pub async fn count_matching<F>(&self, pred: F) -> usize
    where
        F: Fn(&R) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().filter(|r| pred(r)).count()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn get(&self, id: &RecordId) -> StoreResult<Option<R>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<R>> {
        Ok(self.filter_page(offset, limit, |_| true).await)
    }

    async fn insert(&self, record: R) -> StoreResult<R> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(record.id()) {
            return Err(StoreError::Constraint(format!(
                "duplicate id {}",
                record.id()
            )));
        }
        if rows.values().any(|existing| record.conflicts_with(existing)) {
            return Err(StoreError::Constraint(format!(
                "record {} clashes with an existing unique index entry",
                record.id()
            )));
        }

        rows.insert(record.id().clone(), record.clone());
        tracing::debug!(id = %record.id(), "inserted record");
        Ok(record)
    }

    async fn update(&self, record: R) -> StoreResult<R> {
        let mut rows = self.rows.write().await;

        if !rows.contains_key(record.id()) {
            return Err(StoreError::NotFound);
        }
        let clash = rows
            .values()
            .any(|existing| existing.id() != record.id() && record.conflicts_with(existing));
        if clash {
            return Err(StoreError::Constraint(format!(
                "record {} clashes with an existing unique index entry",
                record.id()
            )));
        }

        rows.insert(record.id().clone(), record.clone());
        tracing::debug!(id = %record.id(), "updated record");
        Ok(record)
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: RecordId,
        slug: String,
    }

    impl Note {
        fn new(slug: &str) -> Self {
            Self {
                id: RecordId::generate(),
                slug: slug.to_string(),
            }
        }
    }

    impl Record for Note {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn conflicts_with(&self, other: &Self) -> bool {
            self.slug == other.slug
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = MemoryStore::new();
        let note = store.insert(Note::new("alpha")).await.unwrap();

        let fetched = store.get(&note.id).await.unwrap();
        assert_eq!(fetched, Some(note));
    }

    #[tokio::test]
    async fn insert_rejects_unique_index_clash() {
        let store = MemoryStore::new();
        store.insert(Note::new("alpha")).await.unwrap();

        let result = store.insert(Note::new("alpha")).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));

        // The failed insert left nothing behind.
        assert_eq!(store.count_matching(|_| true).await, 1);
    }

    #[tokio::test]
    async fn update_rejects_clash_but_allows_self() {
        let store = MemoryStore::new();
        store.insert(Note::new("alpha")).await.unwrap();
        let mut beta = store.insert(Note::new("beta")).await.unwrap();

        // Renaming beta onto alpha's slug violates the index.
        beta.slug = "alpha".to_string();
        assert!(matches!(
            store.update(beta.clone()).await,
            Err(StoreError::Constraint(_))
        ));

        // Saving a record over itself is fine.
        beta.slug = "beta".to_string();
        store.update(beta).await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let store = MemoryStore::<Note>::new();
        let ghost = Note::new("ghost");
        assert!(matches!(
            store.update(ghost).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_existed() {
        let store = MemoryStore::new();
        let note = store.insert(Note::new("alpha")).await.unwrap();

        assert!(store.delete(&note.id).await.unwrap());
        assert!(!store.delete(&note.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_applies_skip_take_window() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(Note::new(&format!("n{}", i))).await.unwrap();
        }

        let page = store.list(2, 2).await.unwrap();
        assert_eq!(page.len(), 2);

        let all = store.list(0, 100).await.unwrap();
        assert_eq!(all.len(), 5);
        // Stable ordering across calls.
        let again = store.list(0, 100).await.unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id.clone()).collect();
        let ids_again: Vec<_> = again.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, ids_again);
    }

    #[tokio::test]
    async fn concurrent_conflicting_inserts_admit_exactly_one() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(Note::new("same-slug")).await
            }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }
}
