use async_trait::async_trait;
use thiserror::Error;

use crate::id::RecordId;

/// Errors raised by a record store.
///
/// `Constraint` is the store-enforced uniqueness violation: when two
/// concurrent writers race past application-level checks, exactly one of
/// them receives this error and no partial write remains visible.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Constraint(String),

    #[error("record not found")]
    NotFound,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A storable entity with a stable identifier and a uniqueness rule.
///
/// `conflicts_with` encodes the entity's unique index — e.g. equal email for
/// users, equal `(title, user_id)` for tasks. The store enforces it on every
/// insert and update.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &RecordId;

    fn conflicts_with(&self, other: &Self) -> bool;
}

/// Transactional CRUD contract over one entity type.
///
/// Each mutating operation is atomic: constraint validation and the write
/// either both take effect or neither does.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Fetch a record by id, `None` when absent.
    async fn get(&self, id: &RecordId) -> StoreResult<Option<R>>;

    /// Plain skip/take pagination window, store-default ordering.
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<R>>;

    /// Persist a new record. Fails with `Constraint` on a uniqueness clash.
    async fn insert(&self, record: R) -> StoreResult<R>;

    /// Replace an existing record wholesale. `NotFound` when absent,
    /// `Constraint` when the new state clashes with another record.
    async fn update(&self, record: R) -> StoreResult<R>;

    /// Remove a record. Returns `false` when nothing existed to delete.
    async fn delete(&self, id: &RecordId) -> StoreResult<bool>;
}
