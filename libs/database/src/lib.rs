//! Generic transactional record storage.
//!
//! This crate defines the persistence boundary consumed by the domain
//! services: opaque record identifiers, the [`RecordStore`] contract, and an
//! in-memory implementation whose mutating operations run constraint checks
//! and the write inside a single critical section.

pub mod id;
pub mod memory;
pub mod record;

pub use id::{ParseRecordIdError, RecordId};
pub use memory::MemoryStore;
pub use record::{Record, RecordStore, StoreError, StoreResult};
