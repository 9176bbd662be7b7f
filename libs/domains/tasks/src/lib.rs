//! Tasks Domain
//!
//! Hierarchical task management: tasks nest under parent tasks up to a
//! fixed depth ceiling, titles are unique per owner, and every mutation
//! re-derives the task's depth level from its parent chain.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, ownership checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Hierarchy rules, uniqueness, depth ceiling
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + record-store impl)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{TaskError, TaskResult};
pub use models::{CreateTask, MAX_LEVEL, Priority, Task, TaskFilter, UpdateTask};
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
