//! Users Domain
//!
//! Account management plus the authentication surface (login, token
//! refresh, request guard middleware).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints + auth middleware
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + record-store impl)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::{AuthState, AuthUser, require_auth};
pub use error::{UserError, UserResult};
pub use models::{
    CreateUser, LoginRequest, RefreshRequest, TokenResponse, UpdateUser, User, UserFilter,
    UserResponse,
};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
