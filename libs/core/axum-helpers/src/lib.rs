//! # Axum Helpers
//!
//! Shared HTTP plumbing for the API services.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT access/refresh token codec and bearer extraction
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (record-id path, validated JSON)

pub mod auth;
pub mod errors;
pub mod extractors;

// Re-export auth types
pub use auth::{extract_bearer, AuthError, Claims, JwtAuth, JwtConfig, TokenKind};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{IdPath, ValidatedJson};
