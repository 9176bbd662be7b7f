//! Authentication primitives.
//!
//! This module provides:
//! - JWT access/refresh token creation and verification
//! - Bearer token extraction from request headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, TokenKind};
//! use core_config::FromEnv;
//!
//! let config = JwtConfig::from_env()?;
//! let jwt = JwtAuth::new(&config);
//!
//! let access = jwt.create_access_token("user@example.com")?;
//! let claims = jwt.verify_kind(&access, TokenKind::Access)?;
//! assert_eq!(claims.sub, "user@example.com");
//! ```

pub mod config;
pub mod jwt;

// Re-export commonly used types
pub use config::JwtConfig;
pub use jwt::{AuthError, Claims, JwtAuth, TokenKind};

use axum::http::HeaderMap;

/// Extract the bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not valid UTF-8, or does not
/// use the `Bearer` scheme.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        assert_eq!(extract_bearer(&headers), None);
    }
}
