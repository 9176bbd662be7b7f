use super::config::JwtConfig;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{ErrorCode, ErrorResponse};

/// Distinguishes access tokens from refresh tokens.
///
/// Carried as a claim so a refresh token cannot be replayed against
/// endpoints that require an access token, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // Subject (user email)
    pub kind: TokenKind, // Access or refresh
    pub exp: i64,        // Expiration time
    pub iat: i64,        // Issued at
}

/// Errors produced by token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("expected {expected} token")]
    WrongTokenKind { expected: TokenKind },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::info!(error_code = ErrorCode::Unauthorized.code(), "{}", self);
        let body = Json(ErrorResponse {
            code: ErrorCode::Unauthorized.code(),
            error: ErrorCode::Unauthorized.as_str().to_string(),
            message: self.to_string(),
            details: None,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Stateless HS256 JWT codec for access and refresh tokens.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtAuth {
    /// Create a new JWT codec from configuration.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Create a short-lived access token for the given subject.
    pub fn create_access_token(&self, email: &str) -> Result<String, AuthError> {
        self.create_token(email, TokenKind::Access, self.access_ttl_secs)
    }

    /// Create a long-lived refresh token for the given subject.
    pub fn create_refresh_token(&self, email: &str) -> Result<String, AuthError> {
        self.create_token(email, TokenKind::Refresh, self.refresh_ttl_secs)
    }

    fn create_token(
        &self,
        email: &str,
        kind: TokenKind,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            kind,
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            AuthError::InvalidToken
        })
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Verify the token and additionally require a specific kind.
    pub fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.kind != expected {
            return Err(AuthError::WrongTokenKind { expected });
        }
        Ok(claims)
    }
}
