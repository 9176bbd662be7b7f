//! JWT configuration loaded from the environment.

use core_config::{ConfigError, FromEnv, env_parse_or_default, env_required};

/// Default access token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
/// Default refresh token lifetime (7 days).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604800;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters
/// - `JWT_ACCESS_TTL_SECS` (default: 900)
/// - `JWT_REFRESH_TTL_SECS` (default: 604800)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret and default lifetimes.
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            access_ttl_secs: env_parse_or_default("JWT_ACCESS_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
            refresh_ttl_secs: env_parse_or_default(
                "JWT_REFRESH_TTL_SECS",
                DEFAULT_REFRESH_TTL_SECS,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_valid() {
        let config = JwtConfig::new(VALID_SECRET);
        assert_eq!(config.secret, VALID_SECRET);
        assert_eq!(config.access_ttl_secs, DEFAULT_ACCESS_TTL_SECS);
        assert_eq!(config.refresh_ttl_secs, DEFAULT_REFRESH_TTL_SECS);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(VALID_SECRET)),
                ("JWT_ACCESS_TTL_SECS", Some("60")),
                ("JWT_REFRESH_TTL_SECS", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, VALID_SECRET);
                assert_eq!(config.access_ttl_secs, 60);
                assert_eq!(config.refresh_ttl_secs, DEFAULT_REFRESH_TTL_SECS);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            let err = config.unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            let err = config.unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
