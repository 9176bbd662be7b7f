use axum_helpers::JwtConfig;
use core_config::{FromEnv, server::ServerConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env()?; // Required - will fail if JWT_SECRET is not set

        Ok(Self {
            server,
            jwt,
            environment,
        })
    }
}
