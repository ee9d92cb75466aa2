//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token issuance configuration (issuer, audience, lifetimes)
//! - `keys` - Signing key rotation configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod keys;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::TokenConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use keys::KeyRotationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token issuance configuration
    pub token: TokenConfig,

    /// Signing key rotation configuration
    pub keys: KeyRotationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            token: TokenConfig::default(),
            keys: KeyRotationConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            database: DatabaseConfig::from_env(),
            token: TokenConfig::from_env(),
            keys: KeyRotationConfig::from_env(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}
