//! Configuration for the token service

use std::time::Duration;

use aegis_shared::config::TokenConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Issuer claim stamped into access tokens
    pub issuer: String,
    /// Audience claim stamped into access tokens
    pub audience: String,
    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,
    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
    /// Revoke every live refresh token of a user on replay detection
    pub revoke_on_replay: bool,
    /// Upper bound for a single ledger operation
    pub storage_timeout: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "aegis-auth".to_string(),
            audience: "aegis-api".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            revoke_on_replay: true,
            storage_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&TokenConfig> for TokenServiceConfig {
    fn from(config: &TokenConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            revoke_on_replay: config.revoke_on_replay,
            storage_timeout: config.storage_timeout(),
        }
    }
}
