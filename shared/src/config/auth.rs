//! Token issuance and exchange configuration

use serde::{Deserialize, Serialize};

/// Token issuance configuration
///
/// Controls the claims stamped into access tokens, the lifetime of both
/// token kinds, and the replay-response policy applied by the exchange path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Issuer claim stamped into access tokens
    pub issuer: String,

    /// Audience claim stamped into access tokens
    pub audience: String,

    /// Access token lifetime in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_expiry_days: i64,

    /// Revoke all outstanding refresh tokens of a user when a replayed
    /// refresh token is detected
    #[serde(default = "default_revoke_on_replay")]
    pub revoke_on_replay: bool,

    /// Upper bound for a single ledger operation, in milliseconds
    #[serde(default = "default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("aegis-auth"),
            audience: String::from("aegis-api"),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            revoke_on_replay: default_revoke_on_replay(),
            storage_timeout_ms: default_storage_timeout_ms(),
        }
    }
}

impl TokenConfig {
    /// Create configuration with an explicit issuer and audience
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry_minutes = minutes;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry_days = days;
        self
    }

    /// Set the replay revocation policy
    pub fn with_revoke_on_replay(mut self, revoke: bool) -> Self {
        self.revoke_on_replay = revoke;
        self
    }

    /// Storage timeout as a [`std::time::Duration`]
    pub fn storage_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.storage_timeout_ms)
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let issuer =
            std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| String::from("aegis-auth"));
        let audience =
            std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| String::from("aegis-api"));
        let access_token_expiry_minutes = std::env::var("ACCESS_TOKEN_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);
        let refresh_token_expiry_days = std::env::var("REFRESH_TOKEN_EXPIRY_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7);
        let revoke_on_replay = std::env::var("REVOKE_ON_REPLAY")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Self {
            issuer,
            audience,
            access_token_expiry_minutes,
            refresh_token_expiry_days,
            revoke_on_replay,
            storage_timeout_ms: default_storage_timeout_ms(),
        }
    }
}

fn default_revoke_on_replay() -> bool {
    true
}

fn default_storage_timeout_ms() -> u64 {
    5_000
}
