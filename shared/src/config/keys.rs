//! Signing key rotation configuration

use serde::{Deserialize, Serialize};

/// Configuration for the signing key rotator
///
/// The rotation interval must stay shorter than the key lifetime so a
/// replacement key is always promoted before the active one expires.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyRotationConfig {
    /// How often a new signing key is generated and promoted, in seconds
    pub rotation_interval_secs: u64,

    /// Lifetime of a generated key pair, in seconds. Retired public keys
    /// stay in the verification set until this expiry passes.
    pub key_expiry_secs: u64,

    /// RSA modulus size in bits for generated key pairs
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,

    /// Initial backoff after a failed generation attempt, in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum generation attempts per rotation cycle
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for KeyRotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval_secs: 60 * 60 * 24,     // rotate daily
            key_expiry_secs: 60 * 60 * 24 * 3,        // keys verify for 3 days
            key_bits: default_key_bits(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl KeyRotationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let rotation_interval_secs = std::env::var("KEY_ROTATION_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86_400);
        let key_expiry_secs = std::env::var("KEY_EXPIRY_SECS")
            .unwrap_or_else(|_| "259200".to_string())
            .parse()
            .unwrap_or(259_200);

        Self {
            rotation_interval_secs,
            key_expiry_secs,
            ..Default::default()
        }
    }

    /// Set the rotation interval in seconds
    pub fn with_rotation_interval_secs(mut self, secs: u64) -> Self {
        self.rotation_interval_secs = secs;
        self
    }

    /// Set the key lifetime in seconds
    pub fn with_key_expiry_secs(mut self, secs: u64) -> Self {
        self.key_expiry_secs = secs;
        self
    }

    /// Check the interval/lifetime relationship
    ///
    /// Returns `false` when the rotation interval is not strictly shorter
    /// than the key lifetime, which would leave a window with no valid key.
    pub fn is_valid(&self) -> bool {
        self.rotation_interval_secs < self.key_expiry_secs
    }

    /// Rotation interval as a [`std::time::Duration`]
    pub fn rotation_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.rotation_interval_secs)
    }

    /// Key lifetime as a [`chrono::Duration`]
    pub fn key_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.key_expiry_secs as i64)
    }

    /// Initial retry backoff as a [`std::time::Duration`]
    pub fn retry_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_backoff_ms)
    }
}

fn default_key_bits() -> usize {
    2048
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    5
}
