//! Token entities: signed access-token claims, ledgered refresh tokens,
//! and the pair handed back to clients.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainResult, ValidationError};

/// Token type stamped into issued pairs
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Claims structure for the access-token payload
///
/// Carries the registered claim set plus the granted scopes. Deployment-
/// specific extension claims land in `extra` via serde flattening, so the
/// required fields stay typed while vendors can still append their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (user ID)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,

    /// Not-before timestamp; 0 means valid immediately
    #[serde(default)]
    pub nbf: i64,

    /// Issued-at timestamp
    pub iat: i64,

    /// Unique token identifier, fresh per issuance
    pub jti: String,

    /// Scopes granted to this token
    pub scopes: Vec<String>,

    /// Vendor-specific extension claims
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Creates claims for a new access token
    pub fn new_access_token(
        user_id: Uuid,
        scopes: Vec<String>,
        issuer: &str,
        audience: &str,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            aud: audience.to_string(),
            exp: (now + lifetime).timestamp(),
            nbf: 0,
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            scopes,
            extra: HashMap::new(),
        }
    }

    /// Adds a vendor-specific extension claim
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Checks whether the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Refresh token entity recorded in the ledger
///
/// The `id` is the opaque credential handed to the client; resolving it
/// always goes through the ledger. A token id is consumable at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Opaque credential and primary ledger key
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// Scopes granted at issuance; an exchange may only narrow these
    pub scopes: Vec<String>,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been exchanged already
    pub consumed: bool,
}

impl RefreshToken {
    /// Creates a new unconsumed refresh token
    ///
    /// The lifetime must be positive; a token born expired is malformed.
    pub fn new(user_id: Uuid, scopes: Vec<String>, lifetime: Duration) -> DomainResult<Self> {
        if lifetime <= Duration::zero() {
            return Err(ValidationError::ExpiryInPast.into());
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            scopes,
            created_at: now,
            expires_at: now + lifetime,
            consumed: false,
        })
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Marks the token consumed
    ///
    /// Returns `false` when the token was consumed already. Callers holding
    /// exclusive access to the entity (a write lock or a database row
    /// update) use this as the single check-and-mark step.
    pub fn consume(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        true
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh token credential
    pub refresh_token: Uuid,

    /// Token type for the Authorization header
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: Uuid, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}
