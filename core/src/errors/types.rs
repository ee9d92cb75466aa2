//! Domain-specific error types for token and key management operations
//!
//! Error messages here are internal; the client-facing mapping deliberately
//! collapses most verification failures into a single code so callers cannot
//! probe which individual check rejected a token.

use aegis_shared::errors::error_codes;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Requested scope not granted: {scope}")]
    ScopeDenied { scope: String },
}

/// Token-related errors
///
/// Covers both access-token verification and refresh-token exchange
/// failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Issuer or audience mismatch")]
    AudienceMismatch,

    #[error("No verification key with id: {kid}")]
    UnknownKey { kid: String },

    #[error("Unknown refresh token")]
    UnknownToken,

    #[error("Refresh token already consumed")]
    TokenReplay,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl TokenError {
    /// Client-facing error code
    ///
    /// Every verification and exchange failure maps to `INVALID_TOKEN`
    /// except replay detection, which keeps a distinct code so the
    /// transport layer can raise alerting on it.
    pub fn client_code(&self) -> &'static str {
        match self {
            TokenError::TokenReplay => error_codes::TOKEN_REPLAY,
            _ => error_codes::INVALID_TOKEN,
        }
    }
}

/// Signing key lifecycle errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// The key store holds no active signing key. Outside of startup this
    /// is an invariant breach and treated as fatal.
    #[error("No active signing key available")]
    NoActiveKey,

    #[error("Key pair generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },
}

/// Validation errors raised by entity constructors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Expiry must lie in the future")]
    ExpiryInPast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_code_collapses_verification_failures() {
        assert_eq!(TokenError::TokenExpired.client_code(), "INVALID_TOKEN");
        assert_eq!(TokenError::UnknownToken.client_code(), "INVALID_TOKEN");
        assert_eq!(
            TokenError::UnknownKey { kid: "k1".into() }.client_code(),
            "INVALID_TOKEN"
        );
        assert_eq!(TokenError::AudienceMismatch.client_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_client_code_keeps_replay_distinct() {
        assert_eq!(TokenError::TokenReplay.client_code(), "TOKEN_REPLAY");
    }
}
