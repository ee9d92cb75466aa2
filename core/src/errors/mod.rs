//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, KeyError, TokenError, ValidationError};

use aegis_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A ledger or registry operation exceeded its bounded timeout.
    /// Retryable by the caller.
    #[error("Storage operation timed out")]
    StorageTimeout,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Token(err) => {
                // Verification internals stay server-side; the message is
                // the generic code text, not the specific failed check.
                ErrorResponse::new(err.client_code(), "invalid token")
            }
            DomainError::Auth(AuthError::ScopeDenied { scope }) => {
                ErrorResponse::new(error_codes::SCOPE_DENIED, "requested scope not granted")
                    .add_detail("scope", scope)
            }
            DomainError::Auth(_) => {
                ErrorResponse::new(error_codes::UNAUTHORIZED, "authentication failed")
            }
            DomainError::StorageTimeout => {
                ErrorResponse::new(error_codes::SERVICE_UNAVAILABLE, "temporarily unavailable")
            }
            DomainError::Validation { message } => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone())
            }
            DomainError::ValidationErr(err) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, err.to_string())
            }
            DomainError::NotFound { resource } => {
                ErrorResponse::new(error_codes::NOT_FOUND, format!("not found: {}", resource))
            }
            DomainError::Key(_) | DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "internal error")
            }
        }
    }
}
