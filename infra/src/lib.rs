//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Aegis token
//! service. It provides concrete implementations for the repository ports
//! defined in the core crate:
//!
//! - **Database**: MySQL implementations using SQLx (refresh token ledger,
//!   signing key registry, read-only user lookup)
//! - **Auth**: bcrypt-backed password verification

// Re-export core error types for convenience
pub use aegis_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Password verification against bcrypt hashes
pub mod auth;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
