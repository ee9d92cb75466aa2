//! Password verification port.

use crate::errors::DomainResult;

/// Interface to the external password-verification collaborator
///
/// The hashing scheme and its storage format live outside this service;
/// callers only learn whether a plaintext matches a stored hash.
pub trait PasswordVerifier: Send + Sync {
    /// Check a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, password_hash: &str) -> DomainResult<bool>;
}
