//! bcrypt-backed password verification.

use aegis_core::errors::{DomainError, DomainResult};
use aegis_core::services::auth::PasswordVerifier;

/// Verifies plaintext passwords against bcrypt hashes
pub struct BcryptPasswordVerifier;

impl PasswordVerifier for BcryptPasswordVerifier {
    fn verify(&self, plaintext: &str, password_hash: &str) -> DomainResult<bool> {
        bcrypt::verify(plaintext, password_hash).map_err(|e| DomainError::Internal {
            message: format!("Password verification failed: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_password_verifies() {
        // low cost keeps the test fast; the scheme is the same
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        let verifier = BcryptPasswordVerifier;

        assert!(verifier.verify("correct horse", &hash).unwrap());
        assert!(!verifier.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let verifier = BcryptPasswordVerifier;
        assert!(verifier.verify("anything", "not-a-bcrypt-hash").is_err());
    }
}
