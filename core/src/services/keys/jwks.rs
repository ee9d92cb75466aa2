//! JWKS document derivation.

use std::sync::Arc;

use crate::domain::value_objects::jwks::{Jwk, Jwks};

use super::store::KeyStore;

/// Derived JWKS view over the key store
///
/// Stateless: every call rebuilds the document from the current
/// verification set, so relying parties see a set at most one snapshot
/// behind the rotator.
pub struct JwksPublisher {
    store: Arc<KeyStore>,
}

impl JwksPublisher {
    /// Create a publisher over a key store
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    /// Build the JWKS document, public fields only
    pub fn document(&self) -> Jwks {
        Jwks {
            keys: self
                .store
                .verification_keys()
                .iter()
                .map(|key| Jwk::from(key.entry()))
                .collect(),
        }
    }
}
