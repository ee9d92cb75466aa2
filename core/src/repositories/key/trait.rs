//! Registry trait for durable signing key persistence.

use async_trait::async_trait;

use crate::domain::entities::signing_key::KeyPair;
use crate::errors::DomainError;

/// Repository trait for the durable signing key registry
///
/// Backs the in-memory key store across restarts. Private material is
/// persisted only while a key is active; retiring a key nulls it out.
#[async_trait]
pub trait KeyRepository: Send + Sync {
    /// Save a newly generated key pair
    ///
    /// # Returns
    /// * `Ok(KeyPair)` - The saved key
    /// * `Err(DomainError)` - Save failed (e.g., duplicate kid)
    async fn save_key(&self, key: KeyPair) -> Result<KeyPair, DomainError>;

    /// Load all unexpired keys, newest first
    async fn load_keys(&self) -> Result<Vec<KeyPair>, DomainError>;

    /// Discard the persisted private material of a key
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed and is now verification-only
    /// * `Ok(false)` - No key with the given kid
    async fn mark_retired(&self, kid: &str) -> Result<bool, DomainError>;

    /// Delete keys past their expiry
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of keys deleted
    async fn delete_expired_keys(&self) -> Result<usize, DomainError>;
}
