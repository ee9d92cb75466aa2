//! Mock implementation of KeyRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::signing_key::KeyPair;
use crate::errors::DomainError;

use super::r#trait::KeyRepository;

/// In-memory key registry for testing
pub struct MockKeyRepository {
    keys: Arc<RwLock<HashMap<String, KeyPair>>>,
}

impl MockKeyRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }
}

impl Default for MockKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyRepository for MockKeyRepository {
    async fn save_key(&self, key: KeyPair) -> Result<KeyPair, DomainError> {
        let mut keys = self.keys.write().await;

        if keys.contains_key(&key.kid) {
            return Err(DomainError::Validation {
                message: "Key already exists".to_string(),
            });
        }

        keys.insert(key.kid.clone(), key.clone());
        Ok(key)
    }

    async fn load_keys(&self) -> Result<Vec<KeyPair>, DomainError> {
        let keys = self.keys.read().await;
        let mut unexpired: Vec<KeyPair> =
            keys.values().filter(|k| !k.is_expired()).cloned().collect();
        unexpired.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(unexpired)
    }

    async fn mark_retired(&self, kid: &str) -> Result<bool, DomainError> {
        let mut keys = self.keys.write().await;

        if let Some(key) = keys.get_mut(kid) {
            key.retire();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_expired_keys(&self) -> Result<usize, DomainError> {
        let mut keys = self.keys.write().await;
        let initial_count = keys.len();

        keys.retain(|_, key| !key.is_expired());

        Ok(initial_count - keys.len())
    }
}
