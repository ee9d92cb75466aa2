//! Shared helpers for unit tests.
//!
//! RSA generation dominates test runtime, so tests draw from a small pool
//! of pre-generated material and stamp a fresh kid (and lifetime) per use.

use std::sync::{Arc, OnceLock};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::role::Role;
use crate::domain::entities::user::User;
use crate::services::keys::{generate_key_pair, ActiveKey, GeneratedKey, KeyStore};

static KEY_POOL: OnceLock<Vec<GeneratedKey>> = OnceLock::new();

fn key_pool() -> &'static [GeneratedKey] {
    KEY_POOL.get_or_init(|| {
        (0..2)
            .map(|_| generate_key_pair(2048, Duration::hours(1)).expect("test key generation"))
            .collect()
    })
}

/// A generated key with pooled RSA material, a fresh kid, and the given
/// lifetime (negative lifetimes produce an already-expired key)
pub fn pooled_key(pool_index: usize, lifetime: Duration) -> GeneratedKey {
    let mut key = key_pool()[pool_index % 2].clone();
    let now = Utc::now();
    key.entry.kid = Uuid::new_v4().to_string();
    key.entry.created_at = now;
    key.entry.expires_at = now + lifetime;
    key
}

/// Active-key form of [`pooled_key`]
pub fn pooled_active_key(pool_index: usize, lifetime: Duration) -> ActiveKey {
    let key = pooled_key(pool_index, lifetime);
    ActiveKey::new(key.entry, key.encoding, key.decoding)
}

/// A key store with one active key installed
pub fn bootstrapped_key_store() -> Arc<KeyStore> {
    let store = Arc::new(KeyStore::new());
    store.install(pooled_active_key(0, Duration::hours(1)));
    store
}

/// A user with roles granting the `read` and `write` scopes
pub fn read_write_user() -> User {
    User::new(
        "alice@example.com",
        "$2b$12$hash",
        vec![
            Role::new("reader", vec!["read".to_string()]).unwrap(),
            Role::new("writer", vec!["write".to_string()]).unwrap(),
        ],
    )
    .unwrap()
}
