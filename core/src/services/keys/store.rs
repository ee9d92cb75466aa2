//! In-memory signing key store.
//!
//! Holds the active signing key and the set of still-verifiable public
//! keys behind an atomically swapped immutable snapshot. Mutations build a
//! fresh ring and swap the `Arc`, so a reader either sees the old ring or
//! the new one, never a half-updated state with two or zero active keys.

use std::sync::{Arc, PoisonError, RwLock};

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::domain::entities::signing_key::KeyPair;
use crate::errors::{DomainError, DomainResult, KeyError};

/// The key currently used to sign new tokens
pub struct ActiveKey {
    entry: KeyPair,
    encoding: EncodingKey,
    public: Arc<VerificationKey>,
}

impl ActiveKey {
    /// Builds an active key from its entity and materialized key halves
    pub fn new(entry: KeyPair, encoding: EncodingKey, decoding: DecodingKey) -> Self {
        let mut public_entry = entry.clone();
        public_entry.retire();
        let public = Arc::new(VerificationKey {
            entry: public_entry,
            decoding,
        });
        Self {
            entry,
            encoding,
            public,
        }
    }

    /// Key id
    pub fn kid(&self) -> &str {
        &self.entry.kid
    }

    /// Signing key for `jsonwebtoken::encode`
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Public verification half of this key
    pub fn verification_key(&self) -> Arc<VerificationKey> {
        Arc::clone(&self.public)
    }

    /// Underlying entity, private material included
    pub fn entry(&self) -> &KeyPair {
        &self.entry
    }
}

impl std::fmt::Debug for ActiveKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveKey")
            .field("kid", &self.entry.kid)
            .field("expires_at", &self.entry.expires_at)
            .finish()
    }
}

/// Public half of a signing key, usable only for verification
pub struct VerificationKey {
    entry: KeyPair,
    decoding: DecodingKey,
}

impl VerificationKey {
    /// Key id
    pub fn kid(&self) -> &str {
        &self.entry.kid
    }

    /// Verification key for `jsonwebtoken::decode`
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Underlying entity (private material already discarded)
    pub fn entry(&self) -> &KeyPair {
        &self.entry
    }

    fn is_expired(&self) -> bool {
        self.entry.is_expired()
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.entry.kid)
            .field("expires_at", &self.entry.expires_at)
            .finish()
    }
}

/// One immutable snapshot of the key set
struct KeyRing {
    active: Option<Arc<ActiveKey>>,
    retired: Vec<Arc<VerificationKey>>,
}

impl KeyRing {
    fn empty() -> Self {
        Self {
            active: None,
            retired: Vec::new(),
        }
    }
}

/// Registry of signing keys shared between the issuer, the verifier, the
/// JWKS publisher, and the rotator
///
/// The rotator is the only writer; request-handling readers grab the
/// current snapshot and drop the lock before doing any crypto work.
pub struct KeyStore {
    ring: RwLock<Arc<KeyRing>>,
}

impl KeyStore {
    /// Creates an empty key store
    ///
    /// `active_key` fails until a first key is installed; bootstrap must
    /// run before the store serves traffic.
    pub fn new() -> Self {
        Self {
            ring: RwLock::new(Arc::new(KeyRing::empty())),
        }
    }

    fn snapshot(&self) -> Arc<KeyRing> {
        // A poisoned lock only ever guards a fully formed snapshot, so the
        // inner value stays usable.
        Arc::clone(&self.ring.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn swap(&self, ring: KeyRing) {
        let mut guard = self.ring.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(ring);
    }

    /// Returns the current signing key
    ///
    /// # Errors
    /// * `KeyError::NoActiveKey` - the store was never bootstrapped; in
    ///   steady state this cannot happen and is treated as fatal.
    pub fn active_key(&self) -> DomainResult<Arc<ActiveKey>> {
        self.snapshot()
            .active
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| DomainError::Key(KeyError::NoActiveKey))
    }

    /// Whether an active key is installed
    pub fn has_active(&self) -> bool {
        self.snapshot().active.is_some()
    }

    /// Key id of the current active key, if any
    pub fn active_kid(&self) -> Option<String> {
        self.snapshot()
            .active
            .as_ref()
            .map(|key| key.kid().to_string())
    }

    /// Returns every public key tokens may still verify against
    ///
    /// The active key is always part of the set; retired keys are included
    /// until their expiry passes.
    pub fn verification_keys(&self) -> Vec<Arc<VerificationKey>> {
        let ring = self.snapshot();
        let mut keys = Vec::with_capacity(ring.retired.len() + 1);
        if let Some(active) = &ring.active {
            keys.push(active.verification_key());
        }
        keys.extend(
            ring.retired
                .iter()
                .filter(|key| !key.is_expired())
                .map(Arc::clone),
        );
        keys
    }

    /// Looks up a verification key by the `kid` from a token header
    pub fn find_verification_key(&self, kid: &str) -> Option<Arc<VerificationKey>> {
        let ring = self.snapshot();
        if let Some(active) = &ring.active {
            if active.kid() == kid {
                return Some(active.verification_key());
            }
        }
        ring.retired
            .iter()
            .find(|key| key.kid() == kid && !key.is_expired())
            .map(Arc::clone)
    }

    /// Inserts a freshly generated key and atomically makes it active
    ///
    /// The previous active key is demoted to the retired set with its
    /// private material dropped; tokens it signed keep verifying until
    /// its expiry.
    pub fn install(&self, key: ActiveKey) {
        let current = self.snapshot();
        let mut retired: Vec<Arc<VerificationKey>> = current
            .retired
            .iter()
            .filter(|k| !k.is_expired())
            .map(Arc::clone)
            .collect();
        if let Some(previous) = &current.active {
            retired.push(previous.verification_key());
        }
        self.swap(KeyRing {
            active: Some(Arc::new(key)),
            retired,
        });
    }

    /// Replaces the whole ring in one swap; used at bootstrap
    pub fn restore(&self, active: ActiveKey, retired: Vec<VerificationKey>) {
        self.swap(KeyRing {
            active: Some(Arc::new(active)),
            retired: retired
                .into_iter()
                .filter(|key| !key.is_expired())
                .map(Arc::new)
                .collect(),
        });
    }

    /// Drops retired keys past their expiry
    ///
    /// The active key is never purged here, even when its own expiry has
    /// lapsed; replacing it is the rotator's job and signing must continue
    /// until that happens.
    pub fn purge_expired(&self) -> usize {
        let current = self.snapshot();
        let retired: Vec<Arc<VerificationKey>> = current
            .retired
            .iter()
            .filter(|key| !key.is_expired())
            .map(Arc::clone)
            .collect();
        let purged = current.retired.len() - retired.len();
        if purged > 0 {
            self.swap(KeyRing {
                active: current.active.as_ref().map(Arc::clone),
                retired,
            });
        }
        purged
    }

    /// Materializes the signing form of a persisted key pair
    pub fn materialize_active(entry: KeyPair) -> DomainResult<ActiveKey> {
        let private_pem = entry.private_key_pem.as_deref().ok_or_else(|| {
            DomainError::Key(KeyError::InvalidKeyMaterial {
                message: "private key material missing".to_string(),
            })
        })?;
        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
            DomainError::Key(KeyError::InvalidKeyMaterial {
                message: format!("invalid private key: {}", e),
            })
        })?;
        let decoding = DecodingKey::from_rsa_pem(entry.public_key_pem.as_bytes()).map_err(|e| {
            DomainError::Key(KeyError::InvalidKeyMaterial {
                message: format!("invalid public key: {}", e),
            })
        })?;
        Ok(ActiveKey::new(entry, encoding, decoding))
    }

    /// Materializes the verification-only form of a persisted key pair
    pub fn materialize_verification(mut entry: KeyPair) -> DomainResult<VerificationKey> {
        entry.retire();
        let decoding = DecodingKey::from_rsa_pem(entry.public_key_pem.as_bytes()).map_err(|e| {
            DomainError::Key(KeyError::InvalidKeyMaterial {
                message: format!("invalid public key: {}", e),
            })
        })?;
        Ok(VerificationKey { entry, decoding })
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.snapshot();
        f.debug_struct("KeyStore")
            .field("active_kid", &ring.active.as_ref().map(|k| k.kid()))
            .field("retired", &ring.retired.len())
            .finish()
    }
}
