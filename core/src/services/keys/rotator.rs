//! Scheduled signing key rotation.
//!
//! The rotator is the single writer of the key store: it generates a new
//! key pair on a fixed interval, persists it, promotes it to active, and
//! drops keys past expiry. Generation failures are retried with backoff
//! and never leave the store without an active key; the previous key
//! simply keeps signing.

use std::sync::Arc;

use tracing::{error, info, warn};

use aegis_shared::config::KeyRotationConfig;

use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyRepository;

use super::generation;
use super::store::{ActiveKey, KeyStore, VerificationKey};

/// Periodic key rotation task over a durable key registry
pub struct KeyRotator<K: KeyRepository> {
    store: Arc<KeyStore>,
    repository: Arc<K>,
    config: KeyRotationConfig,
}

impl<K: KeyRepository + 'static> KeyRotator<K> {
    /// Create a new rotator
    ///
    /// # Errors
    /// * `DomainError::Validation` - the rotation interval is not shorter
    ///   than the key lifetime, which would open a window with no
    ///   verifiable key.
    pub fn new(
        store: Arc<KeyStore>,
        repository: Arc<K>,
        config: KeyRotationConfig,
    ) -> DomainResult<Self> {
        if !config.is_valid() {
            return Err(DomainError::Validation {
                message: "rotation interval must be shorter than the key lifetime".to_string(),
            });
        }
        Ok(Self {
            store,
            repository,
            config,
        })
    }

    /// Load persisted keys into the store, generating a first key if the
    /// registry is empty
    ///
    /// After a successful bootstrap the store is guaranteed to hold an
    /// active key; a store without one past this point is a fatal
    /// invariant breach.
    pub async fn bootstrap(&self) -> DomainResult<()> {
        let persisted = self.repository.load_keys().await?;

        let mut active: Option<ActiveKey> = None;
        let mut retired: Vec<VerificationKey> = Vec::new();

        // load_keys returns newest first; the newest key still holding
        // private material resumes as the active key.
        for entry in persisted {
            let kid = entry.kid.clone();
            if active.is_none() && entry.has_private_material() {
                match KeyStore::materialize_active(entry) {
                    Ok(key) => active = Some(key),
                    Err(e) => warn!(kid = %kid, error = %e, "skipping unusable persisted key"),
                }
                continue;
            }
            match KeyStore::materialize_verification(entry) {
                Ok(key) => retired.push(key),
                Err(e) => warn!(kid = %kid, error = %e, "skipping unusable persisted key"),
            }
        }

        let active = match active {
            Some(key) => {
                info!(kid = %key.kid(), retired = retired.len(), "restored signing keys");
                key
            }
            None => {
                let key = self.generate_and_persist().await?;
                info!(kid = %key.kid(), "generated initial signing key");
                key
            }
        };

        self.store.restore(active, retired);
        self.store.active_key().map(|_| ())
    }

    /// Run one rotation cycle: generate, persist, promote, purge
    ///
    /// Returns the kid of the newly active key. On any failure the store
    /// is untouched and the previous key remains active.
    pub async fn rotate_once(&self) -> DomainResult<String> {
        let previous_kid = self.store.active_kid();

        let key = self.generate_and_persist().await?;
        let kid = key.kid().to_string();
        self.store.install(key);

        if let Some(previous) = previous_kid {
            if let Err(e) = self.repository.mark_retired(&previous).await {
                // The in-memory ring already dropped the private half; the
                // registry catches up on the next cycle.
                warn!(kid = %previous, error = %e, "failed to retire previous key in registry");
            }
        }

        let purged = self.store.purge_expired();
        match self.repository.delete_expired_keys().await {
            Ok(deleted) if deleted > 0 => {
                info!(deleted, "removed expired keys from registry")
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to delete expired keys from registry"),
        }

        info!(kid = %kid, purged, "rotated signing key");
        Ok(kid)
    }

    /// Generate a key pair and persist it before it can ever sign
    async fn generate_and_persist(&self) -> DomainResult<ActiveKey> {
        let generated =
            generation::generate_key_pair(self.config.key_bits, self.config.key_lifetime())?;
        self.repository.save_key(generated.entry.clone()).await?;
        Ok(ActiveKey::new(
            generated.entry,
            generated.encoding,
            generated.decoding,
        ))
    }

    /// One rotation attempt with bounded exponential backoff
    ///
    /// Exhausting the retry budget is logged and deferred to the next
    /// interval; request traffic continues on the previous active key.
    pub async fn rotate_with_retry(&self) {
        let mut backoff = self.config.retry_backoff();

        for attempt in 1..=self.config.max_retries {
            match self.rotate_once().await {
                Ok(_) => return,
                Err(e) => {
                    error!(attempt, error = %e, "key rotation failed; previous key stays active");
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        warn!(
            "key rotation abandoned after {} attempts; retrying next interval",
            self.config.max_retries
        );
    }

    /// Start the rotator as a background task
    pub fn start_background_task(self: Arc<Self>) {
        let interval = self.config.rotation_interval();

        tokio::spawn(async move {
            info!(
                "key rotator started - rotating every {} seconds",
                interval.as_secs()
            );

            let mut ticker = tokio::time::interval(interval);
            // the first tick fires immediately; bootstrap already installed
            // a fresh key, so skip it
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.rotate_with_retry().await;
            }
        });
    }
}
