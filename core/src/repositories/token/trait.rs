//! Ledger trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for the refresh token ledger
///
/// Implementations keep the durable record of issued refresh tokens and
/// their consumption state.
///
/// # Security Considerations
/// - `consume_token` must be a single atomic conditional update on the
///   consumed flag: two concurrent calls for the same id must yield exactly
///   one `true` and one `false`.
/// - Expired and long-consumed tokens should be periodically cleaned up.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token to the ledger
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token id)
    async fn save_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its id
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found
    /// * `Ok(None)` - No token with the given id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError>;

    /// Atomically mark a token consumed
    ///
    /// The check and the mark are one conditional update; a caller that
    /// loses the race observes `false`.
    ///
    /// # Returns
    /// * `Ok(true)` - The token existed unconsumed and is now consumed
    /// * `Ok(false)` - The token was absent or consumed already
    async fn consume_token(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Find all live (unconsumed, unexpired) tokens for a user
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Mark every live token of a user consumed
    ///
    /// Used by the replay-response policy to cut off a stolen token chain.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens revoked
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete expired tokens and consumed tokens older than the grace period
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens deleted
    async fn delete_expired_tokens(&self, consumed_grace: Duration) -> Result<usize, DomainError>;
}
