//! Main token service implementation

use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;
use crate::services::keys::KeyStore;

use super::config::TokenServiceConfig;

/// Service minting token pairs, verifying access tokens, and exchanging
/// refresh tokens
///
/// Stateless with respect to request handling: the only shared state it
/// touches is the key store (read) and the refresh token ledger.
pub struct TokenService<R: TokenRepository> {
    pub(crate) repository: Arc<R>,
    key_store: Arc<KeyStore>,
    config: TokenServiceConfig,
    validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    pub fn new(repository: Arc<R>, key_store: Arc<KeyStore>, config: TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // no clock leeway: a token past its expiry is expired
        validation.leeway = 0;

        Self {
            repository,
            key_store,
            config,
            validation,
        }
    }

    /// Mints an access/refresh token pair for an authenticated user
    ///
    /// `requested_scopes` must be a subset of the union of the user's role
    /// scopes; an empty request grants the full union. The refresh token
    /// is persisted to the ledger before the pair is returned.
    ///
    /// # Errors
    /// * `AuthError::ScopeDenied` - a requested scope is not granted
    /// * `KeyError::NoActiveKey` - the key store was never bootstrapped
    /// * `DomainError::StorageTimeout` - the ledger write timed out
    pub async fn issue_token_pair(
        &self,
        user: &User,
        requested_scopes: &[String],
    ) -> DomainResult<TokenPair> {
        let scopes = self.resolve_scopes(user, requested_scopes)?;

        let claims = Claims::new_access_token(
            user.id,
            scopes.clone(),
            &self.config.issuer,
            &self.config.audience,
            Duration::minutes(self.config.access_token_expiry_minutes),
        );
        let access_token = self.encode_claims(&claims)?;

        let refresh_token = RefreshToken::new(
            user.id,
            scopes,
            Duration::days(self.config.refresh_token_expiry_days),
        )?;
        let refresh_id = refresh_token.id;
        self.with_timeout(self.repository.save_token(refresh_token))
            .await?;

        Ok(TokenPair::new(
            access_token,
            refresh_id,
            self.config.access_token_expiry_minutes * 60,
        ))
    }

    /// Verifies an access token and returns its claims
    ///
    /// The `kid` in the token header selects the verification key; the
    /// signature, expiry, not-before, issuer, and audience checks all run
    /// against the selected key and this service's configuration.
    ///
    /// # Errors
    /// * `TokenError::UnknownKey` - no verification key matches the header
    /// * `TokenError::TokenExpired` / `TokenNotYetValid` /
    ///   `AudienceMismatch` / `InvalidSignature` / `InvalidTokenFormat`
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let header =
            decode_header(token).map_err(|_| DomainError::Token(TokenError::InvalidTokenFormat))?;
        let kid = header
            .kid
            .ok_or(DomainError::Token(TokenError::InvalidTokenFormat))?;

        let key = self
            .key_store
            .find_verification_key(&kid)
            .ok_or(DomainError::Token(TokenError::UnknownKey { kid }))?;

        let token_data = decode::<Claims>(token, key.decoding_key(), &self.validation)
            .map_err(|e| DomainError::Token(Self::map_decode_error(e)))?;

        Ok(token_data.claims)
    }

    /// Exchanges a refresh token for a fresh token pair
    ///
    /// The consume step is a single atomic conditional update on the
    /// ledger row: of two concurrent exchanges for the same id, exactly
    /// one wins and the other observes `TokenReplay`.
    ///
    /// `narrowed_scopes`, when given, must be a subset of the scopes the
    /// token was issued with; the new pair carries the narrowed set.
    ///
    /// # Errors
    /// * `TokenError::UnknownToken` - no ledger entry for the id
    /// * `TokenError::TokenExpired` - past expiry (not consumed)
    /// * `TokenError::TokenReplay` - the token was consumed already
    /// * `AuthError::ScopeDenied` - a narrowed scope was never granted
    pub async fn exchange_refresh_token(
        &self,
        token_id: Uuid,
        narrowed_scopes: Option<&[String]>,
    ) -> DomainResult<TokenPair> {
        let token = self
            .with_timeout(self.repository.find_by_id(token_id))
            .await?
            .ok_or(DomainError::Token(TokenError::UnknownToken))?;

        if token.is_expired() {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        if token.consumed {
            return Err(self.handle_replay(&token).await);
        }

        // A denied narrowing request must not burn the token, so the scope
        // check runs before the consume step.
        let scopes = match narrowed_scopes {
            None => token.scopes.clone(),
            Some(requested) => {
                for scope in requested {
                    if !token.scopes.contains(scope) {
                        return Err(DomainError::Auth(AuthError::ScopeDenied {
                            scope: scope.clone(),
                        }));
                    }
                }
                requested.to_vec()
            }
        };

        // The critical section: check-and-mark in one conditional update.
        // Losing the race against a concurrent exchange lands here too.
        let consumed = self
            .with_timeout(self.repository.consume_token(token_id))
            .await?;
        if !consumed {
            return Err(self.handle_replay(&token).await);
        }

        let claims = Claims::new_access_token(
            token.user_id,
            scopes.clone(),
            &self.config.issuer,
            &self.config.audience,
            Duration::minutes(self.config.access_token_expiry_minutes),
        );
        let access_token = self.encode_claims(&claims)?;

        let replacement = RefreshToken::new(
            token.user_id,
            scopes,
            Duration::days(self.config.refresh_token_expiry_days),
        )?;
        let refresh_id = replacement.id;
        self.with_timeout(self.repository.save_token(replacement))
            .await?;

        Ok(TokenPair::new(
            access_token,
            refresh_id,
            self.config.access_token_expiry_minutes * 60,
        ))
    }

    /// Revokes every live refresh token of a user
    pub async fn revoke_user_tokens(&self, user_id: Uuid) -> DomainResult<usize> {
        self.with_timeout(self.repository.revoke_all_user_tokens(user_id))
            .await
    }

    /// Replay response: log, optionally cut the whole chain, return the error
    async fn handle_replay(&self, token: &RefreshToken) -> DomainError {
        warn!(
            user_id = %token.user_id,
            token_id = %token.id,
            "refresh token replay detected"
        );

        if self.config.revoke_on_replay {
            match self
                .with_timeout(self.repository.revoke_all_user_tokens(token.user_id))
                .await
            {
                Ok(revoked) => {
                    warn!(user_id = %token.user_id, revoked, "revoked outstanding refresh tokens after replay")
                }
                Err(e) => {
                    error!(user_id = %token.user_id, error = %e, "failed to revoke tokens after replay")
                }
            }
        }

        DomainError::Token(TokenError::TokenReplay)
    }

    /// Validates the requested scopes against the user's role scopes
    fn resolve_scopes(&self, user: &User, requested: &[String]) -> DomainResult<Vec<String>> {
        let granted = user.scope_union();

        if requested.is_empty() {
            return Ok(granted.into_iter().collect());
        }

        for scope in requested {
            if !granted.contains(scope) {
                return Err(DomainError::Auth(AuthError::ScopeDenied {
                    scope: scope.clone(),
                }));
            }
        }

        Ok(requested.to_vec())
    }

    /// Signs claims with the active key, stamping its kid into the header
    fn encode_claims(&self, claims: &Claims) -> DomainResult<String> {
        let key = self.key_store.active_key()?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key.kid().to_string());

        encode(&header, claims, key.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    fn map_decode_error(e: jsonwebtoken::errors::Error) -> TokenError {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => TokenError::AudienceMismatch,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::InvalidTokenFormat,
        }
    }

    /// Bounds a ledger operation; a breach surfaces as `StorageTimeout`,
    /// which the calling layer may retry once before giving up.
    async fn with_timeout<T, F>(&self, operation: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.storage_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::StorageTimeout),
        }
    }
}
