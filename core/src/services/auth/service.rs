//! Password-grant orchestration over the user-store and password
//! collaborators.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::token::TokenPair;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::auth::password::PasswordVerifier;
use crate::services::token::TokenService;

/// Service turning user credentials into token pairs
pub struct AuthService<U: UserRepository, R: TokenRepository> {
    users: Arc<U>,
    passwords: Arc<dyn PasswordVerifier>,
    tokens: Arc<TokenService<R>>,
}

impl<U: UserRepository, R: TokenRepository> AuthService<U, R> {
    /// Creates a new auth service
    pub fn new(
        users: Arc<U>,
        passwords: Arc<dyn PasswordVerifier>,
        tokens: Arc<TokenService<R>>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Password grant: authenticate and mint a token pair
    ///
    /// Unknown usernames and wrong passwords collapse into the same
    /// `AuthenticationFailed` so the endpoint cannot be used as a
    /// username oracle.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        requested_scopes: &[String],
    ) -> DomainResult<TokenPair> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Auth(AuthError::AuthenticationFailed))?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(DomainError::Auth(AuthError::AuthenticationFailed));
        }

        let pair = self.tokens.issue_token_pair(&user, requested_scopes).await?;
        info!(user_id = %user.id, "issued token pair");
        Ok(pair)
    }
}
