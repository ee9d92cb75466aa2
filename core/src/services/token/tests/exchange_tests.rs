//! Unit tests for refresh token exchange and replay detection

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::token::mock::MockTokenRepository;
use crate::repositories::token::TokenRepository;
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::test_support::{bootstrapped_key_store, read_write_user};

fn test_service(
    repository: Arc<MockTokenRepository>,
    revoke_on_replay: bool,
) -> TokenService<MockTokenRepository> {
    let config = TokenServiceConfig {
        revoke_on_replay,
        ..Default::default()
    };
    TokenService::new(repository, bootstrapped_key_store(), config)
}

fn scopes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_exchange_mints_new_pair_and_consumes_old() {
    let repository = Arc::new(MockTokenRepository::new());
    let service = test_service(Arc::clone(&repository), true);
    let user = read_write_user();

    let pair = service
        .issue_token_pair(&user, &scopes(&["read"]))
        .await
        .unwrap();
    let new_pair = service
        .exchange_refresh_token(pair.refresh_token, None)
        .await
        .unwrap();

    assert_ne!(new_pair.refresh_token, pair.refresh_token);

    // old token is consumed, replacement is live and carries the same scopes
    let old = repository
        .find_by_id(pair.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(old.consumed);
    let replacement = repository
        .find_by_id(new_pair.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(!replacement.consumed);
    assert_eq!(replacement.scopes, vec!["read"]);
    assert_eq!(replacement.user_id, user.id);

    // the minted access token verifies and stays bound to the same subject
    let claims = service.verify_access_token(&new_pair.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.scopes, vec!["read"]);
}

#[tokio::test]
async fn test_second_exchange_is_replay() {
    let service = test_service(Arc::new(MockTokenRepository::new()), true);
    let user = read_write_user();

    let pair = service.issue_token_pair(&user, &[]).await.unwrap();

    service
        .exchange_refresh_token(pair.refresh_token, None)
        .await
        .unwrap();
    let second = service
        .exchange_refresh_token(pair.refresh_token, None)
        .await;

    assert!(matches!(
        second,
        Err(DomainError::Token(TokenError::TokenReplay))
    ));
}

#[tokio::test]
async fn test_exchange_narrows_scopes() {
    let service = test_service(Arc::new(MockTokenRepository::new()), true);
    let user = read_write_user();

    let pair = service
        .issue_token_pair(&user, &scopes(&["read", "write"]))
        .await
        .unwrap();
    let narrowed = service
        .exchange_refresh_token(pair.refresh_token, Some(&scopes(&["read"])))
        .await
        .unwrap();

    let claims = service.verify_access_token(&narrowed.access_token).unwrap();
    assert_eq!(claims.scopes, vec!["read"]);
}

#[tokio::test]
async fn test_exchange_cannot_widen_scopes() {
    let service = test_service(Arc::new(MockTokenRepository::new()), true);
    let user = read_write_user();

    let pair = service
        .issue_token_pair(&user, &scopes(&["read"]))
        .await
        .unwrap();
    // the user's roles grant "write", but this token was issued narrower;
    // exchange may never widen past the token's own scope set
    let widened = service
        .exchange_refresh_token(pair.refresh_token, Some(&scopes(&["read", "write"])))
        .await;

    assert!(matches!(
        widened,
        Err(DomainError::Auth(AuthError::ScopeDenied { .. }))
    ));

    // a denied widening does not burn the token
    assert!(service
        .exchange_refresh_token(pair.refresh_token, None)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let service = test_service(Arc::new(MockTokenRepository::new()), true);

    let result = service.exchange_refresh_token(Uuid::new_v4(), None).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::UnknownToken))
    ));
}

#[tokio::test]
async fn test_expired_refresh_token_rejected_without_consuming() {
    let repository = Arc::new(MockTokenRepository::new());
    let service = test_service(Arc::clone(&repository), true);

    let mut token =
        RefreshToken::new(Uuid::new_v4(), scopes(&["read"]), Duration::days(7)).unwrap();
    token.expires_at = Utc::now() - Duration::seconds(1);
    repository.save_token(token.clone()).await.unwrap();

    let result = service.exchange_refresh_token(token.id, None).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenExpired))
    ));

    // expiry rejection happens before the consume step
    let stored = repository.find_by_id(token.id).await.unwrap().unwrap();
    assert!(!stored.consumed);
}

#[tokio::test]
async fn test_replay_revokes_outstanding_tokens_when_policy_on() {
    let repository = Arc::new(MockTokenRepository::new());
    let service = test_service(Arc::clone(&repository), true);
    let user = read_write_user();

    let stolen = service.issue_token_pair(&user, &[]).await.unwrap();
    let other = service.issue_token_pair(&user, &[]).await.unwrap();

    service
        .exchange_refresh_token(stolen.refresh_token, None)
        .await
        .unwrap();
    let replay = service
        .exchange_refresh_token(stolen.refresh_token, None)
        .await;
    assert!(matches!(
        replay,
        Err(DomainError::Token(TokenError::TokenReplay))
    ));

    // the unrelated outstanding token was cut off as well
    let cut = repository
        .find_by_id(other.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(cut.consumed);
}

#[tokio::test]
async fn test_replay_leaves_other_tokens_when_policy_off() {
    let repository = Arc::new(MockTokenRepository::new());
    let service = test_service(Arc::clone(&repository), false);
    let user = read_write_user();

    let stolen = service.issue_token_pair(&user, &[]).await.unwrap();
    let other = service.issue_token_pair(&user, &[]).await.unwrap();

    service
        .exchange_refresh_token(stolen.refresh_token, None)
        .await
        .unwrap();
    let replay = service
        .exchange_refresh_token(stolen.refresh_token, None)
        .await;
    assert!(matches!(
        replay,
        Err(DomainError::Token(TokenError::TokenReplay))
    ));

    // the other token still exchanges
    assert!(service
        .exchange_refresh_token(other.refresh_token, None)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_exchange_yields_one_success_one_replay() {
    let service = Arc::new(test_service(Arc::new(MockTokenRepository::new()), false));
    let user = read_write_user();

    let pair = service.issue_token_pair(&user, &[]).await.unwrap();
    let token_id = pair.refresh_token;

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.exchange_refresh_token(token_id, None).await })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.exchange_refresh_token(token_id, None).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let replays = results
        .iter()
        .filter(|r| matches!(r, Err(DomainError::Token(TokenError::TokenReplay))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(replays, 1);
}

#[tokio::test]
async fn test_slow_ledger_surfaces_storage_timeout() {
    let config = TokenServiceConfig {
        storage_timeout: StdDuration::from_millis(20),
        ..Default::default()
    };
    let service = TokenService::new(
        Arc::new(SlowTokenRepository),
        bootstrapped_key_store(),
        config,
    );

    let result = service.exchange_refresh_token(Uuid::new_v4(), None).await;
    assert!(matches!(result, Err(DomainError::StorageTimeout)));
}

/// Ledger stub whose every operation hangs past any reasonable timeout
struct SlowTokenRepository;

#[async_trait]
impl TokenRepository for SlowTokenRepository {
    async fn save_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        Ok(token)
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        Ok(None)
    }

    async fn consume_token(&self, _id: Uuid) -> Result<bool, DomainError> {
        tokio::time::sleep(StdDuration::from_secs(60)).await;
        Ok(false)
    }

    async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        Ok(Vec::new())
    }

    async fn revoke_all_user_tokens(&self, _user_id: Uuid) -> Result<usize, DomainError> {
        Ok(0)
    }

    async fn delete_expired_tokens(&self, _grace: Duration) -> Result<usize, DomainError> {
        Ok(0)
    }
}
