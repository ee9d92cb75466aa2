//! Unit tests for the in-memory ledger mock

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::repositories::token::mock::MockTokenRepository;
use crate::repositories::token::TokenRepository;

fn sample_token(user_id: Uuid) -> RefreshToken {
    RefreshToken::new(user_id, vec!["read".to_string()], Duration::days(7)).unwrap()
}

#[tokio::test]
async fn test_save_and_find() {
    let repo = MockTokenRepository::new();
    let token = sample_token(Uuid::new_v4());

    let saved = repo.save_token(token.clone()).await.unwrap();
    assert_eq!(saved.id, token.id);

    let found = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(found, token);
}

#[tokio::test]
async fn test_duplicate_save_rejected() {
    let repo = MockTokenRepository::new();
    let token = sample_token(Uuid::new_v4());

    repo.save_token(token.clone()).await.unwrap();
    assert!(repo.save_token(token).await.is_err());
}

#[tokio::test]
async fn test_consume_token_exactly_once() {
    let repo = MockTokenRepository::new();
    let token = sample_token(Uuid::new_v4());
    repo.save_token(token.clone()).await.unwrap();

    assert!(repo.consume_token(token.id).await.unwrap());
    assert!(!repo.consume_token(token.id).await.unwrap());

    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(stored.consumed);
}

#[tokio::test]
async fn test_consume_missing_token_is_false() {
    let repo = MockTokenRepository::new();
    assert!(!repo.consume_token(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_find_by_user_skips_consumed() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    let first = sample_token(user_id);
    let second = sample_token(user_id);
    repo.save_token(first.clone()).await.unwrap();
    repo.save_token(second.clone()).await.unwrap();
    repo.save_token(sample_token(Uuid::new_v4())).await.unwrap();

    repo.consume_token(first.id).await.unwrap();

    let live = repo.find_by_user_id(user_id).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, second.id);
}

#[tokio::test]
async fn test_revoke_all_user_tokens() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    repo.save_token(sample_token(user_id)).await.unwrap();
    repo.save_token(sample_token(user_id)).await.unwrap();
    let other = sample_token(Uuid::new_v4());
    repo.save_token(other.clone()).await.unwrap();

    let revoked = repo.revoke_all_user_tokens(user_id).await.unwrap();
    assert_eq!(revoked, 2);

    assert!(repo.find_by_user_id(user_id).await.unwrap().is_empty());
    // Unrelated users are untouched
    assert!(!repo.find_by_id(other.id).await.unwrap().unwrap().consumed);
}

#[tokio::test]
async fn test_delete_expired_tokens() {
    let repo = MockTokenRepository::new();

    let mut expired = sample_token(Uuid::new_v4());
    expired.expires_at = chrono::Utc::now() - Duration::hours(1);
    repo.save_token(expired).await.unwrap();
    repo.save_token(sample_token(Uuid::new_v4())).await.unwrap();

    let deleted = repo.delete_expired_tokens(Duration::days(30)).await.unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_delete_consumed_past_grace() {
    let repo = MockTokenRepository::new();

    let mut old_consumed = sample_token(Uuid::new_v4());
    old_consumed.created_at = chrono::Utc::now() - Duration::days(10);
    old_consumed.consumed = true;
    repo.save_token(old_consumed).await.unwrap();

    let mut fresh_consumed = sample_token(Uuid::new_v4());
    fresh_consumed.consumed = true;
    repo.save_token(fresh_consumed.clone()).await.unwrap();

    let deleted = repo.delete_expired_tokens(Duration::days(7)).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(repo.find_by_id(fresh_consumed.id).await.unwrap().is_some());
}
