//! Tokens across key rotation: in-flight tokens keep verifying until the
//! signing key they carry expires out of the verification set.

use std::sync::Arc;

use aegis_shared::config::KeyRotationConfig;

use crate::errors::{DomainError, TokenError};
use crate::repositories::key::mock::MockKeyRepository;
use crate::repositories::token::mock::MockTokenRepository;
use crate::services::keys::{JwksPublisher, KeyRotator, KeyStore};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::test_support::read_write_user;

async fn rotating_setup(
    key_expiry_secs: u64,
) -> (
    Arc<KeyStore>,
    KeyRotator<MockKeyRepository>,
    TokenService<MockTokenRepository>,
) {
    let store = Arc::new(KeyStore::new());
    let config = KeyRotationConfig::default()
        .with_rotation_interval_secs(0)
        .with_key_expiry_secs(key_expiry_secs);
    let rotator = KeyRotator::new(
        Arc::clone(&store),
        Arc::new(MockKeyRepository::new()),
        config,
    )
    .unwrap();
    rotator.bootstrap().await.unwrap();

    let service = TokenService::new(
        Arc::new(MockTokenRepository::new()),
        Arc::clone(&store),
        TokenServiceConfig::default(),
    );

    (store, rotator, service)
}

#[tokio::test]
async fn test_token_signed_before_rotation_still_verifies() {
    let (store, rotator, service) = rotating_setup(3600).await;
    let user = read_write_user();

    let pair = service.issue_token_pair(&user, &[]).await.unwrap();
    let old_kid = store.active_kid().unwrap();

    let new_kid = rotator.rotate_once().await.unwrap();
    assert_ne!(old_kid, new_kid);

    // the pre-rotation token verifies against the retired key
    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());

    // and a post-rotation token is signed by the new key
    let fresh = service.issue_token_pair(&user, &[]).await.unwrap();
    let header = jsonwebtoken::decode_header(&fresh.access_token).unwrap();
    assert_eq!(header.kid.as_deref(), Some(new_kid.as_str()));
}

#[tokio::test]
async fn test_jwks_carries_both_keys_after_rotation() {
    let (store, rotator, _service) = rotating_setup(3600).await;
    let publisher = JwksPublisher::new(Arc::clone(&store));

    let old_kid = store.active_kid().unwrap();
    let new_kid = rotator.rotate_once().await.unwrap();

    let document = publisher.document();
    let kids: Vec<&str> = document.keys.iter().map(|k| k.kid.as_str()).collect();
    assert!(kids.contains(&old_kid.as_str()));
    assert!(kids.contains(&new_kid.as_str()));
}

#[tokio::test]
async fn test_token_stops_verifying_once_its_key_expires() {
    let store = Arc::new(KeyStore::new());
    let service = TokenService::new(
        Arc::new(MockTokenRepository::new()),
        Arc::clone(&store),
        TokenServiceConfig::default(),
    );
    let user = read_write_user();

    // sign with a key that has two seconds of life left, then rotate
    store.install(crate::test_support::pooled_active_key(
        0,
        chrono::Duration::seconds(2),
    ));
    let pair = service.issue_token_pair(&user, &[]).await.unwrap();
    store.install(crate::test_support::pooled_active_key(
        1,
        chrono::Duration::hours(1),
    ));

    // right after rotation the retired key still verifies
    assert!(service.verify_access_token(&pair.access_token).is_ok());

    // once its expiry passes it drops out of the verification set
    tokio::time::sleep(std::time::Duration::from_millis(2_300)).await;
    assert!(matches!(
        service.verify_access_token(&pair.access_token),
        Err(DomainError::Token(TokenError::UnknownKey { .. }))
    ));
}
