//! RSA key pair generation for the rotator.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use uuid::Uuid;

use crate::domain::entities::signing_key::KeyPair;
use crate::errors::{DomainError, DomainResult, KeyError};

/// A freshly generated key pair with its materialized signing halves
#[derive(Clone)]
pub struct GeneratedKey {
    /// Persistable entity form
    pub entry: KeyPair,
    /// Signing key for `jsonwebtoken::encode`
    pub encoding: EncodingKey,
    /// Verification key for `jsonwebtoken::decode`
    pub decoding: DecodingKey,
}

/// Generates a fresh RSA key pair
///
/// The kid is a random UUID; the JWK modulus and exponent are precomputed
/// here so the JWKS view never touches RSA internals.
///
/// # Errors
/// * `KeyError::GenerationFailed` - the RSA generation or PEM encoding
///   failed; the caller (the rotator) retries with backoff.
pub fn generate_key_pair(bits: usize, lifetime: Duration) -> DomainResult<GeneratedKey> {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
        DomainError::Key(KeyError::GenerationFailed {
            message: format!("rsa generation: {}", e),
        })
    })?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .map_err(|e| {
            DomainError::Key(KeyError::GenerationFailed {
                message: format!("private key encoding: {}", e),
            })
        })?;
    let public_pem = public_key
        .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
        .map_err(|e| {
            DomainError::Key(KeyError::GenerationFailed {
                message: format!("public key encoding: {}", e),
            })
        })?;

    let modulus = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let exponent = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

    let entry = KeyPair::new(
        Uuid::new_v4().to_string(),
        public_pem.clone(),
        private_pem.to_string(),
        modulus,
        exponent,
        lifetime,
    )?;

    let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
        DomainError::Key(KeyError::InvalidKeyMaterial {
            message: format!("generated private key rejected: {}", e),
        })
    })?;
    let decoding = DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
        DomainError::Key(KeyError::InvalidKeyMaterial {
            message: format!("generated public key rejected: {}", e),
        })
    })?;

    Ok(GeneratedKey {
        entry,
        encoding,
        decoding,
    })
}
