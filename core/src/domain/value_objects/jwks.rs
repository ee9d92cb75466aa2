//! JWKS document shapes published to relying parties.

use serde::{Deserialize, Serialize};

use crate::domain::entities::signing_key::KeyPair;

/// JSON Web Key: the public half of one signing key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key id
    pub kid: String,

    /// Key type (RSA)
    pub kty: String,

    /// Signing algorithm
    pub alg: String,

    /// Key usage
    #[serde(rename = "use")]
    pub use_: String,

    /// Base64url modulus
    pub n: String,

    /// Base64url public exponent
    pub e: String,
}

impl From<&KeyPair> for Jwk {
    fn from(key: &KeyPair) -> Self {
        Self {
            kid: key.kid.clone(),
            kty: "RSA".to_string(),
            alg: "RS256".to_string(),
            use_: "sig".to_string(),
            n: key.modulus.clone(),
            e: key.exponent.clone(),
        }
    }
}

/// JSON Web Key Set document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_jwk_from_key_pair_omits_private_material() {
        let key = KeyPair::new("k1", "pub-pem", "priv-pem", "mod", "AQAB", Duration::hours(1))
            .unwrap();
        let jwk = Jwk::from(&key);

        assert_eq!(jwk.kid, "k1");
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg, "RS256");
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.n, "mod");
        assert_eq!(jwk.e, "AQAB");

        let json = serde_json::to_string(&jwk).unwrap();
        assert!(!json.contains("priv-pem"));
        assert!(!json.contains("pub-pem"));
    }

    #[test]
    fn test_use_field_serializes_as_use() {
        let key =
            KeyPair::new("k1", "pub", "priv", "n", "AQAB", Duration::hours(1)).unwrap();
        let json = serde_json::to_value(Jwk::from(&key)).unwrap();
        assert_eq!(json["use"], "sig");
    }

    #[test]
    fn test_jwks_round_trip() {
        let key =
            KeyPair::new("k1", "pub", "priv", "n", "AQAB", Duration::hours(1)).unwrap();
        let jwks = Jwks {
            keys: vec![Jwk::from(&key)],
        };

        let json = serde_json::to_string(&jwks).unwrap();
        let decoded: Jwks = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.keys.len(), 1);
        assert_eq!(decoded.keys[0].kid, "k1");
    }
}
