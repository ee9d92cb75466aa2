//! MySQL implementation of the signing key registry.
//!
//! Private key material is stored only while a key is active; retiring a
//! key nulls the column, matching the in-memory ring's demotion step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use aegis_core::domain::entities::signing_key::KeyPair;
use aegis_core::errors::DomainError;
use aegis_core::repositories::KeyRepository;

/// MySQL implementation of KeyRepository
pub struct MySqlKeyRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlKeyRepository {
    /// Create a new MySQL key repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to KeyPair entity
    fn row_to_key(row: &sqlx::mysql::MySqlRow) -> Result<KeyPair, DomainError> {
        Ok(KeyPair {
            kid: row.try_get("kid").map_err(|e| DomainError::Internal {
                message: format!("Failed to get kid: {}", e),
            })?,
            public_key_pem: row
                .try_get("public_key_pem")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get public_key_pem: {}", e),
                })?,
            private_key_pem: row
                .try_get("private_key_pem")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get private_key_pem: {}", e),
                })?,
            modulus: row.try_get("modulus").map_err(|e| DomainError::Internal {
                message: format!("Failed to get modulus: {}", e),
            })?,
            exponent: row.try_get("exponent").map_err(|e| DomainError::Internal {
                message: format!("Failed to get exponent: {}", e),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl KeyRepository for MySqlKeyRepository {
    async fn save_key(&self, key: KeyPair) -> Result<KeyPair, DomainError> {
        let query = r#"
            INSERT INTO signing_keys (
                kid, public_key_pem, private_key_pem, modulus, exponent, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&key.kid)
            .bind(&key.public_key_pem)
            .bind(&key.private_key_pem)
            .bind(&key.modulus)
            .bind(&key.exponent)
            .bind(key.created_at)
            .bind(key.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to save signing key: {}", e),
            })?;

        Ok(key)
    }

    async fn load_keys(&self) -> Result<Vec<KeyPair>, DomainError> {
        let query = r#"
            SELECT kid, public_key_pem, private_key_pem, modulus, exponent, created_at, expires_at
            FROM signing_keys
            WHERE expires_at > ?
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to load signing keys: {}", e),
            })?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(Self::row_to_key(&row)?);
        }

        Ok(keys)
    }

    async fn mark_retired(&self, kid: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE signing_keys
            SET private_key_pem = NULL
            WHERE kid = ?
        "#;

        let result = sqlx::query(query)
            .bind(kid)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to retire signing key: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_keys(&self) -> Result<usize, DomainError> {
        let query = r#"
            DELETE FROM signing_keys
            WHERE expires_at < ?
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete expired keys: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }
}
