//! Read-only MySQL user lookup.
//!
//! Registration, role administration, and password storage are owned by an
//! external collaborator; this repository only resolves users and their
//! roles for issuance.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use aegis_core::domain::entities::role::Role;
use aegis_core::domain::entities::user::User;
use aegis_core::errors::DomainError;
use aegis_core::repositories::UserRepository;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Resolve the roles attached to a user
    async fn load_roles(&self, user_id: &str) -> Result<Vec<Role>, DomainError> {
        let query = r#"
            SELECT r.name, r.scopes
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.name
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to load roles: {}", e),
            })?;

        let mut roles = Vec::new();
        for row in rows {
            let name: String = row.try_get("name").map_err(|e| DomainError::Internal {
                message: format!("Failed to get role name: {}", e),
            })?;
            let scopes: String = row.try_get("scopes").map_err(|e| DomainError::Internal {
                message: format!("Failed to get role scopes: {}", e),
            })?;
            roles.push(Role::from_scope_string(name, &scopes)?);
        }

        Ok(roles)
    }

    async fn hydrate(&self, row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let username: String = row.try_get("username").map_err(|e| DomainError::Internal {
            message: format!("Failed to get username: {}", e),
        })?;
        let password_hash: String =
            row.try_get("password_hash")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get password_hash: {}", e),
                })?;

        let roles = self.load_roles(&id).await?;

        Ok(User::from_parts(
            Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            username,
            password_hash,
            roles,
        ))
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find user: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find user: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }
}
