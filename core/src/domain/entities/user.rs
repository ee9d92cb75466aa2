//! User entity representing a registered account.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::role::Role;
use crate::errors::{DomainResult, ValidationError};

/// Registered user account
///
/// Tokens soft-reference users by id; the password hash is produced and
/// checked by external collaborators and never holds cleartext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Email-shaped unique username
    pub username: String,

    /// Hashed password; hashing scheme is owned by the password collaborator
    pub password_hash: String,

    /// Roles granted to this user (referenced, never owned)
    pub roles: Vec<Role>,
}

impl User {
    /// Creates a new user, validating the username shape
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> DomainResult<Self> {
        let username = username.into();
        if !aegis_shared::validation::is_valid_username(&username) {
            return Err(ValidationError::InvalidEmail.into());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            password_hash: password_hash.into(),
            roles,
        })
    }

    /// Reconstructs a user from persisted fields without re-validating
    ///
    /// Repository implementations use this when hydrating rows that were
    /// validated at creation time.
    pub fn from_parts(
        id: Uuid,
        username: String,
        password_hash: String,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            roles,
        }
    }

    /// Union of all scopes granted by the user's roles
    pub fn scope_union(&self) -> BTreeSet<String> {
        self.roles
            .iter()
            .flat_map(|role| role.scopes().iter().cloned())
            .collect()
    }

    /// Whether the user's roles grant every requested scope
    pub fn grants_all<'a, I>(&self, requested: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let granted = self.scope_union();
        requested.into_iter().all(|scope| granted.contains(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_roles() -> Vec<Role> {
        vec![
            Role::new("reader", vec!["read".to_string()]).unwrap(),
            Role::new("writer", vec!["read".to_string(), "write".to_string()]).unwrap(),
        ]
    }

    #[test]
    fn test_new_user_creation() {
        let user = User::new("alice@example.com", "$2b$12$hash", sample_roles()).unwrap();
        assert_eq!(user.username, "alice@example.com");
        assert_eq!(user.roles.len(), 2);
    }

    #[test]
    fn test_invalid_username_rejected() {
        assert!(User::new("not-an-email", "$2b$12$hash", vec![]).is_err());
    }

    #[test]
    fn test_scope_union_deduplicates_across_roles() {
        let user = User::new("alice@example.com", "$2b$12$hash", sample_roles()).unwrap();
        let scopes = user.scope_union();
        assert_eq!(scopes.len(), 2);
        assert!(scopes.contains("read"));
        assert!(scopes.contains("write"));
    }

    #[test]
    fn test_grants_all() {
        let user = User::new("alice@example.com", "$2b$12$hash", sample_roles()).unwrap();
        assert!(user.grants_all(["read"]));
        assert!(user.grants_all(["read", "write"]));
        assert!(!user.grants_all(["read", "admin"]));
    }

    #[test]
    fn test_user_without_roles_grants_nothing() {
        let user = User::new("bob@example.com", "$2b$12$hash", vec![]).unwrap();
        assert!(user.scope_union().is_empty());
        assert!(!user.grants_all(["read"]));
    }
}
