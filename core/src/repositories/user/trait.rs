//! User lookup trait for the external user-store collaborator.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Read-only user lookup interface
///
/// The user store (registration, role administration, password storage)
/// lives outside this service; issuance only needs to resolve a user and
/// the roles attached to them.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by username, with roles resolved
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by id, with roles resolved
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
}
