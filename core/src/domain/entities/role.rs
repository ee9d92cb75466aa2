//! Role entity binding a named permission group to a set of scopes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainResult, ValidationError};

/// Named group of scopes granted to users holding the role
///
/// Roles are created and edited by an external admin collaborator; users
/// reference them but never own them. The scope set is validated at
/// construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    scopes: BTreeSet<String>,
}

impl Role {
    /// Creates a role from a name and a list of scopes
    ///
    /// Rejects an empty name, empty scope entries, and duplicate scopes.
    /// Duplicates are an input error rather than something to silently
    /// collapse: a caller sending `"read read"` is malformed.
    pub fn new<I>(name: impl Into<String>, scopes: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "name".to_string(),
            }
            .into());
        }

        let mut set = BTreeSet::new();
        for scope in scopes {
            if scope.trim().is_empty() {
                return Err(ValidationError::RequiredField {
                    field: "scope".to_string(),
                }
                .into());
            }
            if !set.insert(scope) {
                return Err(ValidationError::DuplicateValue {
                    field: "scopes".to_string(),
                }
                .into());
            }
        }

        Ok(Self { name, scopes: set })
    }

    /// Creates a role from the space-delimited scope wire form
    pub fn from_scope_string(name: impl Into<String>, scopes: &str) -> DomainResult<Self> {
        Self::new(name, aegis_shared::validation::split_scope_string(scopes))
    }

    /// Role name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scopes granted by this role
    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    /// Whether the role grants a specific scope
    pub fn grants(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Space-delimited scope wire form
    pub fn scope_string(&self) -> String {
        aegis_shared::validation::join_scopes(self.scopes.iter().map(String::as_str))
    }
}
