//! Principals and roles supplied by the session layer

use super::StoreError;
use serde::{Deserialize, Serialize};

/// Role claim of an authenticated user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May create, update and delete articles
    Admin,
    /// May only read
    #[default]
    Reader,
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Display or login name
    pub name: String,

    /// Role claim
    #[serde(default)]
    pub role: Role,
}

impl Default for Principal {
    fn default() -> Self {
        Self::reader("anonymous")
    }
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, Role::Admin)
    }

    pub fn reader(name: impl Into<String>) -> Self {
        Self::new(name, Role::Reader)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with [`StoreError::Forbidden`] unless this principal is an admin
    pub fn require_admin(&self) -> Result<(), StoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            log::warn!("Rejected write by non-admin '{}'", self.name);
            Err(StoreError::Forbidden {
                name: self.name.clone(),
            })
        }
    }
}
