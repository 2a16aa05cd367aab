//! # Roles and the Ownership Check
//!
//! A job may be changed or removed only by the user who created it. Admins
//! bypass the check.

use serde::{Deserialize, Serialize};

use crate::error::PermissionDenied;
use crate::identity::UserId;

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular user; may touch only their own records.
    User,
    /// Administrator; passes every ownership check.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    /// Who is asking.
    pub user_id: UserId,
    /// With what privileges.
    pub role: Role,
}

impl Requester {
    /// A regular user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    /// An administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }
}

/// Allow the request when `requester` owns the resource or is an admin.
pub fn check_permissions(requester: &Requester, owner: &UserId) -> Result<(), PermissionDenied> {
    if requester.role == Role::Admin || requester.user_id == *owner {
        Ok(())
    } else {
        Err(PermissionDenied)
    }
}
