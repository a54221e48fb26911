//! Identity model: users, roles, business elements.
//!
//! These mirror the persisted layout owned by the store; the core only ever
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{ElementId, RoleId, UserId};

/// A user account.
///
/// Invariant: an inactive user is never treated as authenticated, regardless
/// of token validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    /// Opaque password hash; verification happens at the API boundary.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub active: bool,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A named role. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Whether this role is the administrative role (case-insensitive).
    pub fn is_admin(&self) -> bool {
        self.name.eq_ignore_ascii_case("admin")
    }
}

/// A named resource type that access rules can target (e.g. "products").
/// Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessElement {
    pub id: ElementId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A fully resolved, authenticated principal: the user plus its role row.
///
/// Produced only by the authenticator; handlers never assemble one by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: User,
    pub role: Role,
}

impl Principal {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role_id(&self) -> RoleId {
        self.user.role_id
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
