//! Permission matrix rows and the ownership-aware evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{ElementId, RoleId, RuleId, UserId};

/// The closed set of operations a rule can grant.
///
/// Permission flags are reached through an exhaustive match rather than
/// string-built field names, so adding an operation is a compile error until
/// every site handles it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// The permission matrix row for a (role, element) pair.
///
/// At most one rule exists per pair; that pair is the resolution key. The
/// `*_all` flag, when set, supersedes the base flag for its operation: an
/// "-all" holder is never additionally ownership-restricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub id: RuleId,
    pub role_id: RoleId,
    pub element_id: ElementId,

    pub read: bool,
    pub read_all: bool,
    pub create: bool,
    pub update: bool,
    pub update_all: bool,
    pub delete: bool,
    pub delete_all: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccessRule {
    /// Rule with every flag cleared.
    pub fn empty(role_id: RoleId, element_id: ElementId) -> Self {
        Self {
            id: RuleId::new(),
            role_id,
            element_id,
            read: false,
            read_all: false,
            create: false,
            update: false,
            update_all: false,
            delete: false,
            delete_all: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// The base flag for an operation.
    pub fn base(&self, op: Operation) -> bool {
        match op {
            Operation::Read => self.read,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    /// The "-all" flag for an operation. Create has no ownership dimension.
    pub fn all(&self, op: Operation) -> bool {
        match op {
            Operation::Read => self.read_all,
            Operation::Create => false,
            Operation::Update => self.update_all,
            Operation::Delete => self.delete_all,
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a check was denied. Carried back to the caller as the rejection
/// message; never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    #[error("no permissions for this resource")]
    NoRule,

    #[error("missing {0} permission")]
    MissingPermission(Operation),

    #[error("you can only access your own resources")]
    NotOwner,
}

/// Decide whether `requester` may perform `op` given the resolved rule and
/// the owner of the target instance (if any).
///
/// Pure decision function: no IO, no panics, no side effects.
///
/// `owner` of `None` means a collection-level operation with no specific
/// instance to check against; base permission suffices there, and filtering
/// the collection to own records is the caller's job.
pub fn evaluate(
    rule: Option<&AccessRule>,
    op: Operation,
    owner: Option<UserId>,
    requester: UserId,
) -> Decision {
    let Some(rule) = rule else {
        return Decision::Deny(DenyReason::NoRule);
    };

    if op == Operation::Create {
        return if rule.create {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::MissingPermission(op))
        };
    }

    // "-all" is checked before the base flag: an "-all" holder pays no
    // ownership cost even for another user's resource. The order documents
    // intended precedence and must be preserved.
    if rule.all(op) {
        return Decision::Allow;
    }

    if rule.base(op) {
        return match owner {
            None => Decision::Allow,
            Some(owner) if owner == requester => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::NotOwner),
        };
    }

    Decision::Deny(DenyReason::MissingPermission(op))
}
