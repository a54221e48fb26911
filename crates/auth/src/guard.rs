//! Escalation guards used by route handlers.
//!
//! These sit between the authenticator's value-typed outcome and the HTTP
//! layer: they turn `Anonymous`/insufficient-role into typed rejections the
//! API maps to 401/403.

use thiserror::Error;

use crate::authenticate::Identity;
use crate::principal::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("could not validate credentials")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),
}

/// Anonymous requests are rejected; everything else passes through.
pub fn require_authenticated(identity: Identity) -> Result<Principal, AccessError> {
    match identity {
        Identity::Authenticated(principal) => Ok(principal),
        Identity::Anonymous => Err(AccessError::Unauthenticated),
    }
}

/// Redundant re-check of the active flag (defense in depth; the
/// authenticator already refuses inactive users).
pub fn require_active(principal: &Principal) -> Result<(), AccessError> {
    if principal.user.active {
        Ok(())
    } else {
        Err(AccessError::Forbidden("inactive user".to_string()))
    }
}

/// Only principals whose role is named "admin" (case-insensitive) pass.
pub fn require_admin(principal: &Principal) -> Result<(), AccessError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("admin privileges required".to_string()))
    }
}
