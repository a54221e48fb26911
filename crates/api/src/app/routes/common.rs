//! Shared guard helpers for handlers.

use warden_auth::{require_active, require_admin, require_authenticated, Identity, Principal};

use crate::app::errors::ApiError;

/// The authenticated, active principal for this request, or 401/403.
pub fn active_principal(identity: Identity) -> Result<Principal, ApiError> {
    let principal = require_authenticated(identity)?;
    require_active(&principal)?;
    Ok(principal)
}

/// As [`active_principal`], additionally requiring the admin role.
pub fn admin_principal(identity: Identity) -> Result<Principal, ApiError> {
    let principal = active_principal(identity)?;
    require_admin(&principal)?;
    Ok(principal)
}
