//! Storage seam for the authorization core.
//!
//! Absence is a normal value everywhere; only connectivity problems surface
//! as [`StoreError`].

use async_trait::async_trait;
use thiserror::Error;

use warden_core::{RoleId, SessionId, UserId};

use crate::principal::{Role, User};
use crate::rule::AccessRule;
use crate::session::Session;

/// Store-connectivity failure. Mapped to a generic server fault at the edge;
/// never part of an authentication or authorization decision.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The queries the core needs from the data store.
///
/// All methods are return-or-absent; deleting something that is already gone
/// is a no-op, not an error.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    /// Exact match on both token and user: a signature-valid token naming a
    /// different user must not resolve a session.
    async fn session_by_token_and_user(
        &self,
        token: &str,
        user_id: UserId,
    ) -> Result<Option<Session>, StoreError>;

    /// Idempotent; safe to race with other requests deleting the same row.
    async fn delete_session(&self, id: SessionId) -> Result<(), StoreError>;

    /// Idempotent; removes every session held by the user.
    async fn delete_sessions_for_user(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Permission-matrix resolution: the unique rule for (role, element
    /// name), or `None` meaning no permissions granted.
    async fn rule_by_role_and_element(
        &self,
        role_id: RoleId,
        element_name: &str,
    ) -> Result<Option<AccessRule>, StoreError>;
}
