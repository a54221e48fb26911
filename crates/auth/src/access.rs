//! The single permission-check entry point: resolve the matrix row, then
//! evaluate it.

use std::sync::Arc;

use warden_core::UserId;

use crate::principal::Principal;
use crate::rule::{evaluate, Decision, Operation};
use crate::store::{AuthStore, StoreError};

/// Combines the permission-matrix resolver with the evaluator.
///
/// Decisions are computed fresh from the current matrix state on every call:
/// no caching, so administrative changes take effect on the next request.
pub struct AccessControl {
    store: Arc<dyn AuthStore>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// May `principal` perform `op` on the element named `element`, for the
    /// instance owned by `owner` (or a collection if `owner` is `None`)?
    pub async fn check(
        &self,
        principal: &Principal,
        element: &str,
        op: Operation,
        owner: Option<UserId>,
    ) -> Result<Decision, StoreError> {
        let rule = self
            .store
            .rule_by_role_and_element(principal.role_id(), element)
            .await?;

        let decision = evaluate(rule.as_ref(), op, owner, principal.id());
        if let Decision::Deny(reason) = &decision {
            tracing::debug!(
                user_id = %principal.id(),
                role = %principal.role.name,
                element,
                operation = %op,
                reason = %reason,
                "permission denied"
            );
        }
        Ok(decision)
    }

    /// Whether the principal holds the `*_all` flag for `op` on `element`.
    ///
    /// Collection handlers use this to decide between returning everything
    /// and filtering to the requester's own records; the evaluator itself has
    /// no visibility into a collection.
    pub async fn has_all(
        &self,
        principal: &Principal,
        element: &str,
        op: Operation,
    ) -> Result<bool, StoreError> {
        let rule = self
            .store
            .rule_by_role_and_element(principal.role_id(), element)
            .await?;
        Ok(rule.map(|r| r.all(op)).unwrap_or(false))
    }
}
