//! `warden-store` — in-memory data store for the authorization service.
//!
//! Implements the [`warden_auth::AuthStore`] seam plus the administrative
//! CRUD surface. A SQL-backed implementation would slot in behind the same
//! seam; the invariants enforced here (unique names, one rule per
//! role/element pair, soft user deletion) are the contract either way.

pub mod memory;
pub mod resources;
pub mod seed;

pub use memory::{MemoryStore, NewUser, ProfileUpdate, RuleFlags, RulePatch};
pub use resources::{MockObject, ResourceKind, ResourceRepo};
