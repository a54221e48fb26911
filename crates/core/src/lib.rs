//! `warden-core` — shared foundation for the authorization service.
//!
//! Strongly-typed identifiers and the domain error model. No infrastructure
//! concerns live here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ElementId, RoleId, RuleId, SessionId, UserId};
