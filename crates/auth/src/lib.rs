//! `warden-auth` — authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage. Storage is
//! reached through the [`AuthStore`] seam; transport concerns (bearer header
//! parsing, status codes) live in the API layer.

pub mod access;
pub mod authenticate;
pub mod guard;
pub mod principal;
pub mod rule;
pub mod session;
pub mod store;
pub mod token;

pub use access::AccessControl;
pub use authenticate::{Authenticator, Identity};
pub use guard::{require_active, require_admin, require_authenticated, AccessError};
pub use principal::{BusinessElement, Principal, Role, User};
pub use rule::{evaluate, AccessRule, Decision, DenyReason, Operation};
pub use session::Session;
pub use store::{AuthStore, StoreError};
pub use token::{AuthConfig, IssuedToken, SessionClaims, TokenCodec, TokenError, SESSION_TOKEN_TYPE};
