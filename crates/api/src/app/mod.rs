//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;

use warden_auth::{AccessControl, Authenticator};
use warden_store::{seed, MemoryStore, ResourceRepo};

use crate::config::ApiConfig;
use crate::middleware;
use crate::password::Passwords;

pub mod dto;
pub mod errors;
pub mod routes;

/// Everything the handlers need, wired once at startup.
pub struct AppServices {
    pub store: Arc<MemoryStore>,
    pub resources: ResourceRepo,
    pub authenticator: Authenticator,
    pub access: AccessControl,
    pub passwords: Passwords,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: ApiConfig) -> Router {
    let store = Arc::new(MemoryStore::new());
    let passwords = Passwords::new();

    if !config.skip_seed {
        seed::seed_store(&store, |plain| {
            passwords.hash(plain).expect("hashing a seed password cannot fail")
        })
        .expect("seeding an empty store cannot fail");
    }

    let resources = ResourceRepo::new();
    if !config.skip_seed {
        let owners: Vec<_> = store
            .list_users(false)
            .into_iter()
            .map(|u| u.id)
            .collect();
        if !owners.is_empty() {
            seed::seed_resources(&resources, &owners);
        }
    }

    let auth_config = config.auth_config();
    let services = Arc::new(AppServices {
        authenticator: Authenticator::new(store.clone(), &auth_config),
        access: AccessControl::new(store.clone()),
        store,
        resources,
        passwords,
    });

    routes::router()
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::authenticate,
        ))
        .layer(axum::Extension(services))
}
