use axum::{routing::get, Router};

pub mod admin;
pub mod auth;
pub mod common;
pub mod resources;
pub mod system;
pub mod users;

/// Router for the whole API surface.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/resources", resources::router())
}
