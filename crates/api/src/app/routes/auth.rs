//! Registration, login, logout, and the current-principal endpoint.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use warden_auth::{AuthStore, Identity, Session};
use warden_core::DomainError;
use warden_store::NewUser;

use crate::app::routes::common::active_principal;
use crate::app::{dto, errors::ApiError, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> Result<Response, ApiError> {
    body.validate()?;

    // New accounts always start in the default role. Its absence means the
    // deployment was never seeded.
    let default_role = services
        .store
        .role_by_name("user")
        .ok_or_else(|| DomainError::misconfigured("default role 'user' not found"))?;

    let hashed_password = services.passwords.hash(&body.password)?;
    let user = services.store.create_user(NewUser {
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        middle_name: body.middle_name,
        hashed_password,
        role_id: default_role.id,
    })?;

    tracing::info!(user_id = %user.id, "registered new user");
    Ok((StatusCode::CREATED, Json(dto::UserResponse::from(user))).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<Response, ApiError> {
    // Unknown email and wrong password produce the same answer.
    let Some(user) = services.store.user_by_email(&body.email) else {
        return Err(ApiError::Unauthenticated);
    };

    if !user.active {
        return Err(ApiError::forbidden("user account is inactive"));
    }

    if !services.passwords.verify(&body.password, &user.hashed_password) {
        return Err(ApiError::Unauthenticated);
    }

    let issued = services.authenticator.codec().issue_session(user.id)?;

    services.store.insert_session(Session::new(
        user.id,
        issued.token.clone(),
        issued.expires_at,
    ));

    tracing::info!(user_id = %user.id, "opened session");
    Ok(Json(dto::TokenResponse::bearer(issued.token)).into_response())
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ApiError> {
    let principal = active_principal(identity)?;

    // All sessions, not just the one presented: logout means every device.
    services
        .store
        .delete_sessions_for_user(principal.id())
        .await?;

    tracing::info!(user_id = %principal.id(), "logged out");
    Ok(Json(dto::MessageResponse {
        message: "successfully logged out",
    })
    .into_response())
}

pub async fn me(Extension(identity): Extension<Identity>) -> Result<Response, ApiError> {
    let principal = active_principal(identity)?;
    Ok(Json(dto::UserResponse::from(principal.user)).into_response())
}
