//! Self-service profile management.

use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use warden_auth::Identity;
use warden_store::ProfileUpdate;

use crate::app::routes::common::active_principal;
use crate::app::{dto, errors::ApiError, AppServices};

pub fn router() -> Router {
    Router::new().route("/me", get(my_profile).put(update_profile).delete(delete_account))
}

pub async fn my_profile(Extension(identity): Extension<Identity>) -> Result<Response, ApiError> {
    let principal = active_principal(identity)?;
    Ok(Json(dto::UserResponse::from(principal.user)).into_response())
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let principal = active_principal(identity)?;

    if let Some(email) = &body.email {
        if !email.contains('@') {
            return Err(ApiError::bad_request("invalid email"));
        }
    }

    let updated = services.store.update_user_profile(
        principal.id(),
        ProfileUpdate {
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            middle_name: body.middle_name,
        },
    )?;

    Ok(Json(dto::UserResponse::from(updated)).into_response())
}

/// Soft deletion: the account is deactivated, every session is destroyed,
/// and the row stays in place. Future logins are refused.
pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ApiError> {
    let principal = active_principal(identity)?;

    services.store.deactivate_user(principal.id())?;

    tracing::info!(user_id = %principal.id(), "account deactivated");
    Ok(Json(dto::MessageResponse {
        message: "account deactivated; you have been logged out",
    })
    .into_response())
}
