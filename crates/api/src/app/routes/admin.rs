//! Administrator endpoints: roles, business elements, access rules, users.
//!
//! Every handler is behind the admin guard; the permission matrix itself is
//! administered here, not consulted.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use warden_auth::Identity;
use warden_core::{ElementId, RoleId, RuleId, UserId};

use crate::app::routes::common::admin_principal;
use crate::app::{dto, errors::ApiError, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
        .route("/elements", get(list_elements).post(create_element))
        .route("/elements/:id", put(update_element).delete(delete_element))
        .route("/access-rules", get(list_rules).post(create_rule))
        .route("/access-rules/:id", put(update_rule).delete(delete_rule))
        .route("/users", get(list_users))
        .route("/users/:id/role", put(set_user_role))
}

// ───────────────────────────── roles ─────────────────────────────

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let roles: Vec<dto::RoleResponse> = services
        .store
        .list_roles()
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(roles).into_response())
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<dto::RoleRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("role name cannot be empty"));
    }

    let role = services.store.create_role(&body.name, body.description)?;
    Ok((StatusCode::CREATED, Json(dto::RoleResponse::from(role))).into_response())
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<RoleId>,
    Json(body): Json<dto::RoleUpdateRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let role = services.store.update_role(id, body.name, body.description)?;
    Ok(Json(dto::RoleResponse::from(role)).into_response())
}

pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<RoleId>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    services.store.delete_role(id)?;
    Ok(Json(dto::MessageResponse {
        message: "role deleted",
    })
    .into_response())
}

// ─────────────────────────── elements ───────────────────────────

pub async fn list_elements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let elements: Vec<dto::ElementResponse> = services
        .store
        .list_elements()
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(elements).into_response())
}

pub async fn create_element(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<dto::ElementRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("element name cannot be empty"));
    }

    let element = services.store.create_element(&body.name, body.description)?;
    Ok((StatusCode::CREATED, Json(dto::ElementResponse::from(element))).into_response())
}

pub async fn update_element(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<ElementId>,
    Json(body): Json<dto::ElementUpdateRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let element = services
        .store
        .update_element(id, body.name, body.description)?;
    Ok(Json(dto::ElementResponse::from(element)).into_response())
}

pub async fn delete_element(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<ElementId>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    services.store.delete_element(id)?;
    Ok(Json(dto::MessageResponse {
        message: "business element deleted",
    })
    .into_response())
}

// ───────────────────────────── rules ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RuleFilter {
    pub role_id: Option<RoleId>,
    pub element_id: Option<ElementId>,
}

pub async fn list_rules(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Query(filter): Query<RuleFilter>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let rules: Vec<dto::RuleResponse> = services
        .store
        .list_rules(filter.role_id, filter.element_id)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(rules).into_response())
}

pub async fn create_rule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<dto::RuleCreateRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let rule = services
        .store
        .create_rule(body.role_id, body.element_id, body.flags())?;
    Ok((StatusCode::CREATED, Json(dto::RuleResponse::from(rule))).into_response())
}

pub async fn update_rule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<RuleId>,
    Json(body): Json<dto::RuleUpdateRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let rule = services.store.update_rule(id, body.patch())?;
    Ok(Json(dto::RuleResponse::from(rule)).into_response())
}

pub async fn delete_rule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<RuleId>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    services.store.delete_rule(id)?;
    Ok(Json(dto::MessageResponse {
        message: "access rule deleted",
    })
    .into_response())
}

// ───────────────────────────── users ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Query(filter): Query<UserFilter>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let users: Vec<dto::UserResponse> = services
        .store
        .list_users(filter.include_inactive)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(users).into_response())
}

pub async fn set_user_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<UserId>,
    Json(body): Json<dto::SetUserRoleRequest>,
) -> Result<Response, ApiError> {
    admin_principal(identity)?;

    let user = services.store.set_user_role(id, body.role_id)?;
    Ok(Json(dto::UserResponse::from(user)).into_response())
}
