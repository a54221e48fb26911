//! Request/response DTOs and JSON mapping helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::{AccessRule, BusinessElement, Role, User};
use warden_core::{ElementId, RoleId, RuleId, UserId};
use warden_store::{RuleFlags, RulePatch};

use super::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub password: String,
    pub password_repeat: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.email.contains('@') {
            return Err(ApiError::bad_request("invalid email"));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ApiError::bad_request("first and last name are required"));
        }
        if self.password.len() < 6 {
            return Err(ApiError::bad_request("password must be at least 6 characters"));
        }
        if self.password != self.password_repeat {
            return Err(ApiError::bad_request("passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Present-and-null clears the middle name.
    #[serde(default, with = "double_option")]
    pub middle_name: Option<Option<String>>,
}

/// Distinguishes an absent JSON field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ElementRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ElementUpdateRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RuleCreateRequest {
    pub role_id: RoleId,
    pub element_id: ElementId,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_all: bool,
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub update_all: bool,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub delete_all: bool,
}

impl RuleCreateRequest {
    pub fn flags(&self) -> RuleFlags {
        RuleFlags {
            read: self.read,
            read_all: self.read_all,
            create: self.create,
            update: self.update,
            update_all: self.update_all,
            delete: self.delete,
            delete_all: self.delete_all,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RuleUpdateRequest {
    pub read: Option<bool>,
    pub read_all: Option<bool>,
    pub create: Option<bool>,
    pub update: Option<bool>,
    pub update_all: Option<bool>,
    pub delete: Option<bool>,
    pub delete_all: Option<bool>,
}

impl RuleUpdateRequest {
    pub fn patch(&self) -> RulePatch {
        RulePatch {
            read: self.read,
            read_all: self.read_all,
            create: self.create,
            update: self.update,
            update_all: self.update_all,
            delete: self.delete,
            delete_all: self.delete_all,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetUserRoleRequest {
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub active: bool,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            middle_name: user.middle_name,
            active: user.active,
            role_id: user.role_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ElementResponse {
    pub id: ElementId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessElement> for ElementResponse {
    fn from(element: BusinessElement) -> Self {
        Self {
            id: element.id,
            name: element.name,
            description: element.description,
            created_at: element.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: RuleId,
    pub role_id: RoleId,
    pub element_id: ElementId,
    pub read: bool,
    pub read_all: bool,
    pub create: bool,
    pub update: bool,
    pub update_all: bool,
    pub delete: bool,
    pub delete_all: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AccessRule> for RuleResponse {
    fn from(rule: AccessRule) -> Self {
        Self {
            id: rule.id,
            role_id: rule.role_id,
            element_id: rule.element_id,
            read: rule.read,
            read_all: rule.read_all,
            create: rule.create,
            update: rule.update,
            update_all: rule.update_all,
            delete: rule.delete,
            delete_all: rule.delete_all,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
