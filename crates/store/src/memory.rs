//! Mutex-guarded in-memory tables with the persisted-layout invariants.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use warden_auth::{AccessRule, AuthStore, BusinessElement, Role, Session, StoreError, User};
use warden_core::{DomainError, DomainResult, ElementId, RoleId, RuleId, SessionId, UserId};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    elements: HashMap<ElementId, BusinessElement>,
    rules: HashMap<RuleId, AccessRule>,
    sessions: HashMap<SessionId, Session>,
}

/// In-memory store. Each method takes the lock once; no consistency is
/// assumed across calls, matching the per-query consistency the core accepts.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

/// Input for creating a user row. The password arrives already hashed;
/// hashing is the API layer's concern.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub hashed_password: String,
    pub role_id: RoleId,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the middle name.
    pub middle_name: Option<Option<String>>,
}

/// The seven permission flags of a rule row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFlags {
    pub read: bool,
    pub read_all: bool,
    pub create: bool,
    pub update: bool,
    pub update_all: bool,
    pub delete: bool,
    pub delete_all: bool,
}

impl RuleFlags {
    /// Every flag set (the administrator matrix row).
    pub fn all() -> Self {
        Self {
            read: true,
            read_all: true,
            create: true,
            update: true,
            update_all: true,
            delete: true,
            delete_all: true,
        }
    }
}

/// Partial flag update; `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePatch {
    pub read: Option<bool>,
    pub read_all: Option<bool>,
    pub create: Option<bool>,
    pub update: Option<bool>,
    pub update_all: Option<bool>,
    pub delete: Option<bool>,
    pub delete_all: Option<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────────── roles ─────────────────────────────

    pub fn create_role(&self, name: &str, description: Option<String>) -> DomainResult<Role> {
        let mut t = self.tables.write().unwrap();
        if t.roles.values().any(|r| r.name == name) {
            return Err(DomainError::conflict("role with this name already exists"));
        }

        let role = Role {
            id: RoleId::new(),
            name: name.to_string(),
            description,
            created_at: Utc::now(),
        };
        t.roles.insert(role.id, role.clone());
        Ok(role)
    }

    pub fn update_role(
        &self,
        id: RoleId,
        name: Option<String>,
        description: Option<Option<String>>,
    ) -> DomainResult<Role> {
        let mut t = self.tables.write().unwrap();
        if let Some(name) = &name {
            if t.roles.values().any(|r| r.name == *name && r.id != id) {
                return Err(DomainError::conflict("role with this name already exists"));
            }
        }

        let role = t.roles.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(name) = name {
            role.name = name;
        }
        if let Some(description) = description {
            role.description = description;
        }
        Ok(role.clone())
    }

    /// Refused while any user still holds the role.
    pub fn delete_role(&self, id: RoleId) -> DomainResult<()> {
        let mut t = self.tables.write().unwrap();
        if !t.roles.contains_key(&id) {
            return Err(DomainError::NotFound);
        }

        let holders = t.users.values().filter(|u| u.role_id == id).count();
        if holders > 0 {
            return Err(DomainError::conflict(format!(
                "cannot delete role: {holders} user(s) have this role"
            )));
        }

        t.roles.remove(&id);
        t.rules.retain(|_, r| r.role_id != id);
        Ok(())
    }

    pub fn list_roles(&self) -> Vec<Role> {
        let t = self.tables.read().unwrap();
        let mut roles: Vec<_> = t.roles.values().cloned().collect();
        roles.sort_by_key(|r| r.created_at);
        roles
    }

    pub fn role_by_name(&self, name: &str) -> Option<Role> {
        let t = self.tables.read().unwrap();
        t.roles.values().find(|r| r.name == name).cloned()
    }

    // ─────────────────────────── elements ───────────────────────────

    pub fn create_element(
        &self,
        name: &str,
        description: Option<String>,
    ) -> DomainResult<BusinessElement> {
        let mut t = self.tables.write().unwrap();
        if t.elements.values().any(|e| e.name == name) {
            return Err(DomainError::conflict(
                "business element with this name already exists",
            ));
        }

        let element = BusinessElement {
            id: ElementId::new(),
            name: name.to_string(),
            description,
            created_at: Utc::now(),
        };
        t.elements.insert(element.id, element.clone());
        Ok(element)
    }

    pub fn update_element(
        &self,
        id: ElementId,
        name: Option<String>,
        description: Option<Option<String>>,
    ) -> DomainResult<BusinessElement> {
        let mut t = self.tables.write().unwrap();
        if let Some(name) = &name {
            if t.elements.values().any(|e| e.name == *name && e.id != id) {
                return Err(DomainError::conflict(
                    "business element with this name already exists",
                ));
            }
        }

        let element = t.elements.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(name) = name {
            element.name = name;
        }
        if let Some(description) = description {
            element.description = description;
        }
        Ok(element.clone())
    }

    /// Deleting an element drops the rules that target it; a rule without its
    /// element is meaningless.
    pub fn delete_element(&self, id: ElementId) -> DomainResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.elements.remove(&id).is_none() {
            return Err(DomainError::NotFound);
        }
        t.rules.retain(|_, r| r.element_id != id);
        Ok(())
    }

    pub fn list_elements(&self) -> Vec<BusinessElement> {
        let t = self.tables.read().unwrap();
        let mut elements: Vec<_> = t.elements.values().cloned().collect();
        elements.sort_by_key(|e| e.created_at);
        elements
    }

    pub fn element_by_name(&self, name: &str) -> Option<BusinessElement> {
        let t = self.tables.read().unwrap();
        t.elements.values().find(|e| e.name == name).cloned()
    }

    // ───────────────────────────── rules ─────────────────────────────

    /// Role and element must exist; the (role, element) pair must be new.
    pub fn create_rule(
        &self,
        role_id: RoleId,
        element_id: ElementId,
        flags: RuleFlags,
    ) -> DomainResult<AccessRule> {
        let mut t = self.tables.write().unwrap();
        if !t.roles.contains_key(&role_id) || !t.elements.contains_key(&element_id) {
            return Err(DomainError::NotFound);
        }
        if t.rules
            .values()
            .any(|r| r.role_id == role_id && r.element_id == element_id)
        {
            return Err(DomainError::conflict(
                "access rule for this role and element already exists",
            ));
        }

        let mut rule = AccessRule::empty(role_id, element_id);
        rule.read = flags.read;
        rule.read_all = flags.read_all;
        rule.create = flags.create;
        rule.update = flags.update;
        rule.update_all = flags.update_all;
        rule.delete = flags.delete;
        rule.delete_all = flags.delete_all;

        t.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    pub fn update_rule(&self, id: RuleId, patch: RulePatch) -> DomainResult<AccessRule> {
        let mut t = self.tables.write().unwrap();
        let rule = t.rules.get_mut(&id).ok_or(DomainError::NotFound)?;

        if let Some(v) = patch.read {
            rule.read = v;
        }
        if let Some(v) = patch.read_all {
            rule.read_all = v;
        }
        if let Some(v) = patch.create {
            rule.create = v;
        }
        if let Some(v) = patch.update {
            rule.update = v;
        }
        if let Some(v) = patch.update_all {
            rule.update_all = v;
        }
        if let Some(v) = patch.delete {
            rule.delete = v;
        }
        if let Some(v) = patch.delete_all {
            rule.delete_all = v;
        }
        rule.updated_at = Some(Utc::now());
        Ok(rule.clone())
    }

    pub fn delete_rule(&self, id: RuleId) -> DomainResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.rules.remove(&id).is_none() {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    pub fn list_rules(
        &self,
        role_id: Option<RoleId>,
        element_id: Option<ElementId>,
    ) -> Vec<AccessRule> {
        let t = self.tables.read().unwrap();
        let mut rules: Vec<_> = t
            .rules
            .values()
            .filter(|r| role_id.is_none_or(|id| r.role_id == id))
            .filter(|r| element_id.is_none_or(|id| r.element_id == id))
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.created_at);
        rules
    }

    // ───────────────────────────── users ─────────────────────────────

    pub fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let mut t = self.tables.write().unwrap();
        if t.users.values().any(|u| u.email == new_user.email) {
            return Err(DomainError::conflict("email already registered"));
        }
        if !t.roles.contains_key(&new_user.role_id) {
            return Err(DomainError::NotFound);
        }

        let user = User {
            id: UserId::new(),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            middle_name: new_user.middle_name,
            hashed_password: new_user.hashed_password,
            active: true,
            role_id: new_user.role_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let t = self.tables.read().unwrap();
        t.users.values().find(|u| u.email == email).cloned()
    }

    pub fn list_users(&self, include_inactive: bool) -> Vec<User> {
        let t = self.tables.read().unwrap();
        let mut users: Vec<_> = t
            .users
            .values()
            .filter(|u| include_inactive || u.active)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        users
    }

    pub fn update_user_profile(&self, id: UserId, update: ProfileUpdate) -> DomainResult<User> {
        let mut t = self.tables.write().unwrap();
        if let Some(email) = &update.email {
            if t.users.values().any(|u| u.email == *email && u.id != id) {
                return Err(DomainError::conflict("email already registered"));
            }
        }

        let user = t.users.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(middle_name) = update.middle_name {
            user.middle_name = middle_name;
        }
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    pub fn set_user_role(&self, user_id: UserId, role_id: RoleId) -> DomainResult<User> {
        let mut t = self.tables.write().unwrap();
        if !t.roles.contains_key(&role_id) {
            return Err(DomainError::NotFound);
        }
        let user = t.users.get_mut(&user_id).ok_or(DomainError::NotFound)?;
        user.role_id = role_id;
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    /// Soft deletion: the row stays, the account can no longer authenticate,
    /// and every live session is torn down.
    pub fn deactivate_user(&self, id: UserId) -> DomainResult<()> {
        let mut t = self.tables.write().unwrap();
        let user = t.users.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.active = false;
        user.updated_at = Some(Utc::now());
        t.sessions.retain(|_, s| s.user_id != id);
        Ok(())
    }

    // ─────────────────────────── sessions ───────────────────────────

    pub fn insert_session(&self, session: Session) {
        let mut t = self.tables.write().unwrap();
        t.sessions.insert(session.id, session);
    }

    pub fn session_count_for(&self, user_id: UserId) -> usize {
        let t = self.tables.read().unwrap();
        t.sessions.values().filter(|s| s.user_id == user_id).count()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().unwrap();
        Ok(t.users.get(&id).cloned())
    }

    async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let t = self.tables.read().unwrap();
        Ok(t.roles.get(&id).cloned())
    }

    async fn session_by_token_and_user(
        &self,
        token: &str,
        user_id: UserId,
    ) -> Result<Option<Session>, StoreError> {
        let t = self.tables.read().unwrap();
        Ok(t.sessions
            .values()
            .find(|s| s.token == token && s.user_id == user_id)
            .cloned())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StoreError> {
        let mut t = self.tables.write().unwrap();
        t.sessions.remove(&id);
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: UserId) -> Result<(), StoreError> {
        let mut t = self.tables.write().unwrap();
        t.sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn rule_by_role_and_element(
        &self,
        role_id: RoleId,
        element_name: &str,
    ) -> Result<Option<AccessRule>, StoreError> {
        let t = self.tables.read().unwrap();
        let Some(element) = t.elements.values().find(|e| e.name == element_name) else {
            return Ok(None);
        };
        Ok(t.rules
            .values()
            .find(|r| r.role_id == role_id && r.element_id == element.id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with_role() -> (MemoryStore, Role) {
        let store = MemoryStore::new();
        let role = store.create_role("user", None).unwrap();
        (store, role)
    }

    fn some_user(store: &MemoryStore, role_id: RoleId, email: &str) -> User {
        store
            .create_user(NewUser {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                middle_name: None,
                hashed_password: "hash".to_string(),
                role_id,
            })
            .unwrap()
    }

    #[test]
    fn role_names_are_unique() {
        let (store, _) = store_with_role();
        let err = store.create_role("user", None).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn role_in_use_cannot_be_deleted() {
        let (store, role) = store_with_role();
        some_user(&store, role.id, "a@example.com");

        let err = store.delete_role(role.id).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn unused_role_is_deleted() {
        let (store, role) = store_with_role();
        store.delete_role(role.id).unwrap();
        assert!(store.list_roles().is_empty());
    }

    #[test]
    fn element_names_are_unique() {
        let store = MemoryStore::new();
        store.create_element("products", None).unwrap();
        let err = store.create_element("products", None).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn deleting_element_drops_its_rules() {
        let (store, role) = store_with_role();
        let element = store.create_element("products", None).unwrap();
        store
            .create_rule(role.id, element.id, RuleFlags::all())
            .unwrap();

        store.delete_element(element.id).unwrap();
        assert!(store.list_rules(None, None).is_empty());
    }

    #[test]
    fn one_rule_per_role_element_pair() {
        let (store, role) = store_with_role();
        let element = store.create_element("orders", None).unwrap();

        store
            .create_rule(role.id, element.id, RuleFlags::default())
            .unwrap();
        let err = store
            .create_rule(role.id, element.id, RuleFlags::all())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn rule_patch_only_touches_set_flags() {
        let (store, role) = store_with_role();
        let element = store.create_element("orders", None).unwrap();
        let rule = store
            .create_rule(
                role.id,
                element.id,
                RuleFlags {
                    read: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = store
            .update_rule(
                rule.id,
                RulePatch {
                    read_all: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(updated.read);
        assert!(updated.read_all);
        assert!(!updated.create);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn rule_resolution_is_by_role_and_element_name() {
        let (store, role) = store_with_role();
        let other_role = store.create_role("manager", None).unwrap();
        let element = store.create_element("orders", None).unwrap();
        let rule = store
            .create_rule(role.id, element.id, RuleFlags::all())
            .unwrap();

        let found = store
            .rule_by_role_and_element(role.id, "orders")
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id), Some(rule.id));

        assert!(store
            .rule_by_role_and_element(other_role.id, "orders")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .rule_by_role_and_element(role.id, "missing")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn emails_are_unique() {
        let (store, role) = store_with_role();
        some_user(&store, role.id, "a@example.com");

        let err = store
            .create_user(NewUser {
                email: "a@example.com".to_string(),
                first_name: "B".to_string(),
                last_name: "C".to_string(),
                middle_name: None,
                hashed_password: "hash".to_string(),
                role_id: role.id,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn profile_update_cannot_steal_an_email() {
        let (store, role) = store_with_role();
        some_user(&store, role.id, "a@example.com");
        let b = some_user(&store, role.id, "b@example.com");

        let err = store
            .update_user_profile(
                b.id,
                ProfileUpdate {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn deactivation_purges_sessions() {
        let (store, role) = store_with_role();
        let user = some_user(&store, role.id, "a@example.com");

        let expires = Utc::now() + Duration::days(1);
        store.insert_session(Session::new(user.id, "tok-1".to_string(), expires));
        store.insert_session(Session::new(user.id, "tok-2".to_string(), expires));
        assert_eq!(store.session_count_for(user.id), 2);

        store.deactivate_user(user.id).unwrap();

        assert_eq!(store.session_count_for(user.id), 0);
        let stored = store.user_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn session_deletion_is_idempotent() {
        let (store, role) = store_with_role();
        let user = some_user(&store, role.id, "a@example.com");
        let session = Session::new(user.id, "tok".to_string(), Utc::now() + Duration::days(1));
        store.insert_session(session.clone());

        store.delete_session(session.id).await.unwrap();
        store.delete_session(session.id).await.unwrap();
        store.delete_sessions_for_user(user.id).await.unwrap();
    }

    #[tokio::test]
    async fn session_lookup_requires_both_token_and_user() {
        let (store, role) = store_with_role();
        let user = some_user(&store, role.id, "a@example.com");
        store.insert_session(Session::new(
            user.id,
            "tok".to_string(),
            Utc::now() + Duration::days(1),
        ));

        assert!(store
            .session_by_token_and_user("tok", user.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .session_by_token_and_user("tok", UserId::new())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .session_by_token_and_user("other", user.id)
            .await
            .unwrap()
            .is_none());
    }
}
