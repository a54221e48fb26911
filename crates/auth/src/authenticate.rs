//! Bearer-token authentication state machine.
//!
//! Every request re-runs the whole chain from scratch; each check is an
//! early exit to [`Identity::Anonymous`], never an error. Only store
//! connectivity propagates as a fault.

use std::sync::Arc;

use chrono::Utc;

use crate::principal::Principal;
use crate::store::{AuthStore, StoreError};
use crate::token::{AuthConfig, TokenCodec};

/// Terminal state of authenticating one request.
#[derive(Debug, Clone)]
pub enum Identity {
    Authenticated(Principal),
    Anonymous,
}

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Identity::Authenticated(p) => Some(p),
            Identity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

/// Resolves a raw bearer token into an authenticated, active principal.
pub struct Authenticator {
    store: Arc<dyn AuthStore>,
    codec: TokenCodec,
}

impl Authenticator {
    pub fn new(store: Arc<dyn AuthStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            codec: TokenCodec::new(config),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Run the authentication chain for one request.
    ///
    /// Session-type tokens must additionally have a live session row matching
    /// (token, user); an expired row is deleted on first use (lazy cleanup,
    /// idempotent under concurrent requests). Tokens of other declared types
    /// are trusted on signature + expiry alone.
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<Identity, StoreError> {
        let Some(token) = bearer else {
            return Ok(Identity::Anonymous);
        };

        let Some(claims) = self.codec.verify(token) else {
            return Ok(Identity::Anonymous);
        };

        // Missing or unparseable subject.
        let Some(user_id) = claims.subject() else {
            return Ok(Identity::Anonymous);
        };

        if claims.is_session() {
            let Some(session) = self.store.session_by_token_and_user(token, user_id).await? else {
                return Ok(Identity::Anonymous);
            };

            if session.is_expired(Utc::now()) {
                self.store.delete_session(session.id).await?;
                tracing::debug!(user_id = %user_id, "deleted expired session");
                return Ok(Identity::Anonymous);
            }
        }

        let Some(user) = self.store.user_by_id(user_id).await? else {
            return Ok(Identity::Anonymous);
        };
        if !user.active {
            return Ok(Identity::Anonymous);
        }

        let Some(role) = self.store.role_by_id(user.role_id).await? else {
            // A user row pointing at a missing role cannot be authorized for
            // anything; treat it as unauthenticated rather than faulting.
            tracing::warn!(user_id = %user_id, "user references missing role");
            return Ok(Identity::Anonymous);
        };

        Ok(Identity::Authenticated(Principal { user, role }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use warden_core::{RoleId, SessionId, UserId};

    use crate::principal::{Role, User};
    use crate::rule::AccessRule;
    use crate::session::Session;
    use crate::token::SESSION_TOKEN_TYPE;

    #[derive(Default)]
    struct FakeStore {
        users: Mutex<HashMap<UserId, User>>,
        roles: Mutex<HashMap<RoleId, Role>>,
        sessions: Mutex<Vec<Session>>,
    }

    #[async_trait]
    impl AuthStore for FakeStore {
        async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn role_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
            Ok(self.roles.lock().unwrap().get(&id).cloned())
        }

        async fn session_by_token_and_user(
            &self,
            token: &str,
            user_id: UserId,
        ) -> Result<Option<Session>, StoreError> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.token == token && s.user_id == user_id)
                .cloned())
        }

        async fn delete_session(&self, id: SessionId) -> Result<(), StoreError> {
            self.sessions.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }

        async fn delete_sessions_for_user(&self, user_id: UserId) -> Result<(), StoreError> {
            self.sessions.lock().unwrap().retain(|s| s.user_id != user_id);
            Ok(())
        }

        async fn rule_by_role_and_element(
            &self,
            _role_id: RoleId,
            _element_name: &str,
        ) -> Result<Option<AccessRule>, StoreError> {
            Ok(None)
        }
    }

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret", Duration::days(7))
    }

    fn fixture() -> (Arc<FakeStore>, Authenticator, UserId) {
        let store = Arc::new(FakeStore::default());
        let authenticator = Authenticator::new(store.clone(), &config());

        let role = Role {
            id: RoleId::new(),
            name: "user".to_string(),
            description: None,
            created_at: Utc::now(),
        };
        let user = User {
            id: UserId::new(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            middle_name: None,
            hashed_password: "hash".to_string(),
            active: true,
            role_id: role.id,
            created_at: Utc::now(),
            updated_at: None,
        };
        let user_id = user.id;

        store.roles.lock().unwrap().insert(role.id, role);
        store.users.lock().unwrap().insert(user_id, user);

        (store, authenticator, user_id)
    }

    /// Mint a session token and persist a matching session row.
    fn open_session(store: &FakeStore, auth: &Authenticator, user_id: UserId) -> String {
        let issued = auth.codec().issue_session(user_id).unwrap();
        store.sessions.lock().unwrap().push(Session::new(
            user_id,
            issued.token.clone(),
            issued.expires_at,
        ));
        issued.token
    }

    #[tokio::test]
    async fn missing_credential_is_anonymous() {
        let (_store, auth, _) = fixture();
        let identity = auth.authenticate(None).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn garbage_token_is_anonymous() {
        let (_store, auth, _) = fixture();
        let identity = auth.authenticate(Some("not-a-token")).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn unparseable_subject_is_anonymous() {
        let (_store, auth, _) = fixture();

        // Token signed with the right key but whose sub is not a user id.
        let claims = crate::token::SessionClaims {
            sub: "42".to_string(),
            token_type: Some(SESSION_TOKEN_TYPE.to_string()),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let identity = auth.authenticate(Some(&token)).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn valid_session_authenticates() {
        let (store, auth, user_id) = fixture();
        let token = open_session(&store, &auth, user_id);

        let identity = auth.authenticate(Some(&token)).await.unwrap();
        let principal = identity.principal().expect("must authenticate");
        assert_eq!(principal.id(), user_id);
        assert_eq!(principal.role.name, "user");
    }

    #[tokio::test]
    async fn session_token_without_session_row_is_anonymous() {
        let (store, auth, user_id) = fixture();
        let token = open_session(&store, &auth, user_id);
        store.sessions.lock().unwrap().clear();

        // Signature and expiry are fine, but the store check dominates.
        let identity = auth.authenticate(Some(&token)).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn expired_session_is_deleted_and_stays_anonymous() {
        let (store, auth, user_id) = fixture();

        // Codec-valid token with an already-expired session row.
        let issued = auth.codec().issue_session(user_id).unwrap();
        store.sessions.lock().unwrap().push(Session::new(
            user_id,
            issued.token.clone(),
            Utc::now() - Duration::hours(1),
        ));

        let identity = auth.authenticate(Some(&issued.token)).await.unwrap();
        assert!(identity.is_anonymous());
        assert!(store.sessions.lock().unwrap().is_empty(), "row must be cleaned up");

        // Re-running on the same token is a no-op, not an error.
        let identity = auth.authenticate(Some(&issued.token)).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn inactive_user_is_anonymous_despite_valid_session() {
        let (store, auth, user_id) = fixture();
        let token = open_session(&store, &auth, user_id);

        store
            .users
            .lock()
            .unwrap()
            .get_mut(&user_id)
            .unwrap()
            .active = false;

        let identity = auth.authenticate(Some(&token)).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn missing_user_row_is_anonymous() {
        let (store, auth, user_id) = fixture();
        let token = open_session(&store, &auth, user_id);
        store.users.lock().unwrap().clear();

        let identity = auth.authenticate(Some(&token)).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn non_session_token_skips_store_check() {
        let (_store, auth, user_id) = fixture();

        // No session row exists, but the token does not declare the session
        // type, so it is trusted on signature + expiry alone.
        let issued = auth.codec().issue(user_id, "api-key", Duration::hours(1)).unwrap();

        let identity = auth.authenticate(Some(&issued.token)).await.unwrap();
        assert!(identity.principal().is_some());
    }

    #[tokio::test]
    async fn session_for_another_user_does_not_match() {
        let (store, auth, user_id) = fixture();

        // Session row bound to a different user than the token subject.
        let issued = auth.codec().issue_session(user_id).unwrap();
        store.sessions.lock().unwrap().push(Session::new(
            UserId::new(),
            issued.token.clone(),
            issued.expires_at,
        ));

        let identity = auth.authenticate(Some(&issued.token)).await.unwrap();
        assert!(identity.is_anonymous());
    }
}
