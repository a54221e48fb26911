//! Server-side session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{SessionId, UserId};

/// Ephemeral binding of a token string to a user.
///
/// Created at login; one user may hold several concurrent sessions
/// (multi-device). Destroyed on logout, on account deactivation, or lazily on
/// first use past expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// The full token string; unique, and the lookup key for this row.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            token,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Strictly-before comparison: a session expiring exactly at `now` is
    /// still live.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_strictly_before_now() {
        let now = Utc::now();
        let session = Session::new(UserId::new(), "tok".to_string(), now);

        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(1)));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
