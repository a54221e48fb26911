//! Signed, time-bound session tokens (HS256 JWT).
//!
//! The token is the sole carrier of identity between requests. For
//! session-type tokens the encoded string doubles as the session lookup key;
//! the codec's own expiry check is a coarser, secondary check next to the
//! session-store expiry check in the authenticator.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::UserId;

/// Token type claim carried by session tokens.
///
/// Tokens declaring another (or no) type skip session-store validation and
/// are trusted on signature + expiry alone; this leaves room for future
/// non-session token types.
pub const SESSION_TOKEN_TYPE: &str = "session";

/// Immutable codec configuration, constructed once at startup and passed in
/// explicitly. No process-wide mutable singleton.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric MAC secret shared by issue and verify.
    pub secret: Vec<u8>,
    /// Lifetime of session tokens (and of the backing session rows).
    pub session_ttl: Duration,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>, session_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            session_ttl,
        }
    }
}

/// Wire claims: `{sub, type, exp, iat}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id, as a string.
    pub sub: String,
    /// Token type; `"session"` for store-backed tokens.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
}

impl SessionClaims {
    /// Parse the subject claim as a user id, if present and well-formed.
    pub fn subject(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    pub fn is_session(&self) -> bool {
        self.token_type.as_deref() == Some(SESSION_TOKEN_TYPE)
    }
}

/// A freshly minted token together with the expiry it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens with a process-wide secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // `sub` presence is checked by the authenticator, not the codec.
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            session_ttl: config.session_ttl,
        }
    }

    /// Issue a token for `subject` with the given type claim and lifetime.
    pub fn issue(
        &self,
        subject: UserId,
        token_type: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = SessionClaims {
            sub: subject.to_string(),
            token_type: Some(token_type.to_string()),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Issue a session-type token using the configured session TTL.
    pub fn issue_session(&self, subject: UserId) -> Result<IssuedToken, TokenError> {
        self.issue(subject, SESSION_TOKEN_TYPE, self.session_ttl)
    }

    /// Verify signature and expiry.
    ///
    /// Returns `None` for anything that does not verify: malformed token,
    /// signature mismatch, or `exp` in the past. Invalid tokens are a normal
    /// outcome, not an error.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "token failed verification");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("test-secret", Duration::days(7)))
    }

    #[test]
    fn issued_token_verifies_with_original_claims() {
        let codec = codec();
        let subject = UserId::new();

        let issued = codec
            .issue(subject, SESSION_TOKEN_TYPE, Duration::minutes(30))
            .unwrap();
        let claims = codec.verify(&issued.token).expect("fresh token must verify");

        assert_eq!(claims.subject(), Some(subject));
        assert!(claims.is_session());
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn session_tokens_carry_the_configured_ttl() {
        let codec = TokenCodec::new(&AuthConfig::new("test-secret", Duration::days(3)));

        let before = Utc::now();
        let issued = codec.issue_session(UserId::new()).unwrap();

        let drift = issued.expires_at - (before + Duration::days(3));
        assert!(drift.num_seconds().abs() <= 1, "expiry must follow the config");

        let claims = codec.verify(&issued.token).unwrap();
        assert!(claims.is_session());
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec();

        // jsonwebtoken applies default leeway; move exp well into the past.
        let issued = codec
            .issue(UserId::new(), SESSION_TOKEN_TYPE, Duration::minutes(-10))
            .unwrap();

        assert!(codec.verify(&issued.token).is_none());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let codec = codec();
        let issued = codec
            .issue(UserId::new(), SESSION_TOKEN_TYPE, Duration::minutes(30))
            .unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert!(codec.verify(&tampered).is_none());
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let codec = codec();
        let other = TokenCodec::new(&AuthConfig::new("other-secret", Duration::days(7)));

        let issued = other
            .issue(UserId::new(), SESSION_TOKEN_TYPE, Duration::minutes(30))
            .unwrap();

        assert!(codec.verify(&issued.token).is_none());
    }

    #[test]
    fn malformed_token_is_invalid() {
        assert!(codec().verify("definitely.not.a-jwt").is_none());
        assert!(codec().verify("").is_none());
    }

    #[test]
    fn non_session_type_is_preserved() {
        let codec = codec();
        let issued = codec
            .issue(UserId::new(), "api-key", Duration::minutes(30))
            .unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert!(!claims.is_session());
        assert_eq!(claims.token_type.as_deref(), Some("api-key"));
    }
}
