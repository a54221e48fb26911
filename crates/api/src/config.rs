//! Process configuration, read once at startup.

use chrono::Duration;

use warden_auth::AuthConfig;

/// Configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub secret_key: String,
    pub session_expire_days: i64,
    pub bind_addr: String,
    /// Skip loading the demo dataset (roles/elements/rules are then created
    /// through the admin API).
    pub skip_seed: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            secret_key: "dev-secret".to_string(),
            session_expire_days: 7,
            bind_addr: "0.0.0.0:8000".to_string(),
            skip_seed: false,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment, falling back to development
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secret_key = std::env::var("SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("SECRET_KEY not set; using insecure dev default");
            defaults.secret_key
        });

        let session_expire_days = std::env::var("SESSION_EXPIRE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.session_expire_days);

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        Self {
            secret_key,
            session_expire_days,
            bind_addr,
            skip_seed: false,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_expire_days)
    }

    /// The immutable core configuration handed to the token codec and
    /// authenticator.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.secret_key.as_bytes(), self.session_ttl())
    }
}
