//! Client configuration
//!
//! Loaded from TOML, overridable from the environment, validated before
//! use. The environment flag only drives cookie attributes server-side;
//! the client cares about it for nothing else.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: lax cookies, plain HTTP allowed
    #[default]
    Development,
    /// Production: secure cookies, cross-site none
    Production,
}

impl Environment {
    /// Whether session cookies carry the `Secure` attribute
    pub fn cookies_secure(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// The `SameSite` attribute for session cookies
    pub fn same_site(&self) -> &'static str {
        match self {
            Self::Development => "lax",
            Self::Production => "none",
        }
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field failed validation
    #[error("invalid config: {reason}")]
    Invalid {
        /// Which field, and why
        reason: String,
    },
}

/// Everything a client needs to reach the backend and the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash
    pub backend_url: String,
    /// Identity-provider login page
    pub provider_login_url: String,
    /// Where the provider sends the browser back to
    pub callback_url: String,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".into(),
            provider_login_url: "https://auth.example.com/".into(),
            callback_url: "http://localhost:3000/".into(),
            environment: Environment::Development,
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Override fields from `PARLOR_*` environment variables.
    pub fn merge_with_env(&mut self) {
        if let Ok(value) = std::env::var("PARLOR_BACKEND_URL") {
            self.backend_url = value;
        }
        if let Ok(value) = std::env::var("PARLOR_PROVIDER_LOGIN_URL") {
            self.provider_login_url = value;
        }
        if let Ok(value) = std::env::var("PARLOR_CALLBACK_URL") {
            self.callback_url = value;
        }
        if let Ok(value) = std::env::var("PARLOR_ENVIRONMENT") {
            if value.eq_ignore_ascii_case("production") {
                self.environment = Environment::Production;
            } else {
                self.environment = Environment::Development;
            }
        }
    }

    /// Check every URL looks like one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("backend_url", &self.backend_url),
            ("provider_login_url", &self.provider_login_url),
            ("callback_url", &self.callback_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be an http(s) URL, got {value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Absolute URL for an endpoint path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), path)
    }

    /// The provider URL the browser is sent to for login, with the
    /// callback encoded. Pure function of the config: calling it changes
    /// no state, the redirect round-trip re-enters at the session
    /// exchange.
    pub fn login_redirect_url(&self) -> String {
        format!(
            "{}?redirect={}",
            self.provider_login_url.trim_end_matches('?'),
            urlencoding::encode(&self.callback_url)
        )
    }
}
