//! Connection settings for the DBaaS job API

use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct ApiClientConfig {
    pub uri: String,
    pub token: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    /// Client certificate, inline PEM or a file path
    pub cert: String,
    /// Client key, inline PEM or a file path
    pub key: String,
    /// Root CA, inline PEM or a file path
    pub ca: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    /// Log full request and response bodies
    pub debug: bool,
}

impl ApiClientConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load settings from `DBIAAS_*` environment variables, reading an
    /// optional `.env` file first.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let timeout = match read_var("DBIAAS_TIMEOUT") {
            raw if raw.is_empty() => None,
            raw => Some(Duration::from_secs(raw.parse::<u64>()?)),
        };

        let config = Self {
            uri: read_var("DBIAAS_URI"),
            token: read_var("DBIAAS_TOKEN"),
            username: read_var("DBIAAS_USERNAME"),
            password: read_var("DBIAAS_PASSWORD"),
            insecure: read_flag("DBIAAS_INSECURE")?,
            cert: read_var("DBIAAS_CERT"),
            key: read_var("DBIAAS_KEY"),
            ca: read_var("DBIAAS_CA"),
            headers: HashMap::new(),
            timeout,
            debug: read_flag("DBIAAS_DEBUG")?,
        };

        config.normalized()
    }

    /// Reject an empty URI and strip trailing slashes.
    pub fn normalized(mut self) -> AppResult<Self> {
        if self.uri.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "No URI defined, please set the dbaas uri.".to_string(),
            ));
        }
        self.uri = self.uri.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

fn read_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn read_flag(name: &str) -> AppResult<bool> {
    match read_var(name).to_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(AppError::ConfigurationError(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}
