//! Run configuration.
//!
//! Built once from parsed arguments and passed explicitly to every component.
use crate::error::{ProvisionError, Result};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://directus.allisons.dev";
pub const DEFAULT_LOG_FILE: &str = "directus_setup.log";
pub const DEFAULT_SETTLE_MS: u64 = 2000;

pub const ENV_BASE_URL: &str = "DIRECTUS_URL";
pub const ENV_ADMIN_TOKEN: &str = "DIRECTUS_ADMIN_TOKEN";
pub const ENV_ADMIN_EMAIL: &str = "DIRECTUS_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "DIRECTUS_ADMIN_PASSWORD";

/// How a bearer token is obtained.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    StaticToken(String),
    Login { email: String, password: String },
}

// Keep secrets out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticToken(_) => f.write_str("StaticToken(<redacted>)"),
            Self::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl Credentials {
    /// Pick a credential form; a static token wins over email/password.
    ///
    /// Blank values count as absent.
    pub fn from_parts(
        token: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        if let Some(token) = non_blank(token) {
            return Ok(Self::StaticToken(token.to_string()));
        }
        match (non_blank(email), non_blank(password)) {
            (Some(email), Some(password)) => Ok(Self::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ProvisionError::Authentication(format!(
                "no credentials provided; set {ENV_ADMIN_TOKEN} or {ENV_ADMIN_EMAIL} and {ENV_ADMIN_PASSWORD}"
            ))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub base_url: String,
    pub credentials: Credentials,
    /// Pause between collection creation and field creation.
    pub settle_delay: Duration,
}

impl ProvisionConfig {
    pub fn new(base_url: &str, credentials: Credentials, settle_delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            settle_delay,
        }
    }
}
