//! Access configuration
//!
//! Raw option values as populated by the configuration layer, plus the two
//! externally derived runtime flags (demo and debug mode).

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

pub const ENV_PUBLIC: &str = "SHUTTER_PUBLIC";
pub const ENV_AUTH_MODE: &str = "SHUTTER_AUTH_MODE";
pub const ENV_ADMIN_PASSWORD: &str = "SHUTTER_ADMIN_PASSWORD";
pub const ENV_DOWNLOAD_TOKEN: &str = "SHUTTER_DOWNLOAD_TOKEN";
pub const ENV_PREVIEW_TOKEN: &str = "SHUTTER_PREVIEW_TOKEN";
pub const ENV_DEMO: &str = "SHUTTER_DEMO";
pub const ENV_DEBUG: &str = "SHUTTER_DEBUG";

/// Raw authentication options
///
/// `auth_mode` is kept exactly as configured; it is normalized when read.
/// A non-empty `download_token` or `preview_token` is a static token that is
/// served verbatim instead of being issued on first access.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    pub public: bool,
    pub auth_mode: String,
    pub admin_password: String,
    pub download_token: String,
    pub preview_token: String,
}

impl std::fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOptions")
            .field("public", &self.public)
            .field("auth_mode", &self.auth_mode)
            .field("admin_password", &"[REDACTED]")
            .field("download_token", &redact(&self.download_token))
            .field("preview_token", &redact(&self.preview_token))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "[REDACTED]"
    }
}

impl AuthOptions {
    /// Load options from `SHUTTER_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            public: env_bool(ENV_PUBLIC)?,
            auth_mode: env_string(ENV_AUTH_MODE),
            admin_password: env_string(ENV_ADMIN_PASSWORD),
            download_token: env_string(ENV_DOWNLOAD_TOKEN),
            preview_token: env_string(ENV_PREVIEW_TOKEN),
        })
    }
}

/// Externally derived mode flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeFlags {
    /// Demo instances are always public.
    pub demo: bool,
    /// Debug instances may toggle public mode at runtime (tests only).
    pub debug: bool,
}

impl RuntimeFlags {
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            demo: env_bool(ENV_DEMO)?,
            debug: env_bool(ENV_DEBUG)?,
        })
    }
}

fn env_string(var: &str) -> String {
    std::env::var(var).unwrap_or_default()
}

fn env_bool(var: &str) -> ConfigResult<bool> {
    match std::env::var(var) {
        Ok(value) => parse_bool(var, &value),
        Err(_) => Ok(false),
    }
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
