//! Admin password verification
//!
//! The stored admin password may be plaintext (legacy configuration) or a bcrypt
//! hash. The format is detected once when the credential is loaded.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::error::{ConfigError, ConfigResult};

/// bcrypt modular crypt format: version tag, then cost and 53 chars of salt+digest
#[allow(clippy::expect_used)] // literal pattern
static BCRYPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$2[ayb]\$.{56}$").expect("valid bcrypt pattern"));

pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Check whether a stored credential looks like a bcrypt hash
pub fn is_bcrypt(stored: &str) -> bool {
    BCRYPT_PATTERN.is_match(stored)
}

/// Constant-time string equality
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

/// Hash a password for use as the admin credential
pub fn hash_password(plain: &str, cost: u32) -> ConfigResult<String> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(ConfigError::InvalidCost(cost));
    }
    Ok(bcrypt::hash(plain, cost)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Hashed,
    Plain,
    Unset,
}

/// Classified admin credential
#[derive(Clone, PartialEq, Eq)]
pub enum AdminCredential {
    Hashed(String),
    Plain(String),
}

impl AdminCredential {
    /// Classify a stored credential. Anything that is not structurally a bcrypt
    /// hash is treated as plaintext.
    pub fn classify(stored: &str) -> Self {
        if is_bcrypt(stored) {
            AdminCredential::Hashed(stored.to_string())
        } else {
            AdminCredential::Plain(stored.to_string())
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            AdminCredential::Hashed(_) => CredentialKind::Hashed,
            AdminCredential::Plain(secret) if secret.is_empty() => CredentialKind::Unset,
            AdminCredential::Plain(_) => CredentialKind::Plain,
        }
    }

    /// The credential exactly as configured
    pub fn as_stored(&self) -> &str {
        match self {
            AdminCredential::Hashed(hash) => hash,
            AdminCredential::Plain(secret) => secret,
        }
    }

    /// Compare a candidate password with the stored credential
    ///
    /// Errors from the hash primitive count as a mismatch.
    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            AdminCredential::Hashed(hash) => match bcrypt::verify(candidate, hash) {
                Ok(matched) => {
                    if !matched {
                        tracing::debug!("Admin password mismatch (bcrypt)");
                    }
                    matched
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Stored admin password hash rejected by bcrypt");
                    false
                }
            },
            AdminCredential::Plain(secret) => constant_time_eq(candidate, secret),
        }
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminCredential::Hashed(_) => f.write_str("AdminCredential::Hashed([REDACTED])"),
            AdminCredential::Plain(_) => f.write_str("AdminCredential::Plain([REDACTED])"),
        }
    }
}
