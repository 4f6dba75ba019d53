//! Configuration errors
//!
//! Only configuration loading and operator helpers return these. Request-path checks
//! answer with a plain `bool` and absorb every internal failure.

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid boolean for {var}: {value:?}")]
    InvalidBool { var: String, value: String },

    #[error("Invalid bcrypt cost {0} (expected 4..=31)")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<bcrypt::BcryptError> for ConfigError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ConfigError::Hash(err.to_string())
    }
}
