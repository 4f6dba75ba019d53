// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Shutter Access Core
//!
//! Decides whether an instance requires authentication and gates requests with
//! a single shared admin credential plus two scoped capability tokens.
//!
//! ## Components
//!
//! - **Mode resolution**: `public` vs `password`, with demo mode forcing public access
//! - **Password verification**: bcrypt hashes and legacy plaintext credentials
//! - **Download tokens**: random, issued on first access, stable for the process lifetime
//! - **Preview tokens**: public sentinel or derived from the device serial checksum

pub mod access;
pub mod config;
pub mod error;
pub mod identity;
pub mod mode;
pub mod password;
pub mod tokens;


pub use access::{AccessControl, AccessControlBuilder, AccessStatus};
pub use config::{AuthOptions, RuntimeFlags};
pub use error::{ConfigError, ConfigResult};
pub use identity::{serial_checksum, DeviceIdentity, NoIdentity, SharedSerial};
pub use mode::{resolve_mode, AuthMode, AUTH_MODE_PASSWORD, AUTH_MODE_PUBLIC};
pub use password::{
    hash_password, is_bcrypt, AdminCredential, CredentialKind, DEFAULT_BCRYPT_COST,
};
pub use tokens::{
    RandomTokenGenerator, TokenGenerator, DOWNLOAD_TOKEN_LENGTH, PREVIEW_TOKEN_PLACEHOLDER,
    PREVIEW_TOKEN_PUBLIC,
};
