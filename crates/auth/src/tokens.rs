//! Capability tokens for downloads and preview images

use std::sync::OnceLock;

use rand::Rng;

/// Length of an issued download token
pub const DOWNLOAD_TOKEN_LENGTH: usize = 8;

/// Preview token served while the instance is public
pub const PREVIEW_TOKEN_PUBLIC: &str = "public";

/// Preview token served while no device serial is available; never stored
pub const PREVIEW_TOKEN_PLACEHOLDER: &str = "********";

/// Token alphabet: lowercase ASCII letters and digits
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Source of random opaque tokens
pub trait TokenGenerator: Send + Sync {
    /// Generate a token of `len` characters
    fn generate(&self, len: usize) -> String;
}

/// Token generator backed by the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
            .collect()
    }
}

/// A token that is issued at most once, unless it was configured statically
#[derive(Debug, Default)]
pub(crate) struct IssuedToken {
    cell: OnceLock<String>,
    configured: Option<String>,
}

impl IssuedToken {
    pub(crate) fn new(configured: &str) -> Self {
        let configured = Some(configured)
            .filter(|token| !token.is_empty())
            .map(String::from);
        let cell = OnceLock::new();
        if let Some(token) = &configured {
            let _ = cell.set(token.clone());
        }
        Self { cell, configured }
    }

    pub(crate) fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Return the stored token, running `issue` if none is stored yet.
    /// Concurrent callers all observe the value of the single winning `issue`.
    pub(crate) fn get_or_issue(&self, issue: impl FnOnce() -> String) -> &str {
        self.cell.get_or_init(issue)
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    /// Forget an issued token; a configured token is restored
    pub(crate) fn reset(&mut self) {
        self.cell = OnceLock::new();
        if let Some(token) = &self.configured {
            let _ = self.cell.set(token.clone());
        }
    }
}
