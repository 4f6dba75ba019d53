//! Access control for a single shared admin credential and two scoped tokens
//!
//! `AccessControl` decides whether authentication is required at all, checks the
//! admin password, and issues the download and preview tokens on first use.
//! It is shared across request handlers; every check answers with a plain value
//! and failures resolve to denial.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{AuthOptions, RuntimeFlags};
use crate::error::ConfigResult;
use crate::identity::{DeviceIdentity, NoIdentity, SharedSerial};
use crate::mode::{resolve_mode, AuthMode};
use crate::password::{constant_time_eq, AdminCredential, CredentialKind};
use crate::tokens::{
    IssuedToken, RandomTokenGenerator, TokenGenerator, DOWNLOAD_TOKEN_LENGTH,
    PREVIEW_TOKEN_PLACEHOLDER, PREVIEW_TOKEN_PUBLIC,
};

/// Snapshot of the access configuration, safe to log or return from status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AccessStatus {
    pub mode: AuthMode,
    pub requires_auth: bool,
    pub demo: bool,
    pub debug: bool,
    pub credential: CredentialKind,
    pub download_token_issued: bool,
    pub download_token_static: bool,
    pub preview_token_issued: bool,
    pub preview_token_static: bool,
}

pub struct AccessControl {
    public: AtomicBool,
    auth_mode: String,
    credential: AdminCredential,
    download_token: IssuedToken,
    preview_token: IssuedToken,
    flags: RuntimeFlags,
    identity: Arc<dyn DeviceIdentity>,
    generator: Arc<dyn TokenGenerator>,
}

pub struct AccessControlBuilder {
    options: AuthOptions,
    flags: RuntimeFlags,
    identity: Arc<dyn DeviceIdentity>,
    generator: Arc<dyn TokenGenerator>,
}

impl AccessControlBuilder {
    pub fn flags(mut self, flags: RuntimeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn identity(mut self, identity: Arc<dyn DeviceIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn token_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn build(self) -> AccessControl {
        let credential = AdminCredential::classify(&self.options.admin_password);

        tracing::debug!(
            public = self.options.public,
            demo = self.flags.demo,
            debug = self.flags.debug,
            credential = ?credential.kind(),
            "Access control configured"
        );

        AccessControl {
            public: AtomicBool::new(self.options.public),
            auth_mode: self.options.auth_mode,
            credential,
            download_token: IssuedToken::new(&self.options.download_token),
            preview_token: IssuedToken::new(&self.options.preview_token),
            flags: self.flags,
            identity: self.identity,
            generator: self.generator,
        }
    }
}

impl AccessControl {
    pub fn builder(options: AuthOptions) -> AccessControlBuilder {
        AccessControlBuilder {
            options,
            flags: RuntimeFlags::default(),
            identity: Arc::new(NoIdentity),
            generator: Arc::new(RandomTokenGenerator),
        }
    }

    /// Build from `SHUTTER_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self::builder(AuthOptions::from_env()?)
            .flags(RuntimeFlags::from_env()?)
            .identity(Arc::new(SharedSerial::from_env()))
            .build())
    }

    pub fn flags(&self) -> RuntimeFlags {
        self.flags
    }

    /// True if the instance runs without authentication (demo mode always does)
    pub fn is_public(&self) -> bool {
        self.flags.demo || self.public.load(Ordering::SeqCst)
    }

    /// Change public mode at runtime
    ///
    /// Only honoured when the instance was built in debug mode.
    pub fn set_public(&self, enabled: bool) {
        if !self.flags.debug {
            tracing::warn!(
                requested = enabled,
                "Ignoring runtime public mode change outside debug mode"
            );
            return;
        }

        let previous = self.public.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(public = enabled, "Public mode changed at runtime");
        }
    }

    pub fn effective_mode(&self) -> AuthMode {
        resolve_mode(self.is_public(), &self.auth_mode)
    }

    /// Check if authentication is required
    pub fn requires_auth(&self) -> bool {
        self.effective_mode().requires_auth()
    }

    pub fn admin_credential(&self) -> &AdminCredential {
        &self.credential
    }

    /// Compare a candidate with the admin password
    pub fn check_password(&self, candidate: &str) -> bool {
        self.credential.verify(candidate)
    }

    /// The download token, issued on first access
    pub fn download_token(&self) -> String {
        self.download_token
            .get_or_issue(|| {
                tracing::debug!("Issued download token");
                self.issue_random()
            })
            .to_string()
    }

    /// Draw a random token, falling back to the built-in generator on empty output
    fn issue_random(&self) -> String {
        let token = self.generator.generate(DOWNLOAD_TOKEN_LENGTH);
        if !token.is_empty() {
            return token;
        }

        tracing::warn!("Token generator returned an empty token, using fallback");
        RandomTokenGenerator.generate(DOWNLOAD_TOKEN_LENGTH)
    }

    pub fn is_invalid_download_token(&self, candidate: &str) -> bool {
        candidate.is_empty() || !constant_time_eq(candidate, &self.download_token())
    }

    /// The preview image token
    ///
    /// Public instances use a fixed sentinel. Otherwise the token is derived from
    /// the device serial checksum; until a serial exists a placeholder is returned
    /// and nothing is stored. Once stored, the token no longer changes.
    pub fn preview_token(&self) -> String {
        if let Some(token) = self.preview_token.get() {
            return token.to_string();
        }

        if self.is_public() {
            return self
                .preview_token
                .get_or_issue(|| PREVIEW_TOKEN_PUBLIC.to_string())
                .to_string();
        }

        if self.identity.serial().filter(|serial| !serial.is_empty()).is_none() {
            return PREVIEW_TOKEN_PLACEHOLDER.to_string();
        }

        self.preview_token
            .get_or_issue(|| match self.identity.serial_checksum() {
                Some(checksum) if !checksum.is_empty() => {
                    tracing::debug!("Derived preview token from device serial");
                    checksum
                }
                _ => {
                    tracing::warn!("Device serial has no checksum, issuing random preview token");
                    self.issue_random()
                }
            })
            .to_string()
    }

    /// A preview request is valid with either the current preview token or the
    /// download token.
    pub fn is_invalid_preview_token(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return true;
        }

        !constant_time_eq(candidate, &self.preview_token())
            && !constant_time_eq(candidate, &self.download_token())
    }

    /// Forget lazily issued tokens; statically configured tokens are kept
    pub fn reset_tokens(&mut self) {
        self.download_token.reset();
        self.preview_token.reset();
        tracing::info!("Download and preview tokens reset");
    }

    pub fn status(&self) -> AccessStatus {
        let mode = self.effective_mode();
        AccessStatus {
            requires_auth: mode.requires_auth(),
            mode,
            demo: self.flags.demo,
            debug: self.flags.debug,
            credential: self.credential.kind(),
            download_token_issued: self.download_token.get().is_some(),
            download_token_static: self.download_token.is_configured(),
            preview_token_issued: self.preview_token.get().is_some(),
            preview_token_static: self.preview_token.is_configured(),
        }
    }
}

impl std::fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControl")
            .field("public", &self.is_public())
            .field("auth_mode", &self.auth_mode)
            .field("credential", &self.credential)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_options(password: &str) -> AuthOptions {
        AuthOptions {
            admin_password: password.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_access_control_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessControl>();
    }

    #[test]
    fn test_default_requires_password() {
        let access = AccessControl::builder(AuthOptions::default()).build();
        assert_eq!(access.effective_mode(), AuthMode::Password);
        assert!(access.requires_auth());
        assert!(!access.is_public());
    }

    #[test]
    fn test_demo_forces_public() {
        let options = AuthOptions {
            public: false,
            auth_mode: "password".to_string(),
            ..Default::default()
        };
        let access = AccessControl::builder(options)
            .flags(RuntimeFlags {
                demo: true,
                debug: false,
            })
            .build();
        assert_eq!(access.effective_mode(), AuthMode::Public);
        assert!(!access.requires_auth());
    }

    #[test]
    fn test_check_password_plain() {
        let access = AccessControl::builder(password_options("secret")).build();
        assert!(access.check_password("secret"));
        assert!(!access.check_password("Secret"));
    }

    #[test]
    fn test_download_token_memoized() {
        let access = AccessControl::builder(AuthOptions::default()).build();
        let first = access.download_token();
        assert_eq!(first.len(), DOWNLOAD_TOKEN_LENGTH);
        assert_eq!(access.download_token(), first);
        assert!(!access.is_invalid_download_token(&first));
        assert!(access.is_invalid_download_token("nope"));
        assert!(access.is_invalid_download_token(""));
    }

    #[test]
    fn test_reset_tokens_issues_new_download_token() {
        let mut access = AccessControl::builder(AuthOptions::default()).build();
        let first = access.download_token();
        access.reset_tokens();
        assert!(!access.status().download_token_issued);
        let second = access.download_token();
        assert_eq!(second.len(), DOWNLOAD_TOKEN_LENGTH);
        assert!(!access.is_invalid_download_token(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_status_has_no_secrets() {
        let access = AccessControl::builder(password_options("hunter2")).build();
        let token = access.download_token();
        let status = serde_json::to_string(&access.status()).unwrap();
        assert!(!status.contains("hunter2"));
        assert!(!status.contains(&token));
        assert!(status.contains(r#""mode":"password""#));
        assert!(status.contains(r#""credential":"plain""#));
        assert!(status.contains(r#""download_token_issued":true"#));
    }

    #[test]
    fn test_debug_does_not_leak() {
        let access = AccessControl::builder(password_options("hunter2")).build();
        assert!(!format!("{access:?}").contains("hunter2"));
    }
}
