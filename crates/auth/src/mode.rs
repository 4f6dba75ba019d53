//! Authentication mode resolution

use serde::Serialize;

pub const AUTH_MODE_PUBLIC: &str = "public";
pub const AUTH_MODE_PASSWORD: &str = "password";

/// Effective authentication mode
///
/// A configured override other than `public` or `password` is kept verbatim as
/// `Custom`; it only matters that it is not `public`, so it requires authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum AuthMode {
    Public,
    Password,
    Custom(String),
}

impl AuthMode {
    /// Parse a raw override value (trimmed, lower-cased). Empty means no override.
    pub fn from_override(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "" => None,
            AUTH_MODE_PUBLIC => Some(AuthMode::Public),
            AUTH_MODE_PASSWORD => Some(AuthMode::Password),
            _ => Some(AuthMode::Custom(normalized)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthMode::Public => AUTH_MODE_PUBLIC,
            AuthMode::Password => AUTH_MODE_PASSWORD,
            AuthMode::Custom(mode) => mode,
        }
    }

    pub fn requires_auth(&self) -> bool {
        *self != AuthMode::Public
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AuthMode> for String {
    fn from(mode: AuthMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Resolve the effective mode from the public flag and the raw override string
///
/// Callers fold demo mode into `public` before calling.
pub fn resolve_mode(public: bool, raw_override: &str) -> AuthMode {
    if public {
        return AuthMode::Public;
    }

    AuthMode::from_override(raw_override).unwrap_or(AuthMode::Password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_flag_wins_over_override() {
        assert_eq!(resolve_mode(true, "password"), AuthMode::Public);
        assert_eq!(resolve_mode(true, "custom"), AuthMode::Public);
    }

    #[test]
    fn test_empty_override_defaults_to_password() {
        assert_eq!(resolve_mode(false, ""), AuthMode::Password);
        assert_eq!(resolve_mode(false, "   \t"), AuthMode::Password);
    }

    #[test]
    fn test_override_is_normalized() {
        assert_eq!(resolve_mode(false, "  PUBLIC "), AuthMode::Public);
        assert_eq!(resolve_mode(false, "Password"), AuthMode::Password);
        assert_eq!(
            resolve_mode(false, " LDAP "),
            AuthMode::Custom("ldap".to_string())
        );
    }

    #[test]
    fn test_custom_mode_requires_auth() {
        let mode = AuthMode::from_override("sso").unwrap();
        assert_eq!(mode.as_str(), "sso");
        assert!(mode.requires_auth());
        assert!(AuthMode::Password.requires_auth());
        assert!(!AuthMode::Public.requires_auth());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(AuthMode::Public.to_string(), "public");
        assert_eq!(AuthMode::Password.to_string(), "password");
        assert_eq!(AuthMode::Custom("x".into()).to_string(), "x");
    }
}
