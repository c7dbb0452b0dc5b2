//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GITVANE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitvane/config.toml`
//! 3. `~/.gitvane/config.toml`
//!
//! # Repo Config
//!
//! Located at `<git_dir>/gitvane/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing: identity fields must be
//! non-empty and the email must look like an address.

use serde::Deserialize;

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [identity]
/// name = "Build Bot"
/// email = "bot@example.com"
///
/// [output]
/// json = true
///
/// [service]
/// init_if_missing = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Fallback commit identity
    pub identity: Option<IdentityConfig>,

    /// Output defaults
    pub output: Option<OutputConfig>,

    /// Repository service defaults
    pub service: Option<ServiceConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(identity) = &self.identity {
            identity.validate()?;
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// [identity]
/// email = "me@work.example"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Per-repository identity overrides
    pub identity: Option<IdentityConfig>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(identity) = &self.identity {
            identity.validate()?;
        }
        Ok(())
    }
}

/// Identity fields. Either may be left out and supplied by another scope.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl IdentityConfig {
    /// Validate the identity fields that are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "identity name cannot be empty".to_string(),
                ));
            }
        }

        if let Some(email) = &self.email {
            if email.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "identity email cannot be empty".to_string(),
                ));
            }
            if !email.contains('@') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid identity email '{}', expected an address",
                    email
                )));
            }
        }

        Ok(())
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Print results as JSON
    pub json: Option<bool>,
}

/// Repository service settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Create the repository when the configured directory has none
    pub init_if_missing: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.identity.is_none());
            assert!(config.output.is_none());
            assert!(config.service.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn parses_all_tables() {
            let toml = r#"
                [identity]
                name = "Build Bot"
                email = "bot@example.com"

                [output]
                json = true

                [service]
                init_if_missing = true
            "#;

            let config: GlobalConfig = toml::from_str(toml).unwrap();
            assert_eq!(
                config.identity.as_ref().and_then(|i| i.name.as_deref()),
                Some("Build Bot")
            );
            assert_eq!(config.output.and_then(|o| o.json), Some(true));
            assert_eq!(config.service.and_then(|s| s.init_if_missing), Some(true));
        }

        #[test]
        fn invalid_email() {
            let config = GlobalConfig {
                identity: Some(IdentityConfig {
                    name: Some("Bot".to_string()),
                    email: Some("not-an-address".to_string()),
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn parses_every_table() {
            let parsed: GlobalConfig = toml::from_str(
                r#"
                [identity]
                name = "Bot"
                email = "bot@example.com"

                [output]
                json = false

                [service]
                init_if_missing = true
                "#,
            )
            .unwrap();

            let expected = GlobalConfig {
                identity: Some(IdentityConfig {
                    name: Some("Bot".to_string()),
                    email: Some("bot@example.com".to_string()),
                }),
                output: Some(OutputConfig { json: Some(false) }),
                service: Some(ServiceConfig {
                    init_if_missing: Some(true),
                }),
            };
            assert_eq!(parsed, expected);
            assert!(parsed.validate().is_ok());
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = RepoConfig::default();
            assert!(config.identity.is_none());
        }

        #[test]
        fn empty_name_rejected() {
            let config = RepoConfig {
                identity: Some(IdentityConfig {
                    name: Some("  ".to_string()),
                    email: None,
                }),
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn partial_identity_is_valid() {
            let config = RepoConfig {
                identity: Some(IdentityConfig {
                    name: None,
                    email: Some("me@work.example".to_string()),
                }),
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                [identity]
                name = "Bot"
                nickname = "b"
            "#;

            let result: Result<RepoConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }

        #[test]
        fn service_table_is_global_only() {
            let toml = r#"
                [service]
                init_if_missing = true
            "#;

            let result: Result<RepoConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
