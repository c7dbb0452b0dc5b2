//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitvane has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITVANE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitvane/config.toml`
//! 3. `~/.gitvane/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/gitvane/config.toml`, where `git_dir` is the repository's
//! `.git` directory (or the repository itself when bare).
//!
//! # Example
//!
//! ```no_run
//! use gitvane::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//!
//! if let Some(identity) = config.identity() {
//!     println!("Committing as {} <{}>", identity.name, identity.email);
//! }
//! println!("JSON output: {}", config.json_output());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, IdentityConfig, OutputConfig, RepoConfig, ServiceConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::git::Identity;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "GITVANE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads the repository's config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let global_path = global_candidates(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        )
        .into_iter()
        .find(|path| path.exists());

        Self::load_from(global_path.as_deref(), git_dir)
    }

    /// Load from an explicit global file (if any) and repository.
    pub fn load_from(global_file: Option<&Path>, git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let (global, global_path) = match global_file {
            Some(path) if path.exists() => (read_config::<GlobalConfig>(path)?, Some(path.to_path_buf())),
            _ => (GlobalConfig::default(), None),
        };

        let (repo, repo_path) = match git_dir.map(Self::repo_config_path) {
            Some(path) if path.exists() => (Some(read_config::<RepoConfig>(&path)?), Some(path)),
            _ => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Get the path for repo config inside `git_dir`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("gitvane/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// The fallback commit identity.
    ///
    /// Each field is taken from the repo config when set there, otherwise
    /// from the global config. Returns `None` unless both end up set.
    pub fn identity(&self) -> Option<Identity> {
        let repo = self.repo.as_ref().and_then(|r| r.identity.as_ref());
        let global = self.global.identity.as_ref();

        let name = repo
            .and_then(|i| i.name.clone())
            .or_else(|| global.and_then(|i| i.name.clone()))?;
        let email = repo
            .and_then(|i| i.email.clone())
            .or_else(|| global.and_then(|i| i.email.clone()))?;

        Some(Identity { name, email })
    }

    /// Whether results should be printed as JSON.
    ///
    /// Defaults to `false` if not configured.
    pub fn json_output(&self) -> bool {
        self.global
            .output
            .as_ref()
            .and_then(|o| o.json)
            .unwrap_or(false)
    }

    /// Whether the repository service creates a missing repository.
    ///
    /// Defaults to `false` if not configured.
    pub fn init_if_missing(&self) -> bool {
        self.global
            .service
            .as_ref()
            .and_then(|s| s.init_if_missing)
            .unwrap_or(false)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

/// Global config locations in search order.
fn global_candidates(
    explicit: Option<PathBuf>,
    xdg_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    candidates.extend(explicit);
    candidates.extend(xdg_home.map(|dir| dir.join("gitvane/config.toml")));
    candidates.extend(home.map(|dir| dir.join(".gitvane/config.toml")));
    candidates
}

fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, Some(temp.path())).unwrap();

        assert!(config.identity().is_none());
        assert!(!config.json_output());
        assert!(!config.init_if_missing());
        assert!(config.global_config_loaded_from().is_none());
        assert!(config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn candidate_order() {
        let candidates = global_candidates(
            Some(PathBuf::from("/explicit.toml")),
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/me")),
        );
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/explicit.toml"),
                PathBuf::from("/xdg/gitvane/config.toml"),
                PathBuf::from("/home/me/.gitvane/config.toml"),
            ]
        );
        assert!(global_candidates(None, None, None).is_empty());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        write(
            &global,
            r#"
            [output]
            json = true

            [service]
            init_if_missing = true
            "#,
        );

        let config = Config::load_from(Some(&global), None).unwrap();
        assert!(config.json_output());
        assert!(config.init_if_missing());
        assert_eq!(config.global_config_loaded_from(), Some(global.as_path()));
    }

    #[test]
    fn repo_identity_overrides_global_per_field() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let git_dir = temp.path().join(".git");
        write(
            &global,
            r#"
            [identity]
            name = "Global Name"
            email = "global@example.com"
            "#,
        );
        write(
            &Config::repo_config_path(&git_dir),
            r#"
            [identity]
            email = "repo@example.com"
            "#,
        );

        let config = Config::load_from(Some(&global), Some(&git_dir)).unwrap();
        let identity = config.identity().unwrap();
        assert_eq!(identity.name, "Global Name");
        assert_eq!(identity.email, "repo@example.com");
    }

    #[test]
    fn identity_needs_both_fields() {
        let config = Config {
            repo: Some(RepoConfig {
                identity: Some(IdentityConfig {
                    name: Some("Only Name".to_string()),
                    email: None,
                }),
            }),
            ..Default::default()
        };
        assert!(config.identity().is_none());
    }

    #[test]
    fn repo_config_is_found_under_git_dir() {
        let temp = TempDir::new().unwrap();
        let git_dir = temp.path().join(".git");
        let path = Config::repo_config_path(&git_dir);
        write(
            &path,
            r#"
            [identity]
            name = "Repo"
            email = "repo@example.com"
            "#,
        );

        let loaded = Config::load_from(None, Some(&git_dir)).unwrap();
        assert_eq!(loaded.identity().unwrap().name, "Repo");
        assert_eq!(loaded.repo_config_loaded_from(), Some(path.as_path()));
        assert!(path.ends_with("gitvane/config.toml"));
    }

    #[test]
    fn invalid_email_rejected() {
        let temp = TempDir::new().unwrap();
        write(
            &Config::repo_config_path(temp.path()),
            "[identity]\nemail = \"nobody\"\n",
        );

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        write(
            &Config::repo_config_path(temp.path()),
            r#"
            trunk = "main"
            "#,
        );

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
