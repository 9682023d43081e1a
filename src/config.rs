use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::{BranchPolicy, ReleaseIncrement};
use crate::error::{ChangeRevisionError, Result};
use crate::locator::MatchStrategy;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "changerevision.toml";

/// Represents the complete configuration for change-revision.
///
/// Contains the version control client settings and the version bump policy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Which implementation of [`crate::git::Repository`] to use.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run the located git client as a subprocess
    #[default]
    Cli,
    /// Read the repository in-process through libgit2
    Libgit2,
}

impl std::str::FromStr for Backend {
    type Err = ChangeRevisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cli" => Ok(Backend::Cli),
            "libgit2" | "git2" => Ok(Backend::Libgit2),
            other => Err(ChangeRevisionError::config(format!(
                "Unknown backend '{}' (expected 'cli' or 'libgit2')",
                other
            ))),
        }
    }
}

fn default_binary_name() -> String {
    "git".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_primary_branch() -> String {
    "master".to_string()
}

/// Settings for locating and talking to the version control client.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Case-insensitive substring a search-path entry must contain
    #[serde(default)]
    pub path_filter: String,

    /// Executable name without the platform suffix
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    #[serde(default)]
    pub path_match: MatchStrategy,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_primary_branch")]
    pub primary_branch: String,
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Binary file name with the platform executable suffix (`git.exe` on Windows).
    pub fn executable_name(&self) -> String {
        let suffix = std::env::consts::EXE_SUFFIX;
        if suffix.is_empty() || self.binary_name.ends_with(suffix) {
            self.binary_name.clone()
        } else {
            format!("{}{}", self.binary_name, suffix)
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            backend: Backend::default(),
            path_filter: String::new(),
            binary_name: default_binary_name(),
            path_match: MatchStrategy::default(),
            timeout_secs: default_timeout_secs(),
            primary_branch: default_primary_branch(),
        }
    }
}

fn default_release_configuration() -> String {
    "Release".to_string()
}

fn default_prerelease_tag() -> String {
    "pre".to_string()
}

/// Version bump policy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Build configuration name that triggers the release increment (case-sensitive)
    #[serde(default = "default_release_configuration")]
    pub release_configuration: String,

    #[serde(default)]
    pub release_increment: ReleaseIncrement,

    #[serde(default)]
    pub require_primary_branch: bool,

    /// Pre-release identifier appended to package versions of non-release builds
    #[serde(default = "default_prerelease_tag")]
    pub prerelease_tag: String,
}

impl PolicyConfig {
    pub fn branch_policy(&self) -> BranchPolicy {
        if self.require_primary_branch {
            BranchPolicy::Enforce
        } else {
            BranchPolicy::Ignore
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            release_configuration: default_release_configuration(),
            release_increment: ReleaseIncrement::default(),
            require_primary_branch: false,
            prerelease_tag: default_prerelease_tag(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changerevision.toml` in the given working directory
/// 3. `.changerevision.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, working_dir: &Path) -> Result<Config> {
    let local = working_dir.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parses configuration from TOML text.
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| ChangeRevisionError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.git.backend, Backend::Cli);
        assert_eq!(config.git.primary_branch, "master");
        assert_eq!(config.git.timeout(), Duration::from_secs(10));
        assert_eq!(config.policy.release_configuration, "Release");
        assert_eq!(config.policy.release_increment, ReleaseIncrement::Minor);
        assert_eq!(config.policy.branch_policy(), BranchPolicy::Ignore);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
[git]
backend = "libgit2"
path_match = "last"

[policy]
release_increment = "build"
require_primary_branch = true
"#,
        )
        .unwrap();

        assert_eq!(config.git.backend, Backend::Libgit2);
        assert_eq!(config.git.path_match, MatchStrategy::Last);
        assert_eq!(config.git.binary_name, "git");
        assert_eq!(config.policy.release_increment, ReleaseIncrement::Build);
        assert_eq!(config.policy.branch_policy(), BranchPolicy::Enforce);
        assert_eq!(config.policy.prerelease_tag, "pre");
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let err = parse_config("[policy]\nrelease_increment = \"patch\"\n").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("CLI".parse::<Backend>().unwrap(), Backend::Cli);
        assert_eq!("git2".parse::<Backend>().unwrap(), Backend::Libgit2);
        assert!("svn".parse::<Backend>().is_err());
    }

    #[test]
    fn test_executable_name_suffix() {
        let git = GitConfig::default();
        let name = git.executable_name();
        assert!(name.starts_with("git"));
        assert!(name.ends_with(std::env::consts::EXE_SUFFIX));
    }
}
