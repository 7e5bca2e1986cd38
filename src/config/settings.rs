use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Root of the deployed project; holds `ssh_wrapper.sh`. Unset means
    /// git keeps its own ssh and `PROJECT_ROOT` is not exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Deploy key handed to the ssh wrapper through the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_key: Option<String>,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    pub program: String,
    pub remote: String,
    pub official_branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            program: "git".to_string(),
            remote: "origin".to_string(),
            official_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AuditConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl SyncConfig {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("branchsync"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: SyncConfig = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        SyncConfig {
            project_root: None,
            deploy_key: None,
            git: GitConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.program must not be empty".to_string(),
            ));
        }

        if self.git.remote.is_empty() || self.git.remote.contains('/') {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid remote name: '{}'",
                self.git.remote
            )));
        }

        let branch = &self.git.official_branch;
        if branch.is_empty()
            || branch.starts_with('-')
            || branch.contains("..")
            || branch.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid official branch name: '{}'",
                branch
            )));
        }

        Ok(())
    }
}
