use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    /// The git process ran and exited non-zero. `output` is the merged
    /// stdout/stderr it produced.
    #[error("Command 'git {command}' failed with exit code {exit_code}: {}", .output.trim())]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    /// Fetch failed with a transport-level protocol error, which almost
    /// always means the deploy key or remote access is broken.
    #[error("Fetching '{remote}' failed: {message}. Check git remote access/authentication.")]
    FetchAuth { remote: String, message: String },

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Branch '{name}' not found in {location}")]
    BranchNotFound { location: String, name: String },

    #[error("Invalid branch name: '{0}'")]
    InvalidBranchName(String),

    #[error("Refusing to delete the official branch '{0}'")]
    ProtectedBranch(String),

    #[error("HEAD is detached; no current branch to push")]
    DetachedHead,

    #[error("Git version {0} is too old")]
    GitVersionTooOld(String),

    #[error("Failed to detect git version: {0}")]
    GitVersionDetectionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitError {
    /// Combined output captured from a failed command, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            GitError::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Top-level application error used by the binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
