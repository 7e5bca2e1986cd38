use crate::error::{GitError, GitResult};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// `branch --show-current` needs 2.22; test fixtures use `init --initial-branch` (2.28)
const MIN_GIT_VERSION: GitVersion = GitVersion {
    major: 2,
    minor: 28,
    patch: 0,
};

/// Version reported by `git --version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Ask `program` for its version
    pub fn detect(program: &str) -> GitResult<Self> {
        let output = Command::new(program).arg("--version").output().map_err(|e| {
            GitError::GitVersionDetectionFailed(format!("Failed to execute {}: {}", program, e))
        })?;

        if !output.status.success() {
            return Err(GitError::GitVersionDetectionFailed(format!(
                "{} --version exited with {}",
                program, output.status
            )));
        }

        String::from_utf8_lossy(&output.stdout).parse()
    }

    pub fn is_supported(&self) -> bool {
        *self >= MIN_GIT_VERSION
    }

    /// Detect and reject versions older than the supported minimum
    pub fn validate(program: &str) -> GitResult<Self> {
        let version = Self::detect(program)?;

        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(format!(
                "{} (minimum supported: {})",
                version, MIN_GIT_VERSION
            )));
        }

        Ok(version)
    }
}

impl FromStr for GitVersion {
    type Err = GitError;

    /// Accepts "git version 2.39.2", "git version 2.39.2.windows.1",
    /// "git version 2.39.5 (Apple Git-154)"
    fn from_str(s: &str) -> GitResult<Self> {
        let number = match s.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["git", "version", number, ..] => *number,
            _ => {
                return Err(GitError::ParseError(format!(
                    "Unexpected git version format: {}",
                    s.trim()
                )));
            }
        };

        let mut parts = number.split('.');
        let mut component = |what: &str| -> GitResult<u32> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| GitError::ParseError(format!("Invalid {} version in {}", what, number)))
        };

        let major = component("major")?;
        let minor = component("minor")?;
        // Patch may carry a vendor suffix or be missing entirely
        let patch = component("patch").unwrap_or(0);

        Ok(GitVersion { major, minor, patch })
    }
}

impl fmt::Display for GitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
