use std::ffi::OsString;

use tracing::info;

use crate::config::SyncConfig;
use crate::error::{GitError, GitResult};
use crate::git::repository::Repository;

/// Commits generated files and publishes the current branch
#[derive(Debug, Clone)]
pub struct Publisher<'a> {
    repo: &'a Repository,
    remote: String,
}

impl<'a> Publisher<'a> {
    pub fn new(repo: &'a Repository, config: &SyncConfig) -> Self {
        Self {
            repo,
            remote: config.git.remote.clone(),
        }
    }

    /// Commit all changes to the current branch, adding untracked files
    /// only when their path starts with `path_prefix`, and optionally
    /// push upstream.
    ///
    /// Fails with `CommandFailed` when there is nothing to commit.
    pub fn commit_and_push(&self, message: &str, path_prefix: &str, push: bool) -> GitResult<()> {
        let to_add: Vec<OsString> = self
            .repo
            .untracked_files()?
            .into_iter()
            .filter(|path| path.as_encoded_bytes().starts_with(path_prefix.as_bytes()))
            .collect();

        if !to_add.is_empty() {
            // Literal pathspecs: generated file names may contain glob characters
            self.repo.run_with_paths(
                &["--literal-pathspecs", "add", "--force", "--"],
                &to_add,
            )?;
        }

        self.repo.run(&["commit", "--quiet", "-am", message])?;
        self.repo.run(&["status", "--untracked-files", "--short"])?;
        info!(added = to_add.len(), path_prefix, "changes committed");

        if push {
            self.push_current_branch()?;
        }

        Ok(())
    }

    /// Push the checked-out branch, setting its upstream
    pub fn push_current_branch(&self) -> GitResult<()> {
        let branch = self.repo.current_branch()?.ok_or(GitError::DetachedHead)?;

        self.repo.run(&["push", "-u", &self.remote, &branch])?;
        info!(%branch, remote = %self.remote, "branch pushed");

        Ok(())
    }
}
