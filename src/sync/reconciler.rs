//! Bring a named branch into a known state before automated commits.

use std::process;

use tracing::{error, info};

use crate::config::SyncConfig;
use crate::error::{GitError, GitResult};
use crate::git::branch::{
    Branch, BranchSource, LocalBranch, LocalBranchSource, RemoteBranchSource, remote_refname,
};
use crate::git::repository::{Remote, Repository};

/// Substring git prints when the transport itself fails, typically a
/// rejected deploy key on an ssh remote.
const PROTOCOL_ERROR: &str = "protocol error";

/// What to do when fetching fails with a protocol error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchAuthPolicy {
    /// Print a diagnostic to stderr and exit the process with status 1
    #[default]
    Exit,
    /// Return [`GitError::FetchAuth`] to the caller
    Propagate,
}

/// Which branch of the decision table a reconciliation took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// No local branch; created from the remote branch of the same name and tracking it
    CreatedFromRemote { upstream: String },
    /// No branch anywhere; created from the official branch, untracked
    CreatedFromOfficial { base: String },
    /// Existing tracked branch, hard-reset to its upstream tip
    ResetToUpstream { upstream: String },
    /// Existing untracked branch, checked out as-is
    CheckedOut,
}

#[derive(Debug, Clone)]
pub struct BranchReconciler<'a> {
    repo: &'a Repository,
    remote: String,
    official_branch: String,
    fetch_auth_policy: FetchAuthPolicy,
}

impl<'a> BranchReconciler<'a> {
    pub fn new(repo: &'a Repository, config: &SyncConfig) -> Self {
        Self {
            repo,
            remote: config.git.remote.clone(),
            official_branch: config.git.official_branch.clone(),
            fetch_auth_policy: FetchAuthPolicy::default(),
        }
    }

    pub fn with_fetch_auth_policy(mut self, policy: FetchAuthPolicy) -> Self {
        self.fetch_auth_policy = policy;
        self
    }

    /// Ensure a local branch named `branch_name` exists, is checked out,
    /// and matches its upstream if it has one.
    ///
    /// THIS DISCARDS ANY UNCOMMITTED CHANGES to tracked files.
    ///
    /// An existing local branch always wins over the remote lookup, so
    /// repeated calls for the same name converge on the same state.
    pub fn setup_local_branch(&self, branch_name: &str) -> GitResult<Reconciliation> {
        validate_branch_name(branch_name)?;

        let remote = self.repo.remote(&self.remote);
        self.fetch(&remote)?;

        // Clean baseline in case the working tree is dirty
        self.repo.run(&["reset", "--hard", "HEAD"])?;

        if let Some(Branch::Local(branch)) = LocalBranchSource::new(self.repo).lookup(branch_name)? {
            return self.checkout_existing(&branch);
        }

        let remote_branches = RemoteBranchSource::new(&remote);
        let outcome = match remote_branches.lookup(branch_name)? {
            Some(upstream) => {
                let upstream_ref = upstream.refname();
                self.repo.run(&["branch", "--track", branch_name, &upstream_ref])?;

                let created = self.local_branch(branch_name)?;
                if created.tracking_branch().is_none() {
                    let set_upstream = format!("--set-upstream-to={}", upstream_ref);
                    self.repo.run(&["branch", &set_upstream, branch_name])?;
                }

                Reconciliation::CreatedFromRemote {
                    upstream: upstream.revision(),
                }
            }
            None => {
                // Branch from the official branch upstream, but don't track it
                let base = remote_branches
                    .lookup(&self.official_branch)?
                    .ok_or_else(|| GitError::BranchNotFound {
                        location: remote_branches.location(),
                        name: self.official_branch.clone(),
                    })?;
                self.repo.run(&["branch", "--no-track", branch_name, &base.refname()])?;

                Reconciliation::CreatedFromOfficial {
                    base: base.revision(),
                }
            }
        };

        self.force_checkout(branch_name)?;
        info!(branch = branch_name, ?outcome, "local branch created");

        Ok(outcome)
    }

    fn checkout_existing(&self, branch: &LocalBranch) -> GitResult<Reconciliation> {
        self.force_checkout(&branch.name)?;

        if branch.tracking_branch().is_none() {
            info!(branch = %branch.name, "checked out untracked branch");
            return Ok(Reconciliation::CheckedOut);
        }

        // Always the configured remote, whatever remote the tracking
        // config happens to name
        let upstream = format!("{}/{}", self.remote, branch.name);
        self.repo
            .run(&["reset", "--hard", &remote_refname(&self.remote, &branch.name)])?;
        info!(branch = %branch.name, %upstream, "reset to upstream");

        Ok(Reconciliation::ResetToUpstream { upstream })
    }

    fn fetch(&self, remote: &Remote<'_>) -> GitResult<()> {
        match remote.fetch() {
            Ok(_) => Ok(()),
            Err(GitError::CommandFailed { output, .. }) if output.contains(PROTOCOL_ERROR) => {
                let err = GitError::FetchAuth {
                    remote: remote.name().to_string(),
                    message: output.trim().to_string(),
                };

                match self.fetch_auth_policy {
                    FetchAuthPolicy::Propagate => Err(err),
                    FetchAuthPolicy::Exit => {
                        error!(remote = remote.name(), "fetch failed with a protocol error");
                        eprintln!("ERROR: {}", err);
                        process::exit(1);
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    fn force_checkout(&self, branch_name: &str) -> GitResult<()> {
        self.repo.run(&["checkout", "--force", branch_name, "--"])?;
        Ok(())
    }

    fn local_branch(&self, branch_name: &str) -> GitResult<LocalBranch> {
        let source = LocalBranchSource::new(self.repo);
        match source.lookup(branch_name)? {
            Some(Branch::Local(branch)) => Ok(branch),
            _ => Err(GitError::BranchNotFound {
                location: source.location(),
                name: branch_name.to_string(),
            }),
        }
    }

    /// Delete the local branch regardless of merge status.
    ///
    /// The official branch is checked out first, so the target is never
    /// the current branch; the official branch itself is never deleted.
    pub fn kill_branch(&self, branch_name: &str) -> GitResult<()> {
        validate_branch_name(branch_name)?;
        if branch_name == self.official_branch {
            return Err(GitError::ProtectedBranch(branch_name.to_string()));
        }

        self.repo.run(&["checkout", &self.official_branch, "--"])?;
        self.repo.run(&["branch", "-D", branch_name])?;
        info!(branch = branch_name, "local branch deleted");

        Ok(())
    }
}

/// Reject names git would read as an option
fn validate_branch_name(name: &str) -> GitResult<()> {
    if name.is_empty() || name.starts_with('-') {
        return Err(GitError::InvalidBranchName(name.to_string()));
    }
    Ok(())
}
