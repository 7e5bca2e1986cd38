//! Branch lookup against the local repository or one of its remotes.
//!
//! Local heads are named bare (`translations`); remote-tracking refs are
//! named `<remote>/<branch>`. Callers pick the source once and then only
//! deal in bare names.

use std::fmt;

use crate::error::GitResult;
use crate::git::parser::{self, LOCAL_REF_FORMAT, REMOTE_REF_FORMAT};
use crate::git::repository::{Remote, Repository};

/// A local head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBranch {
    pub name: String,
    pub commit: String,
    /// Short name of the tracked remote-tracking ref, e.g. `origin/main`
    pub upstream: Option<String>,
}

impl LocalBranch {
    pub fn tracking_branch(&self) -> Option<&str> {
        self.upstream.as_deref()
    }
}

/// A remote-tracking ref, named without its remote prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    pub remote: String,
    pub name: String,
    pub commit: String,
}

impl RemoteBranch {
    /// `<remote>/<name>`, for display
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.remote, self.name)
    }

    /// Fully qualified ref. Unlike `<remote>/<name>` it cannot collide
    /// with a local head or tag of the same name.
    pub fn refname(&self) -> String {
        remote_refname(&self.remote, &self.name)
    }
}

/// `refs/remotes/<remote>/<name>`
pub fn remote_refname(remote: &str, name: &str) -> String {
    format!("refs/remotes/{}/{}", remote, name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Local(LocalBranch),
    Remote(RemoteBranch),
}

impl Branch {
    /// Bare branch name
    pub fn name(&self) -> &str {
        match self {
            Branch::Local(b) => &b.name,
            Branch::Remote(b) => &b.name,
        }
    }

    /// Tip commit id
    pub fn commit(&self) -> &str {
        match self {
            Branch::Local(b) => &b.commit,
            Branch::Remote(b) => &b.commit,
        }
    }

    /// Short name as git prints it: `translations`, `origin/translations`
    pub fn revision(&self) -> String {
        match self {
            Branch::Local(b) => b.name.clone(),
            Branch::Remote(b) => b.full_name(),
        }
    }

    /// Unambiguous revision argument for git commands
    pub fn refname(&self) -> String {
        match self {
            Branch::Local(b) => format!("refs/heads/{}", b.name),
            Branch::Remote(b) => b.refname(),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.revision())
    }
}

/// Somewhere branches can be looked up by bare name.
///
/// A missing branch is `Ok(None)` / `Ok(false)`, not an error.
pub trait BranchSource {
    fn lookup(&self, name: &str) -> GitResult<Option<Branch>>;

    fn exists(&self, name: &str) -> GitResult<bool> {
        Ok(self.lookup(name)?.is_some())
    }

    /// Human-readable location, used in error messages
    fn location(&self) -> String;
}

/// Local heads of a repository
#[derive(Debug, Clone, Copy)]
pub struct LocalBranchSource<'a> {
    repo: &'a Repository,
}

impl<'a> LocalBranchSource<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    pub fn branches(&self) -> GitResult<Vec<LocalBranch>> {
        let output = self
            .repo
            .executor()
            .query(&["for-each-ref", LOCAL_REF_FORMAT, "refs/heads/"])?;
        parser::parse_local_refs(&output.output)
    }
}

impl BranchSource for LocalBranchSource<'_> {
    fn lookup(&self, name: &str) -> GitResult<Option<Branch>> {
        Ok(self
            .branches()?
            .into_iter()
            .find(|b| b.name == name)
            .map(Branch::Local))
    }

    fn location(&self) -> String {
        format!("local repository {}", self.repo.path().display())
    }
}

/// Remote-tracking refs of one remote, as of the last fetch
#[derive(Debug, Clone, Copy)]
pub struct RemoteBranchSource<'a> {
    remote: &'a Remote<'a>,
}

impl<'a> RemoteBranchSource<'a> {
    pub fn new(remote: &'a Remote<'a>) -> Self {
        Self { remote }
    }

    pub fn branches(&self) -> GitResult<Vec<RemoteBranch>> {
        let pattern = format!("refs/remotes/{}/", self.remote.name());
        let output = self
            .remote
            .repository()
            .executor()
            .query(&["for-each-ref", REMOTE_REF_FORMAT, &pattern])?;
        parser::parse_remote_refs(&output.output, self.remote.name())
    }
}

impl BranchSource for RemoteBranchSource<'_> {
    fn lookup(&self, name: &str) -> GitResult<Option<Branch>> {
        Ok(self
            .branches()?
            .into_iter()
            .find(|b| b.name == name)
            .map(Branch::Remote))
    }

    fn exists(&self, name: &str) -> GitResult<bool> {
        Ok(remote_branch_names(self.remote)?.iter().any(|n| n == name))
    }

    fn location(&self) -> String {
        format!("remote '{}'", self.remote.name())
    }
}

/// Branch names on `remote` without the leading remote name, e.g.
/// `["main", "translations"]`, not `["origin/main", ...]`
pub fn remote_branch_names(remote: &Remote<'_>) -> GitResult<Vec<String>> {
    Ok(RemoteBranchSource::new(remote)
        .branches()?
        .into_iter()
        .map(|b| b.name)
        .collect())
}
