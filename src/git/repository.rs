use crate::audit::AuditLogger;
use crate::config::{GitEnvironment, SyncConfig};
use crate::error::{GitError, GitResult};
use crate::git::branch::{LocalBranch, LocalBranchSource};
use crate::git::executor::{CommandOutput, GitExecutor};
use crate::git::parser::{self, FileStatus};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A pre-existing local working copy
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    executor: GitExecutor,
}

impl Repository {
    /// Detect git repository starting from a specific directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        Ok(Self::new(Self::find_root(start_path)?))
    }

    /// Walk up from `start_path` to the directory holding `.git`
    pub fn find_root<P: AsRef<Path>>(start_path: P) -> GitResult<PathBuf> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            // `.git` is a file in worktrees and submodules
            if current.join(".git").exists() {
                return Ok(current);
            }

            if !current.pop() {
                return Err(GitError::NotARepository);
            }
        }
    }

    /// Create a Repository for a known working-tree root
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_executor(GitExecutor::new(path))
    }

    /// Create a Repository whose commands go through `executor`
    pub fn with_executor(executor: GitExecutor) -> Self {
        Self {
            path: executor.repo_path().to_path_buf(),
            executor,
        }
    }

    /// Open `path` with the program, environment and audit log from `config`
    pub fn open<P: AsRef<Path>>(
        path: P,
        config: &SyncConfig,
        environment: &GitEnvironment,
    ) -> GitResult<Self> {
        let mut executor = GitExecutor::new(path)
            .with_program(config.git.program.clone())
            .with_environment(environment.clone());

        if let Some(log_path) = &config.audit.log_path {
            executor = executor.with_audit_logger(AuditLogger::with_path(log_path)?);
        }

        Ok(Self::with_executor(executor))
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a mutating command, echoing its output
    pub fn run(&self, args: &[&str]) -> GitResult<CommandOutput> {
        self.executor.run(args)
    }

    pub fn run_with_paths(&self, args: &[&str], paths: &[OsString]) -> GitResult<CommandOutput> {
        self.executor.run_with_paths(args, paths)
    }

    /// Get the git executor for this repository
    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    pub fn remote(&self, name: &str) -> Remote<'_> {
        Remote {
            repo: self,
            name: name.to_string(),
        }
    }

    pub fn local_branches(&self) -> GitResult<Vec<LocalBranch>> {
        LocalBranchSource::new(self).branches()
    }

    /// Name of the checked-out branch, `None` when HEAD is detached
    pub fn current_branch(&self) -> GitResult<Option<String>> {
        let output = self.executor.query(&["branch", "--show-current"])?;
        let branch = output.output.trim();

        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// Resolve a revision to a full commit id
    pub fn rev_parse(&self, revision: &str) -> GitResult<String> {
        let target = format!("{}^{{commit}}", revision);
        let output = self.executor.query(&["rev-parse", "--verify", "--quiet", &target])?;
        Ok(output.output.trim().to_string())
    }

    pub fn head_commit(&self) -> GitResult<String> {
        self.rev_parse("HEAD")
    }

    /// Untracked files, one entry per file, relative to the repository root
    pub fn untracked_files(&self) -> GitResult<Vec<OsString>> {
        let output = self
            .executor
            .query_bytes(&["status", "--porcelain=v2", "-z", "--untracked-files=all"])?;

        Ok(parser::parse_status_porcelain_v2(&output)?
            .into_iter()
            .filter(|entry| entry.status == FileStatus::Untracked)
            .map(|entry| entry.path)
            .collect())
    }
}

/// A named remote of a repository, e.g. "origin"
#[derive(Debug, Clone)]
pub struct Remote<'a> {
    repo: &'a Repository,
    name: String,
}

impl<'a> Remote<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository(&self) -> &'a Repository {
        self.repo
    }

    /// Update this remote's tracking refs
    pub fn fetch(&self) -> GitResult<CommandOutput> {
        self.repo.run(&["fetch", &self.name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(repo_path: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(repo_path)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn create_test_repo() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().to_path_buf();

        git(&repo_path, &["init", "--initial-branch=main"]);
        git(&repo_path, &["config", "user.name", "Test User"]);
        git(&repo_path, &["config", "user.email", "test@example.com"]);

        (temp_dir, repo_path)
    }

    fn commit_file(repo_path: &Path, file: &str) {
        fs::write(repo_path.join(file), file).unwrap();
        git(repo_path, &["add", file]);
        git(repo_path, &["commit", "-m", file]);
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (_temp, repo_path) = create_test_repo();

        let sub_dir = repo_path.join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let repo = Repository::discover_from(&sub_dir).unwrap();
        assert_eq!(repo.path(), repo_path.as_path());
    }

    #[test]
    fn test_discover_not_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        let result = Repository::discover_from(temp_dir.path());

        assert!(matches!(result.unwrap_err(), GitError::NotARepository));
    }

    #[test]
    fn test_current_branch() {
        let (_temp, repo_path) = create_test_repo();
        commit_file(&repo_path, "a.txt");
        let repo = Repository::new(&repo_path);

        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("main"));

        let head = repo.head_commit().unwrap();
        git(&repo_path, &["checkout", "--detach", &head]);
        assert_eq!(repo.current_branch().unwrap(), None);
    }

    #[test]
    fn test_local_branches() {
        let (_temp, repo_path) = create_test_repo();
        commit_file(&repo_path, "a.txt");
        git(&repo_path, &["branch", "feature"]);
        let repo = Repository::new(&repo_path);

        let branches = repo.local_branches().unwrap();
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["feature", "main"]);

        let head = repo.head_commit().unwrap();
        assert!(branches.iter().all(|b| b.commit == head));
        assert!(branches.iter().all(|b| b.upstream.is_none()));
    }

    #[test]
    fn test_untracked_files_lists_individual_files() {
        let (_temp, repo_path) = create_test_repo();
        commit_file(&repo_path, "tracked.txt");
        fs::create_dir_all(repo_path.join("locale/fr")).unwrap();
        fs::write(repo_path.join("locale/fr/django.po"), "msgid").unwrap();
        fs::write(repo_path.join("notes with space.txt"), "x").unwrap();
        fs::write(repo_path.join("tracked.txt"), "modified").unwrap();
        let repo = Repository::new(&repo_path);

        let mut untracked = repo.untracked_files().unwrap();
        untracked.sort();
        assert_eq!(untracked, ["locale/fr/django.po", "notes with space.txt"]);
    }

    #[test]
    fn test_rev_parse_unknown_revision() {
        let (_temp, repo_path) = create_test_repo();
        commit_file(&repo_path, "a.txt");
        let repo = Repository::new(&repo_path);

        assert!(matches!(
            repo.rev_parse("no-such-branch"),
            Err(GitError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_open_with_audit_log() {
        let (temp, repo_path) = create_test_repo();
        let mut config = SyncConfig::default_config();
        config.audit.log_path = Some(temp.path().join("logs").join("audit.log"));

        let repo = Repository::open(&repo_path, &config, &GitEnvironment::default()).unwrap();
        repo.run(&["status", "--short"]).unwrap();

        let content = fs::read_to_string(temp.path().join("logs/audit.log")).unwrap();
        assert!(content.contains("git status --short"));
    }
}
