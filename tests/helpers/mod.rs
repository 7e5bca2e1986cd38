#![allow(dead_code)]

use branchsync::SyncConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_user(repo_path: &Path) {
    git(repo_path, &["config", "user.name", "Test User"]);
    git(repo_path, &["config", "user.email", "test@example.com"]);
}

/// Helper to create a test git repository
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "--initial-branch=main"]);
    configure_user(&repo_path);

    (temp_dir, repo_path)
}

/// Helper to create a commit; returns its id
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) -> String {
    let file_path = repo_path.join(file);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(&file_path, content).expect("Failed to write file");

    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-m", message]);
    head(repo_path)
}

pub fn head(repo_path: &Path) -> String {
    git(repo_path, &["rev-parse", "HEAD"])
}

pub fn current_branch(repo_path: &Path) -> String {
    git(repo_path, &["branch", "--show-current"])
}

/// Short upstream name of a local branch, if it tracks one
pub fn upstream_of(repo_path: &Path, branch: &str) -> Option<String> {
    let refname = format!("refs/heads/{}", branch);
    let upstream = git(
        repo_path,
        &["for-each-ref", "--format=%(upstream:short)", &refname],
    );
    (!upstream.is_empty()).then_some(upstream)
}

pub fn local_branch_exists(repo_path: &Path, branch: &str) -> bool {
    let refname = format!("refs/heads/{}", branch);
    Command::new("git")
        .args(["show-ref", "--verify", "--quiet", &refname])
        .current_dir(repo_path)
        .status()
        .expect("Failed to run git")
        .success()
}

/// A bare origin, a seed clone used to publish upstream changes, and the
/// working clone under test
pub struct RemoteFixture {
    pub temp: TempDir,
    pub origin: PathBuf,
    pub seed: PathBuf,
    pub work: PathBuf,
}

impl RemoteFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let origin = temp.path().join("origin.git");
        let seed = temp.path().join("seed");
        let work = temp.path().join("work");

        fs::create_dir_all(&origin).unwrap();
        git(&origin, &["init", "--bare", "--initial-branch=main"]);

        fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init", "--initial-branch=main"]);
        configure_user(&seed);
        create_commit(&seed, "README.md", "hello\n", "Initial commit");
        git(&seed, &["remote", "add", "origin", origin.to_str().unwrap()]);
        git(&seed, &["push", "-u", "origin", "main"]);

        git(temp.path(), &["clone", origin.to_str().unwrap(), "work"]);
        configure_user(&work);

        RemoteFixture {
            temp,
            origin,
            seed,
            work,
        }
    }

    /// Publish a new branch on origin, forked from the seed's main
    pub fn create_remote_branch(&self, branch: &str, file: &str) -> String {
        git(&self.seed, &["checkout", "main"]);
        git(&self.seed, &["checkout", "-b", branch]);
        let commit = create_commit(&self.seed, file, branch, &format!("Add {}", file));
        git(&self.seed, &["push", "origin", branch]);
        git(&self.seed, &["checkout", "main"]);
        commit
    }

    /// Add a commit to an existing origin branch
    pub fn advance_remote_branch(&self, branch: &str, file: &str) -> String {
        git(&self.seed, &["checkout", branch]);
        let commit = create_commit(&self.seed, file, file, &format!("Update {}", file));
        git(&self.seed, &["push", "origin", branch]);
        git(&self.seed, &["checkout", "main"]);
        commit
    }

    /// Tip of a branch as stored in the bare origin
    pub fn origin_tip(&self, branch: &str) -> String {
        git(&self.origin, &["rev-parse", &format!("refs/heads/{}", branch)])
    }

    pub fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::default_config();
        config.project_root = Some(self.temp.path().to_path_buf());
        config
    }
}

/// A git wrapper that fails every fetch with a transport protocol error
/// and passes everything else through to the real git.
#[cfg(unix)]
pub fn fake_git_with_protocol_error(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-git.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
         if [ \"$1\" = \"fetch\" ]; then\n\
         \techo 'fatal: protocol error: bad line length character: Perm' >&2\n\
         \texit 128\n\
         fi\n\
         exec git \"$@\"\n",
    )
    .expect("Failed to write fake git");

    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();

    script
}
