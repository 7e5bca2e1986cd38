use crate::audit::AuditLogger;
use crate::config::GitEnvironment;
use crate::error::{GitError, GitResult};
use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Merged stdout/stderr for `run`, stdout only for `query`
    pub output: String,
    pub exit_code: i32,
}

/// Executes git commands within a repository
///
/// There is no timeout: a hung fetch or push blocks the caller.
#[derive(Debug, Clone)]
pub struct GitExecutor {
    repo_path: PathBuf,
    program: String,
    environment: GitEnvironment,
    audit: Option<AuditLogger>,
}

impl GitExecutor {
    /// Create a new GitExecutor for the given repository path
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            program: "git".to_string(),
            environment: GitEnvironment::default(),
            audit: None,
        }
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Inject these variables into every child process
    pub fn with_environment(mut self, environment: GitEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_audit_logger(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run a git command, mirroring its combined output to the standard
    /// streams: stdout on success, stderr on failure.
    ///
    /// Arguments are passed as-is; `args` must not include "git".
    pub fn run(&self, args: &[&str]) -> GitResult<CommandOutput> {
        self.run_with_paths(args, &[])
    }

    /// Like [`run`](Self::run), with `paths` appended to `args` untouched.
    /// File names are not always UTF-8, so they never pass through `str`.
    pub fn run_with_paths(&self, args: &[&str], paths: &[OsString]) -> GitResult<CommandOutput> {
        let argv: Vec<&OsStr> = args
            .iter()
            .map(|arg| OsStr::new(*arg))
            .chain(paths.iter().map(OsString::as_os_str))
            .collect();
        let command_line = command_line(&argv);

        let (output, status) = self.spawn_merged(&argv)?;
        let exit_code = self.finish(&command_line, status);

        if status.success() {
            print!("{}", output);
            Ok(CommandOutput { output, exit_code })
        } else {
            eprint!("{}", output);
            Err(GitError::CommandFailed {
                command: command_line,
                exit_code,
                output,
            })
        }
    }

    /// Run a read-only git command and capture its stdout without echoing.
    pub fn query(&self, args: &[&str]) -> GitResult<CommandOutput> {
        let stdout = self.query_bytes(args)?;
        Ok(CommandOutput {
            output: String::from_utf8_lossy(&stdout).into_owned(),
            exit_code: 0,
        })
    }

    /// Like [`query`](Self::query), keeping stdout as raw bytes
    pub fn query_bytes(&self, args: &[&str]) -> GitResult<Vec<u8>> {
        let output = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| self.spawn_error(source))?;
        let command_line = command_line(args);
        let exit_code = self.finish(&command_line, output.status);

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(GitError::CommandFailed {
                command: command_line,
                exit_code,
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    fn command<S: AsRef<OsStr>>(&self, args: &[S]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(&self.repo_path)
            .envs(self.environment.vars())
            .stdin(Stdio::null());
        command
    }

    /// Both streams share one pipe so the output keeps git's own ordering.
    fn spawn_merged(&self, args: &[&OsStr]) -> GitResult<(String, ExitStatus)> {
        let (mut reader, writer) = io::pipe()?;

        // `command` holds our copies of the write end; it must be dropped
        // before reading or the read never sees EOF.
        let mut child = {
            let mut command = self.command(args);
            command.stdout(writer.try_clone()?).stderr(writer);
            command.spawn().map_err(|source| self.spawn_error(source))?
        };

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let status = child.wait()?;

        Ok((String::from_utf8_lossy(&buffer).into_owned(), status))
    }

    fn finish(&self, command_line: &str, status: ExitStatus) -> i32 {
        let exit_code = status.code().unwrap_or(-1);
        debug!(repo = %self.repo_path.display(), exit_code, "git {}", command_line);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_command(command_line, &self.repo_path, exit_code) {
                warn!(path = %audit.log_path().display(), "failed to write audit log: {}", e);
            }
        }

        exit_code
    }

    fn spawn_error(&self, source: io::Error) -> GitError {
        GitError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    /// Get the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Arguments joined for logs and error messages
fn command_line<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
