use branchsync::config::{ConfigError, SyncConfig};
use branchsync::git::remote_branch_names;
use branchsync::{
    AppResult, BranchReconciler, GitVersion, Publisher, Repository, ensure_git_environment,
};
use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Keep an automation checkout in sync with its remote
#[derive(Parser, Debug)]
#[command(name = "branchsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Working copy to operate on (default: discovered from the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Config file (default: ~/.config/branchsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, track or reset a local branch and check it out. Discards local changes.
    SetupBranch {
        /// Branch name, without remote prefix
        name: String,
    },
    /// Commit changes, adding untracked files under a path, and optionally push
    Commit {
        #[arg(short, long)]
        message: String,
        /// Only untracked files whose path starts with this are added
        #[arg(long)]
        path: String,
        /// Push the current branch upstream after committing
        #[arg(long)]
        push: bool,
    },
    /// Force-delete a local branch after checking out the official branch
    KillBranch { name: String },
    /// List branch names on the configured remote
    RemoteBranches,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> AppResult<()> {
    let config = load_config(cli.config.as_deref())?;
    let environment = ensure_git_environment(&config);

    let version = GitVersion::validate(&config.git.program)?;
    debug!(%version, program = %config.git.program, "git detected");

    let start = match cli.repo {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let repo = Repository::open(Repository::find_root(start)?, &config, environment)?;
    info!(repo = %repo.path().display(), "repository opened");

    match cli.command {
        Command::SetupBranch { name } => {
            let outcome = BranchReconciler::new(&repo, &config).setup_local_branch(&name)?;
            info!(branch = %name, ?outcome, "branch ready");
        }
        Command::Commit {
            message,
            path,
            push,
        } => {
            Publisher::new(&repo, &config).commit_and_push(&message, &path, push)?;
        }
        Command::KillBranch { name } => {
            BranchReconciler::new(&repo, &config).kill_branch(&name)?;
        }
        Command::RemoteBranches => {
            for name in remote_branch_names(&repo.remote(&config.git.remote))? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    if let Some(path) = path {
        return SyncConfig::load_from(path);
    }

    let default_path = SyncConfig::config_path()?;
    if default_path.exists() {
        SyncConfig::load_from(default_path)
    } else {
        debug!(path = %default_path.display(), "no config file, using defaults");
        Ok(SyncConfig::default_config())
    }
}
