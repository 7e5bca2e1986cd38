//! Credentials and paths the external git process needs.
//!
//! Values already present in the process environment are never replaced,
//! so a test harness or supervising process can pre-seed any of them.

use std::env;
use std::sync::OnceLock;

use tracing::debug;

use crate::config::settings::SyncConfig;

/// ssh command override used by git for pushes and fetches
pub const GIT_SSH_VAR: &str = "GIT_SSH";
/// Deploy key consumed by the ssh wrapper
pub const DEPLOY_KEY_VAR: &str = "TRANSLATION_REPOSITORY_DEPLOY_KEY";
pub const PROJECT_ROOT_VAR: &str = "PROJECT_ROOT";

const SSH_WRAPPER: &str = "ssh_wrapper.sh";

static PROCESS_ENVIRONMENT: OnceLock<GitEnvironment> = OnceLock::new();

/// Environment variables injected into every git child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitEnvironment {
    vars: Vec<(String, String)>,
}

impl GitEnvironment {
    /// Resolve against the current process environment
    pub fn resolve(config: &SyncConfig) -> Self {
        Self::resolve_with(config, |key| env::var(key).ok())
    }

    /// Resolve using `lookup` for already-set values; a value returned by
    /// `lookup` always wins over the configured default.
    pub fn resolve_with<F>(config: &SyncConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut environment = GitEnvironment::default();
        let project_root = config.project_root.as_deref();

        // Without a project root there is no wrapper to point git at
        let wrapper = project_root.map(|root| root.join(SSH_WRAPPER).display().to_string());
        environment.set_if_absent(GIT_SSH_VAR, wrapper, &lookup);
        environment.set_if_absent(DEPLOY_KEY_VAR, config.deploy_key.clone(), &lookup);
        environment.set_if_absent(
            PROJECT_ROOT_VAR,
            project_root.map(|root| root.display().to_string()),
            &lookup,
        );

        environment
    }

    fn set_if_absent<F>(&mut self, key: &str, default: Option<String>, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = match lookup(key) {
            Some(existing) => {
                debug!(key, "keeping value from environment");
                Some(existing)
            }
            None => default,
        };

        if let Some(value) = value {
            self.vars.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Key/value pairs suitable for `Command::envs`
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolve the git environment for this process.
///
/// The first call wins: later calls return the same environment even if
/// given a different config. Safe to call from any number of call sites.
pub fn ensure_git_environment(config: &SyncConfig) -> &'static GitEnvironment {
    PROCESS_ENVIRONMENT.get_or_init(|| GitEnvironment::resolve(config))
}
