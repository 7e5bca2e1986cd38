pub mod environment;
pub mod settings;

pub use environment::{GitEnvironment, ensure_git_environment};
pub use settings::{AuditConfig, ConfigError, GitConfig, SyncConfig};
