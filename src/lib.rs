pub mod audit;
pub mod config;
pub mod error;
pub mod git;
pub mod sync;

// Re-export commonly used types for convenience
pub use config::{GitEnvironment, SyncConfig, ensure_git_environment};
pub use error::{AppError, AppResult, GitError, GitResult};
pub use git::{GitVersion, Repository};
pub use sync::{BranchReconciler, FetchAuthPolicy, Publisher, Reconciliation};
