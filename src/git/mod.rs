pub mod branch;
pub mod executor;
pub mod parser;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use branch::{
    Branch, BranchSource, LocalBranch, LocalBranchSource, RemoteBranch, RemoteBranchSource,
    remote_branch_names,
};
pub use executor::{CommandOutput, GitExecutor};
pub use parser::{FileStatus, StatusEntry};
pub use repository::{Remote, Repository};
pub use version::GitVersion;
