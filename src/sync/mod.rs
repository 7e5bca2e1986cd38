pub mod publisher;
pub mod reconciler;

pub use publisher::Publisher;
pub use reconciler::{BranchReconciler, FetchAuthPolicy, Reconciliation};
