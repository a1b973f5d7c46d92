//! Domain types.

mod audit;
mod environment;
mod history;
mod project;
mod secret;
mod sync;

pub use audit::{AuditAction, AuditEntry};
pub use environment::Environment;
pub use history::SecretHistory;
pub use project::Project;
pub use secret::{Secret, SecretWrite};
pub use sync::{PullOutcome, PushOutcome, SyncDirection, SyncState};
