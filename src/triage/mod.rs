pub mod engine;
pub mod queue;
pub mod stats;
pub mod types;

pub use engine::TriageEngine;
pub use queue::TriageQueue;
pub use stats::SessionStats;
pub use types::{CommitDecision, PendingCommit, TriageDecision, DEFAULT_GRACE_MS};
