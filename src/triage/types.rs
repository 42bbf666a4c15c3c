//! Types for the triage state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grace period before a decision is durably submitted (milliseconds).
/// While the grace timer runs the decision can be undone without any
/// network traffic.
pub const DEFAULT_GRACE_MS: u64 = 5_000;

/// An operator's choice on one approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageDecision {
    /// Approve the gated run
    Approve,
    /// Deny the gated run
    Deny,
    /// Ask the submitter to revise and resubmit
    RequestChanges,
    /// Set aside for a later pass — purely local, never submitted
    Skip,
}

impl TriageDecision {
    /// The submittable form of this decision, or None for Skip.
    /// Skip never reaches the decision submitter.
    pub fn as_commit(&self) -> Option<CommitDecision> {
        match self {
            TriageDecision::Approve => Some(CommitDecision::Approve),
            TriageDecision::Deny => Some(CommitDecision::Deny),
            TriageDecision::RequestChanges => Some(CommitDecision::RequestChanges),
            TriageDecision::Skip => None,
        }
    }
}

impl fmt::Display for TriageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageDecision::Approve => write!(f, "approve"),
            TriageDecision::Deny => write!(f, "deny"),
            TriageDecision::RequestChanges => write!(f, "request_changes"),
            TriageDecision::Skip => write!(f, "skip"),
        }
    }
}

/// The subset of decisions that are actually submitted to the governance
/// endpoint. Skip is excluded by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitDecision {
    Approve,
    Deny,
    RequestChanges,
}

impl fmt::Display for CommitDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitDecision::Approve => write!(f, "approve"),
            CommitDecision::Deny => write!(f, "deny"),
            CommitDecision::RequestChanges => write!(f, "request_changes"),
        }
    }
}

/// The single staged, undoable decision. At most one exists at any instant:
/// creating a new one first force-commits the old one.
#[derive(Debug, Clone)]
pub struct PendingCommit {
    /// Which approval was decided
    pub approval_id: String,
    /// The decision to submit when the grace period expires
    pub decision: CommitDecision,
    /// Operator-provided rationale, forwarded to the submitter
    pub rationale: Option<String>,
    /// Position the approval held in the undecided source list at decision
    /// time — the stable history key, independent of later queue reshuffles
    pub queue_index: usize,
    /// When the grace period expires and the commit fires
    pub scheduled_commit_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_has_no_commit_form() {
        assert!(TriageDecision::Skip.as_commit().is_none());
        assert_eq!(
            TriageDecision::Approve.as_commit(),
            Some(CommitDecision::Approve)
        );
        assert_eq!(TriageDecision::Deny.as_commit(), Some(CommitDecision::Deny));
        assert_eq!(
            TriageDecision::RequestChanges.as_commit(),
            Some(CommitDecision::RequestChanges)
        );
    }
}
