//! Core types for the approval model.
//!
//! Approvals are owned by the external governance source — this crate only
//! reads them. An approval gates an automated workflow run until an operator
//! decides on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an approval at the source.
/// Only `Pending` approvals enter the triage queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting an operator decision
    Pending,
    /// Operator approved the gated run
    Approved,
    /// Operator denied the gated run
    Denied,
    /// Operator asked the submitter to revise and resubmit
    RequestChanges,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Denied => write!(f, "denied"),
            ApprovalStatus::RequestChanges => write!(f, "request_changes"),
        }
    }
}

/// A single approval gating a workflow run.
/// Read-only here: the source is the system of record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    /// Unique approval identifier (e.g., "ap-7f3a")
    pub approval_id: String,

    /// Current status at the source
    pub status: ApprovalStatus,

    /// What the operator is being asked to approve
    pub prompt: String,

    /// The workflow run this approval gates
    pub run_id: String,

    /// The plan that produced the run
    pub plan_id: String,

    /// Deadline for a decision, if the source set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,

    /// Who or what requested the approval (e.g., "deploy-bot")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
}

impl Approval {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}
