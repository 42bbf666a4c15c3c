//! Types for the decision submission path.

use crate::triage::types::CommitDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A decision awaiting (or undergoing) delivery to the governance endpoint.
/// This is what the outbox persists while offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Which approval was decided
    pub approval_id: String,

    /// The decision to apply
    pub decision: CommitDecision,

    /// Operator-provided rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// When the operator's grace period expired and the decision committed
    pub decided_at: DateTime<Utc>,

    /// The triage session that produced the decision
    pub session_id: String,
}

/// Result of a successful `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// True when the endpoint was unreachable and the decision was appended
    /// to the durable queue for later replay. The caller must not retry —
    /// the outbox owns replay.
    pub queued: bool,
}

/// Hard submission failure. Connectivity problems are never surfaced here —
/// they become `SubmitOutcome { queued: true }`.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The endpoint received the decision and refused it (validation,
    /// authorization). Not queued, not retried.
    #[error("decision rejected: {0}")]
    Rejected(String),
}

/// Outcome of a single delivery attempt by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the endpoint (offline, socket missing, timeout).
    /// The decision is safe to queue and replay later.
    #[error("governance endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered and refused the decision.
    #[error("governance endpoint rejected decision: {0}")]
    Rejected(String),
}

/// Summary of one `flush` pass over the queued decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Decisions delivered to the endpoint
    pub delivered: usize,
    /// Decisions the endpoint refused (dropped from the queue)
    pub rejected: usize,
    /// Decisions still queued (endpoint became unreachable mid-flush)
    pub remaining: usize,
}
