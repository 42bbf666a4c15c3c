//! Deferred commit controller — the triage state machine.
//!
//! Two states: `Idle` (no pending commit) and `AwaitingGrace` (exactly one
//! staged decision with a grace timer running). Every decision gets a grace
//! period during which it can be undone without any network traffic; once
//! the grace expires the decision is handed to the decision submitter and
//! is no longer the operator's problem.
//!
//! The one rule that keeps this correct without a lock: **drain before
//! replace**. Any transition that could stage a new decision first commits
//! the old one synchronously, so at most one pending commit ever exists and
//! a fast operator never silently loses a decision by moving on too quickly.
//!
//! The engine never returns errors to the operator. Invariant violations
//! (undo with nothing pending, acting on a non-member) are no-ops, and all
//! submission failures are converted to notices at the commit boundary.

use crate::approval::types::Approval;
use crate::notify::{Notice, NoticeId, NotificationPort};
use crate::outbox::{DecisionSubmitter, SubmitError, SubmitOutcome};
use crate::triage::queue::TriageQueue;
use crate::triage::stats::SessionStats;
use crate::triage::types::{CommitDecision, PendingCommit, TriageDecision, DEFAULT_GRACE_MS};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The triage engine. Owns all session-scoped triage state explicitly —
/// queue, selection, history, stats, and the single pending-commit slot.
pub struct TriageEngine {
    /// Derived work queue, set-aside set, and selection
    queue: TriageQueue,
    /// queue_index -> decision taken, one entry per triaged approval
    history: BTreeMap<usize, TriageDecision>,
    /// Per-session counters
    stats: SessionStats,
    /// The at-most-one staged decision (state == AwaitingGrace iff Some)
    pending: Option<PendingCommit>,
    /// Notice carrying the undo affordance for the staged decision
    undo_notice: Option<NoticeId>,
    /// Grace period length
    grace: Duration,
    /// Where committed decisions go
    submitter: Arc<dyn DecisionSubmitter>,
    /// Operator-facing side channel
    notifier: Arc<dyn NotificationPort>,
}

impl TriageEngine {
    pub fn new(
        submitter: Arc<dyn DecisionSubmitter>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self::with_grace_ms(submitter, notifier, DEFAULT_GRACE_MS)
    }

    pub fn with_grace_ms(
        submitter: Arc<dyn DecisionSubmitter>,
        notifier: Arc<dyn NotificationPort>,
        grace_ms: u64,
    ) -> Self {
        Self {
            queue: TriageQueue::new(),
            history: BTreeMap::new(),
            stats: SessionStats::default(),
            pending: None,
            undo_notice: None,
            grace: Duration::milliseconds(grace_ms as i64),
            submitter,
            notifier,
        }
    }

    /// Feed a fresh source snapshot into the queue.
    pub fn sync_source(&mut self, approvals: Vec<Approval>) {
        self.queue.sync_source(approvals);
    }

    /// The visible work queue, in source order.
    pub fn triage_queue(&self) -> Vec<&Approval> {
        self.queue.members()
    }

    pub fn selection(&self) -> Option<&str> {
        self.queue.selection()
    }

    pub fn selected(&self) -> Option<&Approval> {
        self.queue.selected()
    }

    /// Select an approval for review. No-op unless it is a queue member.
    pub fn select_approval(&mut self, approval_id: &str) {
        self.queue.select(approval_id);
    }

    pub fn pending_commit(&self) -> Option<&PendingCommit> {
        self.pending.as_ref()
    }

    pub fn pending_commit_exists(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn action_history(&self) -> &BTreeMap<usize, TriageDecision> {
        &self.history
    }

    /// Triage complete: nothing left to review and at least one decision made.
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty() && self.stats.total > 0
    }

    /// Transition 1: the operator decided on an approval.
    ///
    /// Drains any prior pending commit first, records the decision in
    /// history/stats, removes the approval from the queue, and — unless the
    /// decision was Skip — stages a new pending commit with a fresh grace
    /// deadline and an undoable notice.
    pub async fn triage_action(
        &mut self,
        approval_id: &str,
        decision: TriageDecision,
        rationale: Option<String>,
    ) {
        if !self.queue.contains(approval_id) {
            tracing::debug!(%approval_id, "triage action on non-queue member ignored");
            return;
        }
        // original_index is defined for every queue member
        let Some(queue_index) = self.queue.original_index(approval_id) else {
            return;
        };

        if let Some(prior) = self.pending.take() {
            self.commit(prior).await;
        }

        self.history.insert(queue_index, decision);
        self.stats.record(decision);
        self.queue.set_aside(approval_id);

        if let Some(commit_decision) = decision.as_commit() {
            self.pending = Some(PendingCommit {
                approval_id: approval_id.to_string(),
                decision: commit_decision,
                rationale,
                queue_index,
                scheduled_commit_at: Utc::now() + self.grace,
            });
            let notice = Notice::undoable(format!(
                "{}: {}",
                commit_decision, approval_id
            ));
            self.undo_notice = Some(self.notifier.show(notice));
            tracing::debug!(%approval_id, decision = %commit_decision, "decision staged");
        } else {
            tracing::debug!(%approval_id, "approval skipped");
        }
    }

    /// Transition 2: the grace timer fired.
    ///
    /// Called by the driving loop with the current time; commits the pending
    /// decision once its deadline has passed. Idempotent — the slot is
    /// cleared before the submitter is called, so a commit fires at most
    /// once per staged decision.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        let due = matches!(&self.pending, Some(p) if now >= p.scheduled_commit_at);
        if due {
            if let Some(pending) = self.pending.take() {
                self.commit(pending).await;
            }
        }
    }

    /// Transition 3: undo the staged decision before its grace expires.
    ///
    /// A perfect inverse: restores the approval to the queue, reselects it,
    /// deletes its history entry, and decrements the matching counter. No
    /// submission occurs. No-op when nothing is pending.
    pub fn undo(&mut self) {
        let Some(pending) = self.pending.take() else {
            tracing::debug!("undo with no pending commit ignored");
            return;
        };
        if let Some(id) = self.undo_notice.take() {
            self.notifier.dismiss(id);
        }

        self.history.remove(&pending.queue_index);
        self.stats.unrecord(triage_form(pending.decision));
        self.queue.restore(&pending.approval_id);
        tracing::debug!(approval_id = %pending.approval_id, "decision undone");
    }

    /// Transition 4: the triage surface is going away.
    /// Force-commits any outstanding decision — never silently dropped.
    pub async fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.commit(pending).await;
        }
    }

    /// Second-pass reset: resurface everything that was set aside and zero
    /// the session bookkeeping. Drains an open pending commit first, the
    /// same as teardown — a reset must not drop a decision either. Nothing
    /// already committed is un-submitted; approvals decided at the source
    /// will simply no longer be pending and will not reappear.
    pub async fn review_skipped(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.commit(pending).await;
        }
        self.queue.clear_set_aside();
        self.history.clear();
        self.stats = SessionStats::default();
    }

    /// Commit a staged decision to the submitter. All failures stop here:
    /// connectivity problems arrive as `queued: true` (informational),
    /// rejections become error notices, and the triage state is never
    /// rolled back.
    async fn commit(&mut self, pending: PendingCommit) {
        if let Some(id) = self.undo_notice.take() {
            self.notifier.dismiss(id);
        }

        let result = self
            .submitter
            .submit(
                &pending.approval_id,
                pending.decision,
                pending.rationale.as_deref(),
            )
            .await;

        match result {
            Ok(SubmitOutcome { queued: true }) => {
                tracing::info!(
                    approval_id = %pending.approval_id,
                    "decision queued for replay"
                );
                self.notifier.show(Notice::info(format!(
                    "offline — decision for {} queued for replay",
                    pending.approval_id
                )));
            }
            Ok(SubmitOutcome { queued: false }) => {
                tracing::debug!(approval_id = %pending.approval_id, "decision committed");
            }
            Err(SubmitError::Rejected(reason)) => {
                tracing::warn!(
                    approval_id = %pending.approval_id,
                    %reason,
                    "decision rejected"
                );
                self.notifier.show(Notice::error(format!(
                    "decision for {} rejected: {}",
                    pending.approval_id, reason
                )));
            }
        }
    }
}

/// Map a submittable decision back to its triage form (undo bookkeeping).
fn triage_form(decision: CommitDecision) -> TriageDecision {
    match decision {
        CommitDecision::Approve => TriageDecision::Approve,
        CommitDecision::Deny => TriageDecision::Deny,
        CommitDecision::RequestChanges => TriageDecision::RequestChanges,
    }
}
