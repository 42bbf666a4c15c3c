//! Triage queue manager.
//!
//! Derives the ordered work queue from the latest source snapshot: all
//! currently pending approvals minus those set aside by a triage action, in
//! the source's natural order. Pure derivation — no failure modes.
//!
//! Selection is auto-repaired on every recompute: keep the current selection
//! if it is still a queue member, else fall back to the queue's first
//! element, else none.

use crate::approval::types::Approval;
use std::collections::HashSet;

/// Derived work queue plus the set-aside set and the current selection.
/// Owned by the engine; session-scoped, created empty.
#[derive(Debug, Default)]
pub struct TriageQueue {
    /// Latest source snapshot, in source order
    approvals: Vec<Approval>,
    /// Approval IDs removed from the visible queue by a triage action
    set_aside: HashSet<String>,
    /// The approval currently presented to the operator
    selection: Option<String>,
}

impl TriageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the source snapshot and recompute the queue.
    /// Approvals that are no longer pending drop out even mid-session.
    pub fn sync_source(&mut self, approvals: Vec<Approval>) {
        self.approvals = approvals;
        self.repair_selection();
    }

    /// The visible queue: pending approvals not set aside, in source order.
    pub fn members(&self) -> Vec<&Approval> {
        self.approvals
            .iter()
            .filter(|a| a.is_pending() && !self.set_aside.contains(&a.approval_id))
            .collect()
    }

    pub fn contains(&self, approval_id: &str) -> bool {
        self.members()
            .iter()
            .any(|a| a.approval_id == approval_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// The selected approval, if any.
    pub fn selected(&self) -> Option<&Approval> {
        let id = self.selection.as_deref()?;
        self.approvals.iter().find(|a| a.approval_id == id)
    }

    /// Select an approval. No-op unless it is a queue member.
    pub fn select(&mut self, approval_id: &str) {
        if self.contains(approval_id) {
            self.selection = Some(approval_id.to_string());
        }
    }

    /// Position of an approval in the undecided source list (all pending
    /// approvals, set-aside included). Stable across queue reshuffles, so
    /// it serves as the history key.
    pub fn original_index(&self, approval_id: &str) -> Option<usize> {
        self.approvals
            .iter()
            .filter(|a| a.is_pending())
            .position(|a| a.approval_id == approval_id)
    }

    /// Remove an approval from the visible queue after a triage action.
    /// If it was selected, re-point selection to the next remaining member,
    /// falling back to the previous one, falling back to none.
    pub fn set_aside(&mut self, approval_id: &str) {
        let replacement = {
            let queue = self.members();
            queue
                .iter()
                .position(|a| a.approval_id == approval_id)
                .and_then(|pos| {
                    queue
                        .get(pos + 1)
                        .or_else(|| if pos > 0 { queue.get(pos - 1) } else { None })
                        .map(|a| a.approval_id.clone())
                })
        };

        self.set_aside.insert(approval_id.to_string());

        if self.selection.as_deref() == Some(approval_id) {
            self.selection = replacement;
        }
        self.repair_selection();
    }

    /// Undo path: bring an approval back into the queue and reselect it.
    pub fn restore(&mut self, approval_id: &str) {
        self.set_aside.remove(approval_id);
        if self.contains(approval_id) {
            self.selection = Some(approval_id.to_string());
        }
        self.repair_selection();
    }

    /// Review-skipped path: resurface everything that was set aside.
    /// Already-committed approvals will no longer be pending at the source
    /// and thus will not reappear.
    pub fn clear_set_aside(&mut self) {
        self.set_aside.clear();
        self.repair_selection();
    }

    pub fn set_aside_ids(&self) -> &HashSet<String> {
        &self.set_aside
    }

    fn repair_selection(&mut self) {
        let valid = self
            .selection
            .as_deref()
            .map(|id| self.contains(id))
            .unwrap_or(false);
        if !valid {
            self.selection = self.members().first().map(|a| a.approval_id.clone());
        }
    }
}
