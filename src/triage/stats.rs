//! Session statistics tracker.
//!
//! Pure bookkeeping over the decisions taken this session. The invariant
//! `total == approved + denied + changes_requested + skipped` holds at every
//! quiescent moment (whenever no pending commit exists).

use crate::triage::types::TriageDecision;
use serde::{Deserialize, Serialize};

/// Per-session decision counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: usize,
    pub approved: usize,
    pub denied: usize,
    pub changes_requested: usize,
    pub skipped: usize,
}

impl SessionStats {
    /// Count a decision.
    pub fn record(&mut self, decision: TriageDecision) {
        self.total += 1;
        match decision {
            TriageDecision::Approve => self.approved += 1,
            TriageDecision::Deny => self.denied += 1,
            TriageDecision::RequestChanges => self.changes_requested += 1,
            TriageDecision::Skip => self.skipped += 1,
        }
    }

    /// Reverse a decision (undo path). Clamped at zero.
    pub fn unrecord(&mut self, decision: TriageDecision) {
        self.total = self.total.saturating_sub(1);
        let counter = match decision {
            TriageDecision::Approve => &mut self.approved,
            TriageDecision::Deny => &mut self.denied,
            TriageDecision::RequestChanges => &mut self.changes_requested,
            TriageDecision::Skip => &mut self.skipped,
        };
        *counter = counter.saturating_sub(1);
    }

    /// Whether the counters are internally consistent.
    pub fn is_balanced(&self) -> bool {
        self.total == self.approved + self.denied + self.changes_requested + self.skipped
    }

    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} triaged | {} approved | {} denied | {} changes requested | {} skipped",
            self.total, self.approved, self.denied, self.changes_requested, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_unrecord_balance() {
        let mut stats = SessionStats::default();
        stats.record(TriageDecision::Approve);
        stats.record(TriageDecision::Deny);
        stats.record(TriageDecision::Skip);
        assert_eq!(stats.total, 3);
        assert!(stats.is_balanced());

        stats.unrecord(TriageDecision::Skip);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.skipped, 0);
        assert!(stats.is_balanced());
    }

    #[test]
    fn test_unrecord_clamps_at_zero() {
        let mut stats = SessionStats::default();
        stats.unrecord(TriageDecision::Approve);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.approved, 0);
        assert!(stats.is_balanced());
    }
}
