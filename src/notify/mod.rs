pub mod terminal;

use std::sync::atomic::{AtomicU64, Ordering};

pub use terminal::TerminalNotifier;

/// Identifier for a shown notice, used to dismiss it later.
pub type NoticeId = u64;

/// Severity / affordance of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational (e.g., "queued for replay")
    Info,
    /// Submission rejected, operator attention needed
    Error,
    /// Carries an undo affordance while the grace period is open
    Undoable,
}

/// A notice surfaced to the operator.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn undoable(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Undoable,
            message: message.into(),
        }
    }
}

/// Trait for the notification side channel.
/// Keeps the triage state machine free of any UI-toolkit types —
/// implementations can be terminal lines, toasts, or nothing at all.
pub trait NotificationPort: Send + Sync {
    /// Show a notice; the returned ID can be used to dismiss it.
    fn show(&self, notice: Notice) -> NoticeId;

    /// Dismiss a previously shown notice. Unknown IDs are ignored.
    fn dismiss(&self, id: NoticeId);
}

/// No-op notifier (for tests and headless runs).
#[derive(Default)]
pub struct NullNotifier {
    next_id: AtomicU64,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationPort for NullNotifier {
    fn show(&self, _notice: Notice) -> NoticeId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn dismiss(&self, _id: NoticeId) {}
}
