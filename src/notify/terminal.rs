//! Terminal notifier — prints notices as colored stderr lines.
//!
//! A line-oriented terminal has no way to retract output, so `dismiss` is a
//! no-op here; the undo affordance is the `[u]` key in the triage loop.

use crate::notify::{Notice, NoticeId, NoticeKind, NotificationPort};
use colored::Colorize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Notifier that writes one colored line per notice.
#[derive(Default)]
pub struct TerminalNotifier {
    next_id: AtomicU64,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationPort for TerminalNotifier {
    fn show(&self, notice: Notice) -> NoticeId {
        match notice.kind {
            NoticeKind::Info => eprintln!("  {} {}", "ℹ".blue(), notice.message),
            NoticeKind::Error => eprintln!("  {} {}", "✗".red().bold(), notice.message),
            NoticeKind::Undoable => eprintln!(
                "  {} {} {}",
                "●".yellow(),
                notice.message,
                "(press u to undo)".dimmed()
            ),
        }
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn dismiss(&self, _id: NoticeId) {}
}
