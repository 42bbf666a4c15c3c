//! `triagectl triage` — the interactive triage loop.
//!
//! Presents one pending approval at a time and takes single-key decisions:
//! approve, deny, request changes, or skip. Every decision gets a grace
//! period during which `u` undoes it; the poll timeout on the key read
//! doubles as the grace-timer tick. Quitting tears the engine down, which
//! force-commits any decision still in its grace period.

use crate::approval::{ApprovalSource, FileSource};
use crate::approval::types::Approval;
use crate::config::TriageConfig;
use crate::notify::TerminalNotifier;
use crate::outbox::{
    DecisionSubmitter, DecisionTransport, OfflineTransport, Outbox, OutboxStore, SocketTransport,
};
use crate::triage::{TriageDecision, TriageEngine};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// How often the key-wait loop wakes up to tick the grace timer.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How often the approval source is re-read.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Run the `triagectl triage` command.
pub async fn run_triage(source_path: &Path, config: &TriageConfig) -> Result<()> {
    let source = FileSource::new(source_path);

    let store = match &config.outbox_path {
        Some(path) => OutboxStore::open(path)?,
        None => OutboxStore::open_default()?,
    };
    let transport: Arc<dyn DecisionTransport> = match &config.endpoint_socket {
        Some(socket) => Arc::new(SocketTransport::new(socket)),
        None => Arc::new(OfflineTransport),
    };
    let outbox = Arc::new(Outbox::new(transport, store));

    let mut engine = TriageEngine::with_grace_ms(
        outbox.clone(),
        Arc::new(TerminalNotifier::new()),
        config.grace_ms,
    );
    engine.sync_source(source.list_approvals(&config.workspace).await?);

    if engine.triage_queue().is_empty() {
        println!();
        println!("  {} Nothing pending in workspace '{}'.", "ℹ".blue(), config.workspace);
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  {} Triaging workspace '{}' — {} pending",
        "▶".green().bold(),
        config.workspace.cyan(),
        engine.triage_queue().len()
    );
    println!(
        "  {}",
        "[a]pprove  [d]eny  [c]hanges  [s]kip  [u]ndo  [r]eview skipped  [q]uit".dimmed()
    );

    let loop_result = triage_loop(&mut engine, &source, config).await;

    // A decision still in its grace period must not be dropped by leaving.
    engine.teardown().await;

    println!();
    println!("  {}", engine.stats().one_line().bold());
    if outbox.pending_count() > 0 {
        println!(
            "  {} {} decision(s) queued — replay with {}",
            "ℹ".blue(),
            outbox.pending_count(),
            "triagectl outbox --flush".dimmed()
        );
    }
    println!();

    loop_result
}

/// One operator keypress, or a timer tick.
enum LoopStep {
    Decision(TriageDecision),
    Undo,
    ReviewSkipped,
    Quit,
    Tick,
}

async fn triage_loop(
    engine: &mut TriageEngine,
    source: &FileSource,
    config: &TriageConfig,
) -> Result<()> {
    let mut last_shown: Option<String> = None;
    let mut last_refresh = std::time::Instant::now();

    loop {
        if engine.is_complete() {
            println!();
            println!("  {} Triage complete.", "✓".green().bold());
            return Ok(());
        }

        if let Some(approval) = engine.selected() {
            if last_shown.as_deref() != Some(approval.approval_id.as_str()) {
                last_shown = Some(approval.approval_id.clone());
                print_approval(approval);
            }
        }

        let step = wait_for_step()?;
        match step {
            LoopStep::Decision(decision) => {
                if let Some(id) = engine.selection().map(|s| s.to_string()) {
                    engine.triage_action(&id, decision, None).await;
                }
            }
            LoopStep::Undo => {
                engine.undo();
                // Re-show the restored approval
                last_shown = None;
            }
            LoopStep::ReviewSkipped => {
                engine.review_skipped().await;
                last_shown = None;
            }
            LoopStep::Quit => return Ok(()),
            LoopStep::Tick => {}
        }

        engine.tick(Utc::now()).await;

        if last_refresh.elapsed() >= REFRESH_INTERVAL {
            last_refresh = std::time::Instant::now();
            match source.list_approvals(&config.workspace).await {
                Ok(approvals) => engine.sync_source(approvals),
                Err(e) => tracing::warn!("approval source refresh failed: {}", e),
            }
        }
    }
}

/// Block (briefly) for the next keypress; time out into a tick so the
/// grace timer keeps running while the operator thinks.
fn wait_for_step() -> Result<LoopStep> {
    terminal::enable_raw_mode().context("Failed to enter raw mode")?;
    let step = read_key();
    terminal::disable_raw_mode().context("Failed to leave raw mode")?;
    step
}

fn read_key() -> Result<LoopStep> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(LoopStep::Tick);
    }
    if let Event::Key(KeyEvent { code, .. }) = event::read()? {
        let step = match code {
            KeyCode::Char('a') | KeyCode::Char('A') => LoopStep::Decision(TriageDecision::Approve),
            KeyCode::Char('d') | KeyCode::Char('D') => LoopStep::Decision(TriageDecision::Deny),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                LoopStep::Decision(TriageDecision::RequestChanges)
            }
            KeyCode::Char('s') | KeyCode::Char('S') => LoopStep::Decision(TriageDecision::Skip),
            KeyCode::Char('u') | KeyCode::Char('U') => LoopStep::Undo,
            KeyCode::Char('r') | KeyCode::Char('R') => LoopStep::ReviewSkipped,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => LoopStep::Quit,
            _ => LoopStep::Tick,
        };
        return Ok(step);
    }
    Ok(LoopStep::Tick)
}

fn print_approval(approval: &Approval) {
    println!();
    println!(
        "  {} {}  {}",
        "●".yellow(),
        approval.approval_id.cyan().bold(),
        format!("run {} / plan {}", approval.run_id, approval.plan_id).dimmed()
    );
    println!("    {}", approval.prompt);
    if let Some(due) = approval.due_at {
        println!("    {} {}", "due:".dimmed(), due.to_rfc3339().dimmed());
    }
    if let Some(ref requested_by) = approval.requested_by {
        println!("    {} {}", "from:".dimmed(), requested_by.dimmed());
    }
}
