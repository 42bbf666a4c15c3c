//! `triagectl outbox` — inspect and replay queued decisions.
//!
//! Shows what is sitting in the durable queue (decisions made while the
//! governance endpoint was unreachable) and, with `--flush`, replays them
//! in FIFO order.

use crate::config::TriageConfig;
use crate::outbox::{DecisionTransport, OfflineTransport, Outbox, OutboxStore, SocketTransport};
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

/// Run the `triagectl outbox` command.
pub async fn run_outbox(flush: bool, config: &TriageConfig) -> Result<()> {
    let store = match &config.outbox_path {
        Some(path) => OutboxStore::open(path)?,
        None => OutboxStore::open_default()?,
    };
    let transport: Arc<dyn DecisionTransport> = match &config.endpoint_socket {
        Some(socket) => Arc::new(SocketTransport::new(socket)),
        None => Arc::new(OfflineTransport),
    };
    let outbox = Outbox::new(transport, store);

    let records = outbox.queued_records().await;
    println!();
    if records.is_empty() {
        println!("  {} Outbox is empty.", "✓".green());
        println!();
        return Ok(());
    }

    println!(
        "  {} {} queued decision(s):",
        "●".yellow(),
        records.len().to_string().bold()
    );
    println!();
    for record in &records {
        println!(
            "  • {} {} {}",
            record.approval_id.cyan(),
            record.decision.to_string().bold(),
            format!("({})", record.decided_at.to_rfc3339()).dimmed()
        );
    }
    println!();

    if flush {
        if config.endpoint_socket.is_none() {
            println!(
                "  {} No governance endpoint configured — nothing to flush to.",
                "✗".red()
            );
            println!();
            return Ok(());
        }

        let report = outbox.flush().await?;
        println!(
            "  {} delivered | {} rejected | {} remaining",
            report.delivered.to_string().green().bold(),
            report.rejected.to_string().red().bold(),
            report.remaining.to_string().yellow().bold(),
        );
        println!();
    } else {
        println!("  Replay them: {}", "triagectl outbox --flush".dimmed());
        println!();
    }

    Ok(())
}
