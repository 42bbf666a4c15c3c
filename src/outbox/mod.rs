//! Decision submitter with an offline-safe outbox.
//!
//! Every commit goes through one `submit` call: try the endpoint now, and if
//! it is unreachable, append the decision to a durable FIFO queue and report
//! `queued: true`. The caller never retries — the outbox owns replay, and
//! each queued decision is delivered at most once.

pub mod store;
pub mod transport;
pub mod types;

use crate::triage::types::CommitDecision;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use store::OutboxStore;
pub use transport::{DecisionTransport, OfflineTransport, SocketTransport};
pub use types::{DecisionRecord, FlushReport, SubmitError, SubmitOutcome, TransportError};

/// Trait for the decision submission boundary consumed by the triage engine.
/// The engine calls `submit` exactly once per committed decision and trusts
/// the implementation to either apply it now or replay it later.
#[async_trait]
pub trait DecisionSubmitter: Send + Sync {
    /// Submit a decision. `queued: true` means the endpoint was unreachable
    /// and the decision will be replayed; do not retry.
    async fn submit(
        &self,
        approval_id: &str,
        decision: CommitDecision,
        rationale: Option<&str>,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// Decisions not yet flushed to the endpoint.
    fn pending_count(&self) -> usize;

    /// Whether a background flush is in progress.
    fn is_flushing(&self) -> bool;
}

/// The durable outbox: immediate delivery attempt, queue on unreachable,
/// FIFO replay on `flush`.
pub struct Outbox {
    /// Delivery seam (socket, offline, or a test fake)
    transport: Arc<dyn DecisionTransport>,
    /// Durable queue, shared between submit and flush
    store: Mutex<OutboxStore>,
    /// Mirror of the store length, readable without locking
    pending: AtomicUsize,
    /// Set while a flush pass is running
    flushing: AtomicBool,
    /// Stamped onto every record for audit correlation
    session_id: String,
}

impl Outbox {
    pub fn new(transport: Arc<dyn DecisionTransport>, store: OutboxStore) -> Self {
        let pending = AtomicUsize::new(store.len());
        Self {
            transport,
            store: Mutex::new(store),
            pending,
            flushing: AtomicBool::new(false),
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Replay queued decisions in FIFO order.
    ///
    /// Each record is removed from the durable store before its delivery
    /// attempt, so a crash mid-flush can lose that one record but can never
    /// deliver it twice. An unreachable endpoint puts the undelivered record
    /// back at the head and stops the pass; a rejected record is dropped
    /// (the endpoint saw it and refused — replaying would just refuse again).
    pub async fn flush(&self) -> Result<FlushReport> {
        self.flushing.store(true, Ordering::SeqCst);
        let report = self.flush_inner().await;
        self.flushing.store(false, Ordering::SeqCst);
        report
    }

    async fn flush_inner(&self) -> Result<FlushReport> {
        let mut report = FlushReport::default();

        loop {
            let record = {
                let mut store = self.store.lock().await;
                let record = store.pop_front()?;
                self.pending.store(store.len(), Ordering::SeqCst);
                record
            };
            let Some(record) = record else { break };

            match self.transport.deliver(&record).await {
                Ok(()) => {
                    tracing::info!(
                        approval_id = %record.approval_id,
                        decision = %record.decision,
                        "replayed queued decision"
                    );
                    report.delivered += 1;
                }
                Err(TransportError::Rejected(reason)) => {
                    tracing::warn!(
                        approval_id = %record.approval_id,
                        %reason,
                        "queued decision rejected during replay"
                    );
                    report.rejected += 1;
                }
                Err(TransportError::Unreachable(reason)) => {
                    tracing::info!(%reason, "endpoint unreachable, stopping flush");
                    let mut store = self.store.lock().await;
                    store.push_front(record)?;
                    self.pending.store(store.len(), Ordering::SeqCst);
                    break;
                }
            }
        }

        report.remaining = self.pending.load(Ordering::SeqCst);
        Ok(report)
    }

    /// Snapshot of the queued records (for `triagectl outbox`).
    pub async fn queued_records(&self) -> Vec<DecisionRecord> {
        self.store.lock().await.records().cloned().collect()
    }
}

#[async_trait]
impl DecisionSubmitter for Outbox {
    async fn submit(
        &self,
        approval_id: &str,
        decision: CommitDecision,
        rationale: Option<&str>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let record = DecisionRecord {
            approval_id: approval_id.to_string(),
            decision,
            rationale: rationale.map(|r| r.to_string()),
            decided_at: Utc::now(),
            session_id: self.session_id.clone(),
        };

        match self.transport.deliver(&record).await {
            Ok(()) => {
                tracing::debug!(%approval_id, %decision, "decision delivered");
                Ok(SubmitOutcome { queued: false })
            }
            Err(TransportError::Unreachable(reason)) => {
                tracing::info!(%approval_id, %reason, "endpoint unreachable, queueing decision");
                let mut store = self.store.lock().await;
                if let Err(e) = store.push(record) {
                    // The queue file itself failed — the decision cannot be
                    // made durable, so surface it as a hard failure.
                    return Err(SubmitError::Rejected(format!(
                        "could not queue decision: {}",
                        e
                    )));
                }
                self.pending.store(store.len(), Ordering::SeqCst);
                Ok(SubmitOutcome { queued: true })
            }
            Err(TransportError::Rejected(reason)) => {
                tracing::warn!(%approval_id, %reason, "decision rejected");
                Err(SubmitError::Rejected(reason))
            }
        }
    }

    fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn is_flushing(&self) -> bool {
        self.flushing.load(Ordering::SeqCst)
    }
}
