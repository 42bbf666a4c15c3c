//! Behavior tests for the outbox contract.
//!
//! Verifies the externally observable guarantees the triage engine relies
//! on: queue-on-unreachable, FIFO at-most-once replay, stop-on-unreachable
//! mid-flush, rejection handling, and durability across reopen.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use triagectl::outbox::{
    DecisionRecord, DecisionSubmitter, DecisionTransport, Outbox, OutboxStore, SubmitError,
    TransportError,
};
use triagectl::triage::CommitDecision;

/// Transport fake. When the script is empty, every delivery succeeds if
/// `online`, else is unreachable. A non-empty script consumes one scripted
/// outcome per call.
#[derive(Default)]
struct FakeTransport {
    online: AtomicBool,
    script: Mutex<VecDeque<Result<(), TransportError>>>,
    delivered: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn online() -> Arc<Self> {
        let t = Self::default();
        t.online.store(true, Ordering::SeqCst);
        Arc::new(t)
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn push_script(&self, outcome: Result<(), TransportError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionTransport for FakeTransport {
    async fn deliver(&self, record: &DecisionRecord) -> Result<(), TransportError> {
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            if outcome.is_ok() {
                self.delivered.lock().unwrap().push(record.approval_id.clone());
            }
            return outcome;
        }
        if self.online.load(Ordering::SeqCst) {
            self.delivered.lock().unwrap().push(record.approval_id.clone());
            Ok(())
        } else {
            Err(TransportError::Unreachable("fake offline".to_string()))
        }
    }
}

fn store_at(tmp: &TempDir) -> OutboxStore {
    OutboxStore::open(tmp.path().join("outbox.jsonl")).unwrap()
}

#[tokio::test]
async fn test_online_submit_applies_immediately() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::online();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    let outcome = outbox
        .submit("ap-1", CommitDecision::Approve, Some("looks good"))
        .await
        .unwrap();

    assert!(!outcome.queued);
    assert_eq!(outbox.pending_count(), 0);
    assert_eq!(transport.delivered(), vec!["ap-1"]);
}

#[tokio::test]
async fn test_offline_submit_queues() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::offline();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    let outcome = outbox
        .submit("ap-1", CommitDecision::Deny, None)
        .await
        .unwrap();

    assert!(outcome.queued);
    assert_eq!(outbox.pending_count(), 1);
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_flush_replays_fifo_exactly_once() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::offline();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    outbox.submit("ap-1", CommitDecision::Approve, None).await.unwrap();
    outbox.submit("ap-2", CommitDecision::Deny, None).await.unwrap();
    outbox.submit("ap-3", CommitDecision::RequestChanges, None).await.unwrap();

    transport.set_online(true);
    let report = outbox.flush().await.unwrap();

    assert_eq!(report.delivered, 3);
    assert_eq!(report.remaining, 0);
    assert_eq!(transport.delivered(), vec!["ap-1", "ap-2", "ap-3"]);
    assert_eq!(outbox.pending_count(), 0);

    // A second flush has nothing left to deliver
    let report = outbox.flush().await.unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(transport.delivered().len(), 3);
}

#[tokio::test]
async fn test_flush_stops_when_endpoint_drops_midway() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::offline();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    outbox.submit("ap-1", CommitDecision::Approve, None).await.unwrap();
    outbox.submit("ap-2", CommitDecision::Deny, None).await.unwrap();

    // First delivery succeeds, then the endpoint goes away
    transport.push_script(Ok(()));
    transport.push_script(Err(TransportError::Unreachable("gone".to_string())));

    let report = outbox.flush().await.unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(report.remaining, 1);
    assert_eq!(transport.delivered(), vec!["ap-1"]);

    // The undelivered record kept its place at the head
    transport.set_online(true);
    let report = outbox.flush().await.unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(transport.delivered(), vec!["ap-1", "ap-2"]);
}

#[tokio::test]
async fn test_rejected_submit_is_not_queued() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::online();
    transport.push_script(Err(TransportError::Rejected("bad rationale".to_string())));
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    let result = outbox.submit("ap-1", CommitDecision::Approve, None).await;

    assert!(matches!(result, Err(SubmitError::Rejected(_))));
    assert_eq!(outbox.pending_count(), 0);
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_rejected_during_flush_is_dropped_not_retried() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::offline();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    outbox.submit("ap-1", CommitDecision::Approve, None).await.unwrap();
    outbox.submit("ap-2", CommitDecision::Deny, None).await.unwrap();

    transport.push_script(Err(TransportError::Rejected("stale".to_string())));
    transport.set_online(true);

    let report = outbox.flush().await.unwrap();
    assert_eq!(report.rejected, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.remaining, 0);
    assert_eq!(transport.delivered(), vec!["ap-2"]);
}

#[tokio::test]
async fn test_queue_survives_restart() {
    let tmp = TempDir::new().unwrap();

    {
        let outbox = Outbox::new(FakeTransport::offline(), store_at(&tmp));
        outbox.submit("ap-1", CommitDecision::Approve, None).await.unwrap();
        outbox.submit("ap-2", CommitDecision::Deny, None).await.unwrap();
    }

    // A new process picks up where the old one left off
    let transport = FakeTransport::online();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));
    assert_eq!(outbox.pending_count(), 2);

    let report = outbox.flush().await.unwrap();
    assert_eq!(report.delivered, 2);
    assert_eq!(transport.delivered(), vec!["ap-1", "ap-2"]);
}

#[tokio::test]
async fn test_resubmitting_same_approval_replaces_queued_record() {
    let tmp = TempDir::new().unwrap();
    let transport = FakeTransport::offline();
    let outbox = Outbox::new(transport.clone(), store_at(&tmp));

    outbox.submit("ap-1", CommitDecision::Approve, None).await.unwrap();
    outbox.submit("ap-1", CommitDecision::Deny, None).await.unwrap();

    // approval_id is the idempotency key — one record, the latest decision
    assert_eq!(outbox.pending_count(), 1);
    let records = outbox.queued_records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].decision, CommitDecision::Deny);
}
