//! Durable outbox store — an append-only JSONL queue file.
//!
//! One JSON object per line, flushed after every write for crash safety.
//! Lives at `~/.triagectl/outbox.jsonl` by default and is independent of any
//! triage session: decisions made offline survive a full restart.
//!
//! The fast path (enqueue) appends a line; head removal and front insertion
//! rewrite the file. Queues here are small — an operator's backlog of
//! offline decisions — so the rewrite cost is irrelevant.

use crate::outbox::types::DecisionRecord;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Durable FIFO queue of decision records.
pub struct OutboxStore {
    /// Path to the queue file
    path: PathBuf,
    /// In-memory mirror of the file, head first
    records: VecDeque<DecisionRecord>,
}

impl OutboxStore {
    /// Open (or create) the store at the default location.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open (or create) a store at a specific path (also used by tests).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create outbox directory: {}", parent.display()))?;
        }

        let records = if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open outbox file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let mut records = VecDeque::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: DecisionRecord = serde_json::from_str(&line)
                    .with_context(|| format!("Corrupt outbox entry: {}", line))?;
                records.push_back(record);
            }
            records
        } else {
            VecDeque::new()
        };

        Ok(Self { path, records })
    }

    /// Default queue file (~/.triagectl/outbox.jsonl).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".triagectl").join("outbox.jsonl"))
    }

    /// Append a record to the tail of the queue.
    /// An approval can only be decided once, so an existing record for the
    /// same approval is replaced in place (the idempotency key).
    pub fn push(&mut self, record: DecisionRecord) -> Result<()> {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.approval_id == record.approval_id)
        {
            *existing = record;
            return self.rewrite();
        }

        let json = serde_json::to_string(&record).context("Failed to serialize outbox record")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open outbox file: {}", self.path.display()))?;
        writeln!(file, "{}", json).context("Failed to write outbox record")?;
        file.flush().context("Failed to flush outbox file")?;

        self.records.push_back(record);
        Ok(())
    }

    /// Remove and return the head of the queue, persisting the removal
    /// before the caller attempts delivery. Losing a record to a crash in
    /// that window is the at-most-once trade: never deliver twice.
    pub fn pop_front(&mut self) -> Result<Option<DecisionRecord>> {
        let record = self.records.pop_front();
        if record.is_some() {
            self.rewrite()?;
        }
        Ok(record)
    }

    /// Put an undelivered record back at the head (endpoint went away
    /// mid-flush). Preserves FIFO order for the eventual replay.
    pub fn push_front(&mut self, record: DecisionRecord) -> Result<()> {
        self.records.push_front(record);
        self.rewrite()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole file from the in-memory mirror.
    fn rewrite(&self) -> Result<()> {
        let mut file = File::create(&self.path)
            .with_context(|| format!("Failed to rewrite outbox file: {}", self.path.display()))?;
        for record in &self.records {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }
        file.flush().context("Failed to flush outbox file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::types::CommitDecision;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(id: &str, decision: CommitDecision) -> DecisionRecord {
        DecisionRecord {
            approval_id: id.to_string(),
            decision,
            rationale: None,
            decided_at: Utc::now(),
            session_id: "test-session".to_string(),
        }
    }

    #[test]
    fn test_push_pop_fifo() {
        let tmp = TempDir::new().unwrap();
        let mut store = OutboxStore::open(tmp.path().join("outbox.jsonl")).unwrap();

        store.push(record("ap-1", CommitDecision::Approve)).unwrap();
        store.push(record("ap-2", CommitDecision::Deny)).unwrap();
        assert_eq!(store.len(), 2);

        let head = store.pop_front().unwrap().unwrap();
        assert_eq!(head.approval_id, "ap-1");
        let head = store.pop_front().unwrap().unwrap();
        assert_eq!(head.approval_id, "ap-2");
        assert!(store.pop_front().unwrap().is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("outbox.jsonl");

        {
            let mut store = OutboxStore::open(&path).unwrap();
            store.push(record("ap-1", CommitDecision::Approve)).unwrap();
            store.push(record("ap-2", CommitDecision::RequestChanges)).unwrap();
        }

        let mut store = OutboxStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.pop_front().unwrap().unwrap().approval_id, "ap-1");
    }

    #[test]
    fn test_push_replaces_same_approval() {
        let tmp = TempDir::new().unwrap();
        let mut store = OutboxStore::open(tmp.path().join("outbox.jsonl")).unwrap();

        store.push(record("ap-1", CommitDecision::Approve)).unwrap();
        store.push(record("ap-1", CommitDecision::Deny)).unwrap();

        assert_eq!(store.len(), 1);
        let head = store.pop_front().unwrap().unwrap();
        assert_eq!(head.decision, CommitDecision::Deny);
    }

    #[test]
    fn test_push_front_restores_order() {
        let tmp = TempDir::new().unwrap();
        let mut store = OutboxStore::open(tmp.path().join("outbox.jsonl")).unwrap();

        store.push(record("ap-1", CommitDecision::Approve)).unwrap();
        store.push(record("ap-2", CommitDecision::Deny)).unwrap();

        let head = store.pop_front().unwrap().unwrap();
        store.push_front(head).unwrap();

        let ids: Vec<String> = store.records().map(|r| r.approval_id.clone()).collect();
        assert_eq!(ids, vec!["ap-1", "ap-2"]);
    }

    #[test]
    fn test_pop_is_persisted_before_return() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("outbox.jsonl");

        let mut store = OutboxStore::open(&path).unwrap();
        store.push(record("ap-1", CommitDecision::Approve)).unwrap();
        store.pop_front().unwrap();

        // A fresh open sees the removal — a crash after pop cannot replay
        let store = OutboxStore::open(&path).unwrap();
        assert!(store.is_empty());
    }
}
