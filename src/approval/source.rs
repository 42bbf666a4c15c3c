//! Approval source implementations.
//!
//! The real system of record is a governance server; for the CLI and for
//! tests this crate ships a file-backed source (a JSON array of approvals,
//! re-read on every poll) and a static in-memory source.

use crate::approval::types::Approval;
use crate::approval::ApprovalSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File-backed approval source.
/// Reads a JSON array of approvals from disk on every call, so edits to the
/// file show up on the next poll — the same pull/refresh model as a server.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ApprovalSource for FileSource {
    async fn list_approvals(&self, _workspace_id: &str) -> Result<Vec<Approval>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read approvals file: {}", self.path.display()))?;
        let approvals: Vec<Approval> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid approvals JSON: {}", self.path.display()))?;
        Ok(approvals)
    }
}

/// In-memory approval source (for tests and demos).
pub struct StaticSource {
    approvals: Vec<Approval>,
}

impl StaticSource {
    pub fn new(approvals: Vec<Approval>) -> Self {
        Self { approvals }
    }
}

#[async_trait]
impl ApprovalSource for StaticSource {
    async fn list_approvals(&self, _workspace_id: &str) -> Result<Vec<Approval>> {
        Ok(self.approvals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::types::ApprovalStatus;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_source_reads_json_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("approvals.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"approval_id":"ap-1","status":"pending","prompt":"p","run_id":"r","plan_id":"pl"}}]"#
        )
        .unwrap();

        let source = FileSource::new(&path);
        let approvals = source.list_approvals("ws-1").await.unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].approval_id, "ap-1");
        assert_eq!(approvals[0].status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_errors() {
        let source = FileSource::new("/nonexistent/approvals.json");
        assert!(source.list_approvals("ws-1").await.is_err());
    }
}
