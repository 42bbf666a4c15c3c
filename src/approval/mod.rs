pub mod source;
pub mod types;

use crate::approval::types::Approval;
use anyhow::Result;
use async_trait::async_trait;

pub use source::{FileSource, StaticSource};
pub use types::ApprovalStatus;

/// Trait for approval sources.
/// Implementations can be file-backed, in-memory, or a remote governance API.
#[async_trait]
pub trait ApprovalSource {
    /// List all approvals for a workspace, in the source's natural order.
    async fn list_approvals(&self, workspace_id: &str) -> Result<Vec<Approval>>;
}
