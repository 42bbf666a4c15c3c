//! Decision transports — one delivery attempt per call.
//!
//! The outbox decides what happens around an attempt (queue, replay, drop);
//! a transport only answers "delivered, unreachable, or rejected?".
//!
//! The default transport speaks JSON lines over a Unix domain socket to the
//! governance daemon: one request line out, one ack line back.

use crate::outbox::types::{DecisionRecord, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Trait for a single delivery attempt.
#[async_trait]
pub trait DecisionTransport: Send + Sync {
    async fn deliver(&self, record: &DecisionRecord) -> Result<(), TransportError>;
}

/// Ack line returned by the governance daemon.
#[derive(Debug, Serialize, Deserialize)]
struct DecisionAck {
    accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Transport that delivers decisions over a Unix domain socket.
/// Each call opens a new connection — simple and reliable.
pub struct SocketTransport {
    socket_path: PathBuf,
}

impl SocketTransport {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DecisionTransport for SocketTransport {
    async fn deliver(&self, record: &DecisionRecord) -> Result<(), TransportError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            TransportError::Unreachable(format!(
                "connect {}: {}",
                self.socket_path.display(),
                e
            ))
        })?;

        let (reader, mut writer) = stream.into_split();

        let json = serde_json::to_string(record)
            .map_err(|e| TransportError::Unreachable(format!("serialize: {}", e)))?;
        writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let ack: DecisionAck = serde_json::from_str(line.trim())
            .map_err(|e| TransportError::Unreachable(format!("bad ack: {}", e)))?;

        if ack.accepted {
            Ok(())
        } else {
            Err(TransportError::Rejected(
                ack.error.unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }
}

/// Transport that is never reachable. Every submission queues.
/// Used when no endpoint is configured (air-gapped / demo mode).
pub struct OfflineTransport;

#[async_trait]
impl DecisionTransport for OfflineTransport {
    async fn deliver(&self, _record: &DecisionRecord) -> Result<(), TransportError> {
        Err(TransportError::Unreachable(
            "no governance endpoint configured".to_string(),
        ))
    }
}
