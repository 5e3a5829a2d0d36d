//! Execution target boundary.
//!
//! The engine drives any remote store that provisions fresh storage
//! and then persists and reads back indexed chunks at a metered cost.
//! Metered operations (deploy, write) always produce a `Receipt`, even
//! on rejection; read-side calls are free and fail with an error
//! instead.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// Outcome of one metered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Whether the target accepted and applied the operation.
    pub success: bool,
    /// Cost charged by the target, in its native units. Zero when the
    /// operation was rejected.
    pub cost_units: u64,
    /// Round-trip time observed for the operation.
    pub elapsed: Duration,
    /// Failure reason reported by the target, if any.
    pub error: Option<String>,
}

impl Receipt {
    pub fn ok(cost_units: u64, elapsed: Duration) -> Self {
        Self {
            success: true,
            cost_units,
            elapsed,
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            cost_units: 0,
            elapsed,
            error: Some(reason.into()),
        }
    }
}

/// Read-side failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("chunk count unavailable: {reason}")]
    Count { reason: String },

    #[error("read of chunk {index} failed: {reason}")]
    Read { index: u32, reason: String },
}

/// One remote execution target.
///
/// `deploy` provisions a fresh storage target and must complete before
/// any `write`. Writes may complete in any order relative to their
/// submission; the chunk index travels with each call, so attribution
/// never depends on timing. A rejected operation comes back as a failed
/// `Receipt` as-is, with no retries underneath.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Provision fresh storage. Metered like a write.
    async fn deploy(&self) -> Receipt;

    /// Persist one chunk at `index`.
    async fn write(&self, index: u32, data: Bytes) -> Receipt;

    /// Number of chunks the target currently holds.
    async fn count(&self) -> Result<u32, ClientError>;

    /// Read back the chunk stored at `index`.
    async fn read(&self, index: u32) -> Result<Bytes, ClientError>;
}
