//! Transfer orchestration: one full upload-and-verify run.
//!
//! A run moves strictly through its phases. All uploads settle
//! (including the draining after a rejection) before the first
//! download starts, and downloads settle before verification. A result
//! exists only once the reassembled payload matches the source byte
//! for byte.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::join_all;

use cairn_core::bench::{BenchCase, PhaseTimings, RunResult};
use cairn_core::chunk::{self, ChunkError};
use cairn_core::payload::{self, PayloadKind};

use crate::client::{ClientError, ExecutionClient, Receipt};
use crate::dispatch::{BatchFailure, Dispatcher, WriteOp};

/// States a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Preprocessed,
    Deployed,
    Uploaded,
    Downloaded,
    Verified,
    Done,
}

/// Why a run failed, with enough context to reproduce it.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("chunking failed: {0}")]
    Chunk(#[from] ChunkError),

    #[error("deploy rejected: {reason}")]
    Deploy { reason: String },

    #[error("upload rejected at chunk {failing_index}: {reason}")]
    Upload {
        failing_index: usize,
        reason: String,
        /// Receipts for the writes that did run, aligned to chunk
        /// order; unclaimed chunks are `None`.
        receipts: Vec<Option<Receipt>>,
    },

    #[error("target holds {stored} chunks but {sent} were sent")]
    CountMismatch { sent: u32, stored: u32 },

    #[error("download failed: {0}")]
    Download(#[from] ClientError),

    #[error(
        "reassembled payload does not match source: \
         {actual_len} bytes ({actual_digest}) vs {expected_len} bytes ({expected_digest})"
    )]
    Verification {
        expected_len: usize,
        actual_len: usize,
        expected_digest: String,
        actual_digest: String,
    },
}

impl From<BatchFailure> for TransferError {
    fn from(failure: BatchFailure) -> Self {
        TransferError::Upload {
            failing_index: failure.failing_index,
            reason: failure.reason,
            receipts: failure.receipts,
        }
    }
}

impl TransferError {
    /// The last phase the run completed before failing.
    pub fn phase_reached(&self) -> Phase {
        match self {
            TransferError::Chunk(_) => Phase::Init,
            TransferError::Deploy { .. } => Phase::Preprocessed,
            TransferError::Upload { .. } => Phase::Deployed,
            TransferError::CountMismatch { .. } | TransferError::Download(_) => Phase::Uploaded,
            TransferError::Verification { .. } => Phase::Downloaded,
        }
    }
}

/// Drives single benchmark cases end to end against one target.
pub struct Orchestrator {
    client: Arc<dyn ExecutionClient>,
    dispatcher: Dispatcher,
    payload: PayloadKind,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn ExecutionClient>,
        dispatcher: Dispatcher,
        payload: PayloadKind,
    ) -> Self {
        Self {
            client,
            dispatcher,
            payload,
        }
    }

    /// Run one case: generate, split, deploy, upload, download, verify.
    ///
    /// Upload time covers the deploy and every chunk write; download
    /// time covers the count check and the parallel reads.
    pub async fn run(&self, case: &BenchCase) -> Result<RunResult, TransferError> {
        let run_start = Instant::now();

        let payload = payload::generate(self.payload, case.total_bytes);
        let chunks = chunk::split(&payload, case.chunk_bytes)?;
        let preprocess_ms = run_start.elapsed().as_millis() as u64;
        tracing::info!(
            case = %case.id(),
            payload_bytes = payload.len(),
            chunks = chunks.len(),
            "payload prepared"
        );

        let upload_start = Instant::now();
        let deploy = self.client.deploy().await;
        if !deploy.success {
            return Err(TransferError::Deploy {
                reason: deploy
                    .error
                    .unwrap_or_else(|| "deploy rejected".to_string()),
            });
        }
        tracing::debug!(cost = deploy.cost_units, "storage target deployed");

        let sent = chunks.len() as u32;
        let ops: Vec<WriteOp> = chunks
            .iter()
            .map(|c| WriteOp {
                index: c.index,
                data: c.data.clone(),
            })
            .collect();
        let receipts = self.dispatcher.run_all(Arc::clone(&self.client), ops).await?;
        let total_cost =
            deploy.cost_units + receipts.iter().map(|r| r.cost_units).sum::<u64>();
        let upload_ms = upload_start.elapsed().as_millis() as u64;
        tracing::info!(chunks = sent, cost = total_cost, elapsed_ms = upload_ms, "upload settled");

        let download_start = Instant::now();
        let stored = self.client.count().await?;
        if stored != sent {
            return Err(TransferError::CountMismatch { sent, stored });
        }
        let reads = (0..stored).map(|index| {
            let client = Arc::clone(&self.client);
            async move { client.read(index).await }
        });
        let parts: Vec<Bytes> = join_all(reads)
            .await
            .into_iter()
            .collect::<Result<_, _>>()?;
        let download_ms = download_start.elapsed().as_millis() as u64;
        tracing::info!(chunks = stored, elapsed_ms = download_ms, "download settled");

        let reassembled = chunk::reassemble(parts.iter().map(|part| part.as_ref()));
        let expected_digest = blake3::hash(&payload);
        if reassembled[..] != payload[..] {
            return Err(TransferError::Verification {
                expected_len: payload.len(),
                actual_len: reassembled.len(),
                expected_digest: hex::encode(expected_digest.as_bytes()),
                actual_digest: hex::encode(blake3::hash(&reassembled).as_bytes()),
            });
        }
        tracing::info!(digest = %hex::encode(expected_digest.as_bytes()), "round trip verified");

        let timings = PhaseTimings {
            preprocess_ms,
            upload_ms,
            download_ms,
            total_ms: run_start.elapsed().as_millis() as u64,
        };
        Ok(RunResult::new(case, sent, timings, total_cost))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
