//! Bounded-concurrency write dispatch.
//!
//! A fixed pool of workers drains an ordered batch: each worker claims
//! the next unclaimed operation off a shared counter, executes it,
//! records the receipt under the operation's position, observes the
//! configured delay, and claims again. In-flight writes never exceed
//! the pool width, and receipts come back aligned to the submitted
//! order no matter how completions interleave.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::client::{ExecutionClient, Receipt};

/// One chunk write waiting to be dispatched.
#[derive(Debug, Clone)]
pub struct WriteOp {
    pub index: u32,
    pub data: Bytes,
}

/// Batch outcome when some write was rejected.
///
/// `receipts` is aligned to the submitted batch; slots the pool never
/// claimed are `None`. Whether to retry is the caller's decision, the
/// pool itself never resubmits.
#[derive(Debug, thiserror::Error)]
#[error("write {failing_index} rejected: {reason}")]
pub struct BatchFailure {
    /// Position in the batch of the lowest rejected write.
    pub failing_index: usize,
    pub reason: String,
    pub receipts: Vec<Option<Receipt>>,
}

/// Fixed-width, rate-limited write dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    concurrency: usize,
    op_delay: Duration,
}

impl Dispatcher {
    /// `concurrency` is clamped to at least one worker. With one worker
    /// and no delay the batch runs strictly sequentially.
    pub fn new(concurrency: usize, op_delay: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            op_delay,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Execute every operation with at most `concurrency` in flight,
    /// each worker pausing `op_delay` after a completed write.
    ///
    /// The first rejected receipt stops further claims; writes already
    /// in flight drain, and the partial receipts travel back inside the
    /// error.
    pub async fn run_all(
        &self,
        client: Arc<dyn ExecutionClient>,
        ops: Vec<WriteOp>,
    ) -> Result<Vec<Receipt>, BatchFailure> {
        let total = ops.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.concurrency.min(total);
        tracing::debug!(ops = total, workers, "dispatching write batch");

        let ops = Arc::new(ops);
        let next = Arc::new(AtomicUsize::new(0));
        let halted = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let ops = Arc::clone(&ops);
            let next = Arc::clone(&next);
            let halted = Arc::clone(&halted);
            let client = Arc::clone(&client);
            let delay = self.op_delay;

            handles.push(tokio::spawn(async move {
                // Claimed slots are disjoint across workers, so each
                // worker collects its own receipts and the merge after
                // the join needs no locking.
                let mut filled: Vec<(usize, Receipt)> = Vec::new();
                loop {
                    if halted.load(Ordering::Acquire) {
                        break;
                    }
                    let slot = next.fetch_add(1, Ordering::AcqRel);
                    if slot >= total {
                        break;
                    }
                    let op = &ops[slot];
                    let receipt = client.write(op.index, op.data.clone()).await;
                    let rejected = !receipt.success;
                    filled.push((slot, receipt));
                    if rejected {
                        halted.store(true, Ordering::Release);
                        break;
                    }
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                filled
            }));
        }

        let mut receipts: Vec<Option<Receipt>> = vec![None; total];
        let mut worker_lost = false;
        for handle in handles {
            match handle.await {
                Ok(filled) => {
                    for (slot, receipt) in filled {
                        receipts[slot] = Some(receipt);
                    }
                }
                Err(error) => {
                    tracing::error!(%error, "dispatch worker terminated abnormally");
                    worker_lost = true;
                }
            }
        }

        if !halted.load(Ordering::Acquire) && !worker_lost {
            // Every slot was claimed and acknowledged.
            let receipts: Vec<Receipt> = receipts.into_iter().flatten().collect();
            debug_assert_eq!(receipts.len(), total);
            return Ok(receipts);
        }

        let failure = receipts.iter().enumerate().find_map(|(slot, entry)| {
            let receipt = entry.as_ref()?;
            if receipt.success {
                return None;
            }
            let reason = receipt
                .error
                .clone()
                .unwrap_or_else(|| "operation rejected".to_string());
            Some((slot, reason))
        });
        let (failing_index, reason) = failure.unwrap_or_else(|| {
            // Only reachable when a worker died mid-operation.
            let slot = receipts.iter().position(|r| r.is_none()).unwrap_or(0);
            (slot, "dispatch worker terminated abnormally".to_string())
        });
        tracing::warn!(failing_index, %reason, "write batch halted");
        Err(BatchFailure {
            failing_index,
            reason,
            receipts,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
