//! In-process execution target with a configurable cost model.
//!
//! Stands in for a real remote target, so the benchmark runs out of
//! the box and fault scenarios stay deterministic. Costs follow a flat
//! deploy charge plus a base-and-per-byte charge per write.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use cairn_core::config::TargetConfig;

use crate::client::{ClientError, ExecutionClient, Receipt};

/// Cost and latency profile of the simulated target.
#[derive(Debug, Clone, Copy)]
pub struct SimProfile {
    pub deploy_cost: u64,
    pub write_base_cost: u64,
    pub write_byte_cost: u64,
    pub write_delay: Duration,
    pub read_delay: Duration,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            deploy_cost: 500_000,
            write_base_cost: 21_000,
            write_byte_cost: 16,
            write_delay: Duration::ZERO,
            read_delay: Duration::ZERO,
        }
    }
}

impl From<&TargetConfig> for SimProfile {
    fn from(config: &TargetConfig) -> Self {
        Self {
            deploy_cost: config.deploy_cost,
            write_base_cost: config.write_base_cost,
            write_byte_cost: config.write_byte_cost,
            write_delay: Duration::from_millis(config.write_delay_ms),
            read_delay: Duration::from_millis(config.read_delay_ms),
        }
    }
}

/// Simulated execution target.
///
/// `deploy` provisions fresh storage and discards anything stored
/// before, so one target instance serves a whole benchmark matrix.
/// Writes to distinct indices may run concurrently. Fault hooks make a
/// chosen operation reject, vanish, or corrupt; the pipeline on top is
/// expected to surface each one.
pub struct SimTarget {
    profile: SimProfile,
    deployed: AtomicBool,
    chunks: DashMap<u32, Bytes>,

    fail_deploy: bool,
    reject_write_at: Option<u32>,
    lose_write_at: Option<u32>,
    corrupt_read_at: Option<u32>,

    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl SimTarget {
    pub fn new(profile: SimProfile) -> Self {
        Self {
            profile,
            deployed: AtomicBool::new(false),
            chunks: DashMap::new(),
            fail_deploy: false,
            reject_write_at: None,
            lose_write_at: None,
            corrupt_read_at: None,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Deploy is rejected with a failed receipt.
    pub fn with_failing_deploy(mut self) -> Self {
        self.fail_deploy = true;
        self
    }

    /// The write for chunk `index` is rejected with a failed receipt.
    pub fn with_rejected_write(mut self, index: u32) -> Self {
        self.reject_write_at = Some(index);
        self
    }

    /// The write for chunk `index` is acknowledged but never stored.
    pub fn with_lost_write(mut self, index: u32) -> Self {
        self.lose_write_at = Some(index);
        self
    }

    /// The read of chunk `index` returns corrupted bytes.
    pub fn with_corrupt_read(mut self, index: u32) -> Self {
        self.corrupt_read_at = Some(index);
        self
    }

    /// Highest number of writes observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    /// Chunks currently stored.
    pub fn stored_chunks(&self) -> usize {
        self.chunks.len()
    }

    async fn perform_write(&self, index: u32, data: Bytes, start: Instant) -> Receipt {
        if !self.profile.write_delay.is_zero() {
            tokio::time::sleep(self.profile.write_delay).await;
        }
        if !self.deployed.load(Ordering::Acquire) {
            return Receipt::rejected("no storage target deployed", start.elapsed());
        }
        if self.reject_write_at == Some(index) {
            return Receipt::rejected(format!("write of chunk {index} rejected"), start.elapsed());
        }
        let cost = self.profile.write_base_cost + self.profile.write_byte_cost * data.len() as u64;
        if self.lose_write_at != Some(index) {
            self.chunks.insert(index, data);
        }
        Receipt::ok(cost, start.elapsed())
    }
}

#[async_trait]
impl ExecutionClient for SimTarget {
    async fn deploy(&self) -> Receipt {
        let start = Instant::now();
        if !self.profile.write_delay.is_zero() {
            tokio::time::sleep(self.profile.write_delay).await;
        }
        if self.fail_deploy {
            return Receipt::rejected("deploy rejected by target", start.elapsed());
        }
        self.chunks.clear();
        self.deployed.store(true, Ordering::Release);
        Receipt::ok(self.profile.deploy_cost, start.elapsed())
    }

    async fn write(&self, index: u32, data: Bytes) -> Receipt {
        let start = Instant::now();
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::AcqRel);

        let receipt = self.perform_write(index, data, start).await;

        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        receipt
    }

    async fn count(&self) -> Result<u32, ClientError> {
        if !self.profile.read_delay.is_zero() {
            tokio::time::sleep(self.profile.read_delay).await;
        }
        if !self.deployed.load(Ordering::Acquire) {
            return Err(ClientError::Count {
                reason: "no storage target deployed".to_string(),
            });
        }
        Ok(self.chunks.len() as u32)
    }

    async fn read(&self, index: u32) -> Result<Bytes, ClientError> {
        if !self.profile.read_delay.is_zero() {
            tokio::time::sleep(self.profile.read_delay).await;
        }
        let data = self
            .chunks
            .get(&index)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ClientError::Read {
                index,
                reason: "no chunk stored at this index".to_string(),
            })?;

        if self.corrupt_read_at == Some(index) {
            let mut corrupted = data.to_vec();
            match corrupted.first_mut() {
                Some(byte) => *byte ^= 0xFF,
                None => corrupted.push(0),
            }
            return Ok(Bytes::from(corrupted));
        }
        Ok(data)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
