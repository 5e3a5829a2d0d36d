//! Benchmark data model: matrix cells and per-run results.

use serde::Serialize;

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = 1024 * KILOBYTE;

/// One cell of the benchmark matrix: a payload size paired with a
/// chunk size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchCase {
    pub total_bytes: usize,
    pub chunk_bytes: usize,
}

impl BenchCase {
    pub fn new(total_bytes: usize, chunk_bytes: usize) -> Self {
        Self {
            total_bytes,
            chunk_bytes,
        }
    }

    /// Compact identifier, e.g. `100KB_23KB`.
    pub fn id(&self) -> String {
        format!(
            "{}_{}",
            format_size(self.total_bytes as u64),
            format_size(self.chunk_bytes as u64)
        )
    }

    /// Human-readable label, e.g. `Total: 100KB, Chunk: 23KB`.
    pub fn label(&self) -> String {
        format!(
            "Total: {}, Chunk: {}",
            format_size(self.total_bytes as u64),
            format_size(self.chunk_bytes as u64)
        )
    }
}

/// Wall-clock durations measured across one run's phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub preprocess_ms: u64,
    pub upload_ms: u64,
    pub download_ms: u64,
    pub total_ms: u64,
}

/// The outcome of one completed benchmark run.
///
/// Only runs that passed verification produce a result; a failed run
/// surfaces its error instead of a row. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub id: String,
    pub test_case: String,
    pub total_bytes: u64,
    pub chunk_bytes: u64,
    pub chunk_count: u32,
    pub preprocess_ms: u64,
    pub upload_ms: u64,
    pub download_ms: u64,
    pub total_ms: u64,
    /// Cost of deploy plus every chunk write, in target units.
    pub total_cost: u64,
    /// `total_cost / (1 + chunk_count)`: the deploy counts as one
    /// operation alongside the writes.
    pub avg_cost_per_op: u64,
    /// Whether the reassembled payload matched the source. Always true
    /// for emitted results; a failed comparison aborts the run instead.
    pub verified: bool,
}

impl RunResult {
    pub fn new(case: &BenchCase, chunk_count: u32, timings: PhaseTimings, total_cost: u64) -> Self {
        let operations = 1 + u64::from(chunk_count);
        Self {
            id: case.id(),
            test_case: case.label(),
            total_bytes: case.total_bytes as u64,
            chunk_bytes: case.chunk_bytes as u64,
            chunk_count,
            preprocess_ms: timings.preprocess_ms,
            upload_ms: timings.upload_ms,
            download_ms: timings.download_ms,
            total_ms: timings.total_ms,
            total_cost,
            avg_cost_per_op: total_cost / operations,
            verified: true,
        }
    }
}

/// Render a byte count with the unit a person would use: `512B`,
/// `23KB`, `5MB`. Kilobyte and megabyte values round to the nearest
/// whole unit.
pub fn format_size(bytes: u64) -> String {
    if bytes < KILOBYTE {
        format!("{bytes}B")
    } else if bytes < MEGABYTE {
        format!("{}KB", div_round(bytes, KILOBYTE))
    } else {
        format!("{}MB", div_round(bytes, MEGABYTE))
    }
}

fn div_round(value: u64, unit: u64) -> u64 {
    (value + unit / 2) / unit
}
