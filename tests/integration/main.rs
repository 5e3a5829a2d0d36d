//! cairn end-to-end tests.
//!
//! Every test drives the real pipeline against the in-process
//! simulated target; nothing here touches the network or an external
//! service. Tests write their reports under fresh directories in the
//! system temp dir and remove them before finishing.

mod failures;
mod pipeline;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cairn_core::bench::BenchCase;
use cairn_core::config::BenchConfig;
use cairn_core::payload::PayloadKind;
use cairn_engine::{Dispatcher, Orchestrator, SimProfile, SimTarget};

// ── Harness ───────────────────────────────────────────────────────────────────

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh directory for one test's report output.
pub fn temp_report_dir(tag: &str) -> PathBuf {
    let id = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("cairn-it-{tag}-{}-{id}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Read a report back as (header, data rows).
pub fn read_report(dir: &Path, filename: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(dir.join(filename)).expect("report should exist");
    let header = reader
        .headers()
        .expect("report should have a header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("report row should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (header, rows)
}

/// Benchmark config pointing at `dir`, with the timing knobs zeroed so
/// tests run fast.
pub fn quick_config(dir: &Path, totals: Vec<usize>, chunks: Vec<usize>) -> BenchConfig {
    let mut config = BenchConfig::default();
    config.matrix.total_sizes = totals;
    config.matrix.chunk_sizes = chunks;
    config.matrix.cooldown_ms = 0;
    config.dispatch.op_delay_ms = 0;
    config.report.output_dir = dir.to_path_buf();
    config.report.filename = "results.csv".to_string();
    config
}

/// Orchestrator over a shared simulated target, repeated payload.
pub fn orchestrator_over(target: &Arc<SimTarget>, concurrency: usize) -> Orchestrator {
    Orchestrator::new(
        Arc::clone(target) as Arc<dyn cairn_engine::ExecutionClient>,
        Dispatcher::new(concurrency, Duration::ZERO),
        PayloadKind::Repeated,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The fundamental round trip every other test builds on: one case,
/// straight through the orchestrator, no report involved.
#[tokio::test]
async fn simulated_target_round_trips_one_case() {
    let target = Arc::new(SimTarget::new(SimProfile::default()));
    let orchestrator = orchestrator_over(&target, 5);

    let result = orchestrator
        .run(&BenchCase::new(4096, 1024))
        .await
        .expect("round trip should verify");

    assert!(result.verified);
    assert_eq!(result.chunk_count, 4);
    assert_eq!(target.stored_chunks(), 4);
}
