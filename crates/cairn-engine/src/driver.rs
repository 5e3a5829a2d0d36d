//! Benchmark driver: walks the case matrix and records results.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use cairn_core::bench::BenchCase;
use cairn_core::config::BenchConfig;

use crate::client::ExecutionClient;
use crate::dispatch::Dispatcher;
use crate::report::CsvReport;
use crate::transfer::Orchestrator;

/// How a full matrix run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub completed: usize,
    pub failed: usize,
}

impl RunTally {
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }
}

/// Runs every case in the matrix, appending one report row per
/// completed run.
///
/// A failed case is logged with the phase it reached and skipped; it
/// never aborts the rest of the matrix and never produces a row. Only
/// a report that cannot be written at all stops the walk.
pub struct Driver {
    orchestrator: Orchestrator,
    report: CsvReport,
    cooldown: Duration,
}

impl Driver {
    pub fn new(client: Arc<dyn ExecutionClient>, config: &BenchConfig, report: CsvReport) -> Self {
        let dispatcher = Dispatcher::new(
            config.dispatch.concurrency,
            Duration::from_millis(config.dispatch.op_delay_ms),
        );
        Self {
            orchestrator: Orchestrator::new(client, dispatcher, config.matrix.payload),
            report,
            cooldown: Duration::from_millis(config.matrix.cooldown_ms),
        }
    }

    pub async fn run(&self, cases: &[BenchCase]) -> Result<RunTally> {
        let mut tally = RunTally::default();
        for (position, case) in cases.iter().enumerate() {
            tracing::info!(case = %case.label(), "benchmark case starting");
            match self.orchestrator.run(case).await {
                Ok(result) => {
                    self.report.record(&result)?;
                    tracing::info!(
                        case = %result.id,
                        chunks = result.chunk_count,
                        total_ms = result.total_ms,
                        total_cost = result.total_cost,
                        avg_cost_per_op = result.avg_cost_per_op,
                        "case completed"
                    );
                    tally.completed += 1;
                }
                Err(error) => {
                    tracing::error!(
                        case = %case.id(),
                        phase = ?error.phase_reached(),
                        %error,
                        "case failed, continuing with the rest of the matrix"
                    );
                    tally.failed += 1;
                }
            }
            if !self.cooldown.is_zero() && position + 1 < cases.len() {
                tokio::time::sleep(self.cooldown).await;
            }
        }
        Ok(tally)
    }
}
