//! Append-only CSV report.
//!
//! One row per completed run. The header is written once, when the
//! file is first created; later invocations append below whatever is
//! already there. Rows are never rewritten or reordered.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cairn_core::bench::RunResult;

/// The fixed column set, in emission order.
pub const COLUMNS: [&str; 11] = [
    "ID",
    "TestCase",
    "TotalSizeBytes",
    "ChunkSizeBytes",
    "ChunkCount",
    "PreprocessMs",
    "UploadMs",
    "DownloadMs",
    "TotalMs",
    "TotalCost",
    "AvgCostPerOp",
];

/// Append-only CSV report file.
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    /// Open (or create) the report at `dir/filename`.
    ///
    /// The header row is emitted only when the file does not exist yet,
    /// so repeated invocations accumulate rows under a single header.
    pub fn open(dir: impl AsRef<Path>, filename: &str) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create report directory {}", dir.display()))?;

        let path = dir.join(filename);
        if !path.exists() {
            let file = File::create(&path)
                .with_context(|| format!("failed to create report {}", path.display()))?;
            let mut writer = csv::Writer::from_writer(file);
            writer
                .write_record(COLUMNS)
                .context("failed to write report header")?;
            writer.flush().context("failed to flush report header")?;
        }
        Ok(Self { path })
    }

    /// The fixed column ordering.
    pub fn header() -> [&'static str; 11] {
        COLUMNS
    }

    /// Append one result row.
    pub fn record(&self, result: &RunResult) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open report {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let fields: [String; 11] = [
            result.id.clone(),
            result.test_case.clone(),
            result.total_bytes.to_string(),
            result.chunk_bytes.to_string(),
            result.chunk_count.to_string(),
            result.preprocess_ms.to_string(),
            result.upload_ms.to_string(),
            result.download_ms.to_string(),
            result.total_ms.to_string(),
            result.total_cost.to_string(),
            result.avg_cost_per_op.to_string(),
        ];
        writer
            .write_record(&fields)
            .with_context(|| format!("failed to append row for {}", result.id))?;
        writer.flush().context("failed to flush report row")?;
        Ok(())
    }

    /// Where rows are being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
