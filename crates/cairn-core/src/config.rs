//! Configuration for the cairn benchmark driver.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $CAIRN_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/cairn/config.toml
//!   3. ~/.config/cairn/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bench::BenchCase;
use crate::payload::PayloadKind;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub matrix: MatrixConfig,
    pub dispatch: DispatchConfig,
    pub target: TargetConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Payload sizes to benchmark, in bytes.
    pub total_sizes: Vec<usize>,
    /// Chunk size ceilings to benchmark, in bytes. Every payload size
    /// is run against every chunk size.
    pub chunk_sizes: Vec<usize>,
    /// Payload flavor uploaded in every run.
    pub payload: PayloadKind,
    /// Pause between cases, letting the target settle. 0 = none.
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Max chunk writes in flight at once. 0 is treated as 1.
    pub concurrency: usize,
    /// Pause a worker takes after each completed write, in ms.
    pub op_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Cost charged for provisioning fresh storage.
    pub deploy_cost: u64,
    /// Flat cost per chunk write.
    pub write_base_cost: u64,
    /// Additional cost per byte written.
    pub write_byte_cost: u64,
    /// Simulated round-trip per write, in ms. 0 = immediate.
    pub write_delay_ms: u64,
    /// Simulated round-trip per read, in ms. 0 = immediate.
    pub read_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the report lives in. Created on first use.
    pub output_dir: PathBuf,
    /// Report file name inside `output_dir`.
    pub filename: String,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

const KILOBYTE: usize = 1024;
const MEGABYTE: usize = 1024 * KILOBYTE;

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            matrix: MatrixConfig::default(),
            dispatch: DispatchConfig::default(),
            target: TargetConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            total_sizes: vec![
                100 * KILOBYTE,
                500 * KILOBYTE,
                MEGABYTE,
                5 * MEGABYTE,
                10 * MEGABYTE,
            ],
            chunk_sizes: vec![24 * KILOBYTE],
            payload: PayloadKind::Repeated,
            cooldown_ms: 2000,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            op_delay_ms: 100,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            deploy_cost: 500_000,
            write_base_cost: 21_000,
            write_byte_cost: 16,
            write_delay_ms: 0,
            read_delay_ms: 0,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("bench-results"),
            filename: "benchmark_results.csv".to_string(),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("cairn")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl BenchConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            BenchConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, skipping the usual lookup. Env
    /// overrides still apply on top.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        let mut config: BenchConfig =
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("CAIRN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&BenchConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Render the resolved configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)
    }

    /// The benchmark matrix in execution order: payload sizes outer,
    /// chunk sizes inner.
    pub fn cases(&self) -> Vec<BenchCase> {
        let mut cases =
            Vec::with_capacity(self.matrix.total_sizes.len() * self.matrix.chunk_sizes.len());
        for &total in &self.matrix.total_sizes {
            for &chunk in &self.matrix.chunk_sizes {
                cases.push(BenchCase::new(total, chunk));
            }
        }
        cases
    }

    /// Apply CAIRN_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CAIRN_MATRIX__PAYLOAD") {
            if let Some(kind) = parse_payload_kind(&v) {
                self.matrix.payload = kind;
            }
        }
        if let Ok(v) = std::env::var("CAIRN_MATRIX__COOLDOWN_MS") {
            if let Ok(ms) = v.parse() {
                self.matrix.cooldown_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("CAIRN_DISPATCH__CONCURRENCY") {
            if let Ok(k) = v.parse() {
                self.dispatch.concurrency = k;
            }
        }
        if let Ok(v) = std::env::var("CAIRN_DISPATCH__OP_DELAY_MS") {
            if let Ok(ms) = v.parse() {
                self.dispatch.op_delay_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("CAIRN_REPORT__OUTPUT_DIR") {
            self.report.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CAIRN_REPORT__FILENAME") {
            self.report.filename = v;
        }
    }
}

fn parse_payload_kind(value: &str) -> Option<PayloadKind> {
    match value.to_ascii_lowercase().as_str() {
        "repeated" => Some(PayloadKind::Repeated),
        "random" => Some(PayloadKind::Random),
        _ => None,
    }
}
