//! cairn-bench: command-line driver for the cairn transfer benchmark.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use cairn_core::config::BenchConfig;
use cairn_engine::{CsvReport, Driver, SimProfile, SimTarget};

// ── Subcommand handlers ───────────────────────────────────────────────────────

async fn cmd_run(config: BenchConfig, json: bool) -> Result<()> {
    let cases = config.cases();
    if cases.is_empty() {
        anyhow::bail!("benchmark matrix is empty: configure at least one total and one chunk size");
    }

    let target = Arc::new(SimTarget::new(SimProfile::from(&config.target)));
    let report = CsvReport::open(&config.report.output_dir, &config.report.filename)?;
    let report_path = report.path().to_path_buf();
    let driver = Driver::new(target, &config, report);

    tracing::info!(
        cases = cases.len(),
        concurrency = config.dispatch.concurrency,
        report = %report_path.display(),
        "benchmark starting"
    );
    let tally = driver.run(&cases).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "cases": tally.total(),
                "completed": tally.completed,
                "failed": tally.failed,
                "report": report_path.display().to_string(),
            })
        );
    } else {
        println!("═══════════════════════════════════════");
        println!("  Benchmark Summary");
        println!("═══════════════════════════════════════");
        println!("  Cases run : {}", tally.total());
        println!("  Completed : {}", tally.completed);
        println!("  Failed    : {}", tally.failed);
        println!("  Report    : {}", report_path.display());
    }

    if tally.completed == 0 && tally.failed > 0 {
        anyhow::bail!("every benchmark case failed");
    }
    Ok(())
}

fn cmd_config(config: &BenchConfig, explicit_path: Option<&PathBuf>) -> Result<()> {
    match explicit_path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# {}", BenchConfig::file_path().display()),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_usage() {
    println!("Usage: cairn-bench [options] <command>");
    println!();
    println!("Commands:");
    println!("  run       Run the benchmark matrix (default)");
    println!("  config    Print the resolved configuration");
    println!();
    println!("Options:");
    println!("  --config <path>     Load configuration from an explicit file");
    println!("  --concurrency <n>   Override dispatch concurrency");
    println!("  --delay-ms <ms>     Override the per-worker write delay");
    println!("  --out <dir>         Override the report output directory");
    println!("  --json              Print the run summary as JSON");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut config_path: Option<PathBuf> = None;
    let mut concurrency: Option<usize> = None;
    let mut delay_ms: Option<u64> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut json = false;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(
                    args.get(i).context("--config requires a path")?,
                ));
            }
            "--concurrency" => {
                i += 1;
                concurrency = Some(
                    args.get(i)
                        .context("--concurrency requires a value")?
                        .parse()
                        .context("--concurrency must be a number")?,
                );
            }
            "--delay-ms" => {
                i += 1;
                delay_ms = Some(
                    args.get(i)
                        .context("--delay-ms requires a value")?
                        .parse()
                        .context("--delay-ms must be a number")?,
                );
            }
            "--out" => {
                i += 1;
                out_dir = Some(PathBuf::from(
                    args.get(i).context("--out requires a directory")?,
                ));
            }
            "--json" => json = true,
            _ => remaining.push(&args[i]),
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => BenchConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            if let Err(e) = BenchConfig::write_default_if_missing() {
                tracing::warn!(error = %e, "failed to write default config");
            }
            BenchConfig::load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                BenchConfig::default()
            })
        }
    };
    if let Some(k) = concurrency {
        config.dispatch.concurrency = k;
    }
    if let Some(ms) = delay_ms {
        config.dispatch.op_delay_ms = ms;
    }
    if let Some(dir) = out_dir {
        config.report.output_dir = dir;
    }

    match remaining.as_slice() {
        ["run"] | [] => cmd_run(config, json).await,
        ["config"] => cmd_config(&config, config_path.as_ref()),
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
