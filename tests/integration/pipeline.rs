//! Full-pipeline benchmark runs against the simulated target.

use std::sync::Arc;
use std::time::Duration;

use cairn_core::bench::BenchCase;
use cairn_core::payload::PayloadKind;
use cairn_engine::report::COLUMNS;
use cairn_engine::{
    CsvReport, Dispatcher, Driver, Orchestrator, RunTally, SimProfile, SimTarget,
};

use crate::{orchestrator_over, quick_config, read_report, temp_report_dir};

#[tokio::test]
async fn hundred_kilobyte_run_reports_five_chunks() {
    let dir = temp_report_dir("five-chunks");
    let config = quick_config(&dir, vec![100_000], vec![23 * 1024]);
    let report = CsvReport::open(&dir, "results.csv").unwrap();
    let driver = Driver::new(
        Arc::new(SimTarget::new(SimProfile::default())),
        &config,
        report,
    );

    let tally = driver.run(&config.cases()).await.unwrap();
    assert_eq!(
        tally,
        RunTally {
            completed: 1,
            failed: 0
        }
    );

    let (header, rows) = read_report(&dir, "results.csv");
    assert_eq!(header, COLUMNS.to_vec());
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row[0], "98KB_23KB");
    assert_eq!(row[2], "100000");
    assert_eq!(row[3], "23552");
    assert_eq!(row[4], "5");
    // Deploy 500_000, five write bases of 21_000, 16 per byte.
    assert_eq!(row[9], "2205000");
    assert_eq!(row[10], "367500");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn matrix_runs_in_declared_order() {
    let dir = temp_report_dir("matrix-order");
    let config = quick_config(&dir, vec![4096, 8192], vec![1024, 2048]);
    let report = CsvReport::open(&dir, "results.csv").unwrap();
    let driver = Driver::new(
        Arc::new(SimTarget::new(SimProfile::default())),
        &config,
        report,
    );

    let tally = driver.run(&config.cases()).await.unwrap();
    assert_eq!(tally.completed, 4);

    let (_, rows) = read_report(&dir, "results.csv");
    let ids: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, ["4KB_1KB", "4KB_2KB", "8KB_1KB", "8KB_2KB"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn repeated_invocations_share_one_header() {
    let dir = temp_report_dir("reopen");
    let config = quick_config(&dir, vec![2048], vec![1024]);
    let target = Arc::new(SimTarget::new(SimProfile::default()));

    for _ in 0..2 {
        let report = CsvReport::open(&dir, "results.csv").unwrap();
        let driver = Driver::new(
            Arc::clone(&target) as Arc<dyn cairn_engine::ExecutionClient>,
            &config,
            report,
        );
        driver.run(&config.cases()).await.unwrap();
    }

    let text = std::fs::read_to_string(dir.join("results.csv")).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("ID,")).count(), 1);
    assert_eq!(text.lines().count(), 3);

    let (_, rows) = read_report(&dir, "results.csv");
    assert_eq!(rows[0][0], "2KB_1KB");
    assert_eq!(rows[1][0], "2KB_1KB");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn random_payload_round_trips_with_uneven_chunks() {
    let target = Arc::new(SimTarget::new(SimProfile::default()));
    let orchestrator = Orchestrator::new(
        Arc::clone(&target) as Arc<dyn cairn_engine::ExecutionClient>,
        Dispatcher::new(3, Duration::ZERO),
        PayloadKind::Random,
    );

    // 768 does not divide 10_000; the last chunk is a remainder.
    let result = orchestrator
        .run(&BenchCase::new(10_000, 768))
        .await
        .expect("random payload should verify");

    assert!(result.verified);
    assert_eq!(result.chunk_count, 14);
    assert_eq!(result.total_cost, 500_000 + 14 * 21_000 + 16 * 10_000);
    assert_eq!(result.avg_cost_per_op, result.total_cost / 15);
}

#[tokio::test]
async fn dispatch_width_caps_writes_in_flight() {
    let profile = SimProfile {
        write_delay: Duration::from_millis(10),
        ..SimProfile::default()
    };
    let target = Arc::new(SimTarget::new(profile));
    let orchestrator = orchestrator_over(&target, 4);

    orchestrator
        .run(&BenchCase::new(12 * 1024, 1024))
        .await
        .expect("run should verify");

    assert!(target.peak_in_flight() <= 4);
    assert!(target.peak_in_flight() >= 2, "writes never overlapped");
}
