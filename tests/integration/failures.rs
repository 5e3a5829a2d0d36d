//! Fault injection: every failure mode surfaces with the right phase,
//! and the driver keeps walking the matrix past a failed case.

use std::sync::Arc;

use cairn_core::bench::BenchCase;
use cairn_engine::{CsvReport, Driver, Phase, RunTally, SimProfile, SimTarget, TransferError};

use crate::{orchestrator_over, quick_config, read_report, temp_report_dir};

/// A corrupted chunk comes back with the right length, so only the
/// byte-level comparison can catch it.
#[tokio::test]
async fn corrupted_read_fails_verification() {
    let target = Arc::new(SimTarget::new(SimProfile::default()).with_corrupt_read(2));
    let orchestrator = orchestrator_over(&target, 5);

    let error = orchestrator
        .run(&BenchCase::new(100_000, 23 * 1024))
        .await
        .unwrap_err();

    assert_eq!(error.phase_reached(), Phase::Downloaded);
    match error {
        TransferError::Verification {
            expected_len,
            actual_len,
            expected_digest,
            actual_digest,
        } => {
            assert_eq!(expected_len, 100_000);
            assert_eq!(actual_len, 100_000);
            assert_ne!(expected_digest, actual_digest);
        }
        other => panic!("expected verification failure, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_write_halts_the_upload() {
    let target = Arc::new(SimTarget::new(SimProfile::default()).with_rejected_write(5));
    let orchestrator = orchestrator_over(&target, 2);

    let error = orchestrator
        .run(&BenchCase::new(10 * 1024, 1024))
        .await
        .unwrap_err();

    assert_eq!(error.phase_reached(), Phase::Deployed);
    match error {
        TransferError::Upload {
            failing_index,
            receipts,
            ..
        } => {
            assert_eq!(failing_index, 5);
            assert_eq!(receipts.len(), 10);
            for receipt in receipts[..5].iter() {
                assert!(receipt.as_ref().is_some_and(|r| r.success));
            }
            assert!(receipts[5].as_ref().is_some_and(|r| !r.success));
            // At most one straggler claim while the halt propagates.
            assert!(receipts[6..].iter().flatten().count() <= 1);
        }
        other => panic!("expected upload failure, got {other:?}"),
    }
}

/// The target acknowledges the write but never stores it; the count
/// check after upload is what catches the hole.
#[tokio::test]
async fn lost_write_surfaces_as_count_mismatch() {
    let target = Arc::new(SimTarget::new(SimProfile::default()).with_lost_write(1));
    let orchestrator = orchestrator_over(&target, 3);

    let error = orchestrator
        .run(&BenchCase::new(5 * 1024, 1024))
        .await
        .unwrap_err();

    assert_eq!(error.phase_reached(), Phase::Uploaded);
    match error {
        TransferError::CountMismatch { sent, stored } => {
            assert_eq!(sent, 5);
            assert_eq!(stored, 4);
        }
        other => panic!("expected count mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_deploy_stops_the_run_before_any_write() {
    let target = Arc::new(SimTarget::new(SimProfile::default()).with_failing_deploy());
    let orchestrator = orchestrator_over(&target, 3);

    let error = orchestrator
        .run(&BenchCase::new(4096, 1024))
        .await
        .unwrap_err();

    assert!(matches!(error, TransferError::Deploy { .. }));
    assert_eq!(error.phase_reached(), Phase::Preprocessed);
    assert_eq!(target.stored_chunks(), 0);
}

#[tokio::test]
async fn driver_walks_past_a_failed_case() {
    let dir = temp_report_dir("walk-past");
    // The failing 12 KB case sits in the middle of the matrix.
    let config = quick_config(&dir, vec![4096, 12 * 1024, 8192], vec![1024]);
    // Chunk 9 exists only in the 12 KB case; the smaller cases pass.
    let target = Arc::new(SimTarget::new(SimProfile::default()).with_corrupt_read(9));
    let report = CsvReport::open(&dir, "results.csv").unwrap();
    let driver = Driver::new(
        Arc::clone(&target) as Arc<dyn cairn_engine::ExecutionClient>,
        &config,
        report,
    );

    let tally = driver.run(&config.cases()).await.unwrap();
    assert_eq!(
        tally,
        RunTally {
            completed: 2,
            failed: 1
        }
    );

    // Only the passing cases produced rows.
    let (_, rows) = read_report(&dir, "results.csv");
    let ids: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, ["4KB_1KB", "8KB_1KB"]);

    let _ = std::fs::remove_dir_all(&dir);
}
