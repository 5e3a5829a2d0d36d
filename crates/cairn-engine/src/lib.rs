//! cairn-engine: the transfer pipeline.
//! Dispatch, orchestration, the report sink, the matrix driver, and a
//! simulated execution target to run them against.

pub mod client;
pub mod dispatch;
pub mod driver;
pub mod report;
pub mod sim;
pub mod transfer;

pub use client::{ClientError, ExecutionClient, Receipt};
pub use dispatch::{BatchFailure, Dispatcher, WriteOp};
pub use driver::{Driver, RunTally};
pub use report::CsvReport;
pub use sim::{SimProfile, SimTarget};
pub use transfer::{Orchestrator, Phase, TransferError};
