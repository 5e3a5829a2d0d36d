//! cairn-core: payload chunking, benchmark data model, and configuration.
//! The engine and CLI crates both depend on this one.

pub mod bench;
pub mod chunk;
pub mod config;
pub mod payload;

pub use bench::{BenchCase, PhaseTimings, RunResult};
pub use chunk::{split, Chunk, ChunkError};
pub use payload::PayloadKind;
