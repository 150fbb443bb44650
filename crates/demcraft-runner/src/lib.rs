//! # demcraft-runner
//!
//! Configuration and the end-to-end pipeline behind the `demcraft` binary:
//! SRTM tiles → elevation field → height field → function pack on disk.

mod config;
mod error;
mod pipeline;

pub use config::GenerationConfig;
pub use error::RunnerError;
pub use pipeline::{run, RunSummary};

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
