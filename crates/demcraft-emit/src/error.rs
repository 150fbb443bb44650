//! Error types for the emitter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while emitting or replaying function files.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Writing an output file or directory failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Emitter settings are unusable.
    #[error("Invalid emitter configuration: {0}")]
    InvalidConfig(String),

    /// A single fill would exceed the host's block volume limit.
    #[error(
        "Fill of {volume} blocks exceeds the limit of {limit}; use a smaller chunk size or scale"
    )]
    FillTooLarge {
        /// Blocks covered by the fill.
        volume: u64,
        /// Host limit.
        limit: u64,
    },

    /// A command line could not be parsed.
    #[error("Cannot parse command `{line}`: {reason}")]
    Parse {
        /// Offending line.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Replay referenced a function that does not exist.
    #[error("Unknown function {0}")]
    UnknownFunction(String),

    /// Replayed terrain differs from the height field.
    #[error("Verification failed at ({x}, {z}): {reason}")]
    VerificationFailed {
        /// Column.
        x: usize,
        /// Row.
        z: usize,
        /// Description of the mismatch.
        reason: String,
    },
}

impl EmitError {
    pub(crate) fn parse(line: &str, reason: impl Into<String>) -> Self {
        EmitError::Parse {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
