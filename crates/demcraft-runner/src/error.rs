//! Error types for the runner.

use demcraft_dem::DemError;
use demcraft_emit::EmitError;
use demcraft_heightfield::HeightFieldError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop a generation run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("DEM error: {0}")]
    Dem(#[from] DemError),

    #[error("No elevation data for the region: no tile under {} covers it", tile_dir.display())]
    NoElevationData { tile_dir: PathBuf },

    #[error("Height field error: {0}")]
    HeightField(HeightFieldError),

    #[error("Emit error: {0}")]
    Emit(EmitError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

impl From<EmitError> for RunnerError {
    fn from(err: EmitError) -> Self {
        match err {
            EmitError::VerificationFailed { .. } => {
                RunnerError::VerificationFailed(err.to_string())
            }
            EmitError::InvalidConfig(msg) => RunnerError::ConfigError(msg),
            other => RunnerError::Emit(other),
        }
    }
}

impl From<HeightFieldError> for RunnerError {
    fn from(err: HeightFieldError) -> Self {
        match err {
            HeightFieldError::LevelOverflow { .. } => RunnerError::ConfigError(err.to_string()),
            other => RunnerError::HeightField(other),
        }
    }
}
