//! Generation settings, loaded from YAML and overridable from the command line.

use crate::RunnerError;
use demcraft_dem::{GeoBoundingBox, TileFormat};
use demcraft_emit::{
    EmitterConfig, LoaderNames, Palette, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_COMMANDS_PER_FILE,
    SUBSOIL_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one generation run needs.
///
/// Every field has a default, so a YAML file only lists what it changes:
///
/// ```yaml
/// tile_dir: dem_data
/// format: srtm3
/// bbox: { west: 28.80, east: 28.85, south: 47.00, north: 47.05 }
/// scale: 20.0
/// chunk_size: 16
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Directory holding `.hgt` tiles.
    pub tile_dir: PathBuf,
    /// Function directory of the behavior pack.
    pub output_dir: PathBuf,
    /// Resolution of every tile in `tile_dir`.
    pub format: TileFormat,
    /// Region to convert.
    pub bbox: GeoBoundingBox,
    /// Meters of elevation per block level.
    pub scale: f64,
    /// Level of the lowest measured elevation.
    pub base_level: i32,
    /// Tile samples per output cell along each axis.
    pub downsample: u32,
    /// Chunk side length in cells.
    pub chunk_size: usize,
    /// Function namespace.
    pub namespace: String,
    /// Scoreboard objective of the incremental loader.
    pub objective: String,
    /// Fake player holding the incremental loader's counter.
    pub counter_holder: String,
    /// Terrain blocks.
    pub palette: Palette,
    /// Host limit on commands per function file.
    pub max_commands_per_file: usize,
    /// Replay the written chunks and compare them with the height field.
    pub verify: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let names = LoaderNames::default();
        Self {
            tile_dir: PathBuf::from("dem_data"),
            output_dir: PathBuf::from("behavior_pack/functions"),
            format: TileFormat::default(),
            bbox: GeoBoundingBox::default(),
            scale: 30.0,
            base_level: 64,
            downsample: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            namespace: names.namespace,
            objective: names.objective,
            counter_holder: names.counter_holder,
            palette: Palette::default(),
            max_commands_per_file: DEFAULT_MAX_COMMANDS_PER_FILE,
            verify: false,
        }
    }
}

impl GenerationConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        let text = fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(RunnerError::ConfigError(format!(
                "scale must be a positive number of meters per level, got {}",
                self.scale
            )));
        }
        if self.downsample == 0 {
            return Err(RunnerError::ConfigError("downsample must be at least 1".to_string()));
        }
        if self.base_level.checked_sub(SUBSOIL_DEPTH + 1).is_none() {
            return Err(RunnerError::ConfigError(format!(
                "base_level {} leaves no room for the foundation below it",
                self.base_level
            )));
        }
        self.emitter_config().validate()?;
        Ok(())
    }

    /// Emitter settings derived from this configuration.
    pub fn emitter_config(&self) -> EmitterConfig {
        EmitterConfig {
            chunk_size: self.chunk_size,
            max_commands_per_file: self.max_commands_per_file,
            palette: self.palette.clone(),
            names: LoaderNames {
                namespace: self.namespace.clone(),
                objective: self.objective.clone(),
                counter_holder: self.counter_holder.clone(),
            },
        }
    }

    /// Angular size of one output cell in degrees.
    pub fn step_degrees(&self) -> f64 {
        self.format.step_degrees() * self.downsample as f64
    }
}
