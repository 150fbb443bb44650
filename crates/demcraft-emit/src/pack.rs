//! Function packs: rendering a height field and writing it to disk.

use crate::chunk::{ChunkCoord, ChunkGrid};
use crate::command::{Palette, FILL_VOLUME_LIMIT};
use crate::protocol::LoaderNames;
use crate::rle::{chunk_runs, TerrainLayers, SUBSOIL_DEPTH};
use crate::EmitError;
use demcraft_heightfield::HeightField;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File extension of function files.
pub const FUNCTION_EXTENSION: &str = "mcfunction";

/// Commands a single function file may hold on the host.
pub const DEFAULT_MAX_COMMANDS_PER_FILE: usize = 10_000;

/// Default chunk side length.
///
/// A fully fragmented 32x32 chunk emits 3072 fills, well under the per-file
/// limit, and one chunk row stays small enough for a single invocation.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Lowest and highest buildable levels of the host world.
pub const WORLD_MIN_LEVEL: i32 = -64;
/// See [`WORLD_MIN_LEVEL`].
pub const WORLD_MAX_LEVEL: i32 = 319;

/// Emitter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Chunk side length in cells.
    pub chunk_size: usize,
    /// Upper bound on commands in one function file.
    pub max_commands_per_file: usize,
    /// Blocks for the terrain layers.
    pub palette: Palette,
    /// Function and scoreboard names.
    pub names: LoaderNames,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_commands_per_file: DEFAULT_MAX_COMMANDS_PER_FILE,
            palette: Palette::default(),
            names: LoaderNames::default(),
        }
    }
}

impl EmitterConfig {
    /// Reject settings that cannot produce valid function files.
    pub fn validate(&self) -> Result<(), EmitError> {
        if self.chunk_size == 0 {
            return Err(EmitError::InvalidConfig("chunk size must be positive".to_string()));
        }
        let worst_case = self.chunk_size.saturating_mul(self.chunk_size).saturating_mul(3);
        if worst_case > self.max_commands_per_file {
            return Err(EmitError::InvalidConfig(format!(
                "a {0}x{0} chunk can need {1} commands, more than the limit of {2}",
                self.chunk_size, worst_case, self.max_commands_per_file
            )));
        }
        self.palette.validate()?;
        self.names.validate()
    }
}

/// One function file: its name (without extension) and its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McFunction {
    /// Name such as `terrain/chunk_0_0`.
    pub name: String,
    /// Commands and comments, one per line.
    pub lines: Vec<String>,
}

impl McFunction {
    /// Lines that are commands rather than comments or blanks.
    pub fn command_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .count()
    }

    /// Path of this function below an output directory.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.name, FUNCTION_EXTENSION))
    }
}

/// Statistics about an emitted pack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Chunk function files.
    pub chunk_files: usize,
    /// Row function files.
    pub row_files: usize,
    /// Constant-level runs found.
    pub runs: usize,
    /// Fill commands across all chunks.
    pub fill_commands: usize,
    /// Commands in the largest chunk file.
    pub largest_chunk_commands: usize,
    /// Fill commands executed by the heaviest `load_next` invocation.
    pub largest_row_commands: usize,
}

/// All function files for one height field.
#[derive(Debug, Clone)]
pub struct FunctionPack {
    functions: Vec<McFunction>,
    summary: EmitSummary,
    grid: ChunkGrid,
}

impl FunctionPack {
    /// Every function, chunks first, then rows and loaders.
    pub fn functions(&self) -> &[McFunction] {
        &self.functions
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<&McFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Emission statistics.
    pub fn summary(&self) -> EmitSummary {
        self.summary
    }

    /// Chunk layout the pack was built with.
    pub fn grid(&self) -> ChunkGrid {
        self.grid
    }

    /// Write every function below `dir`.
    ///
    /// Function files left in the namespace directory by an earlier run are
    /// removed first so stale chunks cannot be called. Returns the number of
    /// files written.
    pub fn write_to(&self, dir: &Path, names: &LoaderNames) -> Result<usize, EmitError> {
        let ns_dir = dir.join(&names.namespace);
        fs::create_dir_all(&ns_dir).map_err(|source| EmitError::Io {
            path: ns_dir.clone(),
            source,
        })?;
        let removed = remove_stale_functions(&ns_dir)?;
        if removed > 0 {
            debug!("Removed {} stale function file(s) from {}", removed, ns_dir.display());
        }

        for function in &self.functions {
            let path = function.path_in(dir);
            let mut contents = function.lines.join("\n");
            contents.push('\n');
            fs::write(&path, contents).map_err(|source| EmitError::Io {
                path: path.clone(),
                source,
            })?;
        }
        info!(
            "Wrote {} function file(s) to {}",
            self.functions.len(),
            ns_dir.display()
        );
        Ok(self.functions.len())
    }
}

fn remove_stale_functions(ns_dir: &Path) -> Result<usize, EmitError> {
    let io_err = |source| EmitError::Io {
        path: ns_dir.to_path_buf(),
        source,
    };
    let mut removed = 0;
    for entry in fs::read_dir(ns_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == FUNCTION_EXTENSION) {
            fs::remove_file(&path).map_err(|source| EmitError::Io {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Turns height fields into function packs.
#[derive(Debug, Clone)]
pub struct Emitter {
    config: EmitterConfig,
}

impl Emitter {
    /// Create an emitter after validating its configuration.
    pub fn new(config: EmitterConfig) -> Result<Self, EmitError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Emitter settings.
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Layer layout this emitter uses for a field.
    pub fn layers(&self, field: &HeightField) -> TerrainLayers {
        TerrainLayers::for_field(field, self.config.palette.clone())
    }

    /// Build all function files for a height field in memory.
    pub fn render(&self, field: &HeightField) -> Result<FunctionPack, EmitError> {
        let names = &self.config.names;
        let grid = ChunkGrid::new(field.width(), field.length(), self.config.chunk_size);
        let layers = self.layers(field);

        if field.min_level().checked_sub(SUBSOIL_DEPTH + 1).is_none() {
            return Err(EmitError::InvalidConfig(format!(
                "lowest level {} leaves no room for the foundation below it",
                field.min_level()
            )));
        }
        let out_of_world =
            layers.floor() < WORLD_MIN_LEVEL || field.max_level() > WORLD_MAX_LEVEL;
        if !field.is_empty() && out_of_world {
            warn!(
                "Terrain spans levels {}..={}, outside the buildable range {}..={}",
                layers.floor(),
                field.max_level(),
                WORLD_MIN_LEVEL,
                WORLD_MAX_LEVEL
            );
        }

        let mut summary = EmitSummary::default();
        let mut functions = Vec::with_capacity(grid.len() + grid.rows() + 3);
        let mut row_commands = vec![0usize; grid.rows()];

        for coord in grid.iter() {
            let function = self.chunk_function(field, &grid, &layers, coord, &mut summary)?;
            let commands = function.lines.len();
            if commands > self.config.max_commands_per_file {
                return Err(EmitError::InvalidConfig(format!(
                    "chunk {} needs {} commands, more than the limit of {}",
                    function.name, commands, self.config.max_commands_per_file
                )));
            }
            summary.largest_chunk_commands = summary.largest_chunk_commands.max(commands);
            row_commands[coord.cz] += commands;
            functions.push(function);
        }
        summary.chunk_files = grid.len();
        summary.largest_row_commands = row_commands.iter().copied().max().unwrap_or(0);

        for cz in 0..grid.rows() {
            functions.push(McFunction {
                name: names.row_function(cz),
                lines: names.row_script(&grid, cz),
            });
        }
        summary.row_files = grid.rows();

        functions.push(McFunction {
            name: names.load_all_function(),
            lines: names.load_all_script(&grid, field.width(), field.length()),
        });
        functions.push(McFunction {
            name: names.load_next_function(),
            lines: names.load_next_script(&grid),
        });
        functions.push(McFunction {
            name: names.setup_function(),
            lines: names.setup_script(&grid),
        });

        debug!(
            "Rendered {} runs into {} fills across {} chunk(s)",
            summary.runs, summary.fill_commands, summary.chunk_files
        );
        Ok(FunctionPack {
            functions,
            summary,
            grid,
        })
    }

    /// Render a height field and write it below `dir`.
    pub fn emit(&self, field: &HeightField, dir: &Path) -> Result<FunctionPack, EmitError> {
        let pack = self.render(field)?;
        pack.write_to(dir, &self.config.names)?;
        Ok(pack)
    }

    fn chunk_function(
        &self,
        field: &HeightField,
        grid: &ChunkGrid,
        layers: &TerrainLayers,
        coord: ChunkCoord,
        summary: &mut EmitSummary,
    ) -> Result<McFunction, EmitError> {
        let runs = chunk_runs(field, &grid.bounds(coord));
        let mut lines = Vec::with_capacity(runs.len() * 3);
        for run in &runs {
            for fill in layers.fills(run) {
                let volume = fill.volume();
                if volume > FILL_VOLUME_LIMIT {
                    return Err(EmitError::FillTooLarge {
                        volume,
                        limit: FILL_VOLUME_LIMIT,
                    });
                }
                lines.push(fill.to_string());
            }
        }
        summary.runs += runs.len();
        summary.fill_commands += lines.len();
        Ok(McFunction {
            name: self.config.names.chunk_function(coord),
            lines,
        })
    }
}
