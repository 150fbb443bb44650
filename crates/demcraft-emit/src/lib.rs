//! # demcraft-emit
//!
//! Turns a [`HeightField`](demcraft_heightfield::HeightField) into a pack of
//! voxel-game function files.
//!
//! Every row of the field is run-length compressed into constant-level runs,
//! and each run becomes three `fill` commands (foundation, subsoil, surface).
//! The field is split into square chunks, one function file each, and three
//! loaders call them:
//!
//! - `load_all`: every chunk in one invocation
//! - `row_<cz>`: one chunk row
//! - `load_next` + `setup`: one chunk row per invocation, driven by a
//!   scoreboard counter that persists in the host
//!
//! The [`replay`] module interprets the emitted commands offline so packs can
//! be checked without a game host.
//!
//! ```no_run
//! use demcraft_emit::{Emitter, EmitterConfig};
//! use demcraft_heightfield::HeightField;
//! use std::path::Path;
//!
//! let field = HeightField::from_levels(2, 2, vec![64, 65, 64, 64], 64).unwrap();
//! let emitter = Emitter::new(EmitterConfig::default())?;
//! let pack = emitter.emit(&field, Path::new("behavior_pack/functions"))?;
//! println!("{} fills", pack.summary().fill_commands);
//! # Ok::<(), demcraft_emit::EmitError>(())
//! ```

mod chunk;
mod command;
mod error;
mod pack;
mod protocol;
pub mod replay;
mod rle;

pub use chunk::{ChunkBounds, ChunkCoord, ChunkGrid};
pub use command::{FillCommand, Palette, FILL_VOLUME_LIMIT};
pub use error::EmitError;
pub use pack::{
    EmitSummary, Emitter, EmitterConfig, FunctionPack, McFunction, DEFAULT_CHUNK_SIZE,
    DEFAULT_MAX_COMMANDS_PER_FILE, FUNCTION_EXTENSION, WORLD_MAX_LEVEL, WORLD_MIN_LEVEL,
};
pub use protocol::LoaderNames;
pub use replay::{verify_chunks, Host, ScoreBoard};
pub use rle::{chunk_runs, row_runs, Run, TerrainLayers, SUBSOIL_DEPTH};

/// Result type for emitter operations.
pub type Result<T> = std::result::Result<T, EmitError>;
