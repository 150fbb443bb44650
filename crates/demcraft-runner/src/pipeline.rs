//! The end-to-end generation run.

use crate::{GenerationConfig, Result, RunnerError};
use demcraft_dem::TileStore;
use demcraft_emit::{verify_chunks, EmitSummary, Emitter, Host};
use demcraft_heightfield::HeightFieldBuilder;
use tracing::{info, warn};

/// What a run produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Cells along the west-east axis.
    pub width: usize,
    /// Cells along the north-south axis.
    pub length: usize,
    /// Lowest measured elevation in meters.
    pub min_elevation: f32,
    /// Highest measured elevation in meters.
    pub max_elevation: f32,
    /// Lowest block level.
    pub min_level: i32,
    /// Highest block level.
    pub max_level: i32,
    /// Cells whose sample was a void.
    pub no_data_cells: usize,
    /// Cells whose tile could not be loaded.
    pub missing_cells: usize,
    /// Emission statistics.
    pub emit: EmitSummary,
    /// Function files written.
    pub files_written: usize,
    /// Cells checked by replay, when verification ran.
    pub verified_cells: Option<usize>,
}

/// Convert the configured region into function files.
pub fn run(config: &GenerationConfig) -> Result<RunSummary> {
    config.validate()?;
    let bbox = config.bbox;
    info!(
        "Converting region west={} east={} south={} north={} from {} ({:?}, downsample {})",
        bbox.west(),
        bbox.east(),
        bbox.south(),
        bbox.north(),
        config.tile_dir.display(),
        config.format,
        config.downsample
    );

    let mut store = TileStore::new(&config.tile_dir, config.format);
    let elevation = store.region_elevation(&bbox, config.downsample);
    info!(
        "Elevation field {}x{}, {:.1}..{:.1} m",
        elevation.width(),
        elevation.height(),
        elevation.min_elevation(),
        elevation.max_elevation()
    );
    if elevation.measured_cells() == 0 && elevation.missing_cells() > 0 {
        return Err(RunnerError::NoElevationData {
            tile_dir: config.tile_dir.clone(),
        });
    }
    if elevation.missing_cells() > 0 {
        warn!(
            "{} of {} cells have no tile and are placed at the base level",
            elevation.missing_cells(),
            elevation.width() * elevation.height()
        );
    }
    if elevation.no_data_cells() > 0 {
        info!("{} cells are voids in the source data", elevation.no_data_cells());
    }

    let heights = HeightFieldBuilder::new(config.scale, config.base_level).build(&elevation)?;
    info!(
        "Height field levels {}..={} ({} distinct, {} m per level)",
        heights.min_level(),
        heights.max_level(),
        heights.distinct_levels(),
        config.scale
    );

    let emitter = Emitter::new(config.emitter_config())?;
    let pack = emitter.render(&heights)?;
    let files_written = pack.write_to(&config.output_dir, &emitter.config().names)?;
    let emit = pack.summary();
    info!(
        "Emitted {} fills from {} runs in {} chunk(s) and {} row(s); \
         largest chunk {} commands, largest row {} commands",
        emit.fill_commands,
        emit.runs,
        emit.chunk_files,
        emit.row_files,
        emit.largest_chunk_commands,
        emit.largest_row_commands
    );

    let verified_cells = if config.verify {
        let names = &emitter.config().names;
        let mut host = Host::load_dir(&config.output_dir, &names.namespace)?;
        let layers = emitter.layers(&heights);
        let cells = verify_chunks(&mut host, &heights, &layers, &pack.grid(), names)?;
        info!("Verified {} cells against the written chunks", cells);
        Some(cells)
    } else {
        None
    };

    Ok(RunSummary {
        width: heights.width(),
        length: heights.length(),
        min_elevation: elevation.min_elevation(),
        max_elevation: elevation.max_elevation(),
        min_level: heights.min_level(),
        max_level: heights.max_level(),
        no_data_cells: elevation.no_data_cells(),
        missing_cells: elevation.missing_cells(),
        emit,
        files_written,
        verified_cells,
    })
}
