//! Elevation tile store with lazy loading.

use crate::region::{ElevationField, GeoBoundingBox};
use crate::tile::{ElevationTile, Sample, TileFormat, TileName, TILE_EXTENSION};
use crate::{DemError, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Store for raw elevation tiles in one directory.
///
/// Tiles are read from `<dir>/<name>.hgt` on first access and kept in memory
/// for the lifetime of the store. The store is an ordinary value owned by the
/// caller; nothing is cached globally.
///
/// # Example
///
/// ```no_run
/// use demcraft_dem::{GeoBoundingBox, TileFormat, TileStore};
///
/// let mut store = TileStore::new("dem_data", TileFormat::Srtm1);
///
/// // Point query - a missing tile is an error here
/// let elevation = store.point_elevation(47.02, 28.83)?;
/// println!("Elevation: {} meters", elevation);
///
/// // Region query - missing tiles degrade to 0 m with a warning
/// let bbox = GeoBoundingBox::new(28.8, 28.9, 46.95, 47.05)?;
/// let field = store.region_elevation(&bbox, 1);
/// println!("{}x{} samples", field.width(), field.height());
/// # Ok::<(), demcraft_dem::DemError>(())
/// ```
#[derive(Debug)]
pub struct TileStore {
    /// Directory holding `.hgt` files.
    dir: PathBuf,
    /// Layout every tile in this store must have.
    format: TileFormat,
    /// Loaded tiles indexed by name.
    tiles: HashMap<TileName, ElevationTile>,
}

impl TileStore {
    /// Create a store over a tile directory. Nothing is read until queried.
    pub fn new<P: AsRef<Path>>(dir: P, format: TileFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
            tiles: HashMap::new(),
        }
    }

    /// Directory the store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Tile layout of this store.
    pub fn format(&self) -> TileFormat {
        self.format
    }

    /// Path where a tile's file is expected.
    pub fn tile_path(&self, name: TileName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Insert an already-parsed tile, replacing any cached one.
    pub fn insert_tile(&mut self, tile: ElevationTile) {
        self.tiles.insert(tile.name(), tile);
    }

    /// Load a tile, returning the cached copy if it was loaded before.
    pub fn load_tile(&mut self, name: TileName) -> Result<&ElevationTile> {
        if !self.tiles.contains_key(&name) {
            let path = self.tile_path(name);
            if !path.is_file() {
                return Err(DemError::TileNotFound {
                    name: name.to_string(),
                    path,
                });
            }

            debug!("Loading tile {} from {}", name, path.display());
            let tile = ElevationTile::from_file(&path, name, self.format)?;
            self.tiles.insert(name, tile);
        }

        self.tiles
            .get(&name)
            .ok_or_else(|| DemError::TileNotFound {
                name: name.to_string(),
                path: self.tile_path(name),
            })
    }

    /// Elevation in meters at a coordinate, using the nearest sample.
    ///
    /// Loads the owning tile on demand. A point on a whole-degree line falls
    /// back to the neighbouring tile sharing that edge; when no covering tile
    /// loads, the owning tile's error is returned. Void samples read as 0.
    pub fn point_elevation(&mut self, lat: f64, lon: f64) -> Result<f32> {
        let mut first_error = None;
        for name in TileName::covering(lat, lon)? {
            match self.load_tile(name) {
                Ok(tile) => return Ok(tile.nearest(lat, lon).meters()),
                Err(e) => {
                    debug!("No sample for ({}, {}) in {}: {}", lat, lon, name, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        Err(first_error.unwrap_or(DemError::InvalidCoordinate { lat, lon }))
    }

    /// Nearest sample among the loaded tiles covering a coordinate.
    fn loaded_sample(&self, lat: f64, lon: f64) -> Sample {
        TileName::covering(lat, lon)
            .unwrap_or_default()
            .into_iter()
            .find_map(|name| self.tiles.get(&name))
            .map_or(Sample::Missing, |tile| tile.nearest(lat, lon))
    }

    /// Sample a bounding box on a regular grid.
    ///
    /// The grid step is the format's native step times `downsample`. Every
    /// tile the box touches is loaded first; tiles that fail to load are
    /// logged and their cells become [`Sample::Missing`].
    ///
    /// # Panics
    /// Panics if `downsample` is zero.
    pub fn region_elevation(&mut self, bbox: &GeoBoundingBox, downsample: u32) -> ElevationField {
        assert!(downsample > 0, "downsample must be positive");
        let step = self.format.step_degrees() * downsample as f64;
        let (width, height) = bbox.dimensions(step);

        let needed = tiles_for_bbox(bbox);
        let mut unavailable = BTreeSet::new();
        for name in &needed {
            if let Err(e) = self.load_tile(*name) {
                warn!("Skipping tile {}: {}", name, e);
                unavailable.insert(*name);
            }
        }
        info!(
            "Sampling {}x{} grid at {:.6}° from {} tile(s) ({} unavailable)",
            width,
            height,
            step,
            needed.len(),
            unavailable.len()
        );

        let mut samples = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let (lat, lon) = bbox.cell_coordinate(step, col, row);
                samples.push(self.loaded_sample(lat, lon));
            }
        }

        // Dimensions come from the same bbox and step, so the count always matches.
        ElevationField::from_samples(*bbox, step, samples)
            .unwrap_or_else(|e| unreachable!("sample grid mismatch: {}", e))
    }

    /// Check if a tile file covering the given coordinate exists.
    ///
    /// Note: This does not check if the tile is currently loaded in memory.
    pub fn has_tile(&self, lat: f64, lon: f64) -> bool {
        TileName::covering(lat, lon)
            .unwrap_or_default()
            .into_iter()
            .any(|name| self.tile_path(name).is_file())
    }

    /// Check if a tile is currently loaded in memory.
    pub fn is_tile_loaded(&self, name: TileName) -> bool {
        self.tiles.contains_key(&name)
    }

    /// Get the number of currently loaded tiles in memory.
    pub fn loaded_tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Clear all loaded tiles from memory.
    ///
    /// The tiles can be reloaded on demand.
    pub fn clear_cache(&mut self) {
        self.tiles.clear();
    }

    /// Names of all `.hgt` tiles present in the directory, sorted.
    ///
    /// Files whose stem is not a valid tile name are ignored.
    pub fn available_tiles(&self) -> Result<Vec<TileName>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TILE_EXTENSION))
            {
                continue;
            }
            if let Some(name) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| TileName::parse(s).ok())
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Every tile a bounding box touches.
///
/// A north or east edge on a whole degree is the shared edge of the tiles
/// inside the box, so the tile beyond it is not needed.
fn tiles_for_bbox(bbox: &GeoBoundingBox) -> Vec<TileName> {
    let lat_min = bbox.south().floor() as i32;
    let lat_max = (bbox.north().ceil() as i32 - 1).max(lat_min);
    let lon_min = bbox.west().floor() as i32;
    let lon_max = (bbox.east().ceil() as i32 - 1).max(lon_min);

    let mut names = Vec::new();
    for lat in lat_min..=lat_max {
        for lon in lon_min..=lon_max {
            // Degrees outside the tile grid have no tile
            if let Ok(name) = TileName::new(lat, lon) {
                names.push(name);
            }
        }
    }
    names
}
