//! # demcraft-dem
//!
//! Digital Elevation Model (DEM) reader for raw SRTM `.hgt` tiles.
//!
//! ## Overview
//!
//! An `.hgt` tile is a headerless square grid of big-endian `i16` samples
//! covering one degree of latitude and longitude:
//! - 1 arc-second (3601 x 3601 samples, ~30 m)
//! - 3 arc-second (1201 x 1201 samples, ~90 m)
//!
//! Tiles are named after their southwest corner, e.g. `N47E028.hgt` covers
//! latitude 47°N to 48°N and longitude 28°E to 29°E. Row 0 is the northern
//! edge and column 0 the western edge. The value `-32768` marks a void and
//! reads as 0 meters.
//!
//! ## Example
//!
//! ```no_run
//! use demcraft_dem::{GeoBoundingBox, TileFormat, TileStore};
//!
//! let mut store = TileStore::new("dem_data", TileFormat::Srtm1);
//! let bbox = GeoBoundingBox::new(28.8, 28.9, 46.95, 47.05)?;
//! let field = store.region_elevation(&bbox, 2);
//!
//! println!(
//!     "{}x{} samples, {}..{} m",
//!     field.width(),
//!     field.height(),
//!     field.min_elevation(),
//!     field.max_elevation()
//! );
//! # Ok::<(), demcraft_dem::DemError>(())
//! ```

mod error;
mod region;
mod store;
mod tile;

pub use error::DemError;
pub use region::{ElevationField, GeoBoundingBox};
pub use store::TileStore;
pub use tile::{ElevationTile, Sample, TileFormat, TileName, NO_DATA, TILE_EXTENSION};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
