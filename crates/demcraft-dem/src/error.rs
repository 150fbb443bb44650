//! Error types for the DEM crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with DEM data.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file for a tile does not exist.
    #[error("Tile {name} not found at {}", path.display())]
    TileNotFound {
        /// Canonical tile name (e.g. `N47E028`).
        name: String,
        /// Path that was checked.
        path: PathBuf,
    },

    /// The tile file does not have the size required by the configured format.
    #[error("Tile {name} has {actual} bytes, expected {expected} for a {side}x{side} grid")]
    InvalidTileSize {
        /// Canonical tile name.
        name: String,
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
        /// Side length of the configured format.
        side: usize,
    },

    /// Invalid tile name - cannot parse coordinates.
    #[error("Invalid tile name: {0}")]
    InvalidTileName(String),

    /// Coordinate cannot be mapped to a tile.
    #[error("Coordinate ({lat}, {lon}) is outside the valid latitude/longitude range")]
    InvalidCoordinate {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lon: f64,
    },

    /// Bounding box violates `west < east` / `south < north`.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}
