//! Geographic bounding boxes and materialized elevation fields.

use crate::tile::Sample;
use crate::{DemError, Result};
use serde::{Deserialize, Serialize};

/// Geographic bounding box in decimal degrees.
///
/// Always satisfies `west < east` and `south < north`; the only way to build
/// one is through [`GeoBoundingBox::new`] (deserialization goes through it too).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundingBoxSpec")]
pub struct GeoBoundingBox {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

/// Unvalidated bounding box as it appears in configuration files.
#[derive(Debug, Deserialize)]
struct BoundingBoxSpec {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl TryFrom<BoundingBoxSpec> for GeoBoundingBox {
    type Error = DemError;

    fn try_from(spec: BoundingBoxSpec) -> Result<Self> {
        GeoBoundingBox::new(spec.west, spec.east, spec.south, spec.north)
    }
}

/// A 0.05° square inside tile `N47E028`.
impl Default for GeoBoundingBox {
    fn default() -> Self {
        Self {
            west: 28.80,
            east: 28.85,
            south: 47.00,
            north: 47.05,
        }
    }
}

impl GeoBoundingBox {
    /// Create a bounding box, rejecting degenerate or non-finite extents.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Result<Self> {
        if ![west, east, south, north].iter().all(|v| v.is_finite()) {
            return Err(DemError::InvalidBoundingBox(
                "coordinates must be finite".to_string(),
            ));
        }
        if west >= east {
            return Err(DemError::InvalidBoundingBox(format!(
                "west ({}) must be less than east ({})",
                west, east
            )));
        }
        if south >= north {
            return Err(DemError::InvalidBoundingBox(format!(
                "south ({}) must be less than north ({})",
                south, north
            )));
        }
        if south < -90.0 || north > 90.0 || west < -180.0 || east > 180.0 {
            return Err(DemError::InvalidBoundingBox(format!(
                "({}, {}, {}, {}) exceeds the latitude/longitude range",
                west, east, south, north
            )));
        }
        Ok(Self {
            west,
            east,
            south,
            north,
        })
    }

    /// Western edge.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Eastern edge.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Southern edge.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Northern edge.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Grid dimensions `(width, height)` when sampled at `step` degrees.
    pub fn dimensions(&self, step: f64) -> (usize, usize) {
        let width = ((self.east - self.west) / step).ceil() as usize;
        let height = ((self.north - self.south) / step).ceil() as usize;
        (width, height)
    }

    /// Geographic coordinate `(lat, lon)` of grid cell `(col, row)`.
    ///
    /// Rows walk north to south and columns west to east.
    pub fn cell_coordinate(&self, step: f64, col: usize, row: usize) -> (f64, f64) {
        (
            self.north - row as f64 * step,
            self.west + col as f64 * step,
        )
    }
}

/// A rectangular elevation extraction over a bounding box.
#[derive(Debug, Clone)]
pub struct ElevationField {
    bbox: GeoBoundingBox,
    step: f64,
    width: usize,
    height: usize,
    /// Row-major samples, row 0 is the northern edge.
    samples: Vec<Sample>,
    min_elevation: f32,
    max_elevation: f32,
    no_data_cells: usize,
    missing_cells: usize,
}

impl ElevationField {
    /// Build a field from row-major samples covering `bbox` at `step` degrees.
    ///
    /// The number of samples must equal `width * height` as given by
    /// [`GeoBoundingBox::dimensions`].
    pub fn from_samples(bbox: GeoBoundingBox, step: f64, samples: Vec<Sample>) -> Result<Self> {
        let (width, height) = bbox.dimensions(step);
        if samples.len() != width * height {
            return Err(DemError::InvalidBoundingBox(format!(
                "{} samples do not fill a {}x{} grid",
                samples.len(),
                width,
                height
            )));
        }

        let mut min_elevation = f32::INFINITY;
        let mut max_elevation = f32::NEG_INFINITY;
        let mut no_data_cells = 0;
        let mut missing_cells = 0;
        for sample in &samples {
            match *sample {
                Sample::Measured(v) => {
                    min_elevation = min_elevation.min(v as f32);
                    max_elevation = max_elevation.max(v as f32);
                }
                Sample::NoData => no_data_cells += 1,
                Sample::Missing => missing_cells += 1,
            }
        }
        if min_elevation > max_elevation {
            min_elevation = 0.0;
            max_elevation = 0.0;
        }

        Ok(Self {
            bbox,
            step,
            width,
            height,
            samples,
            min_elevation,
            max_elevation,
            no_data_cells,
            missing_cells,
        })
    }

    /// Bounding box this field was sampled from.
    pub fn bbox(&self) -> GeoBoundingBox {
        self.bbox
    }

    /// Angular sampling step in degrees.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of columns (west to east).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (north to south).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Lowest measured elevation, or 0 if nothing was measured.
    pub fn min_elevation(&self) -> f32 {
        self.min_elevation
    }

    /// Highest measured elevation, or 0 if nothing was measured.
    pub fn max_elevation(&self) -> f32 {
        self.max_elevation
    }

    /// Classified sample at `(col, row)`; out-of-range cells are `Missing`.
    pub fn sample(&self, col: usize, row: usize) -> Sample {
        if col >= self.width || row >= self.height {
            return Sample::Missing;
        }
        self.samples[row * self.width + col]
    }

    /// Elevation in meters at `(col, row)`, 0 for any fallback cell.
    pub fn elevation(&self, col: usize, row: usize) -> f32 {
        self.sample(col, row).meters()
    }

    /// Cells whose tile was present but held a void sample.
    pub fn no_data_cells(&self) -> usize {
        self.no_data_cells
    }

    /// Cells with no tile coverage at all.
    pub fn missing_cells(&self) -> usize {
        self.missing_cells
    }

    /// Cells holding a real measurement.
    pub fn measured_cells(&self) -> usize {
        self.samples.len() - self.no_data_cells - self.missing_cells
    }
}
