//! Elevation to level remapping.

use crate::{HeightField, HeightFieldError};
use demcraft_dem::{ElevationField, Sample};
use tracing::debug;

/// Maps elevations in meters to integer levels.
#[derive(Debug, Clone, Copy)]
pub struct HeightFieldBuilder {
    /// Meters of real elevation per output level.
    scale: f64,
    /// Level of the lowest measured elevation.
    base_level: i32,
}

impl HeightFieldBuilder {
    /// Create a builder.
    ///
    /// # Panics
    /// Panics if `scale` is not a positive finite number.
    pub fn new(scale: f64, base_level: i32) -> Self {
        assert!(
            scale.is_finite() && scale > 0.0,
            "scale must be positive, got {}",
            scale
        );
        Self { scale, base_level }
    }

    /// Meters per level.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Level assigned to the lowest elevation and to fallback cells.
    pub fn base_level(&self) -> i32 {
        self.base_level
    }

    /// Highest level an elevation range maps to, if it fits in an `i32`.
    pub fn max_level_for(&self, range: f64) -> Result<i32, HeightFieldError> {
        let span = (range / self.scale).ceil();
        let overflow = || HeightFieldError::LevelOverflow {
            range,
            scale: self.scale,
            base_level: self.base_level,
        };
        if !(0.0..=i32::MAX as f64).contains(&span) {
            return Err(overflow());
        }
        self.base_level.checked_add(span as i32).ok_or_else(overflow)
    }

    /// Level for one elevation given the field minimum.
    ///
    /// Only meaningful for elevations whose range passed [`Self::max_level_for`].
    pub fn level_for(&self, elevation: f32, min_elevation: f32) -> i32 {
        let offset = (elevation as f64 - min_elevation as f64) / self.scale;
        self.base_level + offset.round() as i32
    }

    /// Convert an elevation field into a height field.
    ///
    /// Fails when the elevation range at this scale reaches past `i32::MAX`.
    pub fn build(&self, field: &ElevationField) -> Result<HeightField, HeightFieldError> {
        let (width, length) = (field.width(), field.height());
        let min = field.min_elevation();
        let max = field.max_elevation();
        let max_level = self.max_level_for(max as f64 - min as f64)?;

        let mut levels = Vec::with_capacity(width * length);
        for z in 0..length {
            for x in 0..width {
                let level = match field.sample(x, z) {
                    Sample::Measured(v) => self.level_for(v as f32, min),
                    Sample::NoData | Sample::Missing => self.base_level,
                };
                levels.push(level);
            }
        }

        debug!(
            "Built {}x{} height field, levels {}..={}",
            width, length, self.base_level, max_level
        );

        Ok(HeightField::with_range(
            width,
            length,
            levels,
            self.base_level,
            max_level,
        ))
    }
}
