//! The discretized height field.

use thiserror::Error;

/// Errors when building a height field from raw levels.
#[derive(Debug, Error)]
pub enum HeightFieldError {
    /// Level count does not match the declared dimensions.
    #[error("{actual} levels do not fill a {width}x{length} grid")]
    ShapeMismatch {
        /// Declared width.
        width: usize,
        /// Declared length.
        length: usize,
        /// Number of levels supplied.
        actual: usize,
    },

    /// The elevation range needs more levels than fit above the base level.
    #[error(
        "elevation range of {range} m at {scale} m per level overflows levels above {base_level}"
    )]
    LevelOverflow {
        /// Meters between the lowest and highest measured elevation.
        range: f64,
        /// Meters per level.
        scale: f64,
        /// Level of the lowest elevation.
        base_level: i32,
    },
}

/// A rectangular grid of integer output levels.
///
/// `x` runs west to east over `[0, width)` and `z` runs north to south over
/// `[0, length)`, matching the orientation of the source elevation grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightField {
    width: usize,
    length: usize,
    /// Row-major levels, row `z` starts at `z * width`.
    levels: Vec<i32>,
    base_level: i32,
    min_level: i32,
    max_level: i32,
}

impl HeightField {
    /// Build a field from row-major levels.
    ///
    /// `min_level` and `max_level` are the realized extremes of `levels`
    /// (both `base_level` for an empty grid).
    pub fn from_levels(
        width: usize,
        length: usize,
        levels: Vec<i32>,
        base_level: i32,
    ) -> Result<Self, HeightFieldError> {
        if levels.len() != width * length {
            return Err(HeightFieldError::ShapeMismatch {
                width,
                length,
                actual: levels.len(),
            });
        }
        let min_level = levels.iter().copied().min().unwrap_or(base_level);
        let max_level = levels.iter().copied().max().unwrap_or(base_level);
        Ok(Self {
            width,
            length,
            levels,
            base_level,
            min_level,
            max_level,
        })
    }

    /// Used by the builder, which knows the level range up front.
    pub(crate) fn with_range(
        width: usize,
        length: usize,
        levels: Vec<i32>,
        base_level: i32,
        max_level: i32,
    ) -> Self {
        debug_assert_eq!(levels.len(), width * length);
        Self {
            width,
            length,
            levels,
            base_level,
            min_level: base_level,
            max_level,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.length == 0
    }

    /// Level used for fallback cells.
    pub fn base_level(&self) -> i32 {
        self.base_level
    }

    /// Lowest level of the field.
    pub fn min_level(&self) -> i32 {
        self.min_level
    }

    /// Highest level of the field.
    pub fn max_level(&self) -> i32 {
        self.max_level
    }

    /// Level at `(x, z)`, or `base_level` outside the grid.
    pub fn level(&self, x: usize, z: usize) -> i32 {
        if x >= self.width || z >= self.length {
            return self.base_level;
        }
        self.levels[z * self.width + x]
    }

    /// All levels of row `z`; empty outside the grid.
    pub fn row(&self, z: usize) -> &[i32] {
        if z >= self.length {
            return &[];
        }
        &self.levels[z * self.width..(z + 1) * self.width]
    }

    /// Number of distinct levels present.
    pub fn distinct_levels(&self) -> usize {
        let mut seen: Vec<i32> = self.levels.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}
