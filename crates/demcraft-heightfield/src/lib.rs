//! # demcraft-heightfield
//!
//! Converts an [`ElevationField`](demcraft_dem::ElevationField) into a grid of
//! integer output levels (block heights).
//!
//! Each measured cell maps linearly from meters to levels:
//!
//! ```text
//! level = base_level + round((elevation - min_elevation) / scale)
//! ```
//!
//! where `scale` is meters per level. Cells without a measurement (voids or
//! missing tiles) sit at `base_level`.

mod builder;
mod field;

pub use builder::HeightFieldBuilder;
pub use field::{HeightField, HeightFieldError};
