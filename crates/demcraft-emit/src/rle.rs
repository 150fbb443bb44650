//! Run-length compression of height field rows into layered fills.

use crate::chunk::ChunkBounds;
use crate::command::{FillCommand, Palette};
use demcraft_heightfield::HeightField;

/// Subsoil layers between the foundation and the surface block.
pub const SUBSOIL_DEPTH: i32 = 3;

/// Consecutive columns of one row sharing a surface level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Row.
    pub z: usize,
    /// First column.
    pub x_start: usize,
    /// Last column, inclusive.
    pub x_end: usize,
    /// Surface level of every column in the run.
    pub level: i32,
}

impl Run {
    /// Number of columns covered.
    pub fn columns(&self) -> usize {
        self.x_end - self.x_start + 1
    }
}

/// Split one row segment into maximal constant-level runs.
///
/// `levels[i]` is the level of column `x_offset + i`. A run closes whenever
/// the next level differs or the segment ends.
pub fn row_runs(levels: &[i32], x_offset: usize, z: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let Some(&first) = levels.first() else {
        return runs;
    };

    let mut run_start = 0;
    let mut run_level = first;
    for x in 1..=levels.len() {
        let at_end = x == levels.len();
        if at_end || levels[x] != run_level {
            runs.push(Run {
                z,
                x_start: x_offset + run_start,
                x_end: x_offset + x - 1,
                level: run_level,
            });
            if !at_end {
                run_start = x;
                run_level = levels[x];
            }
        }
    }
    runs
}

/// All runs inside a chunk, row by row.
pub fn chunk_runs(field: &HeightField, bounds: &ChunkBounds) -> Vec<Run> {
    bounds
        .z
        .clone()
        .flat_map(|z| row_runs(&field.row(z)[bounds.x.clone()], bounds.x.start, z))
        .collect()
}

/// The vertical layer layout of every terrain column.
///
/// A column with surface level `h` holds the foundation block on
/// `[floor, h - 4]`, the subsoil on `[h - 3, h - 1]` and the surface block on
/// `h`. `floor` sits four levels below the field's lowest level, so the
/// lowest columns still get one foundation layer and neighbouring columns
/// never leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainLayers {
    floor: i32,
    palette: Palette,
}

impl TerrainLayers {
    /// Layers for a given height field.
    ///
    /// The floor saturates at `i32::MIN`; [`crate::Emitter::render`] rejects
    /// such fields before emitting anything.
    pub fn for_field(field: &HeightField, palette: Palette) -> Self {
        Self {
            floor: field.min_level().saturating_sub(SUBSOIL_DEPTH + 1),
            palette,
        }
    }

    /// Lowest filled level.
    pub fn floor(&self) -> i32 {
        self.floor
    }

    /// Block palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The three fills for a run: foundation, subsoil, surface.
    pub fn fills(&self, run: &Run) -> [FillCommand; 3] {
        let (x0, x1, z) = (run.x_start as i32, run.x_end as i32, run.z as i32);
        let h = run.level;
        [
            FillCommand {
                from: (x0, self.floor, z),
                to: (x1, h - SUBSOIL_DEPTH - 1, z),
                block: self.palette.foundation.clone(),
            },
            FillCommand {
                from: (x0, h - SUBSOIL_DEPTH, z),
                to: (x1, h - 1, z),
                block: self.palette.subsoil.clone(),
            },
            FillCommand {
                from: (x0, h, z),
                to: (x1, h, z),
                block: self.palette.surface.clone(),
            },
        ]
    }

    /// Block expected at height `y` in a column whose surface is `level`.
    pub fn block_at(&self, level: i32, y: i32) -> Option<&str> {
        if y < self.floor || y > level {
            None
        } else if y == level {
            Some(&self.palette.surface)
        } else if y >= level - SUBSOIL_DEPTH {
            Some(&self.palette.subsoil)
        } else {
            Some(&self.palette.foundation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_runs_basic() {
        let runs = row_runs(&[5, 5, 7, 7, 7, 5], 10, 3);
        assert_eq!(
            runs,
            vec![
                Run { z: 3, x_start: 10, x_end: 11, level: 5 },
                Run { z: 3, x_start: 12, x_end: 14, level: 7 },
                Run { z: 3, x_start: 15, x_end: 15, level: 5 },
            ]
        );
        assert_eq!(runs[1].columns(), 3);
    }

    #[test]
    fn test_row_runs_single_and_empty() {
        assert!(row_runs(&[], 0, 0).is_empty());
        assert_eq!(
            row_runs(&[9], 4, 1),
            vec![Run { z: 1, x_start: 4, x_end: 4, level: 9 }]
        );
    }

    #[test]
    fn test_row_runs_uniform() {
        let runs = row_runs(&[64; 10], 0, 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].columns(), 10);
    }

    #[test]
    fn test_last_column_change_closes_run() {
        let runs = row_runs(&[1, 1, 1, 2], 0, 0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1], Run { z: 0, x_start: 3, x_end: 3, level: 2 });
    }

    #[test]
    fn test_layer_fills() {
        let field = HeightField::from_levels(1, 1, vec![64], 64).unwrap();
        let layers = TerrainLayers::for_field(&field, Palette::default());
        assert_eq!(layers.floor(), 60);

        let run = Run { z: 2, x_start: 0, x_end: 4, level: 70 };
        let lines: Vec<String> = layers.fills(&run).iter().map(|f| f.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "fill ~0 60 ~2 ~4 66 ~2 stone",
                "fill ~0 67 ~2 ~4 69 ~2 dirt",
                "fill ~0 70 ~2 ~4 70 ~2 grass_block",
            ]
        );
    }

    #[test]
    fn test_block_at() {
        let field = HeightField::from_levels(1, 1, vec![64], 64).unwrap();
        let layers = TerrainLayers::for_field(&field, Palette::default());
        assert_eq!(layers.block_at(64, 64), Some("grass_block"));
        assert_eq!(layers.block_at(64, 61), Some("dirt"));
        assert_eq!(layers.block_at(64, 60), Some("stone"));
        assert_eq!(layers.block_at(64, 59), None);
        assert_eq!(layers.block_at(64, 65), None);
    }
}
