//! Partitioning of a height field into square chunks.

use std::ops::Range;

/// Position of a chunk in the chunk grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk column.
    pub cx: usize,
    /// Chunk row.
    pub cz: usize,
}

/// Cell ranges covered by one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBounds {
    /// Columns, half-open.
    pub x: Range<usize>,
    /// Rows, half-open.
    pub z: Range<usize>,
}

impl ChunkBounds {
    /// Number of cells covered.
    pub fn cells(&self) -> usize {
        self.x.len() * self.z.len()
    }
}

/// A `width x length` grid tiled by `size x size` chunks.
///
/// The last chunk column and row are clipped to the grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGrid {
    width: usize,
    length: usize,
    size: usize,
}

impl ChunkGrid {
    /// Tile a grid.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(width: usize, length: usize, size: usize) -> Self {
        assert!(size > 0, "chunk size must be positive");
        Self {
            width,
            length,
            size,
        }
    }

    /// Chunk side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of chunk columns; 0 when the grid has no cells.
    pub fn columns(&self) -> usize {
        if self.length == 0 {
            return 0;
        }
        self.width.div_ceil(self.size)
    }

    /// Number of chunk rows; 0 when the grid has no cells.
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            return 0;
        }
        self.length.div_ceil(self.size)
    }

    /// Total number of chunks.
    pub fn len(&self) -> usize {
        self.columns() * self.rows()
    }

    /// Whether the grid has no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell ranges of a chunk.
    pub fn bounds(&self, coord: ChunkCoord) -> ChunkBounds {
        let x0 = (coord.cx * self.size).min(self.width);
        let z0 = (coord.cz * self.size).min(self.length);
        ChunkBounds {
            x: x0..(x0 + self.size).min(self.width),
            z: z0..(z0 + self.size).min(self.length),
        }
    }

    /// Chunks of one chunk row, in column order.
    pub fn row(&self, cz: usize) -> impl Iterator<Item = ChunkCoord> {
        (0..self.columns()).map(move |cx| ChunkCoord { cx, cz })
    }

    /// All chunks in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> {
        let columns = self.columns();
        (0..self.rows()).flat_map(move |cz| (0..columns).map(move |cx| ChunkCoord { cx, cz }))
    }
}
