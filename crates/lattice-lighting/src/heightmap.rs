//! Per-column skylight heightmap.
//!
//! Stores, for each of the 256 columns of a chunk, the y of the topmost block
//! that stops the skylight shortcut. Every cell above it has sky light 15
//! without consulting the light arrays.

use lattice_coords::{COLUMNS_PER_CHUNK, InChunkPosition};

/// Topmost skylight-blocking y per column, `min_y - 1` for an open column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightHeightmap {
    heights: Box<[i32; COLUMNS_PER_CHUNK]>,
    min_y: i32,
}

impl LightHeightmap {
    /// A heightmap with every column open to the sky.
    pub fn new(min_y: i32) -> Self {
        Self {
            heights: Box::new([min_y - 1; COLUMNS_PER_CHUNK]),
            min_y,
        }
    }

    /// Height of column `xz_index` (`x | z << 4`).
    #[inline]
    pub fn get(&self, xz_index: usize) -> i32 {
        self.heights[xz_index]
    }

    /// Returns `true` if the column has no blocking block at all.
    pub fn is_open(&self, xz_index: usize) -> bool {
        self.heights[xz_index] < self.min_y
    }

    /// Returns `true` if `position` lies above its column's top block.
    #[inline]
    pub fn is_above(&self, position: InChunkPosition) -> bool {
        position.y() > self.heights[position.xz_index()]
    }

    /// Rebuilds every column by scanning down from `max_y`.
    pub fn recalculate(&mut self, max_y: i32, mut blocks_skylight: impl FnMut(InChunkPosition) -> bool) {
        for xz in 0..COLUMNS_PER_CHUNK {
            let (x, z) = ((xz & 0x0F) as i32, (xz >> 4) as i32);
            self.heights[xz] = self.scan_down(x, z, max_y, &mut blocks_skylight);
        }
    }

    /// Updates the column of `position` after its block changed.
    ///
    /// Only scans downwards when the top block itself was removed. Returns
    /// `Some((old, new))` if the column height changed.
    pub fn on_block_change(
        &mut self,
        position: InChunkPosition,
        next_blocks_skylight: bool,
        mut blocks_skylight: impl FnMut(InChunkPosition) -> bool,
    ) -> Option<(i32, i32)> {
        let xz = position.xz_index();
        let old = self.heights[xz];
        let y = position.y();

        let new = if next_blocks_skylight {
            old.max(y)
        } else if y == old {
            self.scan_down(position.x(), position.z(), y - 1, &mut blocks_skylight)
        } else {
            old
        };

        if new == old {
            return None;
        }
        self.heights[xz] = new;
        Some((old, new))
    }

    fn scan_down(
        &self,
        x: i32,
        z: i32,
        from_y: i32,
        blocks_skylight: &mut impl FnMut(InChunkPosition) -> bool,
    ) -> i32 {
        (self.min_y..=from_y)
            .rev()
            .find(|&y| blocks_skylight(InChunkPosition::new(x, y, z)))
            .unwrap_or(self.min_y - 1)
    }
}
