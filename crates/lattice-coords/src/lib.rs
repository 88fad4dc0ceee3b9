//! Packed integer position types for the voxel world and the bit-shift scheme
//! that converts between them.
//!
//! # Coordinate spaces
//!
//! 1. **World** ([`BlockPosition`]): absolute block coordinates, x/z within
//!    ±[`WORLD_MAX_XZ`], y within [`CHUNK_MIN_Y`]..=[`CHUNK_MAX_Y`].
//! 2. **Chunk** ([`ChunkPosition`]): column index, `world >> 4` on x and z.
//! 3. **In-chunk** ([`InChunkPosition`]): x/z in `0..16`, full y range.
//! 4. **In-section** ([`InSectionPosition`]): all three axes in `0..16`;
//!    its packed value doubles as the flat cell index `x | z << 4 | y << 8`.
//!
//! Every decomposition uses arithmetic shifts and masks, so negative
//! coordinates floor (`-1 >> 4 == -1`, `-1 & 0xF == 15`) instead of truncating.
//!
//! ```rust
//! use lattice_coords::{BlockPosition, ChunkPosition};
//!
//! let position = BlockPosition::new(-1, 64, -17);
//! assert_eq!(position.chunk_position(), ChunkPosition::new(-1, -2));
//! let local = position.in_chunk_position();
//! assert_eq!((local.x(), local.y(), local.z()), (15, 64, 15));
//! assert_eq!(BlockPosition::from_parts(position.chunk_position(), local), position);
//! ```

mod block_position;
mod chunk_position;
mod direction;
mod in_chunk;
mod in_section;

pub use block_position::BlockPosition;
pub use chunk_position::{ChunkPosition, NEIGHBOUR_OFFSETS};
pub use direction::{Axis, DIRECTION_PAIRS, Direction, direction_pair_index};
pub use in_chunk::InChunkPosition;
pub use in_section::InSectionPosition;

use static_assertions::const_assert_eq;

/// Width of a section along x.
pub const SECTION_WIDTH_X: i32 = 16;
/// Height of a section along y.
pub const SECTION_HEIGHT_Y: i32 = 16;
/// Width of a section along z.
pub const SECTION_WIDTH_Z: i32 = 16;

/// Largest in-section x.
pub const SECTION_MAX_X: i32 = SECTION_WIDTH_X - 1;
/// Largest in-section y.
pub const SECTION_MAX_Y: i32 = SECTION_HEIGHT_Y - 1;
/// Largest in-section z.
pub const SECTION_MAX_Z: i32 = SECTION_WIDTH_Z - 1;

/// Number of cells in one section (16³).
pub const BLOCKS_PER_SECTION: usize = (SECTION_WIDTH_X * SECTION_HEIGHT_Y * SECTION_WIDTH_Z) as usize;

/// Number of columns in one chunk (16²).
pub const COLUMNS_PER_CHUNK: usize = (SECTION_WIDTH_X * SECTION_WIDTH_Z) as usize;

/// Lowest encodable block y.
pub const CHUNK_MIN_Y: i32 = -2048;
/// Highest encodable block y.
pub const CHUNK_MAX_Y: i32 = 2047;

/// Largest absolute block x/z accepted by [`BlockPosition`].
pub const WORLD_MAX_XZ: i32 = 30_000_000;

const_assert_eq!(BLOCKS_PER_SECTION, 4096);
const_assert_eq!(COLUMNS_PER_CHUNK, 256);

/// Section height (section index along y) containing block `y`.
#[inline]
pub const fn section_height(y: i32) -> i32 {
    y >> 4
}

/// Block y relative to the bottom of its section, in `0..16`.
#[inline]
pub const fn in_section_height(y: i32) -> i32 {
    y & SECTION_MAX_Y
}
