//! Absolute world block position packed into a single `u64`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use static_assertions::assert_eq_size;

use crate::{
    CHUNK_MAX_Y, CHUNK_MIN_Y, ChunkPosition, Direction, InChunkPosition, InSectionPosition,
    SECTION_HEIGHT_Y, SECTION_WIDTH_X, SECTION_WIDTH_Z, WORLD_MAX_XZ,
};

const BITS_XZ: u32 = 26;
const BITS_Y: u32 = 12;

const SHIFT_Y: u32 = 0;
const SHIFT_Z: u32 = BITS_Y;
const SHIFT_X: u32 = BITS_Y + BITS_XZ;

const MASK_XZ: i64 = (1 << BITS_XZ) - 1;
const MASK_Y: i64 = (1 << BITS_Y) - 1;

/// A world block position.
///
/// Layout (most to least significant): 26 bits x, 26 bits z, 12 bits y, each
/// in two's complement. x and z are limited to ±[`WORLD_MAX_XZ`], y to
/// [`CHUNK_MIN_Y`]..=[`CHUNK_MAX_Y`]. Construction outside those bounds panics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockPosition(u64);

assert_eq_size!(BlockPosition, u64);

impl BlockPosition {
    /// The origin `(0, 0, 0)`.
    pub const ORIGIN: Self = Self(0);

    /// Packs `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is outside the documented world bounds.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        assert!(
            Self::in_bounds(x, y, z),
            "block position ({x}, {y}, {z}) is outside the world bounds"
        );
        Self::pack(x, y, z)
    }

    /// Packs `(x, y, z)`, returning `None` outside the world bounds.
    pub fn try_new(x: i32, y: i32, z: i32) -> Option<Self> {
        Self::in_bounds(x, y, z).then(|| Self::pack(x, y, z))
    }

    /// Returns `true` if `(x, y, z)` can be encoded.
    pub const fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        x >= -WORLD_MAX_XZ
            && x <= WORLD_MAX_XZ
            && z >= -WORLD_MAX_XZ
            && z <= WORLD_MAX_XZ
            && y >= CHUNK_MIN_Y
            && y <= CHUNK_MAX_Y
    }

    const fn pack(x: i32, y: i32, z: i32) -> Self {
        let packed = ((x as i64 & MASK_XZ) << SHIFT_X)
            | ((z as i64 & MASK_XZ) << SHIFT_Z)
            | ((y as i64 & MASK_Y) << SHIFT_Y);
        Self(packed as u64)
    }

    /// Rebuilds a position from its packed representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The packed representation.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// World x.
    #[inline]
    pub const fn x(self) -> i32 {
        ((self.0 as i64) >> SHIFT_X) as i32
    }

    /// World y.
    #[inline]
    pub const fn y(self) -> i32 {
        (((self.0 as i64) << (64 - BITS_Y)) >> (64 - BITS_Y)) as i32
    }

    /// World z.
    #[inline]
    pub const fn z(self) -> i32 {
        (((self.0 as i64) << (64 - SHIFT_X)) >> (64 - BITS_XZ)) as i32
    }

    /// Returns a copy with y replaced.
    pub fn with_y(self, y: i32) -> Self {
        Self::new(self.x(), y, self.z())
    }

    /// Offsets by `(dx, dy, dz)`.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the world bounds.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x() + dx, self.y() + dy, self.z() + dz)
    }

    /// One block towards +x.
    pub fn plus_x(self) -> Self {
        self.offset(1, 0, 0)
    }

    /// One block towards -x.
    pub fn minus_x(self) -> Self {
        self.offset(-1, 0, 0)
    }

    /// One block towards +y.
    pub fn plus_y(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// One block towards -y.
    pub fn minus_y(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// One block towards +z.
    pub fn plus_z(self) -> Self {
        self.offset(0, 0, 1)
    }

    /// One block towards -z.
    pub fn minus_z(self) -> Self {
        self.offset(0, 0, -1)
    }

    /// Index of the section containing this position.
    pub const fn section_height(self) -> i32 {
        crate::section_height(self.y())
    }

    /// Column containing this position (`x >> 4`, `z >> 4`).
    pub const fn chunk_position(self) -> ChunkPosition {
        ChunkPosition::new(self.x() >> 4, self.z() >> 4)
    }

    /// Position relative to the owning chunk.
    pub fn in_chunk_position(self) -> InChunkPosition {
        InChunkPosition::new(self.x() & 0x0F, self.y(), self.z() & 0x0F)
    }

    /// Position relative to the owning section.
    pub fn in_section_position(self) -> InSectionPosition {
        InSectionPosition::new(self.x() & 0x0F, crate::in_section_height(self.y()), self.z() & 0x0F)
    }

    /// Inverse of [`chunk_position`](Self::chunk_position) + [`in_chunk_position`](Self::in_chunk_position).
    pub fn from_parts(chunk: ChunkPosition, position: InChunkPosition) -> Self {
        Self::new(
            chunk.x * SECTION_WIDTH_X + position.x(),
            position.y(),
            chunk.z * SECTION_WIDTH_Z + position.z(),
        )
    }

    /// Block position of `position` inside section `section_height` of `chunk`.
    pub fn of_section(chunk: ChunkPosition, section_height: i32, position: InSectionPosition) -> Self {
        Self::new(
            chunk.x * SECTION_WIDTH_X + position.x(),
            section_height * SECTION_HEIGHT_Y + position.y(),
            chunk.z * SECTION_WIDTH_Z + position.z(),
        )
    }
}

impl Add<Direction> for BlockPosition {
    type Output = Self;

    fn add(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.vector();
        self.offset(dx, dy, dz)
    }
}

impl Sub<Direction> for BlockPosition {
    type Output = Self;

    fn sub(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.vector();
        self.offset(-dx, -dy, -dz)
    }
}

impl Add for BlockPosition {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.offset(other.x(), other.y(), other.z())
    }
}

impl Neg for BlockPosition {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x(), -self.y(), -self.z())
    }
}

impl fmt::Debug for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockPosition({} {} {})", self.x(), self.y(), self.z())
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.x(), self.y(), self.z())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
