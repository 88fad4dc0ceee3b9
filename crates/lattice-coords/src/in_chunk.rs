//! Block position relative to its chunk column.

use std::fmt;

use crate::{CHUNK_MAX_Y, CHUNK_MIN_Y, InSectionPosition, SECTION_MAX_X, SECTION_MAX_Z};

const MASK_XZ: u32 = 0x0F;
const SHIFT_Z: u32 = 4;
const SHIFT_Y: u32 = 8;

/// Position inside a chunk: x/z in `0..16`, y over the full world range.
///
/// Packed as `x | z << 4 | y << 8` with y in 12-bit two's complement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InChunkPosition(u32);

impl InChunkPosition {
    /// # Panics
    ///
    /// Panics if x or z is outside `0..16` or y is outside the world range.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        assert!(
            (0..=SECTION_MAX_X).contains(&x)
                && (0..=SECTION_MAX_Z).contains(&z)
                && (CHUNK_MIN_Y..=CHUNK_MAX_Y).contains(&y),
            "in-chunk position ({x}, {y}, {z}) out of range"
        );
        Self((x as u32) | ((z as u32) << SHIFT_Z) | (((y as u32) & 0xFFF) << SHIFT_Y))
    }

    #[inline]
    pub const fn x(self) -> i32 {
        (self.0 & MASK_XZ) as i32
    }

    #[inline]
    pub const fn y(self) -> i32 {
        ((self.0 << 12) as i32) >> 20
    }

    #[inline]
    pub const fn z(self) -> i32 {
        ((self.0 >> SHIFT_Z) & MASK_XZ) as i32
    }

    /// Column index `x | z << 4`, used by heightmaps and border arrays.
    #[inline]
    pub const fn xz_index(self) -> usize {
        (self.0 & 0xFF) as usize
    }

    pub const fn section_height(self) -> i32 {
        crate::section_height(self.y())
    }

    pub fn in_section_position(self) -> InSectionPosition {
        InSectionPosition::new(self.x(), crate::in_section_height(self.y()), self.z())
    }

    pub fn with_y(self, y: i32) -> Self {
        Self::new(self.x(), y, self.z())
    }

    pub fn plus_x(self) -> Self {
        Self::new(self.x() + 1, self.y(), self.z())
    }

    pub fn minus_x(self) -> Self {
        Self::new(self.x() - 1, self.y(), self.z())
    }

    pub fn plus_y(self) -> Self {
        self.with_y(self.y() + 1)
    }

    pub fn minus_y(self) -> Self {
        self.with_y(self.y() - 1)
    }

    pub fn plus_z(self) -> Self {
        Self::new(self.x(), self.y(), self.z() + 1)
    }

    pub fn minus_z(self) -> Self {
        Self::new(self.x(), self.y(), self.z() - 1)
    }
}

impl fmt::Debug for InChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InChunkPosition({} {} {})", self.x(), self.y(), self.z())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_y_roundtrips() {
        for y in [CHUNK_MIN_Y, -1000, -17, -1, 0, 1, 255, CHUNK_MAX_Y] {
            let position = InChunkPosition::new(15, y, 7);
            assert_eq!((position.x(), position.y(), position.z()), (15, y, 7));
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_x_outside_chunk_panics() {
        let _ = InChunkPosition::new(16, 0, 0);
    }

    #[test]
    #[should_panic]
    fn test_plus_x_past_edge_panics() {
        let _ = InChunkPosition::new(15, 0, 0).plus_x();
    }

    #[test]
    fn test_section_decomposition() {
        let position = InChunkPosition::new(3, -17, 9);
        assert_eq!(position.section_height(), -2);
        let in_section = position.in_section_position();
        assert_eq!((in_section.x(), in_section.y(), in_section.z()), (3, 15, 9));
        assert_eq!(position.xz_index(), 3 | (9 << 4));
    }

    #[test]
    fn test_steps() {
        let position = InChunkPosition::new(5, 0, 5);
        assert_eq!(position.minus_y().y(), -1);
        assert_eq!(position.plus_z().z(), 6);
        assert_eq!(position.minus_x().x(), 4);
    }
}
