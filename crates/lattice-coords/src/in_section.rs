//! Block position relative to its 16³ section.

use std::fmt;

use crate::{BLOCKS_PER_SECTION, SECTION_MAX_X, SECTION_MAX_Y, SECTION_MAX_Z};

/// Position inside a section. The packed value is the flat cell index
/// `x | z << 4 | y << 8`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InSectionPosition(u16);

impl InSectionPosition {
    /// # Panics
    ///
    /// Panics if any axis is outside `0..16`.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        assert!(
            (0..=SECTION_MAX_X).contains(&x)
                && (0..=SECTION_MAX_Y).contains(&y)
                && (0..=SECTION_MAX_Z).contains(&z),
            "in-section position ({x}, {y}, {z}) out of range"
        );
        Self((x | (z << 4) | (y << 8)) as u16)
    }

    /// # Panics
    ///
    /// Panics if `index >= 4096`.
    pub fn from_index(index: usize) -> Self {
        assert!(index < BLOCKS_PER_SECTION, "section index {index} out of range");
        Self(index as u16)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn x(self) -> i32 {
        (self.0 & 0x0F) as i32
    }

    #[inline]
    pub const fn y(self) -> i32 {
        ((self.0 >> 8) & 0x0F) as i32
    }

    #[inline]
    pub const fn z(self) -> i32 {
        ((self.0 >> 4) & 0x0F) as i32
    }

    #[inline]
    pub const fn xz_index(self) -> usize {
        (self.0 & 0xFF) as usize
    }

    pub fn plus_x(self) -> Self {
        Self::new(self.x() + 1, self.y(), self.z())
    }

    pub fn minus_x(self) -> Self {
        Self::new(self.x() - 1, self.y(), self.z())
    }

    pub fn plus_y(self) -> Self {
        Self::new(self.x(), self.y() + 1, self.z())
    }

    pub fn minus_y(self) -> Self {
        Self::new(self.x(), self.y() - 1, self.z())
    }

    pub fn plus_z(self) -> Self {
        Self::new(self.x(), self.y(), self.z() + 1)
    }

    pub fn minus_z(self) -> Self {
        Self::new(self.x(), self.y(), self.z() - 1)
    }

    /// Every cell of a section in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BLOCKS_PER_SECTION as u16).map(Self)
    }
}

impl fmt::Debug for InSectionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InSectionPosition({} {} {})", self.x(), self.y(), self.z())
    }
}
