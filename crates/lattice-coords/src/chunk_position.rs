//! Chunk (column) coordinates.

use std::fmt;
use std::ops::{Add, Sub};

/// Offsets of the 8 horizontal neighbours of a chunk, x outer, z inner.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Column index in the horizontal plane: world x/z shifted right by 4.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// The 8 surrounding chunks in [`NEIGHBOUR_OFFSETS`] order.
    pub fn neighbours(self) -> [Self; 8] {
        NEIGHBOUR_OFFSETS.map(|(dx, dz)| self.offset(dx, dz))
    }

    /// Returns `true` if `other` is one of the 8 surrounding chunks.
    pub fn is_neighbour(self, other: Self) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.z - other.z).abs() <= 1
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl Add for ChunkPosition {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.z + other.z)
    }
}

impl Sub for ChunkPosition {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.z - other.z)
    }
}

impl fmt::Debug for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkPosition({} {})", self.x, self.z)
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_exclude_self() {
        let center = ChunkPosition::new(3, -7);
        let neighbours = center.neighbours();
        assert_eq!(neighbours.len(), 8);
        assert!(!neighbours.contains(&center));
        for neighbour in neighbours {
            assert!(center.is_neighbour(neighbour));
            assert_eq!(center.chebyshev_distance(neighbour), 1);
        }
    }

    #[test]
    fn test_is_neighbour_rejects_distant() {
        let center = ChunkPosition::ORIGIN;
        assert!(!center.is_neighbour(center));
        assert!(!center.is_neighbour(ChunkPosition::new(2, 0)));
        assert!(center.is_neighbour(ChunkPosition::new(-1, 1)));
    }

    #[test]
    fn test_arithmetic() {
        let a = ChunkPosition::new(1, 2);
        let b = ChunkPosition::new(-3, 5);
        assert_eq!(a + b, ChunkPosition::new(-2, 7));
        assert_eq!(a - b, ChunkPosition::new(4, -3));
    }
}
