//! Session-scoped context shared by every chunk of a world.

use std::sync::Arc;

use lattice_biome::BiomeRegistry;
use lattice_coords::{CHUNK_MAX_Y, CHUNK_MIN_Y, SECTION_HEIGHT_Y};
use lattice_voxel::BlockRegistry;

/// Vertical extent of a dimension and whether it has a sky.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionLimits {
    min_y: i32,
    height: i32,
    has_skylight: bool,
}

impl DimensionLimits {
    /// # Panics
    ///
    /// Panics if `min_y` or `height` is not a multiple of 16, or the range
    /// does not fit the packed y coordinate.
    pub fn new(min_y: i32, height: i32, has_skylight: bool) -> Self {
        assert!(
            min_y % SECTION_HEIGHT_Y == 0 && height % SECTION_HEIGHT_Y == 0 && height > 0,
            "dimension bounds must be whole sections: min_y={min_y} height={height}"
        );
        assert!(
            min_y >= CHUNK_MIN_Y && min_y + height - 1 <= CHUNK_MAX_Y,
            "dimension exceeds the addressable y range: min_y={min_y} height={height}"
        );
        Self {
            min_y,
            height,
            has_skylight,
        }
    }

    /// Like [`DimensionLimits::new`], returning `None` instead of panicking.
    pub fn try_new(min_y: i32, height: i32, has_skylight: bool) -> Option<Self> {
        let whole_sections = min_y % SECTION_HEIGHT_Y == 0 && height % SECTION_HEIGHT_Y == 0 && height > 0;
        let in_range = min_y >= CHUNK_MIN_Y && min_y.checked_add(height - 1)? <= CHUNK_MAX_Y;
        (whole_sections && in_range).then_some(Self {
            min_y,
            height,
            has_skylight,
        })
    }

    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    pub const fn max_y(&self) -> i32 {
        self.min_y + self.height - 1
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn has_skylight(&self) -> bool {
        self.has_skylight
    }

    pub const fn min_section(&self) -> i32 {
        self.min_y >> 4
    }

    pub const fn max_section(&self) -> i32 {
        self.max_y() >> 4
    }

    pub const fn section_count(&self) -> usize {
        (self.height / SECTION_HEIGHT_Y) as usize
    }

    pub const fn contains_y(&self, y: i32) -> bool {
        y >= self.min_y && y <= self.max_y()
    }

    /// Index into a chunk's section array, `None` outside the dimension.
    pub fn section_index(&self, section_height: i32) -> Option<usize> {
        (section_height >= self.min_section() && section_height <= self.max_section())
            .then(|| (section_height - self.min_section()) as usize)
    }
}

impl Default for DimensionLimits {
    fn default() -> Self {
        Self::new(0, 256, true)
    }
}

/// Registries and settings a world is built against.
///
/// Created once per session and handed to the world, which hands it to every
/// chunk it creates.
#[derive(Debug)]
pub struct WorldContext {
    pub blocks: Arc<BlockRegistry>,
    pub biomes: Arc<BiomeRegistry>,
    pub dimension: DimensionLimits,
    /// Compute light locally when a batch carries blocks without light.
    pub calculate_light: bool,
}

impl WorldContext {
    pub fn new(blocks: Arc<BlockRegistry>, biomes: Arc<BiomeRegistry>, dimension: DimensionLimits) -> Self {
        Self {
            blocks,
            biomes,
            dimension,
            calculate_light: true,
        }
    }

    pub fn with_calculate_light(mut self, calculate_light: bool) -> Self {
        self.calculate_light = calculate_light;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_indexing_with_negative_floor() {
        let limits = DimensionLimits::new(-64, 384, true);
        assert_eq!(limits.min_section(), -4);
        assert_eq!(limits.max_section(), 19);
        assert_eq!(limits.section_count(), 24);
        assert_eq!(limits.section_index(-4), Some(0));
        assert_eq!(limits.section_index(19), Some(23));
        assert_eq!(limits.section_index(-5), None);
        assert_eq!(limits.section_index(20), None);
        assert!(limits.contains_y(-64));
        assert!(!limits.contains_y(320));
    }

    #[test]
    #[should_panic(expected = "whole sections")]
    fn test_partial_section_rejected() {
        DimensionLimits::new(0, 250, true);
    }

    #[test]
    fn test_try_new_rejects_what_new_panics_on() {
        assert!(DimensionLimits::try_new(-64, 384, true).is_some());
        assert!(DimensionLimits::try_new(0, 250, true).is_none());
        assert!(DimensionLimits::try_new(0, 0, true).is_none());
        assert!(DimensionLimits::try_new(2032, 32, false).is_none());
        assert!(DimensionLimits::try_new(-2064, 64, false).is_none());
    }

    #[test]
    fn test_context_debug_summarises_registries() {
        let context = WorldContext::new(
            Arc::new(BlockRegistry::new()),
            Arc::new(BiomeRegistry::new()),
            DimensionLimits::default(),
        );
        let debug = format!("{context:?}");
        assert!(debug.contains("BlockRegistry { len: 1, .. }"), "{debug}");
        assert!(debug.contains("BiomeRegistry { len: 0, .. }"), "{debug}");
        assert!(debug.contains("calculate_light: true"), "{debug}");
    }
}
