//! Per-section memo of resolved biomes.

use std::sync::Arc;

use lattice_coords::{BLOCKS_PER_SECTION, InSectionPosition};

use crate::biome::Biome;

/// Resolved biome per cell, valid for one cache generation.
///
/// Cells are filled lazily, one query at a time. An entry stored under an older
/// generation is treated as missing, so invalidating every section of the
/// world is a single counter bump.
#[derive(Debug, Default)]
pub struct SectionBiomeCache {
    generation: u64,
    /// Empty until the first store. `Some(None)` caches "no biome".
    cells: Vec<Option<Option<Arc<Biome>>>>,
}

impl SectionBiomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `position`, or `None` on a miss.
    pub fn get(&self, position: InSectionPosition, generation: u64) -> Option<Option<Arc<Biome>>> {
        if generation != self.generation {
            return None;
        }
        self.cells.get(position.index()).cloned().flatten()
    }

    pub fn store(&mut self, position: InSectionPosition, generation: u64, biome: Option<Arc<Biome>>) {
        if generation != self.generation || self.cells.is_empty() {
            self.cells.clear();
            self.cells.resize(BLOCKS_PER_SECTION, None);
            self.generation = generation;
        }
        self.cells[position.index()] = Some(biome);
    }

    pub fn clear(&mut self) {
        self.cells = Vec::new();
    }

    /// Number of cells holding a value for `generation`.
    pub fn cached_cells(&self, generation: u64) -> usize {
        if generation != self.generation {
            return 0;
        }
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
