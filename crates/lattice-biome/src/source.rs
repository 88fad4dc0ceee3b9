//! Per-chunk biome sources backed by data received with the chunk.

use std::sync::Arc;

use lattice_coords::{COLUMNS_PER_CHUNK, InChunkPosition};

use crate::biome::{Biome, BiomeId, BiomeRegistry};

/// Resolves the biome at a position inside one chunk.
///
/// Implementations receive the y coordinate unclamped and decide themselves
/// what an out-of-range y means.
pub trait BiomeSource: Send + Sync {
    fn get(&self, position: InChunkPosition) -> Option<Arc<Biome>>;
}

/// The same biome everywhere.
#[derive(Clone, Debug)]
pub struct FixedBiomeSource {
    biome: Option<Arc<Biome>>,
}

impl FixedBiomeSource {
    pub fn new(biome: Option<Arc<Biome>>) -> Self {
        Self { biome }
    }
}

impl BiomeSource for FixedBiomeSource {
    fn get(&self, _position: InChunkPosition) -> Option<Arc<Biome>> {
        self.biome.clone()
    }
}

/// One biome per column, independent of y (legacy 16×16 layout).
#[derive(Clone, Debug)]
pub struct ColumnBiomeSource {
    columns: Vec<Option<Arc<Biome>>>,
}

impl ColumnBiomeSource {
    /// Resolves 256 wire ids (`x | z << 4` order). `None` unless exactly 256.
    pub fn from_ids(ids: &[u16], registry: &BiomeRegistry) -> Option<Self> {
        if ids.len() != COLUMNS_PER_CHUNK {
            return None;
        }
        let columns = ids
            .iter()
            .map(|&id| registry.get(BiomeId(id)).cloned())
            .collect();
        Some(Self { columns })
    }
}

impl BiomeSource for ColumnBiomeSource {
    fn get(&self, position: InChunkPosition) -> Option<Arc<Biome>> {
        self.columns[position.xz_index()].clone()
    }
}

/// One biome per 4×4×4 cell, 64 cells per section (modern layout).
#[derive(Clone, Debug)]
pub struct CellBiomeSource {
    min_section: i32,
    cells: Vec<Option<Arc<Biome>>>,
}

impl CellBiomeSource {
    const CELLS_PER_SECTION: usize = 64;

    /// Resolves wire ids for consecutive sections starting at `min_section`.
    /// `None` if the id count is not a multiple of 64.
    pub fn from_ids(min_section: i32, ids: &[u16], registry: &BiomeRegistry) -> Option<Self> {
        if ids.is_empty() || ids.len() % Self::CELLS_PER_SECTION != 0 {
            return None;
        }
        let cells = ids
            .iter()
            .map(|&id| registry.get(BiomeId(id)).cloned())
            .collect();
        Some(Self { min_section, cells })
    }

    fn index(&self, position: InChunkPosition) -> Option<usize> {
        let section = position.section_height() - self.min_section;
        if section < 0 {
            return None;
        }
        let in_section = position.in_section_position();
        let cell = ((in_section.y() >> 2) << 4) | ((in_section.z() >> 2) << 2) | (in_section.x() >> 2);
        let index = section as usize * Self::CELLS_PER_SECTION + cell as usize;
        (index < self.cells.len()).then_some(index)
    }
}

impl BiomeSource for CellBiomeSource {
    /// Positions outside the sent sections have no biome.
    fn get(&self, position: InChunkPosition) -> Option<Arc<Biome>> {
        self.index(position).and_then(|index| self.cells[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BiomeRegistry {
        let mut registry = BiomeRegistry::new();
        registry.register(Biome::new("ocean", 0.5, 0.5)).unwrap();
        registry.register(Biome::new("forest", 0.7, 0.8)).unwrap();
        registry
    }

    #[test]
    fn test_fixed_ignores_position() {
        let biome = Arc::new(Biome::new("plains", 0.8, 0.4));
        let source = FixedBiomeSource::new(Some(biome.clone()));
        let found = source.get(InChunkPosition::new(3, -900, 9)).unwrap();
        assert!(Arc::ptr_eq(&found, &biome));
        assert!(FixedBiomeSource::new(None).get(InChunkPosition::new(0, 0, 0)).is_none());
    }

    #[test]
    fn test_column_source_indexes_by_column() {
        let registry = registry();
        let mut ids = vec![0u16; 256];
        ids[5 | (7 << 4)] = 1;
        ids[1] = 99;
        let source = ColumnBiomeSource::from_ids(&ids, &registry).unwrap();

        assert_eq!(source.get(InChunkPosition::new(5, 64, 7)).unwrap().name, "forest");
        assert_eq!(source.get(InChunkPosition::new(5, -3, 7)).unwrap().name, "forest");
        assert_eq!(source.get(InChunkPosition::new(0, 0, 0)).unwrap().name, "ocean");
        assert!(source.get(InChunkPosition::new(1, 0, 0)).is_none(), "unknown id");
        assert!(ColumnBiomeSource::from_ids(&ids[..200], &registry).is_none());
    }

    #[test]
    fn test_cell_source_uses_quarter_resolution() {
        let registry = registry();
        // Two sections starting at section -1.
        let mut ids = vec![0u16; 128];
        // Section 0 (second), cell x=1 y=2 z=3.
        ids[64 + ((2 << 4) | (3 << 2) | 1)] = 1;
        let source = CellBiomeSource::from_ids(-1, &ids, &registry).unwrap();

        assert_eq!(source.get(InChunkPosition::new(4, 8, 12)).unwrap().name, "forest");
        assert_eq!(source.get(InChunkPosition::new(7, 11, 15)).unwrap().name, "forest");
        assert_eq!(source.get(InChunkPosition::new(8, 11, 15)).unwrap().name, "ocean");
        assert_eq!(source.get(InChunkPosition::new(0, -16, 0)).unwrap().name, "ocean");
        assert!(source.get(InChunkPosition::new(0, -17, 0)).is_none(), "below first section");
        assert!(source.get(InChunkPosition::new(0, 16, 0)).is_none(), "above last section");
        assert!(CellBiomeSource::from_ids(0, &ids[..100], &registry).is_none());
    }
}
