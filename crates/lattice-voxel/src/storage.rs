//! Palette-compressed block storage for one 16×16×16 section.
//!
//! Cells hold indices into a local palette of distinct [`BlockStateId`]s. The
//! index width grows with the palette, so a uniform section costs no index
//! storage at all. A running non-air count makes [`BlockStorage::is_empty`]
//! O(1), which the occlusion and light code use to skip empty sections.

use lattice_coords::{BLOCKS_PER_SECTION, InSectionPosition};

use crate::packed::PackedIndices;
use crate::registry::BlockStateId;

/// Block states of a section.
#[derive(Clone, Debug)]
pub struct BlockStorage {
    palette: Vec<BlockStateId>,
    indices: PackedIndices,
    non_air: u16,
}

impl BlockStorage {
    /// A section filled with air.
    pub fn new() -> Self {
        Self::filled(BlockStateId::AIR)
    }

    /// A section filled with `state`.
    pub fn filled(state: BlockStateId) -> Self {
        Self {
            palette: vec![state],
            indices: PackedIndices::new(0),
            non_air: if state.is_air() {
                0
            } else {
                BLOCKS_PER_SECTION as u16
            },
        }
    }

    /// Builds a section from 4096 states in [`InSectionPosition`] index order.
    ///
    /// # Panics
    ///
    /// Panics if `states.len() != 4096`.
    pub fn from_states(states: &[BlockStateId]) -> Self {
        assert_eq!(
            states.len(),
            BLOCKS_PER_SECTION,
            "a section holds exactly {BLOCKS_PER_SECTION} states"
        );
        let mut storage = Self::new();
        for (index, &state) in states.iter().enumerate() {
            storage.set(InSectionPosition::from_index(index), state);
        }
        storage
    }

    #[inline]
    pub fn get(&self, position: InSectionPosition) -> BlockStateId {
        self.palette[self.indices.get(position.index()) as usize]
    }

    /// Stores `state` and returns the state that was there before.
    pub fn set(&mut self, position: InSectionPosition, state: BlockStateId) -> BlockStateId {
        let previous = self.get(position);
        if previous == state {
            return previous;
        }
        let palette_index = self.palette_index_or_insert(state);
        self.indices.set(position.index(), palette_index);

        match (previous.is_air(), state.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        previous
    }

    /// Returns `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }

    /// Number of cells that are not air.
    pub fn non_air_count(&self) -> usize {
        self.non_air as usize
    }

    pub fn palette(&self) -> &[BlockStateId] {
        &self.palette
    }

    pub fn bits(&self) -> u8 {
        self.indices.bits()
    }

    /// Iterates `(position, state)` for every non-air cell.
    pub fn iter_non_air(&self) -> impl Iterator<Item = (InSectionPosition, BlockStateId)> + '_ {
        InSectionPosition::all()
            .map(|position| (position, self.get(position)))
            .filter(|(_, state)| !state.is_air())
    }

    /// Drops unused palette entries and narrows the index width if possible.
    ///
    /// Scans all cells. Call after bulk edits, not after every `set`.
    pub fn compact(&mut self) {
        if self.indices.bits() == 0 {
            return;
        }

        let mut used = vec![false; self.palette.len()];
        for index in 0..BLOCKS_PER_SECTION {
            used[self.indices.get(index) as usize] = true;
        }

        let mut remap = vec![0u16; self.palette.len()];
        let mut palette = Vec::with_capacity(self.palette.len());
        for (old, &in_use) in used.iter().enumerate() {
            if in_use {
                remap[old] = palette.len() as u16;
                palette.push(self.palette[old]);
            }
        }

        let mut indices = PackedIndices::new(PackedIndices::bits_for(palette.len()));
        if indices.bits() != 0 {
            for index in 0..BLOCKS_PER_SECTION {
                indices.set(index, remap[self.indices.get(index) as usize]);
            }
        }
        self.palette = palette;
        self.indices = indices;
    }

    fn palette_index_or_insert(&mut self, state: BlockStateId) -> u16 {
        if let Some(index) = self.palette.iter().position(|&entry| entry == state) {
            return index as u16;
        }
        let bits = PackedIndices::bits_for(self.palette.len() + 1);
        if bits != self.indices.bits() {
            self.indices = self.indices.resized(bits);
        }
        self.palette.push(state);
        (self.palette.len() - 1) as u16
    }
}

impl Default for BlockStorage {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32, z: i32) -> InSectionPosition {
        InSectionPosition::new(x, y, z)
    }

    #[test]
    fn test_new_section_is_empty_air() {
        let storage = BlockStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.bits(), 0);
        assert_eq!(storage.get(at(7, 7, 7)), BlockStateId::AIR);
    }

    #[test]
    fn test_set_returns_previous_and_tracks_non_air() {
        let mut storage = BlockStorage::new();
        assert_eq!(storage.set(at(1, 2, 3), BlockStateId(5)), BlockStateId::AIR);
        assert!(!storage.is_empty());
        assert_eq!(storage.non_air_count(), 1);

        assert_eq!(storage.set(at(1, 2, 3), BlockStateId(6)), BlockStateId(5));
        assert_eq!(storage.non_air_count(), 1);

        assert_eq!(storage.set(at(1, 2, 3), BlockStateId::AIR), BlockStateId(6));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_palette_widens_past_sixteen_states() {
        let mut storage = BlockStorage::new();
        for id in 1..=20u16 {
            storage.set(InSectionPosition::from_index(id as usize), BlockStateId(id));
        }
        assert_eq!(storage.bits(), 8);
        for id in 1..=20u16 {
            assert_eq!(storage.get(InSectionPosition::from_index(id as usize)), BlockStateId(id));
        }
        assert_eq!(storage.get(InSectionPosition::from_index(0)), BlockStateId::AIR);
    }

    #[test]
    fn test_compact_collapses_to_uniform() {
        let mut storage = BlockStorage::new();
        storage.set(at(5, 5, 5), BlockStateId(42));
        storage.set(at(5, 5, 5), BlockStateId::AIR);
        assert_eq!(storage.palette().len(), 2);

        storage.compact();
        assert_eq!(storage.palette(), &[BlockStateId::AIR]);
        assert_eq!(storage.bits(), 0);
    }

    #[test]
    fn test_filled_section_counts_all_cells() {
        let storage = BlockStorage::filled(BlockStateId(1));
        assert_eq!(storage.non_air_count(), BLOCKS_PER_SECTION);
        assert_eq!(storage.iter_non_air().count(), BLOCKS_PER_SECTION);
    }

    #[test]
    fn test_from_states_roundtrips() {
        let states: Vec<BlockStateId> = (0..BLOCKS_PER_SECTION)
            .map(|index| BlockStateId((index % 3) as u16))
            .collect();
        let storage = BlockStorage::from_states(&states);
        for (index, &state) in states.iter().enumerate() {
            assert_eq!(storage.get(InSectionPosition::from_index(index)), state);
        }
        assert_eq!(storage.non_air_count(), states.iter().filter(|s| !s.is_air()).count());
    }
}
