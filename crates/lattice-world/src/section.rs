//! One 16×16×16 cube of a chunk with its derived data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lattice_biome::{Biome, SectionBiomeCache};
use lattice_coords::{Direction, InSectionPosition};
use lattice_lighting::{LightArray, LightLevel};
use lattice_voxel::{BlockRegistry, BlockStateId, BlockStorage, SectionOcclusion};
use rustc_hash::FxHashSet;

/// Blocks, light, occlusion and cached biomes of a section.
///
/// Blocks and light are mutated under the owning chunk's write lock. The
/// `update` flag, the occlusion table and the biome cache have their own
/// synchronisation so readers holding the chunk's read lock can use them.
pub struct ChunkSection {
    blocks: BlockStorage,
    light: LightArray,
    /// Set when light changed since the last light event for this section.
    update: AtomicBool,
    occlusion: SectionOcclusion,
    biomes: Mutex<SectionBiomeCache>,
    /// Cells whose block has a `tick` hook.
    ticking: FxHashSet<InSectionPosition>,
}

impl ChunkSection {
    pub fn new() -> Self {
        Self {
            blocks: BlockStorage::new(),
            light: LightArray::new(),
            update: AtomicBool::new(false),
            occlusion: SectionOcclusion::new(),
            biomes: Mutex::new(SectionBiomeCache::new()),
            ticking: FxHashSet::default(),
        }
    }

    pub fn blocks(&self) -> &BlockStorage {
        &self.blocks
    }

    pub fn get(&self, position: InSectionPosition) -> BlockStateId {
        self.blocks.get(position)
    }

    /// Stores `state` and returns the previous state.
    pub fn set(&mut self, position: InSectionPosition, state: BlockStateId, registry: &BlockRegistry) -> BlockStateId {
        let previous = self.blocks.set(position, state);
        if previous == state {
            return previous;
        }
        self.occlusion
            .on_block_change(registry.is_fully_opaque(previous), registry.is_fully_opaque(state));
        if has_tick_hook(registry, state) {
            self.ticking.insert(position);
        } else {
            self.ticking.remove(&position);
        }
        previous
    }

    /// Replaces every block at once, as delivered by a chunk data batch.
    pub fn replace_blocks(&mut self, blocks: BlockStorage, registry: &BlockRegistry) {
        self.ticking = blocks
            .iter_non_air()
            .filter(|&(_, state)| has_tick_hook(registry, state))
            .map(|(position, _)| position)
            .collect();
        self.blocks = blocks;
        self.occlusion.invalidate();
    }

    pub fn ticking(&self) -> impl Iterator<Item = (InSectionPosition, BlockStateId)> + '_ {
        self.ticking.iter().map(|&position| (position, self.blocks.get(position)))
    }

    pub fn light(&self, position: InSectionPosition) -> LightLevel {
        self.light.get(position)
    }

    pub fn light_array(&self) -> &LightArray {
        &self.light
    }

    /// Returns `true` and flags the section if the level changed.
    pub fn set_light(&mut self, position: InSectionPosition, level: LightLevel) -> bool {
        let changed = self.light.set(position, level);
        if changed {
            self.mark_update();
        }
        changed
    }

    pub fn replace_light(&mut self, light: LightArray) {
        self.light = light;
        self.mark_update();
    }

    pub fn clear_light(&mut self) {
        if !self.light.is_dark() {
            self.light.clear();
            self.mark_update();
        }
    }

    pub fn mark_update(&self) {
        self.update.store(true, Ordering::Release);
    }

    /// Clears the update flag, returning whether it was set.
    pub fn take_update(&self) -> bool {
        self.update.swap(false, Ordering::AcqRel)
    }

    /// Recomputes the occlusion table if stale. Returns `true` if it changed.
    pub fn refresh_occlusion(&self, registry: &BlockRegistry) -> bool {
        self.occlusion.refresh(&self.blocks, registry)
    }

    pub fn is_occluded(&self, from: Direction, to: Direction, registry: &BlockRegistry) -> bool {
        self.occlusion.is_occluded(from, to, &self.blocks, registry)
    }

    pub fn occlusion(&self) -> &SectionOcclusion {
        &self.occlusion
    }

    /// Cached biome, `None` on a miss.
    pub fn cached_biome(&self, position: InSectionPosition, generation: u64) -> Option<Option<Arc<Biome>>> {
        self.lock_biomes().get(position, generation)
    }

    pub fn store_biome(&self, position: InSectionPosition, generation: u64, biome: Option<Arc<Biome>>) {
        self.lock_biomes().store(position, generation, biome);
    }

    pub fn clear_biomes(&self) {
        self.lock_biomes().clear();
    }

    pub fn cached_biomes(&self, generation: u64) -> usize {
        self.lock_biomes().cached_cells(generation)
    }

    fn lock_biomes(&self) -> MutexGuard<'_, SectionBiomeCache> {
        self.biomes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}

fn has_tick_hook(registry: &BlockRegistry, state: BlockStateId) -> bool {
    registry
        .behavior(state)
        .is_some_and(|behavior| behavior.tick.is_some())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_voxel::{BlockBehavior, BlockDef};

    fn registry() -> (BlockRegistry, BlockStateId, BlockStateId) {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockDef::opaque("stone")).unwrap();
        let hook: lattice_voxel::Hook = Arc::new(|_| {});
        let furnace = registry
            .register(BlockDef::opaque("furnace").with_behavior(BlockBehavior {
                tick: Some(hook),
                ..Default::default()
            }))
            .unwrap();
        (registry, stone, furnace)
    }

    #[test]
    fn test_ticking_cells_follow_block_changes() {
        let (registry, stone, furnace) = registry();
        let mut section = ChunkSection::new();
        let position = InSectionPosition::new(1, 2, 3);

        section.set(position, furnace, &registry);
        assert_eq!(section.ticking().collect::<Vec<_>>(), vec![(position, furnace)]);

        section.set(position, stone, &registry);
        assert_eq!(section.ticking().count(), 0);
    }

    #[test]
    fn test_replace_blocks_rebuilds_ticking() {
        let (registry, _, furnace) = registry();
        let mut storage = BlockStorage::new();
        storage.set(InSectionPosition::new(0, 0, 0), furnace);
        storage.set(InSectionPosition::new(9, 9, 9), furnace);

        let mut section = ChunkSection::new();
        section.replace_blocks(storage, &registry);
        assert_eq!(section.ticking().count(), 2);
        assert!(section.occlusion().needs_calculation());
    }

    #[test]
    fn test_update_flag_is_taken_once() {
        let mut section = ChunkSection::new();
        assert!(!section.take_update());

        assert!(section.set_light(InSectionPosition::new(0, 0, 0), LightLevel::new(3, 0)));
        assert!(!section.set_light(InSectionPosition::new(0, 0, 0), LightLevel::new(3, 0)));
        assert!(section.take_update());
        assert!(!section.take_update());
    }

    #[test]
    fn test_opacity_change_invalidates_occlusion() {
        let (registry, stone, _) = registry();
        let mut section = ChunkSection::new();
        section.refresh_occlusion(&registry);
        assert!(!section.occlusion().needs_calculation());

        section.set(InSectionPosition::new(4, 4, 4), stone, &registry);
        assert!(section.occlusion().needs_calculation());
    }
}
