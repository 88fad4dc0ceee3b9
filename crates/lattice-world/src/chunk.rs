//! A vertical column of sections at one chunk position.
//!
//! All mutable column state lives in [`ChunkState`] behind one `RwLock`, so a
//! reader never observes a half-merged batch or a half-finished light update.
//! Neighbour completeness is an atomic flag next to it: the world flips it
//! while looking at other chunks, which must not require this chunk's lock.
//! Block edits are serialised by a separate edit lock that is held across
//! hooks but never across the state lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lattice_biome::{Biome, BiomeSource};
use lattice_coords::{ChunkPosition, Direction, InChunkPosition};
use lattice_lighting::{
    BorderLight, FaceBorder, LightEngine, LightHeightmap, LightLevel, LightVolume, VerticalBorder,
    border_changed,
};
use lattice_voxel::{BlockRegistry, BlockStateId};

use crate::context::{DimensionLimits, WorldContext};
use crate::data::{ChunkDataBatch, ChunkDataError, DataOutcome};
use crate::section::ChunkSection;

// ---------------------------------------------------------------------------
// Data phase
// ---------------------------------------------------------------------------

/// Which kinds of data a chunk has received at least once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataFields {
    pub blocks: bool,
    pub light: bool,
    pub biomes: bool,
}

/// Initialisation state of a chunk's data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataPhase {
    /// Created, nothing received. Sections may not be written.
    Uninitialized,
    Partial(DataFields),
    /// Blocks, light and biomes have all arrived.
    Ready,
}

impl DataPhase {
    pub fn from_fields(fields: DataFields) -> Self {
        match fields {
            DataFields {
                blocks: true,
                light: true,
                biomes: true,
            } => Self::Ready,
            fields if fields == DataFields::default() => Self::Uninitialized,
            fields => Self::Partial(fields),
        }
    }

    pub fn fields(self) -> DataFields {
        match self {
            Self::Uninitialized => DataFields::default(),
            Self::Partial(fields) => fields,
            Self::Ready => DataFields {
                blocks: true,
                light: true,
                biomes: true,
            },
        }
    }

    pub fn is_initialized(self) -> bool {
        self != Self::Uninitialized
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

// ---------------------------------------------------------------------------
// Column state
// ---------------------------------------------------------------------------

/// Mutable state of a chunk, guarded by the chunk's lock.
pub struct ChunkState {
    dimension: DimensionLimits,
    /// Bottom section first. `None` until something is written there.
    sections: Vec<Option<ChunkSection>>,
    heightmap: LightHeightmap,
    bottom_light: BorderLight,
    top_light: BorderLight,
    biome_source: Option<Arc<dyn BiomeSource>>,
    phase: DataPhase,
}

impl ChunkState {
    fn new(dimension: DimensionLimits) -> Self {
        Self {
            dimension,
            sections: (0..dimension.section_count()).map(|_| None).collect(),
            heightmap: LightHeightmap::new(dimension.min_y()),
            bottom_light: BorderLight::full_bright(),
            top_light: BorderLight::full_bright(),
            biome_source: None,
            phase: DataPhase::Uninitialized,
        }
    }

    /// Drops everything except the biome source.
    fn reset(&mut self) {
        let biome_source = self.biome_source.take();
        *self = Self::new(self.dimension);
        self.phase = DataPhase::from_fields(DataFields {
            biomes: biome_source.is_some(),
            ..DataFields::default()
        });
        self.biome_source = biome_source;
    }

    pub fn phase(&self) -> DataPhase {
        self.phase
    }

    /// Allocated section at `section_height`.
    pub fn section(&self, section_height: i32) -> Option<&ChunkSection> {
        let index = self.dimension.section_index(section_height)?;
        self.sections[index].as_ref()
    }

    /// Allocated sections with their heights, bottom first.
    pub fn sections(&self) -> impl Iterator<Item = (i32, &ChunkSection)> + '_ {
        let min_section = self.dimension.min_section();
        self.sections
            .iter()
            .enumerate()
            .filter_map(move |(index, section)| Some((min_section + index as i32, section.as_ref()?)))
    }

    fn section_or_insert(&mut self, index: usize) -> &mut ChunkSection {
        self.sections[index].get_or_insert_with(|| {
            tracing::trace!(index, "allocated section");
            ChunkSection::new()
        })
    }

    fn block_at(&self, position: InChunkPosition) -> BlockStateId {
        self.section(position.section_height())
            .map_or(BlockStateId::AIR, |section| section.get(position.in_section_position()))
    }

    fn recalculate_heightmap(&mut self, registry: &BlockRegistry) {
        let mut heightmap = LightHeightmap::new(self.dimension.min_y());
        heightmap.recalculate(self.dimension.max_y(), |position| {
            registry.blocks_skylight(self.block_at(position))
        });
        self.heightmap = heightmap;
    }

    fn mark_fields(&mut self, update: impl FnOnce(&mut DataFields)) {
        let mut fields = self.phase.fields();
        update(&mut fields);
        self.phase = DataPhase::from_fields(fields);
    }
}

impl LightVolume for ChunkState {
    fn min_y(&self) -> i32 {
        self.dimension.min_y()
    }

    fn max_y(&self) -> i32 {
        self.dimension.max_y()
    }

    fn block(&self, position: InChunkPosition) -> BlockStateId {
        self.block_at(position)
    }

    fn light(&self, position: InChunkPosition) -> LightLevel {
        self.section(position.section_height())
            .map_or(LightLevel::DARK, |section| section.light(position.in_section_position()))
    }

    fn set_light(&mut self, position: InChunkPosition, level: LightLevel) {
        let Some(index) = self.dimension.section_index(position.section_height()) else {
            return;
        };
        if level == LightLevel::DARK && self.sections[index].is_none() {
            return;
        }
        self.section_or_insert(index)
            .set_light(position.in_section_position(), level);
    }

    fn clear_light(&mut self) {
        for section in self.sections.iter_mut().flatten() {
            section.clear_light();
        }
    }

    fn heightmap(&self) -> &LightHeightmap {
        &self.heightmap
    }

    fn border_mut(&mut self, side: VerticalBorder) -> &mut BorderLight {
        match side {
            VerticalBorder::Bottom => &mut self.bottom_light,
            VerticalBorder::Top => &mut self.top_light,
        }
    }

    fn for_each_block(&self, visit: &mut dyn FnMut(InChunkPosition, BlockStateId)) {
        for (section_height, section) in self.sections() {
            for (position, state) in section.blocks().iter_non_air() {
                let y = (section_height << 4) + position.y();
                visit(InChunkPosition::new(position.x(), y, position.z()), state);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// Result of a lookup in the section biome cache.
#[derive(Clone, Debug)]
pub enum CachedBiome {
    Hit(Option<Arc<Biome>>),
    Miss,
    /// The section is not allocated and has no cache.
    Unallocated,
}

/// A block change applied to a chunk.
pub(crate) struct BlockChange {
    pub previous: BlockStateId,
    /// Sides whose edge light changed, with snapshots from before and after.
    pub borders: Vec<(Direction, FaceBorder, FaceBorder)>,
}

/// One chunk column.
pub struct Chunk {
    position: ChunkPosition,
    context: Arc<WorldContext>,
    state: RwLock<ChunkState>,
    neighbours_loaded: AtomicBool,
    /// Held by [`World::set`](crate::World::set) from reading the previous
    /// block until its place hook returned.
    edit: Mutex<()>,
}

impl Chunk {
    pub fn new(position: ChunkPosition, context: Arc<WorldContext>) -> Self {
        let state = ChunkState::new(context.dimension);
        Self {
            position,
            context,
            state: RwLock::new(state),
            neighbours_loaded: AtomicBool::new(false),
            edit: Mutex::new(()),
        }
    }

    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    pub fn dimension(&self) -> DimensionLimits {
        self.context.dimension
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ChunkState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ChunkState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until no other thread edits this chunk's blocks. Hooks only get
    /// a read-only view, so nothing re-enters while the guard is held.
    pub(crate) fn begin_edit(&self) -> MutexGuard<'_, ()> {
        self.edit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engine(&self) -> LightEngine<'_> {
        LightEngine::new(&self.context.blocks, self.context.dimension.has_skylight())
    }

    pub fn phase(&self) -> DataPhase {
        self.read().phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase().is_initialized()
    }

    pub fn neighbours_loaded(&self) -> bool {
        self.neighbours_loaded.load(Ordering::Acquire)
    }

    /// Returns the previous value.
    pub(crate) fn set_neighbours_loaded(&self, loaded: bool) -> bool {
        self.neighbours_loaded.swap(loaded, Ordering::AcqRel)
    }

    /// All data received and every neighbour present.
    pub fn is_fully_loaded(&self) -> bool {
        self.neighbours_loaded() && self.phase().is_ready()
    }

    /// Block at `position`. `None` if the chunk has not received data or `y`
    /// lies outside the dimension; unallocated sections read as air.
    pub fn get(&self, position: InChunkPosition) -> Option<BlockStateId> {
        let state = self.read();
        if !state.phase.is_initialized() || !state.dimension.contains_y(position.y()) {
            return None;
        }
        Some(state.block_at(position))
    }

    /// Light at `position`.
    ///
    /// Unknown light is full bright: before any light arrived, and beyond the
    /// two border layers. The layer above the column always has full sky.
    pub fn get_light(&self, position: InChunkPosition) -> LightLevel {
        let state = self.read();
        if !state.phase.fields().light {
            return LightLevel::FULL_BRIGHT;
        }
        let dimension = state.dimension;
        let section_height = position.section_height();
        if section_height == dimension.max_section() + 1 {
            let level = state.top_light.get(position.xz_index());
            return if dimension.has_skylight() {
                level.with_sky(LightLevel::MAX)
            } else {
                level
            };
        }
        if section_height == dimension.min_section() - 1 {
            return state.bottom_light.get(position.xz_index());
        }
        if !dimension.contains_y(position.y()) {
            return LightLevel::FULL_BRIGHT;
        }
        self.engine().effective(&*state, position)
    }

    pub fn biome_source(&self) -> Option<Arc<dyn BiomeSource>> {
        self.read().biome_source.clone()
    }

    /// Asks the chunk's own source, bypassing every cache.
    pub fn source_biome(&self, position: InChunkPosition) -> Option<Arc<Biome>> {
        let source = self.biome_source()?;
        source.get(position)
    }

    pub(crate) fn cached_biome(&self, position: InChunkPosition, generation: u64) -> CachedBiome {
        let state = self.read();
        let Some(section) = state.section(position.section_height()) else {
            return CachedBiome::Unallocated;
        };
        match section.cached_biome(position.in_section_position(), generation) {
            Some(biome) => CachedBiome::Hit(biome),
            None => CachedBiome::Miss,
        }
    }

    pub(crate) fn store_biome(&self, position: InChunkPosition, generation: u64, biome: Option<Arc<Biome>>) {
        let state = self.read();
        if let Some(section) = state.section(position.section_height()) {
            section.store_biome(position.in_section_position(), generation, biome);
        }
    }

    /// Forgets every memoised biome of this column.
    pub(crate) fn clear_biome_cache(&self) {
        for (_, section) in self.read().sections() {
            section.clear_biomes();
        }
    }

    /// Number of cached biome cells of one section in `generation`.
    pub fn cached_biomes(&self, section_height: i32, generation: u64) -> usize {
        self.read()
            .section(section_height)
            .map_or(0, |section| section.cached_biomes(generation))
    }

    /// Whether nothing passes from `from` to `to` through a section. Missing
    /// sections are air. `None` if the chunk has no data or the height is
    /// outside the dimension.
    pub fn is_occluded(&self, section_height: i32, from: Direction, to: Direction) -> Option<bool> {
        let state = self.read();
        if !state.phase.is_initialized() {
            return None;
        }
        state.dimension.section_index(section_height)?;
        Some(
            state
                .section(section_height)
                .is_some_and(|section| section.is_occluded(from, to, &self.context.blocks)),
        )
    }

    /// Recomputes a stale occlusion table. Returns `true` if it changed.
    pub(crate) fn refresh_occlusion(&self, section_height: i32) -> bool {
        self.read()
            .section(section_height)
            .is_some_and(|section| section.refresh_occlusion(&self.context.blocks))
    }

    /// Blocks with a `tick` hook, collected so hooks run without the lock.
    pub(crate) fn ticking_blocks(&self) -> Vec<(InChunkPosition, BlockStateId)> {
        let state = self.read();
        let mut blocks = Vec::new();
        for (section_height, section) in state.sections() {
            for (position, block) in section.ticking() {
                let y = (section_height << 4) + position.y();
                blocks.push((InChunkPosition::new(position.x(), y, position.z()), block));
            }
        }
        blocks
    }

    /// Section heights whose light changed since the last call.
    pub(crate) fn take_light_updates(&self) -> Vec<i32> {
        self.read()
            .sections()
            .filter(|(_, section)| section.take_update())
            .map(|(section_height, _)| section_height)
            .collect()
    }

    /// Writes a block and updates the heightmap and light of this column.
    ///
    /// Edge light of the sides in `faces` is snapshotted around the update so
    /// the caller can forward changes to those neighbours. Returns `None` if
    /// the block was already there.
    ///
    /// # Panics
    ///
    /// Panics if the chunk has not received any data, or `y` lies outside the
    /// dimension.
    pub(crate) fn set_block(
        &self,
        position: InChunkPosition,
        block: BlockStateId,
        faces: &[Direction],
    ) -> Option<BlockChange> {
        let registry = &*self.context.blocks;
        let engine = self.engine();
        let mut guard = self.write();
        let state = &mut *guard;
        assert!(
            state.phase.is_initialized(),
            "block written into chunk {} before it received data",
            self.position
        );
        let Some(index) = state.dimension.section_index(position.section_height()) else {
            panic!("y={} is outside the dimension", position.y());
        };
        if state.block_at(position) == block {
            return None;
        }

        let lit = state.phase.fields().light;
        let before: Vec<(Direction, FaceBorder)> = if lit {
            faces
                .iter()
                .map(|&face| (face, FaceBorder::extract(&engine, &*state, face)))
                .collect()
        } else {
            Vec::new()
        };

        let previous = state
            .section_or_insert(index)
            .set(position.in_section_position(), block, registry);

        let mut heightmap = state.heightmap.clone();
        let height_change = heightmap.on_block_change(position, registry.blocks_skylight(block), |cell| {
            registry.blocks_skylight(state.block_at(cell))
        });
        state.heightmap = heightmap;

        if lit {
            engine.on_block_change(&mut *state, position, height_change);
        }

        let borders = before
            .into_iter()
            .map(|(face, old)| {
                let new = FaceBorder::extract(&engine, &*state, face);
                (face, old, new)
            })
            .filter(|(_, old, new)| border_changed(old, new))
            .collect();
        Some(BlockChange { previous, borders })
    }

    /// Merges a data batch.
    ///
    /// With `merge == false` the column is wiped first (the biome source
    /// survives). Light is computed locally when blocks arrive without light
    /// and the context asks for it.
    pub(crate) fn set_data(&self, data: ChunkDataBatch, merge: bool) -> Result<DataOutcome, ChunkDataError> {
        let dimension = self.context.dimension;
        data.validate(dimension.section_count())?;
        let registry = &*self.context.blocks;

        let mut guard = self.write();
        let state = &mut *guard;
        if !merge {
            state.reset();
        }

        let mut outcome = DataOutcome::default();
        let carries_light = data.light.is_some();
        if let Some(blocks) = data.blocks {
            for (index, storage) in blocks.into_iter().enumerate() {
                if let Some(storage) = storage {
                    state.section_or_insert(index).replace_blocks(storage, registry);
                }
            }
            state.recalculate_heightmap(registry);
            outcome.blocks = true;
        }
        if let Some(light) = data.light {
            for (index, light) in light.into_iter().enumerate() {
                if let Some(light) = light {
                    state.section_or_insert(index).replace_light(light);
                }
            }
            outcome.light = true;
        }
        if let Some(bottom) = data.bottom_light {
            state.bottom_light = bottom;
            outcome.light = true;
        }
        if let Some(top) = data.top_light {
            state.top_light = top;
            outcome.light = true;
        }
        if let Some(source) = data.biome_source {
            state.biome_source = Some(source);
            for section in state.sections.iter().flatten() {
                section.clear_biomes();
            }
            outcome.biomes = true;
        }

        if outcome.blocks && !carries_light && self.context.calculate_light {
            self.engine().recalculate(&mut *state);
            outcome.light = true;
            outcome.recalculated = true;
        }

        state.mark_fields(|fields| {
            fields.blocks |= outcome.blocks;
            fields.light |= outcome.light;
            fields.biomes |= outcome.biomes;
        });
        tracing::debug!(chunk = %self.position, ?outcome, phase = ?state.phase, "merged chunk data");
        Ok(outcome)
    }

    /// Rebuilds this column's light in isolation.
    pub fn recalculate_light(&self) {
        let mut state = self.write();
        self.engine().recalculate(&mut *state);
        state.mark_fields(|fields| fields.light = true);
    }

    /// Snapshot of the edge light on side `face`, `None` without light.
    pub fn face_border(&self, face: Direction) -> Option<FaceBorder> {
        let state = self.read();
        if !state.phase.fields().light {
            return None;
        }
        Some(FaceBorder::extract(&self.engine(), &*state, face))
    }

    /// Spreads a neighbour's edge light into this column. Returns the number
    /// of edge cells that got brighter.
    pub fn absorb_border(&self, border: &FaceBorder) -> usize {
        let mut state = self.write();
        if !state.phase.fields().light {
            return 0;
        }
        self.engine().propagate_border(&mut *state, border)
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("phase", &self.phase())
            .field("neighbours_loaded", &self.neighbours_loaded())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_biome::{BiomeRegistry, FixedBiomeSource};
    use lattice_coords::InSectionPosition;
    use lattice_voxel::{BlockDef, BlockStorage};

    struct Fixture {
        chunk: Chunk,
        stone: BlockStateId,
        torch: BlockStateId,
    }

    fn fixture(calculate_light: bool) -> Fixture {
        let mut blocks = BlockRegistry::new();
        let stone = blocks.register(BlockDef::opaque("stone")).unwrap();
        let torch = blocks
            .register(BlockDef::transparent("torch").with_light_emission(14))
            .unwrap();
        let context = WorldContext::new(
            Arc::new(blocks),
            Arc::new(BiomeRegistry::new()),
            DimensionLimits::new(0, 64, true),
        )
        .with_calculate_light(calculate_light);
        Fixture {
            chunk: Chunk::new(ChunkPosition::ORIGIN, Arc::new(context)),
            stone,
            torch,
        }
    }

    fn floor(stone: BlockStateId) -> Vec<Option<BlockStorage>> {
        let mut storage = BlockStorage::new();
        for x in 0..16 {
            for z in 0..16 {
                storage.set(InSectionPosition::new(x, 0, z), stone);
            }
        }
        vec![Some(storage), None, None, None]
    }

    fn at(x: i32, y: i32, z: i32) -> InChunkPosition {
        InChunkPosition::new(x, y, z)
    }

    #[test]
    fn test_phase_tracks_received_fields() {
        let fixture = fixture(false);
        let chunk = &fixture.chunk;
        assert_eq!(chunk.phase(), DataPhase::Uninitialized);
        assert_eq!(chunk.get(at(0, 0, 0)), None, "absent before any data");

        chunk
            .set_data(ChunkDataBatch::new().with_blocks(floor(fixture.stone)), true)
            .unwrap();
        assert!(matches!(chunk.phase(), DataPhase::Partial(DataFields { blocks: true, light: false, .. })));
        assert_eq!(chunk.get(at(3, 0, 3)), Some(fixture.stone));
        assert_eq!(chunk.get(at(3, 40, 3)), Some(BlockStateId::AIR), "unallocated section");
        assert_eq!(chunk.get(at(3, 64, 3)), None, "above the dimension");
        assert_eq!(chunk.get_light(at(3, 5, 3)), LightLevel::FULL_BRIGHT, "no light yet");

        chunk
            .set_data(ChunkDataBatch::new().with_light(vec![None; 4]), true)
            .unwrap();
        let biome: Arc<dyn BiomeSource> = Arc::new(FixedBiomeSource::new(None));
        chunk
            .set_data(ChunkDataBatch::new().with_biome_source(biome), true)
            .unwrap();
        assert!(chunk.phase().is_ready());
        assert!(!chunk.is_fully_loaded(), "neighbours are still missing");
    }

    #[test]
    fn test_blocks_without_light_are_lit_locally() {
        let fixture = fixture(true);
        let chunk = &fixture.chunk;
        let outcome = chunk
            .set_data(ChunkDataBatch::new().with_blocks(floor(fixture.stone)), true)
            .unwrap();
        assert!(outcome.recalculated);
        assert_eq!(chunk.get_light(at(5, 1, 5)).sky(), 15);
        assert_eq!(chunk.get_light(at(5, 0, 5)).sky(), 0, "inside the floor");
        assert_eq!(chunk.get_light(at(5, 64, 5)).sky(), 15, "top border");
    }

    #[test]
    fn test_replace_without_merge_keeps_biome_source() {
        let fixture = fixture(false);
        let chunk = &fixture.chunk;
        let biome: Arc<dyn BiomeSource> = Arc::new(FixedBiomeSource::new(None));
        chunk
            .set_data(
                ChunkDataBatch::new()
                    .with_blocks(floor(fixture.stone))
                    .with_biome_source(biome),
                true,
            )
            .unwrap();
        chunk
            .set_data(ChunkDataBatch::new().with_light(vec![None; 4]), false)
            .unwrap();

        assert_eq!(chunk.get(at(0, 0, 0)), Some(BlockStateId::AIR), "blocks were wiped");
        assert!(chunk.biome_source().is_some());
        assert_eq!(
            chunk.phase(),
            DataPhase::Partial(DataFields {
                blocks: false,
                light: true,
                biomes: true
            })
        );
    }

    #[test]
    fn test_set_block_relights_and_reports_borders() {
        let fixture = fixture(true);
        let chunk = &fixture.chunk;
        chunk
            .set_data(ChunkDataBatch::new().with_blocks(floor(fixture.stone)), true)
            .unwrap();
        chunk.take_light_updates();

        let change = chunk
            .set_block(at(15, 5, 8), fixture.torch, &[Direction::East, Direction::West])
            .unwrap();
        assert_eq!(change.previous, BlockStateId::AIR);
        assert_eq!(chunk.get_light(at(15, 5, 8)).block(), 14);
        assert_eq!(chunk.get_light(at(12, 5, 8)).block(), 11);

        let sides: Vec<Direction> = change.borders.iter().map(|(side, _, _)| *side).collect();
        assert_eq!(sides, vec![Direction::East], "torch light does not reach the west edge");
        assert_eq!(chunk.take_light_updates(), vec![0, 1], "light reaches into the section above");
        assert!(chunk.set_block(at(15, 5, 8), fixture.torch, &[]).is_none());
    }

    #[test]
    fn test_unloaded_section_is_not_occluded() {
        let fixture = fixture(false);
        let chunk = &fixture.chunk;
        assert_eq!(chunk.is_occluded(0, Direction::Up, Direction::Down), None);
        chunk
            .set_data(ChunkDataBatch::new().with_blocks(floor(fixture.stone)), true)
            .unwrap();
        assert_eq!(chunk.is_occluded(2, Direction::Up, Direction::Down), Some(false));
        assert_eq!(chunk.is_occluded(0, Direction::Up, Direction::North), Some(false));
        assert_eq!(chunk.is_occluded(0, Direction::Up, Direction::Down), Some(true), "floor seals the bottom");
        assert_eq!(chunk.is_occluded(9, Direction::Up, Direction::Down), None);
    }

    #[test]
    #[should_panic(expected = "before it received data")]
    fn test_write_before_data_panics() {
        let fixture = fixture(false);
        fixture.chunk.set_block(at(0, 0, 0), fixture.stone, &[]);
    }
}
