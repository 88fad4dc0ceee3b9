//! The world: a concurrent map of chunks and the orchestration around it.
//!
//! Lock discipline: a thread holds at most one chunk lock at a time. Work that
//! spans chunks (light crossing a border, neighbour completeness) snapshots
//! what it needs from one chunk, releases it, then locks the next. Hooks and
//! listeners run with no chunk lock held; block edits of one chunk are
//! serialised by its edit lock, which is not a state lock.

use std::collections::VecDeque;
use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lattice_biome::{Biome, BiomeSource, BiomeSourceLookup};
use lattice_coords::{BlockPosition, ChunkPosition, Direction, InChunkPosition, SECTION_WIDTH_X};
use lattice_lighting::{FaceBorder, LightLevel};
use lattice_voxel::{BlockStateId, BlockView, HookContext};
use rand::Rng;

use crate::biomes::WorldBiomes;
use crate::chunk::{CachedBiome, Chunk};
use crate::context::{DimensionLimits, WorldContext};
use crate::data::{ChunkDataBatch, ChunkDataError, DataOutcome, WorldUpdate};
use crate::environment::WorldEnvironment;
use crate::events::{EventBus, WorldEvent};

/// Random tick attempts per radius and call.
pub const RANDOM_TICK_ITERATIONS: usize = 667;
/// Radii around the centre that random ticks sample from.
pub const RANDOM_TICK_RADII: [i32; 2] = [16, 32];

pub struct World {
    context: Arc<WorldContext>,
    chunks: DashMap<ChunkPosition, Arc<Chunk>>,
    /// Bumped on every chunk insertion and removal.
    revision: AtomicU64,
    /// Bumped when a section's occlusion table changes.
    occlusion_revision: AtomicU64,
    biomes: WorldBiomes,
    events: EventBus,
    environment: RwLock<WorldEnvironment>,
}

impl World {
    pub fn new(context: Arc<WorldContext>) -> Self {
        Self {
            context,
            chunks: DashMap::new(),
            revision: AtomicU64::new(0),
            occlusion_revision: AtomicU64::new(0),
            biomes: WorldBiomes::new(),
            events: EventBus::new(),
            environment: RwLock::new(WorldEnvironment::default()),
        }
    }

    pub fn context(&self) -> &Arc<WorldContext> {
        &self.context
    }

    pub fn dimension(&self) -> DimensionLimits {
        self.context.dimension
    }

    pub fn biomes(&self) -> &WorldBiomes {
        &self.biomes
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Changes whenever the set of loaded chunks changes.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn occlusion_revision(&self) -> u64 {
        self.occlusion_revision.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    // -----------------------------------------------------------------------
    // Chunk map
    // -----------------------------------------------------------------------

    pub fn chunk(&self, position: ChunkPosition) -> Option<Arc<Chunk>> {
        self.chunks.get(&position).map(|entry| Arc::clone(entry.value()))
    }

    pub fn chunk_positions(&self) -> Vec<ChunkPosition> {
        self.chunks.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns the chunk at `position`, creating an empty one if needed.
    /// Concurrent callers for the same position get the same chunk.
    pub fn get_or_create_chunk(&self, position: ChunkPosition) -> Arc<Chunk> {
        match self.chunks.entry(position) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let chunk = Arc::new(Chunk::new(position, Arc::clone(&self.context)));
                entry.insert(Arc::clone(&chunk));
                self.revision.fetch_add(1, Ordering::AcqRel);
                tracing::trace!(chunk = %position, "created chunk");
                chunk
            }
        }
    }

    /// Removes a chunk. Its neighbours lose their completeness and must earn
    /// it again. Returns `false` if nothing was loaded there.
    pub fn unload_chunk(&self, position: ChunkPosition) -> bool {
        if self.chunks.remove(&position).is_none() {
            return false;
        }
        self.revision.fetch_add(1, Ordering::AcqRel);
        for neighbour in position.neighbours() {
            if let Some(chunk) = self.chunk(neighbour) {
                chunk.set_neighbours_loaded(false);
            }
        }
        tracing::debug!(chunk = %position, "unloaded chunk");
        self.events.fire(self, WorldEvent::ChunkUnload { chunk: position });
        true
    }

    /// Merges a data batch into the chunk at `position`, creating it first.
    pub fn set_data(
        &self,
        position: ChunkPosition,
        data: ChunkDataBatch,
        merge: bool,
    ) -> Result<DataOutcome, ChunkDataError> {
        let chunk = self.get_or_create_chunk(position);
        let outcome = chunk.set_data(data, merge)?;
        if outcome.recalculated {
            self.pull_borders(&chunk);
            self.spread_light(position, [position]);
        }
        if outcome.biomes {
            // Noise accessors of the neighbours may have sampled the old source.
            for neighbour in position.neighbours() {
                if let Some(neighbour) = self.chunk(neighbour) {
                    neighbour.clear_biome_cache();
                }
            }
        }
        self.on_chunk_update(position);
        self.events.fire(self, WorldEvent::ChunkDataChange { chunk: position });
        self.fire_light_changes(position);
        Ok(outcome)
    }

    /// Re-evaluates neighbour completeness of `position` and its 8 neighbours.
    ///
    /// A chunk is complete once it and all 8 chunks around it have received
    /// block data.
    fn on_chunk_update(&self, position: ChunkPosition) {
        for candidate in iter::once(position).chain(position.neighbours()) {
            let Some(chunk) = self.chunk(candidate) else {
                continue;
            };
            if chunk.neighbours_loaded() || !has_blocks(&chunk) {
                continue;
            }
            if !self.neighbours_have_blocks(candidate) {
                continue;
            }
            chunk.set_neighbours_loaded(true);
            // A neighbour may have been unloaded between the check and the flip.
            if !self.neighbours_have_blocks(candidate) {
                chunk.set_neighbours_loaded(false);
                continue;
            }
            // Cells cached before the last unload may have sampled a neighbour
            // that has since been replaced.
            chunk.clear_biome_cache();
            tracing::debug!(chunk = %candidate, "neighbours loaded");
            self.events.fire(self, WorldEvent::ChunkDataChange { chunk: candidate });
        }
    }

    fn neighbours_have_blocks(&self, position: ChunkPosition) -> bool {
        position
            .neighbours()
            .into_iter()
            .all(|neighbour| self.chunk(neighbour).is_some_and(|chunk| has_blocks(&chunk)))
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Block at `position`. `None` means unknown (chunk absent or without
    /// data, or `y` outside the dimension), never air.
    pub fn get(&self, position: BlockPosition) -> Option<BlockStateId> {
        self.chunk(position.chunk_position())?
            .get(position.in_chunk_position())
    }

    /// Replaces the block at `position`.
    ///
    /// Runs the old block's `on_break` hook, writes the block and updates
    /// light, runs the new block's `on_place` hook, then notifies listeners.
    /// Returns `false` if nothing changed or the chunk is not loaded.
    ///
    /// Concurrent edits of one chunk take turns for the whole sequence, so
    /// every replaced block sees exactly one break.
    ///
    /// # Panics
    ///
    /// Panics if the chunk exists but has not received any data.
    pub fn set(&self, position: BlockPosition, state: BlockStateId) -> bool {
        let chunk_position = position.chunk_position();
        let Some(chunk) = self.chunk(chunk_position) else {
            return false;
        };
        if !self.dimension().contains_y(position.y()) {
            return false;
        }
        let in_chunk = position.in_chunk_position();
        let edit = chunk.begin_edit();
        let Some(previous) = chunk.get(in_chunk) else {
            panic!("block set in chunk {chunk_position} before it received data");
        };
        if previous == state {
            return false;
        }

        let registry = &self.context.blocks;
        if let Some(hook) = registry.behavior(previous).and_then(|b| b.on_break.as_ref()) {
            hook(&HookContext {
                world: self,
                position,
                state: previous,
            });
        }

        let faces: Vec<Direction> = Direction::HORIZONTAL
            .into_iter()
            .filter(|&face| self.chunk(neighbour_of(chunk_position, face)).is_some())
            .collect();
        let Some(change) = chunk.set_block(in_chunk, state, &faces) else {
            return false;
        };
        self.settle_light(&chunk, &change.borders);

        if let Some(hook) = registry.behavior(state).and_then(|b| b.on_place.as_ref()) {
            hook(&HookContext {
                world: self,
                position,
                state,
            });
        }
        drop(edit);

        self.fire_light_changes(chunk_position);
        self.events.fire(
            self,
            WorldEvent::BlockSet {
                position,
                previous: change.previous,
                state,
            },
        );
        true
    }

    /// Applies a batched delta to one chunk. Every change fires its own
    /// block event; one `MultiBlockSet` follows. Returns the number of blocks
    /// that changed.
    pub fn apply_block_updates(&self, position: ChunkPosition, changes: &[(InChunkPosition, BlockStateId)]) -> usize {
        let Some(chunk) = self.chunk(position) else {
            tracing::warn!(chunk = %position, count = changes.len(), "block delta for unloaded chunk");
            return 0;
        };
        if !chunk.is_initialized() {
            tracing::warn!(chunk = %position, count = changes.len(), "block delta before chunk data");
            return 0;
        }

        let applied: Vec<(InChunkPosition, BlockStateId)> = changes
            .iter()
            .copied()
            .filter(|&(in_chunk, state)| self.set(BlockPosition::from_parts(position, in_chunk), state))
            .collect();
        let count = applied.len();
        if count > 0 {
            self.events.fire(
                self,
                WorldEvent::MultiBlockSet {
                    chunk: position,
                    changes: applied,
                },
            );
        }
        count
    }

    /// Single entry point for the session layer.
    pub fn apply(&self, update: WorldUpdate) -> Result<(), ChunkDataError> {
        match update {
            WorldUpdate::ChunkData { chunk, data, merge } => {
                self.set_data(chunk, data, merge)?;
            }
            WorldUpdate::BlockChange { position, state } => {
                match self.chunk(position.chunk_position()) {
                    Some(chunk) if chunk.is_initialized() => {
                        self.set(position, state);
                    }
                    _ => tracing::warn!(%position, "block change for chunk without data"),
                }
            }
            WorldUpdate::MultiBlockChange { chunk, changes } => {
                self.apply_block_updates(chunk, &changes);
            }
            WorldUpdate::Unload { chunk } => {
                self.unload_chunk(chunk);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Light
    // -----------------------------------------------------------------------

    /// Light at `position`; full bright where nothing is known.
    pub fn get_light(&self, position: BlockPosition) -> LightLevel {
        match self.chunk(position.chunk_position()) {
            Some(chunk) => chunk.get_light(position.in_chunk_position()),
            None => LightLevel::FULL_BRIGHT,
        }
    }

    /// Brightens `chunk` from the edges of its 4 face neighbours.
    fn pull_borders(&self, chunk: &Chunk) {
        for face in Direction::HORIZONTAL {
            let Some(neighbour) = self.chunk(neighbour_of(chunk.position(), face)) else {
                continue;
            };
            if let Some(border) = neighbour.face_border(face.opposite()) {
                chunk.absorb_border(&border);
            }
        }
    }

    /// Pushes edge light out of `seeds` until no chunk in the 3×3 grid
    /// around `origin` brightens any more. Light never crosses more than one
    /// chunk, so the grid bounds the spread of anything `origin` emits.
    fn spread_light(&self, origin: ChunkPosition, seeds: impl IntoIterator<Item = ChunkPosition>) {
        let mut queue: VecDeque<ChunkPosition> = seeds.into_iter().collect();
        while let Some(position) = queue.pop_front() {
            let Some(chunk) = self.chunk(position) else {
                continue;
            };
            for face in Direction::HORIZONTAL {
                let target = neighbour_of(position, face);
                if target.chebyshev_distance(origin) > 1 {
                    continue;
                }
                let Some(neighbour) = self.chunk(target) else {
                    continue;
                };
                let Some(border) = chunk.face_border(face) else {
                    continue;
                };
                if neighbour.absorb_border(&border) > 0 && !queue.contains(&target) {
                    queue.push_back(target);
                }
            }
        }
    }

    /// Reconciles light around `chunk` after one of its blocks changed.
    ///
    /// If an edge got darker, light that crossed it is stale in the chunks
    /// around, so they are rebuilt and refilled from their own neighbours.
    /// The edited column then takes back whatever its neighbours shine in,
    /// and the result spreads through the grid.
    fn settle_light(&self, chunk: &Chunk, borders: &[(Direction, FaceBorder, FaceBorder)]) {
        if !chunk.phase().fields().light {
            return;
        }
        let origin = chunk.position();
        let dimension = self.dimension();
        let mut seeds = vec![origin];
        if borders.iter().any(|(_, old, new)| darkened(old, new, dimension)) {
            let ring: Vec<Arc<Chunk>> = origin
                .neighbours()
                .into_iter()
                .filter_map(|position| self.chunk(position))
                .filter(|neighbour| neighbour.phase().fields().light)
                .collect();
            tracing::trace!(chunk = %origin, rebuilt = ring.len(), "edge darkened, relighting neighbours");
            for neighbour in &ring {
                neighbour.recalculate_light();
            }
            for neighbour in &ring {
                self.pull_borders(neighbour);
                seeds.push(neighbour.position());
            }
        }
        self.pull_borders(chunk);
        self.spread_light(origin, seeds);
    }

    /// Emits one light event per section whose light changed, in `center`
    /// and its 8 neighbours.
    fn fire_light_changes(&self, center: ChunkPosition) {
        for candidate in iter::once(center).chain(center.neighbours()) {
            let Some(chunk) = self.chunk(candidate) else {
                continue;
            };
            for section_height in chunk.take_light_updates() {
                self.events.fire(
                    self,
                    WorldEvent::ChunkLightUpdate {
                        chunk: candidate,
                        section_height,
                        same_chunk: candidate == center,
                    },
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Biomes and occlusion
    // -----------------------------------------------------------------------

    pub fn get_biome(&self, position: BlockPosition) -> Option<Arc<Biome>> {
        let chunk = self.chunk(position.chunk_position())?;
        self.chunk_biome(&chunk, position.in_chunk_position())
    }

    /// Biome at `position` inside `chunk`. The y coordinate is passed to the
    /// source as is.
    pub fn chunk_biome(&self, chunk: &Chunk, position: InChunkPosition) -> Option<Arc<Biome>> {
        let Some(noise) = self.biomes.noise() else {
            return chunk.source_biome(position);
        };
        if !chunk.neighbours_loaded() {
            return noise.get(chunk.position(), position, self);
        }

        let generation = self.biomes.generation();
        match chunk.cached_biome(position, generation) {
            CachedBiome::Hit(biome) => biome,
            CachedBiome::Miss => {
                let biome = noise.get(chunk.position(), position, self);
                chunk.store_biome(position, generation, biome.clone());
                biome
            }
            CachedBiome::Unallocated => noise.get(chunk.position(), position, self),
        }
    }

    /// Whether biome queries for `chunk` are currently memoised.
    pub fn caches_biomes(&self, chunk: &Chunk) -> bool {
        self.biomes.noise().is_some() && chunk.neighbours_loaded()
    }

    /// Face-to-face occlusion of one section. `None` if unknown.
    pub fn is_occluded(
        &self,
        chunk: ChunkPosition,
        section_height: i32,
        from: Direction,
        to: Direction,
    ) -> Option<bool> {
        let chunk = self.chunk(chunk)?;
        if chunk.refresh_occlusion(section_height) {
            self.occlusion_revision.fetch_add(1, Ordering::AcqRel);
        }
        chunk.is_occluded(section_height, from, to)
    }

    // -----------------------------------------------------------------------
    // Environment and ticking
    // -----------------------------------------------------------------------

    pub fn environment(&self) -> WorldEnvironment {
        *self.environment.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update_environment(&self, update: impl FnOnce(&mut WorldEnvironment)) {
        update(&mut self.environment.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// Advances time and runs `tick` hooks in fully loaded chunks.
    ///
    /// Iterates a snapshot of the chunk map, so chunks may be loaded or
    /// unloaded by hooks or other threads meanwhile.
    pub fn tick(&self) {
        self.update_environment(WorldEnvironment::advance);
        let snapshot: Vec<Arc<Chunk>> = self.chunks.iter().map(|entry| Arc::clone(entry.value())).collect();
        let registry = &self.context.blocks;
        for chunk in snapshot {
            if !chunk.is_fully_loaded() {
                continue;
            }
            for (position, state) in chunk.ticking_blocks() {
                if let Some(hook) = registry.behavior(state).and_then(|b| b.tick.as_ref()) {
                    hook(&HookContext {
                        world: self,
                        position: BlockPosition::from_parts(chunk.position(), position),
                        state,
                    });
                }
            }
        }
    }

    /// Picks random positions around `center` and runs their `random_tick`
    /// hooks. Returns the number of hooks run.
    pub fn random_tick<R: Rng>(&self, center: BlockPosition, rng: &mut R) -> usize {
        let mut ticked = 0;
        for _ in 0..RANDOM_TICK_ITERATIONS {
            for radius in RANDOM_TICK_RADII {
                if self.random_tick_near(center, radius, rng) {
                    ticked += 1;
                }
            }
        }
        ticked
    }

    fn random_tick_near<R: Rng>(&self, center: BlockPosition, radius: i32, rng: &mut R) -> bool {
        let dx = random_offset(rng, radius);
        let dy = random_offset(rng, radius);
        let dz = random_offset(rng, radius);
        let Some(position) = BlockPosition::try_new(center.x() + dx, center.y() + dy, center.z() + dz) else {
            return false;
        };
        let Some(state) = self.get(position) else {
            return false;
        };
        let Some(hook) = self
            .context
            .blocks
            .behavior(state)
            .and_then(|b| b.random_tick.as_ref())
        else {
            return false;
        };
        hook(&HookContext {
            world: self,
            position,
            state,
        });
        true
    }
}

impl BlockView for World {
    fn block_at(&self, position: BlockPosition) -> Option<BlockStateId> {
        self.get(position)
    }
}

impl BiomeSourceLookup for World {
    fn biome_source(&self, chunk: ChunkPosition) -> Option<Arc<dyn BiomeSource>> {
        self.chunk(chunk)?.biome_source()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("chunks", &self.len())
            .field("revision", &self.revision())
            .field("biomes", &self.biomes)
            .finish()
    }
}

fn has_blocks(chunk: &Chunk) -> bool {
    chunk.phase().fields().blocks
}

fn neighbour_of(position: ChunkPosition, face: Direction) -> ChunkPosition {
    let (dx, _, dz) = face.vector();
    position.offset(dx, dz)
}

/// Symmetric offset in `-(radius - 1)..radius`, denser towards the centre.
fn random_offset<R: Rng>(rng: &mut R, radius: i32) -> i32 {
    rng.random_range(0..radius) - rng.random_range(0..radius)
}

/// Whether any cell of the edge got darker in either channel.
fn darkened(old: &FaceBorder, new: &FaceBorder, dimension: DimensionLimits) -> bool {
    (dimension.min_y()..=dimension.max_y()).any(|y| {
        (0..SECTION_WIDTH_X).any(|along| match (old.get(along, y), new.get(along, y)) {
            (Some(old), Some(new)) => new.sky() < old.sky() || new.block() < old.block(),
            _ => false,
        })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_biome::BiomeRegistry;
    use lattice_coords::InSectionPosition;
    use lattice_voxel::{BlockDef, BlockRegistry, BlockStorage};

    struct Fixture {
        world: World,
        stone: BlockStateId,
        torch: BlockStateId,
    }

    /// A world without sky, 32 blocks high.
    fn fixture() -> Fixture {
        let mut blocks = BlockRegistry::new();
        let stone = blocks.register(BlockDef::opaque("stone")).unwrap();
        let torch = blocks
            .register(BlockDef::transparent("torch").with_light_emission(14))
            .unwrap();
        let context = WorldContext::new(
            Arc::new(blocks),
            Arc::new(BiomeRegistry::new()),
            DimensionLimits::new(0, 32, false),
        );
        Fixture {
            world: World::new(Arc::new(context)),
            stone,
            torch,
        }
    }

    fn load_air(world: &World, position: ChunkPosition) {
        world
            .set_data(position, ChunkDataBatch::new().with_blocks(vec![None, None]), true)
            .unwrap();
    }

    #[test]
    fn test_unknown_positions_are_absent_and_full_bright() {
        let fixture = fixture();
        let position = BlockPosition::new(40, 5, -3);
        assert_eq!(fixture.world.get(position), None);
        assert_eq!(fixture.world.get_light(position), LightLevel::FULL_BRIGHT);
        assert!(!fixture.world.set(position, fixture.stone));
        assert!(!fixture.world.unload_chunk(position.chunk_position()));
    }

    #[test]
    fn test_torch_light_crosses_chunk_border() {
        let fixture = fixture();
        let world = &fixture.world;
        load_air(world, ChunkPosition::new(0, 0));
        load_air(world, ChunkPosition::new(1, 0));

        assert!(world.set(BlockPosition::new(14, 8, 8), fixture.torch));
        assert_eq!(world.get_light(BlockPosition::new(14, 8, 8)).block(), 14);
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 8)).block(), 12);
        assert_eq!(world.get_light(BlockPosition::new(20, 8, 8)).block(), 8);

        assert!(world.set(BlockPosition::new(14, 8, 8), BlockStateId::AIR));
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 8)).block(), 0);
        assert_eq!(world.get_light(BlockPosition::new(20, 8, 8)).block(), 0);
    }

    #[test]
    fn test_torch_light_reaches_diagonal_chunk() {
        let fixture = fixture();
        let world = &fixture.world;
        for (x, z) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            load_air(world, ChunkPosition::new(x, z));
        }

        assert!(world.set(BlockPosition::new(15, 8, 15), fixture.torch));
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 15)).block(), 13);
        assert_eq!(world.get_light(BlockPosition::new(15, 8, 16)).block(), 13);
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 16)).block(), 12);
        assert_eq!(world.get_light(BlockPosition::new(20, 8, 20)).block(), 4);

        assert!(world.set(BlockPosition::new(15, 8, 15), BlockStateId::AIR));
        for (x, z) in [(16, 15), (15, 16), (16, 16), (20, 20)] {
            assert_eq!(world.get_light(BlockPosition::new(x, 8, z)).block(), 0, "stale light at {x},{z}");
        }
    }

    #[test]
    fn test_reopened_edge_takes_neighbour_light_back() {
        let fixture = fixture();
        let world = &fixture.world;
        load_air(world, ChunkPosition::new(0, 0));
        load_air(world, ChunkPosition::new(1, 0));
        assert!(world.set(BlockPosition::new(15, 8, 8), fixture.torch));
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 8)).block(), 13);

        assert!(world.set(BlockPosition::new(16, 8, 8), fixture.stone));
        assert_eq!(world.get_light(BlockPosition::new(18, 8, 8)).block(), 9, "light flows around the stone");

        assert!(world.set(BlockPosition::new(16, 8, 8), BlockStateId::AIR));
        assert_eq!(world.get_light(BlockPosition::new(16, 8, 8)).block(), 13);
        assert_eq!(world.get_light(BlockPosition::new(18, 8, 8)).block(), 11);
    }

    #[test]
    fn test_loaded_chunk_pulls_neighbour_light() {
        let fixture = fixture();
        let world = &fixture.world;
        let mut storage = BlockStorage::new();
        storage.set(InSectionPosition::new(15, 4, 4), fixture.torch);
        world
            .set_data(
                ChunkPosition::ORIGIN,
                ChunkDataBatch::new().with_blocks(vec![Some(storage), None]),
                true,
            )
            .unwrap();
        load_air(world, ChunkPosition::new(1, 0));
        assert_eq!(world.get_light(BlockPosition::new(17, 4, 4)).block(), 12);
    }

    #[test]
    fn test_batched_delta_fires_one_multi_event() {
        let fixture = fixture();
        let world = &fixture.world;
        load_air(world, ChunkPosition::ORIGIN);
        let (_, events) = world.events().channel();

        let changes = [
            (InChunkPosition::new(1, 1, 1), fixture.stone),
            (InChunkPosition::new(2, 1, 1), fixture.stone),
            (InChunkPosition::new(3, 1, 1), BlockStateId::AIR),
        ];
        assert_eq!(world.apply_block_updates(ChunkPosition::ORIGIN, &changes), 2);

        let received: Vec<WorldEvent> = events.try_iter().collect();
        let block_sets = received
            .iter()
            .filter(|event| matches!(event, WorldEvent::BlockSet { .. }))
            .count();
        assert_eq!(block_sets, 2);
        assert!(matches!(
            received.last(),
            Some(WorldEvent::MultiBlockSet { changes, .. }) if changes.len() == 2
        ));
    }

    #[test]
    fn test_delta_for_missing_chunk_is_ignored() {
        let fixture = fixture();
        let world = &fixture.world;
        world.get_or_create_chunk(ChunkPosition::ORIGIN);
        let changes = [(InChunkPosition::new(1, 1, 1), fixture.stone)];
        assert_eq!(world.apply_block_updates(ChunkPosition::ORIGIN, &changes), 0);
        assert_eq!(world.apply_block_updates(ChunkPosition::new(5, 5), &changes), 0);
        world
            .apply(WorldUpdate::BlockChange {
                position: BlockPosition::new(1, 1, 1),
                state: fixture.stone,
            })
            .unwrap();
        assert_eq!(world.get(BlockPosition::new(1, 1, 1)), None);
    }

    #[test]
    fn test_occlusion_revision_moves_only_on_change() {
        let fixture = fixture();
        let world = &fixture.world;
        load_air(world, ChunkPosition::ORIGIN);
        assert_eq!(world.is_occluded(ChunkPosition::ORIGIN, 0, Direction::Up, Direction::Down), Some(false));
        let revision = world.occlusion_revision();

        for x in 0..16 {
            for z in 0..16 {
                world.set(BlockPosition::new(x, 3, z), fixture.stone);
            }
        }
        assert_eq!(world.is_occluded(ChunkPosition::ORIGIN, 0, Direction::Up, Direction::Down), Some(true));
        assert_eq!(world.occlusion_revision(), revision + 1);
        assert_eq!(world.is_occluded(ChunkPosition::ORIGIN, 0, Direction::Up, Direction::Down), Some(true));
        assert_eq!(world.occlusion_revision(), revision + 1);
    }

    #[test]
    fn test_tick_advances_time() {
        let fixture = fixture();
        fixture.world.tick();
        fixture.world.tick();
        assert_eq!(fixture.world.environment().time, 2);
        assert_eq!(fixture.world.environment().age, 2);
    }
}
