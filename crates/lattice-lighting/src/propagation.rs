//! Breadth-first light propagation inside one chunk column.
//!
//! Light decays by one level per step, plus the entered block's extra decay.
//! Opaque blocks stop it. Sky light is never stored above the heightmap: those
//! cells read as 15 and act as sources for everything below.
//!
//! Incremental updates follow the usual two-queue scheme: a removal pass clears
//! every cell that was lit through the changed cell and collects the brighter
//! cells bordering the cleared region, then a regular spread relights from them.

use std::collections::VecDeque;

use lattice_coords::{COLUMNS_PER_CHUNK, InChunkPosition, SECTION_MAX_X, SECTION_MAX_Z};
use lattice_voxel::{BlockRegistry, BlockStateId};

use crate::heightmap::LightHeightmap;
use crate::level::{BorderLight, Channel, LightLevel, VerticalBorder};

type LightQueue = VecDeque<(InChunkPosition, Channel)>;

/// Storage the engine reads blocks from and writes light into.
///
/// Implemented by a chunk column for the duration of one exclusive borrow.
pub trait LightVolume {
    /// Lowest block y of the column.
    fn min_y(&self) -> i32;
    /// Highest block y of the column.
    fn max_y(&self) -> i32;
    fn block(&self, position: InChunkPosition) -> BlockStateId;
    /// Stored light, without the heightmap shortcut.
    fn light(&self, position: InChunkPosition) -> LightLevel;
    fn set_light(&mut self, position: InChunkPosition, level: LightLevel);
    /// Resets every stored light value to dark.
    fn clear_light(&mut self);
    fn heightmap(&self) -> &LightHeightmap;
    fn border_mut(&mut self, side: VerticalBorder) -> &mut BorderLight;

    /// Visits every non-air block. The default scans the whole column.
    fn for_each_block(&self, visit: &mut dyn FnMut(InChunkPosition, BlockStateId)) {
        for y in self.min_y()..=self.max_y() {
            for z in 0..=SECTION_MAX_Z {
                for x in 0..=SECTION_MAX_X {
                    let position = InChunkPosition::new(x, y, z);
                    let state = self.block(position);
                    if !state.is_air() {
                        visit(position, state);
                    }
                }
            }
        }
    }
}

/// Light propagation rules bound to a block registry.
#[derive(Clone, Copy)]
pub struct LightEngine<'a> {
    registry: &'a BlockRegistry,
    has_skylight: bool,
}

impl<'a> LightEngine<'a> {
    pub fn new(registry: &'a BlockRegistry, has_skylight: bool) -> Self {
        Self {
            registry,
            has_skylight,
        }
    }

    pub fn has_skylight(&self) -> bool {
        self.has_skylight
    }

    /// Light at `position` as seen by readers: stored light with sky forced
    /// to 15 above the heightmap.
    pub fn effective<V: LightVolume + ?Sized>(&self, volume: &V, position: InChunkPosition) -> LightLevel {
        let stored = volume.light(position);
        if self.has_skylight && volume.heightmap().is_above(position) {
            stored.with_sky(LightLevel::MAX)
        } else {
            stored
        }
    }

    /// Wipes and rebuilds both channels of the whole column, then the two
    /// border layers. Does not look at neighbouring columns.
    pub fn recalculate<V: LightVolume + ?Sized>(&self, volume: &mut V) {
        volume.clear_light();
        let min_y = volume.min_y();
        let mut queue = LightQueue::new();

        if self.has_skylight {
            self.seed_sky(volume, &mut queue);
        }

        let mut emitters = Vec::new();
        volume.for_each_block(&mut |position, state| {
            let emission = self.registry.light_emission(state);
            if emission > 0 {
                emitters.push((position, emission));
            }
        });
        for (position, emission) in emitters {
            let current = volume.light(position);
            volume.set_light(position, current.with_block(emission));
            queue.push_back((position, Channel::Block));
        }

        self.spread(volume, queue);
        self.update_borders(volume, min_y);
        tracing::trace!(min_y, max_y = volume.max_y(), "recalculated column light");
    }

    /// Incrementally fixes light after the block at `position` changed.
    ///
    /// The block and the heightmap must already hold their new values;
    /// `height_change` is what [`LightHeightmap::on_block_change`] returned.
    pub fn on_block_change<V: LightVolume + ?Sized>(
        &self,
        volume: &mut V,
        position: InChunkPosition,
        height_change: Option<(i32, i32)>,
    ) {
        let min_y = volume.min_y();
        let mut relight = LightQueue::new();

        let stored = volume.light(position);
        let mut removals = VecDeque::new();
        if stored.block() > 0 {
            volume.set_light(position, stored.with_block(0));
            removals.push_back((position, stored.block()));
        }
        self.unspread(volume, Channel::Block, removals, &mut relight);

        let emission = self.registry.light_emission(volume.block(position));
        if emission > 0 {
            let current = volume.light(position);
            volume.set_light(position, current.with_block(emission.max(current.block())));
            relight.push_back((position, Channel::Block));
        }

        if self.has_skylight {
            let mut removals = VecDeque::new();
            match height_change {
                Some((old, new)) if new > old => {
                    // Cells that lost the shortcut were at 15.
                    for y in (old + 1).max(min_y)..=new {
                        let cell = position.with_y(y);
                        let current = volume.light(cell);
                        volume.set_light(cell, current.with_sky(0));
                        removals.push_back((cell, LightLevel::MAX));
                    }
                }
                Some((old, new)) => {
                    for y in (new + 1).max(min_y)..=old {
                        let cell = position.with_y(y);
                        let current = volume.light(cell);
                        volume.set_light(cell, current.with_sky(0));
                        relight.push_back((cell, Channel::Sky));
                    }
                }
                None if !volume.heightmap().is_above(position) => {
                    let current = volume.light(position);
                    if current.sky() > 0 {
                        volume.set_light(position, current.with_sky(0));
                        removals.push_back((position, current.sky()));
                    }
                }
                None => {}
            }
            self.unspread(volume, Channel::Sky, removals, &mut relight);
        }

        for neighbour in neighbours(position, min_y, volume.max_y()).into_iter().flatten() {
            relight.push_back((neighbour, Channel::Block));
            if self.has_skylight {
                relight.push_back((neighbour, Channel::Sky));
            }
        }
        self.spread(volume, relight);
        self.update_borders(volume, min_y);
    }

    /// Offers `source_level` from an adjacent cell to `target`. Returns `true`
    /// and queues the target if it got brighter.
    pub(crate) fn offer<V: LightVolume + ?Sized>(
        &self,
        volume: &mut V,
        target: InChunkPosition,
        channel: Channel,
        source_level: u8,
        queue: &mut LightQueue,
    ) -> bool {
        let state = volume.block(target);
        if self.registry.blocks_light(state) {
            return false;
        }
        let decay = 1 + self.registry.extra_decay(state);
        if source_level <= decay {
            return false;
        }
        let level = source_level - decay;
        if channel == Channel::Sky && volume.heightmap().is_above(target) {
            return false;
        }
        let current = volume.light(target);
        if channel.get(current) >= level {
            return false;
        }
        volume.set_light(target, channel.set(current, level));
        queue.push_back((target, channel));
        true
    }

    /// Drains `queue`, spreading each cell's light to its neighbours.
    pub(crate) fn spread<V: LightVolume + ?Sized>(&self, volume: &mut V, mut queue: LightQueue) {
        let (min_y, max_y) = (volume.min_y(), volume.max_y());
        while let Some((position, channel)) = queue.pop_front() {
            let level = channel.get(self.effective(volume, position));
            if level <= 1 {
                continue;
            }
            for neighbour in neighbours(position, min_y, max_y).into_iter().flatten() {
                self.offer(volume, neighbour, channel, level, &mut queue);
            }
        }
    }

    fn unspread<V: LightVolume + ?Sized>(
        &self,
        volume: &mut V,
        channel: Channel,
        mut removals: VecDeque<(InChunkPosition, u8)>,
        relight: &mut LightQueue,
    ) {
        let (min_y, max_y) = (volume.min_y(), volume.max_y());
        while let Some((position, level)) = removals.pop_front() {
            for neighbour in neighbours(position, min_y, max_y).into_iter().flatten() {
                let neighbour_level = channel.get(self.effective(volume, neighbour));
                if neighbour_level == 0 {
                    continue;
                }
                let shortcut = channel == Channel::Sky && volume.heightmap().is_above(neighbour);
                if shortcut || neighbour_level >= level {
                    relight.push_back((neighbour, channel));
                    continue;
                }

                let current = volume.light(neighbour);
                volume.set_light(neighbour, channel.set(current, 0));
                removals.push_back((neighbour, neighbour_level));

                if channel == Channel::Block {
                    let emission = self.registry.light_emission(volume.block(neighbour));
                    if emission > 0 {
                        volume.set_light(neighbour, current.with_block(emission));
                        relight.push_back((neighbour, Channel::Block));
                    }
                }
            }
        }
    }

    /// Sky enters each covered column from above and from open columns beside it.
    fn seed_sky<V: LightVolume + ?Sized>(&self, volume: &mut V, queue: &mut LightQueue) {
        let min_y = volume.min_y();
        for xz in 0..COLUMNS_PER_CHUNK {
            let (x, z) = ((xz & 0x0F) as i32, (xz >> 4) as i32);
            let height = volume.heightmap().get(xz);
            if height < min_y {
                continue;
            }
            self.offer(volume, InChunkPosition::new(x, height, z), Channel::Sky, LightLevel::MAX, queue);

            for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let (nx, nz) = (x + dx, z + dz);
                if !(0..=SECTION_MAX_X).contains(&nx) || !(0..=SECTION_MAX_Z).contains(&nz) {
                    continue;
                }
                let neighbour_height = volume.heightmap().get((nx | (nz << 4)) as usize);
                for y in (neighbour_height + 1).max(min_y)..=height {
                    self.offer(volume, InChunkPosition::new(x, y, z), Channel::Sky, LightLevel::MAX, queue);
                }
            }
        }
    }

    fn update_borders<V: LightVolume + ?Sized>(&self, volume: &mut V, min_y: i32) {
        for xz in 0..COLUMNS_PER_CHUNK {
            self.update_border_column(volume, xz, min_y);
        }
    }

    /// Derives the pseudo-section layers just below and above the column.
    fn update_border_column<V: LightVolume + ?Sized>(&self, volume: &mut V, xz: usize, min_y: i32) {
        let (x, z) = ((xz & 0x0F) as i32, (xz >> 4) as i32);
        let max_y = volume.max_y();

        let lowest = self.effective(volume, InChunkPosition::new(x, min_y, z));
        let bottom_sky = if !self.has_skylight {
            0
        } else if volume.heightmap().is_open(xz) {
            LightLevel::MAX
        } else {
            lowest.sky().saturating_sub(1)
        };
        volume
            .border_mut(VerticalBorder::Bottom)
            .set(xz, LightLevel::new(bottom_sky, lowest.block().saturating_sub(1)));

        let highest = self.effective(volume, InChunkPosition::new(x, max_y, z));
        let top_sky = if self.has_skylight { LightLevel::MAX } else { 0 };
        volume
            .border_mut(VerticalBorder::Top)
            .set(xz, LightLevel::new(top_sky, highest.block().saturating_sub(1)));
    }
}

/// The up to six neighbours of `position` inside the column.
pub(crate) fn neighbours(position: InChunkPosition, min_y: i32, max_y: i32) -> [Option<InChunkPosition>; 6] {
    let (x, y, z) = (position.x(), position.y(), position.z());
    [
        (x > 0).then(|| position.minus_x()),
        (x < SECTION_MAX_X).then(|| position.plus_x()),
        (z > 0).then(|| position.minus_z()),
        (z < SECTION_MAX_Z).then(|| position.plus_z()),
        (y > min_y).then(|| position.minus_y()),
        (y < max_y).then(|| position.plus_y()),
    ]
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use lattice_voxel::{BlockDef, Transparency};

    pub struct Blocks {
        pub registry: BlockRegistry,
        pub stone: BlockStateId,
        pub water: BlockStateId,
        pub torch: BlockStateId,
    }

    pub fn blocks() -> Blocks {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockDef::opaque("stone")).unwrap();
        let water = registry
            .register(BlockDef::transparent("water").with_transparency(Transparency::SemiTransparent))
            .unwrap();
        let torch = registry
            .register(BlockDef::transparent("torch").with_light_emission(14))
            .unwrap();
        Blocks {
            registry,
            stone,
            water,
            torch,
        }
    }

    /// A dense in-memory column used to drive the engine in tests.
    pub struct TestColumn {
        pub min_y: i32,
        pub max_y: i32,
        blocks: Vec<BlockStateId>,
        light: Vec<LightLevel>,
        pub heightmap: LightHeightmap,
        pub bottom: BorderLight,
        pub top: BorderLight,
    }

    impl TestColumn {
        pub fn new(min_y: i32, max_y: i32) -> Self {
            let cells = ((max_y - min_y + 1) as usize) * COLUMNS_PER_CHUNK;
            Self {
                min_y,
                max_y,
                blocks: vec![BlockStateId::AIR; cells],
                light: vec![LightLevel::DARK; cells],
                heightmap: LightHeightmap::new(min_y),
                bottom: BorderLight::full_bright(),
                top: BorderLight::full_bright(),
            }
        }

        fn index(&self, position: InChunkPosition) -> usize {
            (position.y() - self.min_y) as usize * COLUMNS_PER_CHUNK + position.xz_index()
        }

        /// Sets a block without touching light; call `rebuild_heightmap` after.
        pub fn put(&mut self, x: i32, y: i32, z: i32, state: BlockStateId) {
            let index = self.index(InChunkPosition::new(x, y, z));
            self.blocks[index] = state;
        }

        pub fn rebuild_heightmap(&mut self, registry: &BlockRegistry) {
            let mut heightmap = LightHeightmap::new(self.min_y);
            heightmap.recalculate(self.max_y, |p| registry.blocks_skylight(self.block(p)));
            self.heightmap = heightmap;
        }

        /// Sets a block and applies the incremental update.
        pub fn change(&mut self, engine: &LightEngine<'_>, registry: &BlockRegistry, x: i32, y: i32, z: i32, state: BlockStateId) {
            self.put(x, y, z, state);
            let position = InChunkPosition::new(x, y, z);
            let mut heightmap = self.heightmap.clone();
            let change = heightmap.on_block_change(position, registry.blocks_skylight(state), |p| {
                registry.blocks_skylight(self.block(p))
            });
            self.heightmap = heightmap;
            engine.on_block_change(self, position, change);
        }

        pub fn all_positions(&self) -> impl Iterator<Item = InChunkPosition> + '_ {
            (self.min_y..=self.max_y).flat_map(|y| {
                (0..256).map(move |xz| InChunkPosition::new(xz & 0x0F, y, xz >> 4))
            })
        }
    }

    impl LightVolume for TestColumn {
        fn min_y(&self) -> i32 {
            self.min_y
        }

        fn max_y(&self) -> i32 {
            self.max_y
        }

        fn block(&self, position: InChunkPosition) -> BlockStateId {
            self.blocks[self.index(position)]
        }

        fn light(&self, position: InChunkPosition) -> LightLevel {
            self.light[self.index(position)]
        }

        fn set_light(&mut self, position: InChunkPosition, level: LightLevel) {
            let index = self.index(position);
            self.light[index] = level;
        }

        fn clear_light(&mut self) {
            self.light.fill(LightLevel::DARK);
        }

        fn heightmap(&self) -> &LightHeightmap {
            &self.heightmap
        }

        fn border_mut(&mut self, side: VerticalBorder) -> &mut BorderLight {
            match side {
                VerticalBorder::Bottom => &mut self.bottom,
                VerticalBorder::Top => &mut self.top,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
