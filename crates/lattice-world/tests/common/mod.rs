//! Shared world setup for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use lattice_biome::{BiomeRegistry, BiomeSource};
use lattice_coords::ChunkPosition;
use lattice_voxel::{BlockRegistry, BlockStorage};
use lattice_world::{ChunkDataBatch, DimensionLimits, World, WorldContext};

/// Builds a 256 block high world with skylight around `blocks`.
pub fn world(blocks: BlockRegistry, calculate_light: bool) -> World {
    let context = WorldContext::new(
        Arc::new(blocks),
        Arc::new(BiomeRegistry::new()),
        DimensionLimits::new(0, 256, true),
    )
    .with_calculate_light(calculate_light);
    World::new(Arc::new(context))
}

/// Block data with section 0 allocated from `section`, the rest empty.
pub fn blocks_with(section: BlockStorage) -> Vec<Option<BlockStorage>> {
    let mut sections: Vec<Option<BlockStorage>> = vec![None; 16];
    sections[0] = Some(section);
    sections
}

/// Loads every chunk with `-radius..=radius` coordinates: section 0 from
/// `section`, and the biome source returned by `source`.
pub fn load_grid(
    world: &World,
    radius: i32,
    section: &BlockStorage,
    source: impl Fn(ChunkPosition) -> Arc<dyn BiomeSource>,
) {
    for x in -radius..=radius {
        for z in -radius..=radius {
            let position = ChunkPosition::new(x, z);
            let batch = ChunkDataBatch::new()
                .with_blocks(blocks_with(section.clone()))
                .with_biome_source(source(position));
            world.set_data(position, batch, true).unwrap();
        }
    }
}
