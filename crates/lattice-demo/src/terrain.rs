//! Synthetic chunk data standing in for a server stream.

use std::sync::Arc;

use lattice_biome::{ClimateNoise, NoiseBiomeSource};
use lattice_coords::{ChunkPosition, InSectionPosition, SECTION_HEIGHT_Y};
use lattice_voxel::{BlockStateId, BlockStorage};
use lattice_world::{ChunkDataBatch, DimensionLimits};
use noise::{NoiseFn, Simplex};

use crate::content::Blocks;

/// Surface height from a few octaves of simplex noise.
pub struct TerrainGenerator {
    noise: Simplex,
    blocks: Blocks,
    dimension: DimensionLimits,
    climate: Arc<ClimateNoise>,
    sea_level: i32,
}

impl TerrainGenerator {
    const OCTAVES: u32 = 4;
    const BASE_FREQUENCY: f64 = 0.01;
    const AMPLITUDE: f64 = 12.0;

    pub fn new(seed: u64, blocks: Blocks, dimension: DimensionLimits, climate: Arc<ClimateNoise>) -> Self {
        let sea_level = (dimension.min_y() + dimension.height() / 4).min(dimension.max_y());
        Self {
            noise: Simplex::new(seed as u32),
            blocks,
            dimension,
            climate,
            sea_level,
        }
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Surface y of column `(x, z)`, clamped into the dimension.
    pub fn surface(&self, x: i32, z: i32) -> i32 {
        let mut total = 0.0;
        let mut frequency = Self::BASE_FREQUENCY;
        let mut amplitude = Self::AMPLITUDE;
        for _ in 0..Self::OCTAVES {
            total += self.noise.get([f64::from(x) * frequency, f64::from(z) * frequency]) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        (self.sea_level + total as i32).clamp(self.dimension.min_y(), self.dimension.max_y())
    }

    /// Full chunk batch: blocks and biome source, no light.
    pub fn generate(&self, position: ChunkPosition) -> ChunkDataBatch {
        let mut sections: Vec<Option<BlockStorage>> = vec![None; self.dimension.section_count()];
        for x in 0..16 {
            for z in 0..16 {
                let world_x = position.x * 16 + x;
                let world_z = position.z * 16 + z;
                let surface = self.surface(world_x, world_z);
                let top = surface.max(self.sea_level);
                for y in self.dimension.min_y()..=top {
                    let state = self.block_at(world_x, y, world_z, surface);
                    if state.is_air() {
                        continue;
                    }
                    let Some(index) = self.dimension.section_index(y >> 4) else {
                        continue;
                    };
                    let section = sections[index].get_or_insert_with(BlockStorage::new);
                    section.set(InSectionPosition::new(x, y & (SECTION_HEIGHT_Y - 1), z), state);
                }
            }
        }
        for section in sections.iter_mut().flatten() {
            section.compact();
        }

        ChunkDataBatch::new()
            .with_blocks(sections)
            .with_biome_source(Arc::new(NoiseBiomeSource::new(Arc::clone(&self.climate), position)))
    }

    fn block_at(&self, x: i32, y: i32, z: i32, surface: i32) -> BlockStateId {
        let blocks = &self.blocks;
        if y > surface {
            return blocks.water;
        }
        if y == surface {
            return if surface < self.sea_level { blocks.dirt } else { blocks.grass };
        }
        if y > surface - 4 {
            return blocks.dirt;
        }
        // Sparse light sources deep in the rock.
        let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663) ^ z.wrapping_mul(83_492_791);
        if y < surface - 8 && hash % 509 == 0 {
            return blocks.glowstone;
        }
        blocks.stone
    }
}
