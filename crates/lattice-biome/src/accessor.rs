//! Noise biome accessors: resolve a position by sampling the biome sources of
//! the surrounding chunks, not just the owning one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use lattice_coords::{ChunkPosition, InChunkPosition, SECTION_WIDTH_X, SECTION_WIDTH_Z};

use crate::biome::Biome;
use crate::source::BiomeSource;

/// Finds the biome source of any loaded chunk.
pub trait BiomeSourceLookup {
    fn biome_source(&self, chunk: ChunkPosition) -> Option<Arc<dyn BiomeSource>>;
}

/// Expensive resolution strategy. When the world has one configured, its
/// results are cached per section.
pub trait NoiseBiomeAccessor: Send + Sync {
    fn get(
        &self,
        chunk: ChunkPosition,
        position: InChunkPosition,
        lookup: &dyn BiomeSourceLookup,
    ) -> Option<Arc<Biome>>;
}

/// Blends biome borders by sampling at a seed-jittered position up to two
/// blocks away, possibly inside a neighbouring chunk.
#[derive(Clone, Copy, Debug)]
pub struct VoronoiBiomeAccessor {
    seed: u64,
}

impl VoronoiBiomeAccessor {
    /// Largest jitter along x or z.
    pub const MAX_OFFSET: i32 = 2;

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Horizontal jitter of the 4×4×4 cell containing `(x, y, z)`.
    pub fn offset(&self, x: i32, y: i32, z: i32) -> (i32, i32) {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        (x >> 2).hash(&mut hasher);
        (y >> 2).hash(&mut hasher);
        (z >> 2).hash(&mut hasher);
        let hash = hasher.finish();

        let span = (2 * Self::MAX_OFFSET + 1) as u64;
        let dx = (hash % span) as i32 - Self::MAX_OFFSET;
        let dz = ((hash >> 32) % span) as i32 - Self::MAX_OFFSET;
        (dx, dz)
    }
}

impl NoiseBiomeAccessor for VoronoiBiomeAccessor {
    fn get(
        &self,
        chunk: ChunkPosition,
        position: InChunkPosition,
        lookup: &dyn BiomeSourceLookup,
    ) -> Option<Arc<Biome>> {
        let x = chunk.x * SECTION_WIDTH_X + position.x();
        let z = chunk.z * SECTION_WIDTH_Z + position.z();
        let (dx, dz) = self.offset(x, position.y(), z);
        let (x, z) = (x + dx, z + dz);

        let sampled = ChunkPosition::new(x >> 4, z >> 4);
        let Some(source) = lookup.biome_source(sampled) else {
            tracing::trace!(%chunk, %sampled, "no biome source to sample");
            return None;
        };
        source.get(InChunkPosition::new(x & 0x0F, position.y(), z & 0x0F))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixedBiomeSource;
    use std::collections::HashMap;

    struct Chunks(HashMap<ChunkPosition, Arc<dyn BiomeSource>>);

    impl BiomeSourceLookup for Chunks {
        fn biome_source(&self, chunk: ChunkPosition) -> Option<Arc<dyn BiomeSource>> {
            self.0.get(&chunk).cloned()
        }
    }

    fn grid(biome_of: impl Fn(ChunkPosition) -> Arc<Biome>) -> Chunks {
        let mut chunks = HashMap::new();
        for x in -1..=1 {
            for z in -1..=1 {
                let position = ChunkPosition::new(x, z);
                let source: Arc<dyn BiomeSource> = Arc::new(FixedBiomeSource::new(Some(biome_of(position))));
                chunks.insert(position, source);
            }
        }
        Chunks(chunks)
    }

    #[test]
    fn test_offset_is_bounded_and_deterministic() {
        let accessor = VoronoiBiomeAccessor::new(1234);
        for x in -40..40 {
            for z in -40..40 {
                let (dx, dz) = accessor.offset(x, 64, z);
                assert!(dx.abs() <= VoronoiBiomeAccessor::MAX_OFFSET);
                assert!(dz.abs() <= VoronoiBiomeAccessor::MAX_OFFSET);
                assert_eq!(accessor.offset(x, 64, z), (dx, dz));
            }
        }
    }

    #[test]
    fn test_offsets_vary_with_seed() {
        let a = VoronoiBiomeAccessor::new(1);
        let b = VoronoiBiomeAccessor::new(2);
        let differs = (0..64).any(|i| a.offset(i * 4, 0, 0) != b.offset(i * 4, 0, 0));
        assert!(differs);
    }

    #[test]
    fn test_uniform_neighbourhood_resolves_uniformly() {
        let plains = Arc::new(Biome::new("plains", 0.8, 0.4));
        let chunks = grid(|_| plains.clone());
        let accessor = VoronoiBiomeAccessor::new(99);
        for x in 0..16 {
            for z in 0..16 {
                let biome = accessor
                    .get(ChunkPosition::ORIGIN, InChunkPosition::new(x, 5, z), &chunks)
                    .unwrap();
                assert!(Arc::ptr_eq(&biome, &plains));
            }
        }
    }

    #[test]
    fn test_edges_may_sample_neighbours() {
        let centre = Arc::new(Biome::new("centre", 0.5, 0.5));
        let outer = Arc::new(Biome::new("outer", 0.5, 0.5));
        let chunks = grid(|p| if p == ChunkPosition::ORIGIN { centre.clone() } else { outer.clone() });
        let accessor = VoronoiBiomeAccessor::new(5);

        let mut saw_outer = false;
        for x in 0..16 {
            for z in 0..16 {
                let biome = accessor
                    .get(ChunkPosition::ORIGIN, InChunkPosition::new(x, 0, z), &chunks)
                    .unwrap();
                let interior = (2..14).contains(&x) && (2..14).contains(&z);
                if interior {
                    assert!(Arc::ptr_eq(&biome, &centre), "interior ({x}, {z}) left the chunk");
                }
                saw_outer |= Arc::ptr_eq(&biome, &outer);
            }
        }
        assert!(saw_outer, "some edge cell should jitter into a neighbour");
    }

    #[test]
    fn test_missing_neighbour_is_absent() {
        let accessor = VoronoiBiomeAccessor::new(5);
        let empty = Chunks(HashMap::new());
        assert!(accessor.get(ChunkPosition::ORIGIN, InChunkPosition::new(8, 0, 8), &empty).is_none());
    }
}
