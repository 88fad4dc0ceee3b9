//! Noise-driven climate sampling: the expensive biome source.

use std::sync::Arc;

use lattice_coords::{ChunkPosition, InChunkPosition, SECTION_WIDTH_X, SECTION_WIDTH_Z};
use noise::{NoiseFn, Simplex};

use crate::biome::{Biome, BiomeRegistry};
use crate::source::BiomeSource;

/// Temperature and humidity simplex fields mapped onto the closest biome.
pub struct ClimateNoise {
    temperature: Simplex,
    humidity: Simplex,
    registry: Arc<BiomeRegistry>,
    /// Lower values give broader climate zones.
    pub frequency: f64,
}

impl ClimateNoise {
    /// The two fields use decorrelated seeds derived from `seed`.
    pub fn new(seed: u64, registry: Arc<BiomeRegistry>) -> Self {
        Self {
            temperature: Simplex::new(seed as u32),
            humidity: Simplex::new(seed.wrapping_add(0xDEAD_BEEF) as u32),
            registry,
            frequency: 0.004,
        }
    }

    /// Normalised `(temperature, humidity)` in `[0, 1]` at a world position.
    pub fn climate(&self, x: i32, y: i32, z: i32) -> (f64, f64) {
        let point = [
            f64::from(x) * self.frequency,
            f64::from(y) * self.frequency * 0.25,
            f64::from(z) * self.frequency,
        ];
        let temperature = (self.temperature.get(point) + 1.0) * 0.5;
        let humidity = (self.humidity.get(point) + 1.0) * 0.5;
        (temperature.clamp(0.0, 1.0), humidity.clamp(0.0, 1.0))
    }

    /// Biome closest to the climate at a world position.
    pub fn sample(&self, x: i32, y: i32, z: i32) -> Option<Arc<Biome>> {
        let (temperature, humidity) = self.climate(x, y, z);
        // Registered temperatures span roughly -0.5..=2.0.
        let temperature = temperature * 2.5 - 0.5;
        self.registry
            .closest(temperature as f32, humidity as f32)
            .cloned()
    }
}

/// A chunk's view of a shared [`ClimateNoise`].
pub struct NoiseBiomeSource {
    climate: Arc<ClimateNoise>,
    chunk: ChunkPosition,
}

impl NoiseBiomeSource {
    pub fn new(climate: Arc<ClimateNoise>, chunk: ChunkPosition) -> Self {
        Self { climate, chunk }
    }
}

impl BiomeSource for NoiseBiomeSource {
    fn get(&self, position: InChunkPosition) -> Option<Arc<Biome>> {
        self.climate.sample(
            self.chunk.x * SECTION_WIDTH_X + position.x(),
            position.y(),
            self.chunk.z * SECTION_WIDTH_Z + position.z(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<BiomeRegistry> {
        let mut registry = BiomeRegistry::new();
        registry.register(Biome::new("desert", 2.0, 0.0)).unwrap();
        registry.register(Biome::new("jungle", 0.95, 0.9)).unwrap();
        registry.register(Biome::new("tundra", -0.5, 0.3)).unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_climate_is_normalised() {
        let noise = ClimateNoise::new(42, registry());
        for x in (-2000..2000).step_by(97) {
            for z in (-2000..2000).step_by(89) {
                let (t, h) = noise.climate(x, 64, z);
                assert!((0.0..=1.0).contains(&t), "temperature {t} out of range");
                assert!((0.0..=1.0).contains(&h), "humidity {h} out of range");
            }
        }
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let registry = registry();
        let a = ClimateNoise::new(7, registry.clone());
        let b = ClimateNoise::new(7, registry);
        for x in (-500..500).step_by(37) {
            let first = a.sample(x, 70, -x).unwrap();
            let second = b.sample(x, 70, -x).unwrap();
            assert!(Arc::ptr_eq(&first, &second));
        }
    }

    #[test]
    fn test_chunk_source_offsets_by_chunk() {
        let climate = Arc::new(ClimateNoise::new(3, registry()));
        let source = NoiseBiomeSource::new(climate.clone(), ChunkPosition::new(-2, 5));
        let local = source.get(InChunkPosition::new(3, 10, 4)).unwrap();
        let world = climate.sample(-32 + 3, 10, 80 + 4).unwrap();
        assert!(Arc::ptr_eq(&local, &world));
    }

    #[test]
    fn test_empty_registry_yields_nothing() {
        let noise = ClimateNoise::new(1, Arc::new(BiomeRegistry::new()));
        assert!(noise.sample(0, 0, 0).is_none());
    }
}
