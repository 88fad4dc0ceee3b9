//! Biomes and the strategies resolving them at a position.
//!
//! A [`BiomeSource`] answers per chunk from data it owns. A
//! [`NoiseBiomeAccessor`] may look across chunk borders and is expensive, so
//! its results are memoised per section in a [`SectionBiomeCache`].

mod accessor;
mod biome;
mod cache;
mod climate;
mod source;

pub use accessor::{BiomeSourceLookup, NoiseBiomeAccessor, VoronoiBiomeAccessor};
pub use biome::{Biome, BiomeId, BiomeRegistry, BiomeRegistryError};
pub use cache::SectionBiomeCache;
pub use climate::{ClimateNoise, NoiseBiomeSource};
pub use source::{BiomeSource, CellBiomeSource, ColumnBiomeSource, FixedBiomeSource};
