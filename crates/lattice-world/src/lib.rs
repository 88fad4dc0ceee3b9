//! Chunk and world containers: block get/set, section allocation, light and
//! biome orchestration, neighbour completeness and change events.
//!
//! A [`World`] owns every [`Chunk`]. Each chunk owns its sections. All public
//! operations take `&self` and are safe to call from any number of threads.

pub mod biomes;
pub mod chunk;
pub mod context;
pub mod data;
pub mod environment;
pub mod events;
pub mod lookup;
pub mod section;
pub mod world;

pub use biomes::WorldBiomes;
pub use chunk::{CachedBiome, Chunk, ChunkState, DataFields, DataPhase};
pub use context::{DimensionLimits, WorldContext};
pub use data::{ChunkDataBatch, ChunkDataError, DataOutcome, WorldUpdate};
pub use environment::{TICKS_PER_DAY, WorldEnvironment};
pub use events::{EventBus, Listener, ListenerId, WorldEvent};
pub use lookup::ChunkLookup;
pub use section::ChunkSection;
pub use world::{RANDOM_TICK_ITERATIONS, RANDOM_TICK_RADII, World};
