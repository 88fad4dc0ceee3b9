//! Chunk light engine: packed sky/block light storage, the per-column skylight
//! heightmap and breadth-first propagation inside and across chunk columns.

pub mod cross_chunk;
pub mod heightmap;
pub mod level;
pub mod propagation;

pub use cross_chunk::{FaceBorder, border_changed};
pub use heightmap::LightHeightmap;
pub use level::{BorderLight, Channel, LightArray, LightLevel, VerticalBorder};
pub use propagation::{LightEngine, LightVolume};
