//! World-level biome resolution strategy.
//!
//! Without a noise accessor every query goes straight to the owning chunk's
//! [`BiomeSource`](lattice_biome::BiomeSource). With one, results are memoised
//! per section for chunks whose neighbours are loaded, since the accessor
//! samples neighbouring chunks. [`WorldBiomes::reset_cache`] invalidates every
//! memo at once by bumping a generation counter; cells are re-resolved lazily
//! on their next query.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use lattice_biome::NoiseBiomeAccessor;

#[derive(Default)]
pub struct WorldBiomes {
    noise: RwLock<Option<Arc<dyn NoiseBiomeAccessor>>>,
    generation: AtomicU64,
}

impl WorldBiomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn noise(&self) -> Option<Arc<dyn NoiseBiomeAccessor>> {
        self.noise.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Installs or removes the noise accessor. Cached values from a previous
    /// accessor are dropped.
    pub fn set_noise(&self, noise: Option<Arc<dyn NoiseBiomeAccessor>>) {
        *self.noise.write().unwrap_or_else(PoisonError::into_inner) = noise;
        self.reset_cache();
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Invalidates every cached biome of the world.
    pub fn reset_cache(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "biome cache reset");
    }
}

impl std::fmt::Debug for WorldBiomes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldBiomes")
            .field("noise", &self.noise().is_some())
            .field("generation", &self.generation())
            .finish()
    }
}
