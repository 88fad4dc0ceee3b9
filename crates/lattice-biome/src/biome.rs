//! Biome definitions and the registry resolving network biome ids.

use std::sync::Arc;

use hashbrown::HashMap;

/// Immutable climate description. Shared as `Arc<Biome>`; identity is the
/// allocation, so two lookups of the same biome are `Arc::ptr_eq`.
#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    pub name: String,
    pub temperature: f32,
    pub downfall: f32,
}

impl Biome {
    pub fn new(name: impl Into<String>, temperature: f32, downfall: f32) -> Self {
        Self {
            name: name.into(),
            temperature,
            downfall,
        }
    }
}

/// Registry index of a biome, as sent over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeId(pub u16);

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
}

/// All biomes known to the session.
pub struct BiomeRegistry {
    biomes: Vec<Arc<Biome>>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeRegistry {
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Registers a biome, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if the name is taken.
    pub fn register(&mut self, biome: Biome) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&biome.name) {
            return Err(BiomeRegistryError::DuplicateName(biome.name));
        }
        let id = BiomeId(self.biomes.len() as u16);
        tracing::trace!(name = %biome.name, id = id.0, "registered biome");
        self.name_to_id.insert(biome.name.clone(), id);
        self.biomes.push(Arc::new(biome));
        Ok(id)
    }

    /// `None` for ids the server sent but the registry does not know.
    pub fn get(&self, id: BiomeId) -> Option<&Arc<Biome>> {
        self.biomes.get(id.0 as usize)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Biome whose climate is nearest to `(temperature, downfall)`.
    pub fn closest(&self, temperature: f32, downfall: f32) -> Option<&Arc<Biome>> {
        let distance = |biome: &Biome| {
            let dt = biome.temperature - temperature;
            let dd = biome.downfall - downfall;
            dt * dt + dd * dd
        };
        self.biomes
            .iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BiomeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
