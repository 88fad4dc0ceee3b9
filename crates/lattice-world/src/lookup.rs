//! Per-entity cache of the chunk it was last found in.

use std::sync::Arc;

use lattice_coords::ChunkPosition;

use crate::chunk::Chunk;
use crate::world::World;

/// Remembers the last chunk resolved and the world revision it was valid
/// for. Entities mostly stay in one chunk, so most lookups skip the map.
#[derive(Debug, Default)]
pub struct ChunkLookup {
    cached: Option<(u64, Arc<Chunk>)>,
    hits: u64,
    misses: u64,
}

impl ChunkLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, world: &World, position: ChunkPosition) -> Option<Arc<Chunk>> {
        let revision = world.revision();
        if let Some((cached_revision, chunk)) = &self.cached
            && *cached_revision == revision
            && chunk.position() == position
        {
            self.hits += 1;
            return Some(Arc::clone(chunk));
        }

        self.misses += 1;
        let chunk = world.chunk(position);
        self.cached = chunk.as_ref().map(|chunk| (revision, Arc::clone(chunk)));
        chunk
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// `(hits, misses)` so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
