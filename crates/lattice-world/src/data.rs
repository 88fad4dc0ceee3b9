//! Inbound update batches, already parsed by the session layer.

use std::fmt;
use std::sync::Arc;

use lattice_biome::BiomeSource;
use lattice_coords::{BlockPosition, ChunkPosition, InChunkPosition};
use lattice_lighting::{BorderLight, LightArray, VerticalBorder};
use lattice_voxel::{BlockStateId, BlockStorage};

/// Errors for malformed chunk data.
#[derive(Debug, thiserror::Error)]
pub enum ChunkDataError {
    #[error("{field} carries {actual} sections, the dimension has {expected}")]
    SectionCount {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{side:?} border light must be 256 bytes, got {actual}")]
    BorderSize { side: VerticalBorder, actual: usize },
}

/// Partial chunk data. Every field may arrive on its own; absent fields leave
/// the chunk's current value untouched.
#[derive(Default)]
pub struct ChunkDataBatch {
    /// One entry per section of the dimension, bottom first.
    pub blocks: Option<Vec<Option<BlockStorage>>>,
    /// One entry per section of the dimension, bottom first.
    pub light: Option<Vec<Option<LightArray>>>,
    pub bottom_light: Option<BorderLight>,
    pub top_light: Option<BorderLight>,
    pub biome_source: Option<Arc<dyn BiomeSource>>,
}

impl ChunkDataBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(mut self, blocks: Vec<Option<BlockStorage>>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn with_light(mut self, light: Vec<Option<LightArray>>) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_biome_source(mut self, source: Arc<dyn BiomeSource>) -> Self {
        self.biome_source = Some(source);
        self
    }

    /// Attaches a raw border light layer as received from the wire.
    pub fn with_border_bytes(mut self, side: VerticalBorder, bytes: &[u8]) -> Result<Self, ChunkDataError> {
        let light = BorderLight::from_bytes(bytes).ok_or(ChunkDataError::BorderSize {
            side,
            actual: bytes.len(),
        })?;
        match side {
            VerticalBorder::Bottom => self.bottom_light = Some(light),
            VerticalBorder::Top => self.top_light = Some(light),
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_none()
            && self.light.is_none()
            && self.bottom_light.is_none()
            && self.top_light.is_none()
            && self.biome_source.is_none()
    }

    pub(crate) fn validate(&self, sections: usize) -> Result<(), ChunkDataError> {
        let check = |field: &'static str, actual: Option<usize>| match actual {
            Some(actual) if actual != sections => Err(ChunkDataError::SectionCount {
                field,
                expected: sections,
                actual,
            }),
            _ => Ok(()),
        };
        check("blocks", self.blocks.as_ref().map(Vec::len))?;
        check("light", self.light.as_ref().map(Vec::len))
    }
}

impl fmt::Debug for ChunkDataBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkDataBatch")
            .field("blocks", &self.blocks.as_ref().map(Vec::len))
            .field("light", &self.light.as_ref().map(Vec::len))
            .field("bottom_light", &self.bottom_light.is_some())
            .field("top_light", &self.top_light.is_some())
            .field("biome_source", &self.biome_source.is_some())
            .finish()
    }
}

/// What a merged batch changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataOutcome {
    pub blocks: bool,
    pub light: bool,
    pub biomes: bool,
    /// Light was computed locally rather than received.
    pub recalculated: bool,
}

/// Everything the session layer feeds into a world.
#[derive(Debug)]
pub enum WorldUpdate {
    ChunkData {
        chunk: ChunkPosition,
        data: ChunkDataBatch,
        merge: bool,
    },
    BlockChange {
        position: BlockPosition,
        state: BlockStateId,
    },
    MultiBlockChange {
        chunk: ChunkPosition,
        changes: Vec<(InChunkPosition, BlockStateId)>,
    },
    Unload {
        chunk: ChunkPosition,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_wrong_section_count() {
        let batch = ChunkDataBatch::new().with_blocks(vec![None; 3]);
        assert!(batch.validate(3).is_ok());
        let err = batch.validate(16).unwrap_err();
        assert!(matches!(
            err,
            ChunkDataError::SectionCount {
                field: "blocks",
                expected: 16,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_border_bytes_must_cover_all_columns() {
        let err = ChunkDataBatch::new()
            .with_border_bytes(VerticalBorder::Top, &[0u8; 100])
            .unwrap_err();
        assert!(err.to_string().contains("256"), "{err}");

        let batch = ChunkDataBatch::new()
            .with_border_bytes(VerticalBorder::Bottom, &[0x21u8; 256])
            .unwrap();
        assert!(batch.bottom_light.is_some() && batch.top_light.is_none());
        assert!(!batch.is_empty());
    }
}
