//! Block state registry, palette-compressed section storage and section
//! occlusion (face-to-face visibility through non-opaque cells).

pub mod occlusion;
pub mod packed;
pub mod registry;
pub mod storage;

pub use occlusion::SectionOcclusion;
pub use registry::{
    BlockBehavior, BlockDef, BlockRegistry, BlockStateId, BlockView, Hook, HookContext, Opacity,
    RegistryError, Transparency,
};
pub use storage::BlockStorage;
