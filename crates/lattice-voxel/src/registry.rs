//! Block state registry: maps compact [`BlockStateId`] values to [`BlockDef`]
//! data plus the optional behaviour hooks each block opts into.
//!
//! A block "type" is plain data and a capability table of closures. There is
//! no trait hierarchy: a block that never random-ticks simply leaves
//! `random_tick` unset. Air is always ID 0 so a freshly allocated section
//! reads as empty space.

use std::fmt;
use std::sync::Arc;

use lattice_coords::BlockPosition;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier of a block state (2 bytes per cell).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockStateId(pub u16);

impl BlockStateId {
    /// The empty block.
    pub const AIR: Self = Self(0);

    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// How a block lets light through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    /// Blocks light entirely.
    Opaque,
    /// Lets light through with one extra level of decay (water, leaves).
    SemiTransparent,
    /// Lets light through unchanged (air, glass panes, torches).
    FullyTransparent,
}

/// Whether a block fills its cell for visibility purposes.
#[derive(Clone, Copy)]
pub enum Opacity {
    /// Always fills the cell.
    Full,
    /// Never fills the cell.
    None,
    /// Depends on the concrete state (slabs, stairs, ...).
    Shape(fn(BlockStateId, &BlockDef) -> bool),
}

impl fmt::Debug for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opacity::Full => f.write_str("Full"),
            Opacity::None => f.write_str("None"),
            Opacity::Shape(_) => f.write_str("Shape(..)"),
        }
    }
}

/// Read-only block access handed to behaviour hooks.
pub trait BlockView {
    /// Block at `position`, `None` if the chunk is not loaded.
    fn block_at(&self, position: BlockPosition) -> Option<BlockStateId>;
}

/// Arguments passed to every behaviour hook.
pub struct HookContext<'a> {
    pub world: &'a dyn BlockView,
    pub position: BlockPosition,
    pub state: BlockStateId,
}

/// A behaviour callback.
pub type Hook = Arc<dyn Fn(&HookContext<'_>) + Send + Sync>;

/// Optional behaviours a block opts into.
#[derive(Clone, Default)]
pub struct BlockBehavior {
    /// Runs before the block is replaced. Observes the old world.
    pub on_break: Option<Hook>,
    /// Runs after the block was placed. Observes the new world.
    pub on_place: Option<Hook>,
    /// Runs when the block is picked by a random tick.
    pub random_tick: Option<Hook>,
    /// Runs on every world tick while the block is loaded.
    pub tick: Option<Hook>,
}

impl BlockBehavior {
    /// Returns `true` if no hook is set.
    pub fn is_inert(&self) -> bool {
        self.on_break.is_none()
            && self.on_place.is_none()
            && self.random_tick.is_none()
            && self.tick.is_none()
    }
}

impl fmt::Debug for BlockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBehavior")
            .field("on_break", &self.on_break.is_some())
            .field("on_place", &self.on_place.is_some())
            .field("random_tick", &self.random_tick.is_some())
            .field("tick", &self.tick.is_some())
            .finish()
    }
}

/// Full descriptor for a block state.
#[derive(Clone, Debug)]
pub struct BlockDef {
    /// Unique name (e.g. "stone", "water", "torch").
    pub name: String,
    /// Whether entities collide with this block.
    pub solid: bool,
    /// Light transmission.
    pub transparency: Transparency,
    /// Visibility occlusion.
    pub opacity: Opacity,
    /// Light emission level (0 = none, 15 = max).
    pub light_emission: u8,
    /// Hooks this block opts into.
    pub behavior: BlockBehavior,
}

impl BlockDef {
    /// A solid, fully opaque block with no behaviour.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: true,
            transparency: Transparency::Opaque,
            opacity: Opacity::Full,
            light_emission: 0,
            behavior: BlockBehavior::default(),
        }
    }

    /// A non-solid block that lets all light through.
    pub fn transparent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: false,
            transparency: Transparency::FullyTransparent,
            opacity: Opacity::None,
            light_emission: 0,
            behavior: BlockBehavior::default(),
        }
    }

    pub fn with_transparency(mut self, transparency: Transparency) -> Self {
        self.transparency = transparency;
        self
    }

    pub fn with_opacity(mut self, opacity: Opacity) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_light_emission(mut self, level: u8) -> Self {
        self.light_emission = level.min(15);
        self
    }

    pub fn with_behavior(mut self, behavior: BlockBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 536 state slots have been consumed.
    #[error("block registry is full (max 65536 states)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct RegisteredBlock {
    def: BlockDef,
    /// `opacity` resolved against the state at registration.
    fully_opaque: bool,
}

/// Maps [`BlockStateId`] to [`BlockDef`] with O(1) lookup by index and by name.
///
/// Queries for unknown IDs behave like air rather than panicking: the
/// registry may lag behind state IDs arriving from the network.
pub struct BlockRegistry {
    blocks: Vec<RegisteredBlock>,
    name_to_id: FxHashMap<String, BlockStateId>,
}

impl BlockRegistry {
    /// Creates a new registry with air pre-registered as ID 0.
    pub fn new() -> Self {
        let mut name_to_id = FxHashMap::default();
        name_to_id.insert("air".to_string(), BlockStateId::AIR);
        Self {
            blocks: vec![RegisteredBlock {
                def: BlockDef::transparent("air"),
                fully_opaque: false,
            }],
            name_to_id,
        }
    }

    /// Registers a block and returns its assigned ID (sequential from 1).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken, or
    /// [`RegistryError::RegistryFull`] if all slots are consumed.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockStateId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.blocks.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockStateId(self.blocks.len() as u16);
        let fully_opaque = match def.opacity {
            Opacity::Full => true,
            Opacity::None => false,
            Opacity::Shape(shape) => shape(id, &def),
        };
        tracing::trace!(name = %def.name, id = id.0, fully_opaque, "registered block");
        self.name_to_id.insert(def.name.clone(), id);
        self.blocks.push(RegisteredBlock { def, fully_opaque });
        Ok(id)
    }

    /// Returns the definition for `id`.
    pub fn get(&self, id: BlockStateId) -> Option<&BlockDef> {
        self.blocks.get(id.0 as usize).map(|block| &block.def)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<BlockStateId> {
        self.name_to_id.get(name).copied()
    }

    /// Number of registered states, including air.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    /// Whether the block fills its cell for occlusion.
    pub fn is_fully_opaque(&self, id: BlockStateId) -> bool {
        self.blocks
            .get(id.0 as usize)
            .is_some_and(|block| block.fully_opaque)
    }

    /// Whether light cannot enter the cell at all.
    pub fn blocks_light(&self, id: BlockStateId) -> bool {
        self.transparency(id) == Transparency::Opaque
    }

    /// Whether the block stops the skylight shortcut (counts for the heightmap).
    pub fn blocks_skylight(&self, id: BlockStateId) -> bool {
        self.transparency(id) != Transparency::FullyTransparent
    }

    /// Decay beyond the usual one level per step when light enters this block.
    pub fn extra_decay(&self, id: BlockStateId) -> u8 {
        match self.transparency(id) {
            Transparency::SemiTransparent => 1,
            _ => 0,
        }
    }

    pub fn light_emission(&self, id: BlockStateId) -> u8 {
        self.get(id).map_or(0, |def| def.light_emission)
    }

    pub fn behavior(&self, id: BlockStateId) -> Option<&BlockBehavior> {
        self.get(id).map(|def| &def.behavior)
    }

    fn transparency(&self, id: BlockStateId) -> Transparency {
        self.get(id)
            .map_or(Transparency::FullyTransparent, |def| def.transparency)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn half_slab(_: BlockStateId, def: &BlockDef) -> bool {
        !def.name.ends_with("_slab")
    }

    #[test]
    fn test_air_is_id_zero() {
        let registry = BlockRegistry::new();
        let air = registry.get(BlockStateId::AIR).unwrap();
        assert_eq!(air.name, "air");
        assert!(!air.solid);
        assert!(!registry.is_fully_opaque(BlockStateId::AIR));
        assert!(!registry.blocks_skylight(BlockStateId::AIR));
    }

    #[test]
    fn test_register_returns_sequential_ids() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockDef::opaque("stone")).unwrap();
        let dirt = registry.register(BlockDef::opaque("dirt")).unwrap();
        assert_eq!(stone, BlockStateId(1));
        assert_eq!(dirt, BlockStateId(2));
        assert_eq!(registry.lookup_by_name("dirt"), Some(dirt));
        assert_eq!(registry.lookup_by_name("nonexistent"), None);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register(BlockDef::opaque("stone")).unwrap();
        let result = registry.register(BlockDef::opaque("stone"));
        assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn test_shape_opacity_resolved_at_registration() {
        let mut registry = BlockRegistry::new();
        let slab = registry
            .register(BlockDef::opaque("stone_slab").with_opacity(Opacity::Shape(half_slab)))
            .unwrap();
        let bricks = registry
            .register(BlockDef::opaque("bricks").with_opacity(Opacity::Shape(half_slab)))
            .unwrap();
        assert!(!registry.is_fully_opaque(slab));
        assert!(registry.is_fully_opaque(bricks));
    }

    #[test]
    fn test_light_properties() {
        let mut registry = BlockRegistry::new();
        let water = registry
            .register(
                BlockDef::transparent("water").with_transparency(Transparency::SemiTransparent),
            )
            .unwrap();
        let torch = registry
            .register(BlockDef::transparent("torch").with_light_emission(14))
            .unwrap();
        let stone = registry.register(BlockDef::opaque("stone")).unwrap();

        assert_eq!(registry.extra_decay(water), 1);
        assert!(registry.blocks_skylight(water));
        assert!(!registry.blocks_light(water));
        assert_eq!(registry.light_emission(torch), 14);
        assert!(!registry.blocks_skylight(torch));
        assert!(registry.blocks_light(stone));
    }

    #[test]
    fn test_unknown_id_behaves_like_air() {
        let registry = BlockRegistry::new();
        let unknown = BlockStateId(999);
        assert!(registry.get(unknown).is_none());
        assert!(!registry.is_fully_opaque(unknown));
        assert!(!registry.blocks_light(unknown));
        assert_eq!(registry.light_emission(unknown), 0);
    }

    #[test]
    fn test_behavior_flags() {
        let hook: Hook = Arc::new(|_| {});
        let behavior = BlockBehavior {
            random_tick: Some(hook),
            ..BlockBehavior::default()
        };
        assert!(!behavior.is_inert());
        assert!(BlockBehavior::default().is_inert());
    }
}
