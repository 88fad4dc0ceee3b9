//! Block and biome tables for the demo world.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lattice_biome::{Biome, BiomeRegistry, BiomeRegistryError};
use lattice_voxel::{
    BlockBehavior, BlockDef, BlockRegistry, BlockStateId, HookContext, RegistryError, Transparency,
};

/// State ids of the blocks the terrain generator places.
#[derive(Clone, Copy, Debug)]
pub struct Blocks {
    pub stone: BlockStateId,
    pub dirt: BlockStateId,
    pub grass: BlockStateId,
    pub water: BlockStateId,
    pub glowstone: BlockStateId,
    pub torch: BlockStateId,
}

/// Hook invocation counters, shared with the hooks themselves.
#[derive(Debug, Default)]
pub struct HookCounters {
    pub grass_ticks: AtomicUsize,
    pub torch_placed: AtomicUsize,
    pub torch_broken: AtomicUsize,
}

impl HookCounters {
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.grass_ticks.load(Ordering::Relaxed),
            self.torch_placed.load(Ordering::Relaxed),
            self.torch_broken.load(Ordering::Relaxed),
        )
    }
}

pub fn block_registry(counters: &Arc<HookCounters>) -> Result<(BlockRegistry, Blocks), RegistryError> {
    let mut registry = BlockRegistry::new();

    let grass_counters = Arc::clone(counters);
    let placed = Arc::clone(counters);
    let broken = Arc::clone(counters);

    let stone = registry.register(BlockDef::opaque("stone"))?;
    let dirt = registry.register(BlockDef::opaque("dirt"))?;
    let grass = registry.register(BlockDef::opaque("grass").with_behavior(BlockBehavior {
        random_tick: Some(Arc::new(move |_ctx: &HookContext<'_>| {
            grass_counters.grass_ticks.fetch_add(1, Ordering::Relaxed);
        })),
        ..BlockBehavior::default()
    }))?;
    let water =
        registry.register(BlockDef::transparent("water").with_transparency(Transparency::SemiTransparent))?;
    let glowstone = registry.register(BlockDef::opaque("glowstone").with_light_emission(15))?;
    let torch = registry.register(
        BlockDef::transparent("torch")
            .with_light_emission(14)
            .with_behavior(BlockBehavior {
                on_place: Some(Arc::new(move |ctx: &HookContext<'_>| {
                    placed.torch_placed.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(position = %ctx.position, "torch placed");
                })),
                on_break: Some(Arc::new(move |_ctx: &HookContext<'_>| {
                    broken.torch_broken.fetch_add(1, Ordering::Relaxed);
                })),
                ..BlockBehavior::default()
            }),
    )?;

    Ok((
        registry,
        Blocks {
            stone,
            dirt,
            grass,
            water,
            glowstone,
            torch,
        },
    ))
}

pub fn biome_registry() -> Result<BiomeRegistry, BiomeRegistryError> {
    let mut registry = BiomeRegistry::new();
    for (name, temperature, downfall) in [
        ("snowy_tundra", 0.0, 0.5),
        ("taiga", 0.25, 0.8),
        ("plains", 0.8, 0.4),
        ("forest", 0.7, 0.8),
        ("jungle", 0.95, 0.9),
        ("savanna", 1.2, 0.0),
        ("desert", 2.0, 0.0),
    ] {
        registry.register(Biome::new(name, temperature, downfall))?;
    }
    Ok(registry)
}
