//! Headless lattice client: streams synthetic terrain into a world from a pool
//! of ingest threads while reader threads query it, then edits, ticks and
//! unloads part of it.

mod content;
mod ingest;
mod terrain;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use lattice_biome::{ClimateNoise, VoronoiBiomeAccessor};
use lattice_config::{CliArgs, Config};
use lattice_coords::{BlockPosition, ChunkPosition, Direction, InChunkPosition};
use lattice_world::{DimensionLimits, World, WorldContext, WorldEvent, WorldUpdate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::content::{Blocks, HookCounters};
use crate::ingest::IngestPool;
use crate::terrain::TerrainGenerator;

#[derive(Parser, Debug)]
#[command(name = "lattice-demo", about = "Headless voxel world exercise")]
struct DemoArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Terrain and random tick seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Reader threads querying the world while chunks stream in.
    #[arg(long, default_value_t = 2)]
    readers: usize,

    /// World ticks to run after loading.
    #[arg(long, default_value_t = 40)]
    ticks: u32,
}

fn main() -> ExitCode {
    let args = DemoArgs::parse();

    let config_dir = match args.common.config.clone().map_or_else(Config::default_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.common);

    lattice_log::init_logging(Some(&config_dir.join("logs")), cfg!(debug_assertions), Some(&config));

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let counters = Arc::new(HookCounters::default());
    let (blocks, ids) = content::block_registry(&counters)?;
    let biomes = Arc::new(content::biome_registry()?);

    let world_config = &config.world;
    let dimension = DimensionLimits::try_new(world_config.min_y, world_config.height, world_config.has_skylight)
        .ok_or_else(|| format!("unusable dimension: min_y={} height={}", world_config.min_y, world_config.height))?;
    let context = WorldContext::new(Arc::new(blocks), Arc::clone(&biomes), dimension)
        .with_calculate_light(world_config.calculate_light);
    let world = Arc::new(World::new(Arc::new(context)));
    if world_config.noise_biomes {
        world
            .biomes()
            .set_noise(Some(Arc::new(VoronoiBiomeAccessor::new(world_config.biome_seed))));
    }
    let (_listener, events) = world.events().channel();

    let climate = Arc::new(ClimateNoise::new(args.seed, biomes));
    let generator = Arc::new(TerrainGenerator::new(args.seed, ids, dimension, climate));

    let radius = config.network.view_distance as i32;
    let mut positions: Vec<ChunkPosition> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| ChunkPosition::new(x, z)))
        .collect();
    positions.sort_by_key(|position| position.chebyshev_distance(ChunkPosition::ORIGIN));

    tracing::info!(
        chunks = positions.len(),
        threads = config.network.ingest_threads,
        readers = args.readers,
        server = %format!("{}:{}", config.network.server_address, config.network.server_port),
        "streaming terrain"
    );
    let started = Instant::now();
    let pool = IngestPool::new(
        Arc::clone(&world),
        Arc::clone(&generator),
        config.network.ingest_threads,
        positions.len(),
    )?;
    for &position in &positions {
        if pool.submit(position).is_err() {
            tracing::warn!(chunk = %position, "ingest queue full");
        }
    }

    let stop = AtomicBool::new(false);
    let reads = AtomicU64::new(0);
    let (merged, failed, recalculated, total_us) = std::thread::scope(|scope| {
        for index in 0..args.readers {
            let world = &world;
            let stop = &stop;
            let reads = &reads;
            let verify = config.debug.verify_coordinates;
            let seed = args.seed.wrapping_add(index as u64 + 1);
            std::thread::Builder::new()
                .name(format!("reader-{index}"))
                .spawn_scoped(scope, move || read_loop(world, radius, seed, verify, stop, reads))
                .map_err(|e| tracing::error!(error = %e, "failed to spawn reader"))
                .ok();
        }

        let (mut merged, mut failed, mut recalculated, mut total_us) = (0usize, 0usize, 0usize, 0u64);
        while merged + failed < positions.len() {
            let Some(report) = pool.recv() else {
                break;
            };
            total_us += report.elapsed_us;
            match report.outcome {
                Ok(outcome) => {
                    merged += 1;
                    recalculated += usize::from(outcome.recalculated);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(chunk = %report.chunk, error = %e, "rejected chunk batch");
                }
            }
        }
        stop.store(true, Ordering::Release);
        (merged, failed, recalculated, total_us)
    });

    let fully_loaded = count_fully_loaded(&world);
    tracing::info!(
        merged,
        failed,
        recalculated,
        fully_loaded,
        in_flight = pool.in_flight(),
        reads = reads.load(Ordering::Relaxed),
        avg_us = total_us / merged.max(1) as u64,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "terrain loaded"
    );
    pool.shutdown();

    edit_surface(&world, &generator, ids)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let center = BlockPosition::new(8, generator.sea_level(), 8);
    let period = Duration::from_secs(1) / config.network.updates_per_second.max(1);
    for _ in 0..args.ticks {
        world.tick();
        world.random_tick(center, &mut rng);
        std::thread::sleep(period);
    }
    let environment = world.environment();
    let (grass_ticks, torches_placed, torches_broken) = counters.snapshot();
    tracing::info!(
        time = environment.time,
        sky_angle = environment.sky_angle(),
        light_base = environment.light_base(),
        grass_ticks,
        torches_placed,
        torches_broken,
        "ticked"
    );

    report_occlusion(&world);

    if world.biomes().noise().is_some() {
        world.biomes().reset_cache();
    }
    for position in world.chunk_positions() {
        if position.chebyshev_distance(ChunkPosition::ORIGIN) == radius {
            world.apply(WorldUpdate::Unload { chunk: position })?;
        }
    }
    tracing::info!(
        chunks = world.len(),
        fully_loaded = count_fully_loaded(&world),
        revision = world.revision(),
        "outer ring unloaded"
    );

    let (mut blocks_set, mut light_updates, mut data_changes, mut unloads) = (0, 0, 0, 0);
    for event in events.try_iter() {
        match event {
            WorldEvent::BlockSet { .. } | WorldEvent::MultiBlockSet { .. } => blocks_set += 1,
            WorldEvent::ChunkLightUpdate { .. } => light_updates += 1,
            WorldEvent::ChunkDataChange { .. } => data_changes += 1,
            WorldEvent::ChunkUnload { .. } => unloads += 1,
        }
    }
    tracing::info!(blocks_set, light_updates, data_changes, unloads, "events");
    Ok(())
}

/// Random point queries over the loaded square until `stop` is set.
fn read_loop(world: &World, radius: i32, seed: u64, verify: bool, stop: &AtomicBool, reads: &AtomicU64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let span = (radius + 1) * 16;
    let dimension = world.dimension();
    let mut known = 0u64;
    while !stop.load(Ordering::Acquire) {
        let position = BlockPosition::new(
            rng.random_range(-span..span),
            rng.random_range(dimension.min_y()..=dimension.max_y()),
            rng.random_range(-span..span),
        );
        if verify {
            let rebuilt = BlockPosition::from_parts(position.chunk_position(), position.in_chunk_position());
            if rebuilt != position {
                tracing::error!(%position, %rebuilt, "coordinate decomposition mismatch");
            }
        }
        if world.get(position).is_some() {
            known += 1;
        }
        world.get_light(position);
        world.get_biome(position);
        reads.fetch_add(1, Ordering::Relaxed);
    }
    tracing::debug!(known, "reader finished");
}

/// Places torches on the surface near the origin and turns a row of grass
/// into dirt in one batched delta.
fn edit_surface(world: &World, generator: &TerrainGenerator, ids: Blocks) -> Result<(), Box<dyn Error>> {
    for (x, z) in [(0, 0), (15, 8), (16, 8), (-1, -1)] {
        let y = generator.surface(x, z) + 1;
        if !world.dimension().contains_y(y) {
            continue;
        }
        let position = BlockPosition::new(x, y, z);
        world.apply(WorldUpdate::BlockChange {
            position,
            state: ids.torch,
        })?;
        let light = world.get_light(position);
        tracing::info!(%position, sky = light.sky(), block = light.block(), "torch lit");
    }

    let chunk = ChunkPosition::ORIGIN;
    let changes: Vec<(InChunkPosition, _)> = (0..16)
        .map(|x| (InChunkPosition::new(x, generator.surface(x, 4), 4), ids.dirt))
        .collect();
    world.apply(WorldUpdate::MultiBlockChange { chunk, changes })?;

    // Break the first torch again.
    let y = generator.surface(0, 0) + 1;
    if world.dimension().contains_y(y) {
        world.apply(WorldUpdate::BlockChange {
            position: BlockPosition::new(0, y, 0),
            state: lattice_voxel::BlockStateId::AIR,
        })?;
    }
    Ok(())
}

fn report_occlusion(world: &World) {
    let dimension = world.dimension();
    let mut occluded = 0;
    for section in dimension.min_section()..=dimension.max_section() {
        if world.is_occluded(ChunkPosition::ORIGIN, section, Direction::Up, Direction::Down) == Some(true) {
            occluded += 1;
        }
    }
    tracing::info!(
        occluded_sections = occluded,
        revision = world.occlusion_revision(),
        "origin column occlusion"
    );
}

fn count_fully_loaded(world: &World) -> usize {
    world
        .chunk_positions()
        .into_iter()
        .filter_map(|position| world.chunk(position))
        .filter(|chunk| chunk.is_fully_loaded())
        .count()
}
