//! The binary entry point for the Vale terrain viewer.
//!
//! Generates a world from the configured seed, places the viewer at a spawn
//! point and walks it across streamed terrain tiles for a fixed number of
//! frames, optionally switching to a fresh seed partway through.

use std::error::Error as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use vale_app::mesh::{MeshError, MeshPool};
use vale_app::platform::PlatformDirs;
use vale_app::viewer::{FRAME_TIME, FrameClock, Viewer};
use vale_config::{CliArgs, Config, ConfigError};
use vale_stream::{StreamError, StreamingWorld, TileBuilder};
use vale_terrain::{ConfigurationError, GenerationProfile, WorldConfig, WorldGenerator};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid world configuration")]
    World(#[from] ConfigurationError),
    #[error("terrain streaming failed")]
    Stream(#[from] StreamError<MeshError>),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match args.config.as_deref() {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to initialize platform directories: {e}");
        return ExitCode::FAILURE;
    }

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    vale_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!("{message}");
            eprintln!("vale: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    config.validate()?;

    let seed = config
        .world
        .seed
        .unwrap_or_else(|| u64::from(vale_terrain::seed::new_seed()));
    let world_config = WorldConfig::from_settings(&config.world, seed)?;
    info!(
        seed = world_config.seed(),
        size = world_config.size(),
        subdivisions = world_config.subdivisions(),
        radius = world_config.stream_radius(),
        "starting vale"
    );

    let generator = WorldGenerator::new(world_config.clone(), GenerationProfile::from(config));
    let generated = generator.build();
    let spawn = generated.pick_spawn();
    info!(x = spawn.x, y = spawn.y, z = spawn.z, "spawn point");
    for ruin in generated.ruins() {
        debug!(x = ruin.position.x, y = ruin.position.y, z = ruin.position.z, yaw = ruin.yaw, "ruin");
    }

    let pool = MeshPool::new(&world_config);
    let mut world = StreamingWorld::new(generator, config.terrain.tile_mode, pool);
    world.update(spawn, true)?;
    place_scatter(&mut world, config);

    let mut viewer = Viewer::new(spawn, config.viewer.clone());
    let mut clock = FrameClock::new();
    for frame in 0..config.viewer.frames {
        if config.viewer.reseed_at_frame == Some(frame) {
            world.reseed(vale_terrain::seed::new_seed())?;
            place_scatter(&mut world, config);
        }

        let dt = clock.tick(FRAME_TIME);
        let update = viewer.step(dt, &mut world)?;
        if update.changed {
            debug!(
                frame,
                created = update.created,
                reused = update.reused,
                released = update.released,
                "streaming window moved"
            );
        }
    }

    let end = viewer.position();
    info!(
        frames = clock.frames(),
        seconds = clock.elapsed(),
        travelled = viewer.travelled(),
        x = end.x,
        y = end.y,
        z = end.z,
        active = world.streamer().active_count(),
        pooled = world.streamer().pool_len(),
        meshes = world.builder_mut().created(),
        "walk finished"
    );
    Ok(())
}

/// Scatter props on the streamed ground and log how many survived.
fn place_scatter<B: TileBuilder>(world: &mut StreamingWorld<B>, config: &Config) {
    let seed = world.seed();
    let size = world.cache().size();
    let points = vale_terrain::scatter_points(seed, size, &config.scatter, |x, z| {
        world.sample_height(x, z)
    });
    info!(seed, placed = points.len(), candidates = config.scatter.count, "scattered trees");
}
