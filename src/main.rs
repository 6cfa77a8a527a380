//! Headless obstacle-runner simulation demonstrating the pool

use std::env;
use std::process::ExitCode;

use spawnpool::pool::config;
use spawnpool::prelude::*;

fn run(config: &GameConfig) -> Result<(), PoolError> {
    let mut pool = ObjectPool::new(obstacle_factory(), config.pool);
    pool.preload(ObstacleKind::ALL, config.preload_per_kind)?;

    let mut scene = Scene::new();
    let mut spawner = Spawner::new(config.spawn.clone());

    let frames_per_report = (1.0 / config.fixed_dt).round().max(1.0) as u32;
    for frame in 1..=config.frames {
        spawner.update(config.fixed_dt, &mut pool, &mut scene)?;

        if frame % frames_per_report == 0 {
            log::info!(
                "t={:.0}s interval={:.2}s nodes={} | {}",
                spawner.elapsed(),
                spawner.current_interval(),
                scene.len(),
                pool.stats()
            );
        }
    }

    let recycled = spawner.restart(&mut pool, &mut scene);
    let stats = pool.stats();
    log::info!("Run finished: {} spawned, {recycled} recycled at end", spawner.total_spawned());
    for kind in ObstacleKind::ALL {
        log::info!("  {:<6} pooled={}", kind.name(), stats.available(&kind));
    }
    log::info!("{stats}");

    pool.clear(&mut scene);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => match config::load::<GameConfig>(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    if let Err(e) = run(&config) {
        log::error!("Simulation error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
