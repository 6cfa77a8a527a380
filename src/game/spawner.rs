//! Spawn scheduling
//!
//! Drives the obstacle lifecycle each frame: scroll every active obstacle,
//! recycle those that left the screen, then spawn new ones on a timer that
//! tightens as the run goes on.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::obstacle::{Obstacle, ObstacleKind, ObstacleSpawn};
use super::scene::Scene;
use crate::pool::{EntityHandle, Factory, ObjectPool, PoolError};

/// Lower bound on the spawn interval, whatever the config says
const MIN_SPAWN_INTERVAL: f32 = 0.05;

/// Spawner tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between spawns at the start of a run
    pub initial_interval: f32,
    /// Shortest interval the ramp can reach
    pub min_interval: f32,
    /// Seconds taken off the interval per second of play
    pub interval_ramp: f32,
    /// Leftward scroll speed in units per second
    pub scroll_speed: f32,
    /// X coordinate new obstacles appear at
    pub spawn_x: f32,
    /// Obstacles fully left of this X are recycled
    pub despawn_x: f32,
    /// Y coordinates cycled through for successive spawns
    pub lanes: Vec<f32>,
    /// Kinds cycled through for successive spawns
    pub pattern: Vec<ObstacleKind>,
    /// Most spawns a single update may catch up on
    pub max_spawns_per_update: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial_interval: 1.2,
            min_interval: 0.35,
            interval_ramp: 0.01,
            scroll_speed: 320.0,
            spawn_x: 900.0,
            despawn_x: -100.0,
            lanes: vec![80.0, 160.0, 240.0],
            pattern: ObstacleKind::ALL.to_vec(),
            max_spawns_per_update: 4,
        }
    }
}

impl SpawnConfig {
    /// Set the starting interval and its floor
    #[must_use]
    pub fn with_interval(mut self, initial: f32, min: f32) -> Self {
        self.initial_interval = initial;
        self.min_interval = min;
        self
    }

    /// Set the interval ramp
    #[must_use]
    pub fn with_ramp(mut self, ramp: f32) -> Self {
        self.interval_ramp = ramp;
        self
    }

    /// Set the scroll speed
    #[must_use]
    pub fn with_scroll_speed(mut self, speed: f32) -> Self {
        self.scroll_speed = speed;
        self
    }

    /// Set where obstacles appear and disappear
    #[must_use]
    pub fn with_bounds(mut self, spawn_x: f32, despawn_x: f32) -> Self {
        self.spawn_x = spawn_x;
        self.despawn_x = despawn_x;
        self
    }

    /// Set the lanes
    #[must_use]
    pub fn with_lanes(mut self, lanes: Vec<f32>) -> Self {
        self.lanes = lanes;
        self
    }

    /// Set the kind pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: Vec<ObstacleKind>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set the per-update spawn cap
    #[must_use]
    pub fn with_max_spawns_per_update(mut self, max: usize) -> Self {
        self.max_spawns_per_update = max;
        self
    }
}

/// What happened during one `Spawner::update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: usize,
    pub recycled: usize,
}

/// Timer-driven obstacle spawner.
#[derive(Debug)]
pub struct Spawner {
    config: SpawnConfig,
    /// Time accumulated towards the next spawn
    timer: f32,
    /// Seconds since the run started
    elapsed: f32,
    pattern_cursor: usize,
    lane_cursor: usize,
    total_spawned: u64,
}

impl Spawner {
    #[must_use]
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            config,
            timer: 0.0,
            elapsed: 0.0,
            pattern_cursor: 0,
            lane_cursor: 0,
            total_spawned: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Seconds since the run started
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Obstacles spawned since the run started
    #[must_use]
    pub const fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Spawn interval at the current point in the run.
    #[must_use]
    pub fn current_interval(&self) -> f32 {
        (self.config.initial_interval - self.config.interval_ramp * self.elapsed)
            .max(self.config.min_interval)
            .max(MIN_SPAWN_INTERVAL)
    }

    /// Advance one frame.
    ///
    /// # Errors
    ///
    /// Fails if the pattern names a kind the pool's factory cannot build.
    /// Obstacles moved or recycled before the failure stay that way.
    pub fn update<F: Factory<Obstacle>>(
        &mut self,
        dt: f32,
        pool: &mut ObjectPool<Obstacle, F>,
        scene: &mut Scene,
    ) -> Result<SpawnReport, PoolError> {
        let mut report = SpawnReport::default();

        let mut expired: SmallVec<[EntityHandle; 16]> = SmallVec::new();
        for (handle, obstacle) in pool.iter_active_mut() {
            obstacle.update(dt);
            if obstacle.is_past(self.config.despawn_x) {
                expired.push(handle);
            }
        }
        for handle in expired {
            if pool.recycle(handle, scene) {
                report.recycled += 1;
            }
        }

        self.elapsed += dt;
        if !self.config.pattern.is_empty() {
            self.timer += dt;
            while report.spawned < self.config.max_spawns_per_update {
                let interval = self.current_interval();
                if self.timer < interval {
                    break;
                }
                self.timer -= interval;
                self.spawn_next(pool, scene)?;
                report.spawned += 1;
            }

            // Drop whatever the cap left behind, keeping at most one spawn due
            let interval = self.current_interval();
            if self.timer > interval {
                log::debug!("Spawn backlog of {:.2}s discarded", self.timer - interval);
                self.timer = interval;
            }
        }

        scene.sync(pool);
        Ok(report)
    }

    /// Recycle every active obstacle and restart the run.
    pub fn restart<F: Factory<Obstacle>>(
        &mut self,
        pool: &mut ObjectPool<Obstacle, F>,
        scene: &mut Scene,
    ) -> usize {
        let recycled = pool.recycle_all(scene);
        self.timer = 0.0;
        self.elapsed = 0.0;
        self.pattern_cursor = 0;
        self.lane_cursor = 0;
        log::info!("Run restarted, {recycled} obstacles recycled");
        recycled
    }

    fn spawn_next<F: Factory<Obstacle>>(
        &mut self,
        pool: &mut ObjectPool<Obstacle, F>,
        scene: &mut Scene,
    ) -> Result<EntityHandle, PoolError> {
        let kind = self.config.pattern[self.pattern_cursor % self.config.pattern.len()];
        self.pattern_cursor += 1;

        let lane = if self.config.lanes.is_empty() {
            0.0
        } else {
            let lane = self.config.lanes[self.lane_cursor % self.config.lanes.len()];
            self.lane_cursor += 1;
            lane
        };

        let spawn = ObstacleSpawn::default_for(
            kind,
            Vec2::new(self.config.spawn_x, lane),
            Vec2::new(-self.config.scroll_speed, 0.0),
        );
        let handle = pool.spawn(kind, spawn, scene)?;
        self.total_spawned += 1;

        log::debug!("Spawned {} {handle} in lane {lane}", kind.name());
        Ok(handle)
    }
}
