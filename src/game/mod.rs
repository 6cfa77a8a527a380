//! Obstacle-runner gameplay built on the pool
//!
//! Contains the obstacle entity, a hecs-backed scene and the spawner that
//! ties them to an [`ObjectPool`](crate::pool::ObjectPool).

mod obstacle;
mod scene;
mod spawner;

use serde::{Deserialize, Serialize};

use crate::pool::PoolConfig;

pub use obstacle::{Obstacle, ObstacleKind, ObstacleSpawn, SpawnDetails, obstacle_factory};
pub use scene::{Name, Pooled, Scene, Transform2D};
pub use spawner::{SpawnConfig, SpawnReport, Spawner};

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Pool capacity limits
    pub pool: PoolConfig,
    /// Spawner tuning
    pub spawn: SpawnConfig,
    /// Obstacles built per kind before the first frame
    pub preload_per_kind: usize,
    /// Fixed simulation step in seconds
    pub fixed_dt: f32,
    /// Number of steps a headless run simulates
    pub frames: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            spawn: SpawnConfig::default(),
            preload_per_kind: 5,
            fixed_dt: 1.0 / 60.0,
            frames: 60 * 60,
        }
    }
}

impl GameConfig {
    /// Set pool limits
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Set spawner tuning
    #[must_use]
    pub fn with_spawn(mut self, spawn: SpawnConfig) -> Self {
        self.spawn = spawn;
        self
    }

    /// Set the preload count
    #[must_use]
    pub fn with_preload(mut self, per_kind: usize) -> Self {
        self.preload_per_kind = per_kind;
        self
    }

    /// Set how long a headless run lasts
    #[must_use]
    pub fn with_frames(mut self, frames: u32, fixed_dt: f32) -> Self {
        self.frames = frames;
        self.fixed_dt = fixed_dt;
        self
    }
}
