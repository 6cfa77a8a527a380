//! Pooled spawning for a 2D obstacle runner
//!
//! This crate provides:
//! - A keyed object pool with bounded, LIFO reuse
//! - Generation-checked handles and an active-set for bulk updates
//! - A timer-driven obstacle spawner built on the pool
//! - A hecs scene that mirrors active obstacles

pub mod game;
pub mod pool;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::game::{
        GameConfig, Obstacle, ObstacleKind, ObstacleSpawn, Scene, SpawnConfig, SpawnDetails,
        Spawner, obstacle_factory,
    };
    pub use crate::pool::{
        EntityHandle, Factory, FactoryRegistry, ObjectPool, PoolConfig, PoolError, PoolStats,
        Poolable, Presenter, SharedPool,
    };
    pub use glam::Vec2;
}
