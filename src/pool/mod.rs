//! Object pooling for frequently spawned entities
//!
//! Provides a keyed pool with:
//! - Per-type LIFO buckets of reusable entities
//! - Active-set tracking with generation-checked handles
//! - Per-type and global capacity limits on the return path
//! - Running hit/miss statistics

pub mod config;
mod error;
mod handle;
mod object_pool;
mod shared;
mod stats;
mod traits;

pub use config::{ConfigError, PoolConfig};
pub use error::PoolError;
pub use handle::EntityHandle;
pub use object_pool::ObjectPool;
pub use shared::SharedPool;
pub use stats::PoolStats;
pub use traits::{Factory, FactoryRegistry, Poolable, Presenter};
