//! Seams between the pool and its owner
//!
//! The pool itself only moves entities between buckets and the active set.
//! Everything domain specific is injected through three traits:
//!
//! - [`Poolable`] - how an entity resets and applies activation parameters
//! - [`Factory`] - how a new entity is built for a type key
//! - [`Presenter`] - what happens when an entity enters or leaves play

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::handle::EntityHandle;

// ============================================================================
// Poolable
// ============================================================================

/// An entity that can be reused by an [`ObjectPool`](super::ObjectPool).
///
/// # Example
///
/// ```ignore
/// impl Poolable for Bullet {
///     type Key = BulletKind;
///     type Params = BulletSpawn;
///
///     fn type_key(&self) -> BulletKind { self.kind }
///     fn reset(&mut self) { self.velocity = Vec2::ZERO; self.age = 0.0; }
///     fn activate(&mut self, params: BulletSpawn) { self.position = params.origin; }
/// }
/// ```
pub trait Poolable {
    /// Discriminator selecting the available bucket this entity belongs to.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// Typed activation parameters applied every time the entity is handed out.
    type Params;

    /// Bucket this entity is returned to on recycle.
    fn type_key(&self) -> Self::Key;

    /// Restore the canonical just-created state.
    ///
    /// Must overwrite all transient state so nothing leaks between activations.
    fn reset(&mut self);

    /// Apply activation parameters.
    fn activate(&mut self, params: Self::Params);
}

// ============================================================================
// Factory
// ============================================================================

/// Builds new entities when a bucket is empty.
///
/// Returning `None` means the key is not recognised; the pool turns that into
/// a [`PoolError::ConstructionError`](super::PoolError::ConstructionError).
pub trait Factory<T: Poolable> {
    /// Construct a fresh entity for `key`.
    fn create(&mut self, key: T::Key) -> Option<T>;
}

impl<T, F> Factory<T> for F
where
    T: Poolable,
    F: FnMut(T::Key) -> Option<T>,
{
    #[inline]
    fn create(&mut self, key: T::Key) -> Option<T> {
        self(key)
    }
}

type Builder<T> = Box<dyn Fn(<T as Poolable>::Key) -> T + Send + Sync>;

/// Factory backed by a table of per-key builders.
pub struct FactoryRegistry<T: Poolable> {
    builders: FxHashMap<T::Key, Builder<T>>,
}

impl<T: Poolable> FactoryRegistry<T> {
    /// Create an empty registry. Every key is unknown until registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builders: FxHashMap::default(),
        }
    }

    /// Register (or replace) the builder for `key`.
    pub fn register(
        &mut self,
        key: T::Key,
        builder: impl Fn(T::Key) -> T + Send + Sync + 'static,
    ) {
        self.builders.insert(key, Box::new(builder));
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with(
        mut self,
        key: T::Key,
        builder: impl Fn(T::Key) -> T + Send + Sync + 'static,
    ) -> Self {
        self.register(key, builder);
        self
    }

    /// Check whether a builder exists for `key`.
    #[must_use]
    pub fn contains(&self, key: T::Key) -> bool {
        self.builders.contains_key(&key)
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl<T: Poolable> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> Factory<T> for FactoryRegistry<T> {
    fn create(&mut self, key: T::Key) -> Option<T> {
        self.builders.get(&key).map(|build| build(key))
    }
}

impl<T: Poolable> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("keys", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Presenter
// ============================================================================

/// Container notified when entities enter or leave play.
///
/// Typically a scene or physics world. The pool never stores the container;
/// it is passed into every operation that can trigger a callback.
pub trait Presenter<T: Poolable> {
    /// Called after an entity becomes active.
    fn attach(&mut self, _handle: EntityHandle, _entity: &mut T) {}

    /// Called before an active entity is reset and returned.
    fn detach(&mut self, _handle: EntityHandle, _entity: &mut T) {}
}

/// No presentation layer.
impl<T: Poolable> Presenter<T> for () {}
