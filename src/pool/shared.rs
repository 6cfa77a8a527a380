//! Thread-shared pool
//!
//! Wraps an [`ObjectPool`] in a single mutex so a loader thread can preload
//! while the update loop acquires and recycles.

use std::sync::Arc;

use parking_lot::Mutex;

use super::error::PoolError;
use super::handle::EntityHandle;
use super::object_pool::ObjectPool;
use super::stats::PoolStats;
use super::traits::{Factory, Poolable, Presenter};

/// Cloneable handle to a mutex-guarded pool.
///
/// Every operation takes the lock for its whole duration. Presenter
/// callbacks run while the lock is held and must not call back into the pool.
pub struct SharedPool<T: Poolable, F> {
    inner: Arc<Mutex<ObjectPool<T, F>>>,
}

impl<T: Poolable, F: Factory<T>> SharedPool<T, F> {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: ObjectPool<T, F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// See [`ObjectPool::preload`].
    ///
    /// # Errors
    ///
    /// Fails on the first key the factory does not recognise
    pub fn preload(
        &self,
        keys: impl IntoIterator<Item = T::Key>,
        count_per_type: usize,
    ) -> Result<(), PoolError> {
        self.inner.lock().preload(keys, count_per_type)
    }

    /// See [`ObjectPool::acquire`].
    ///
    /// # Errors
    ///
    /// Fails if the bucket is empty and the factory does not recognise `key`
    pub fn acquire(&self, key: T::Key, params: T::Params) -> Result<EntityHandle, PoolError> {
        self.inner.lock().acquire(key, params)
    }

    /// See [`ObjectPool::spawn`].
    ///
    /// # Errors
    ///
    /// Fails if the bucket is empty and the factory does not recognise `key`
    pub fn spawn<P: Presenter<T> + ?Sized>(
        &self,
        key: T::Key,
        params: T::Params,
        presenter: &mut P,
    ) -> Result<EntityHandle, PoolError> {
        self.inner.lock().spawn(key, params, presenter)
    }

    /// See [`ObjectPool::activate`].
    pub fn activate<P: Presenter<T> + ?Sized>(
        &self,
        entity: T,
        params: T::Params,
        presenter: &mut P,
    ) -> EntityHandle {
        self.inner.lock().activate(entity, params, presenter)
    }

    /// See [`ObjectPool::recycle`].
    pub fn recycle<P: Presenter<T> + ?Sized>(&self, handle: EntityHandle, presenter: &mut P) -> bool {
        self.inner.lock().recycle(handle, presenter)
    }

    /// See [`ObjectPool::recycle_all`].
    pub fn recycle_all<P: Presenter<T> + ?Sized>(&self, presenter: &mut P) -> usize {
        self.inner.lock().recycle_all(presenter)
    }

    /// See [`ObjectPool::clear`].
    pub fn clear<P: Presenter<T> + ?Sized>(&self, presenter: &mut P) {
        self.inner.lock().clear(presenter);
    }

    /// Snapshot of counts and counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats<T::Key> {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access to the pool.
    ///
    /// Use for reads that need a consistent view (e.g. copying positions
    /// out of every active entity) or for batching several operations under
    /// one lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut ObjectPool<T, F>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<T: Poolable, F> Clone for SharedPool<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
