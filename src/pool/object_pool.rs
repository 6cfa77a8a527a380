//! Keyed Object Pool with Bounded Reuse
//!
//! Reuses frequently spawned entities (obstacles, projectiles, transient
//! effects) instead of building new ones on every spawn. Entities are grouped
//! into per-type buckets and handed out LIFO, so the most recently returned
//! instance is reused first.
//!
//! # Design Principles
//!
//! - **Reuse First**: `acquire` only calls the factory when the bucket is empty
//! - **Bounded**: capacity is checked on the return path; extra entities are dropped
//! - **Forgiving**: recycling a stale or unknown handle is a silent no-op
//! - **No Presentation**: scene attach/detach goes through an injected [`Presenter`]
//!
//! # Example
//!
//! ```ignore
//! let mut pool = ObjectPool::new(obstacle_factory(), PoolConfig::default());
//! pool.preload(ObstacleKind::ALL, 5)?;
//!
//! let handle = pool.spawn(ObstacleKind::Spike, ObstacleSpawn::spike(pos), &mut scene)?;
//! // ...
//! pool.recycle(handle, &mut scene);
//! ```

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::config::PoolConfig;
use super::error::PoolError;
use super::handle::EntityHandle;
use super::stats::{self, Counters, PoolStats};
use super::traits::{Factory, Poolable, Presenter};

/// Handles gathered for a bulk operation.
type HandleBatch = SmallVec<[EntityHandle; 32]>;

// ============================================================================
// Slots
// ============================================================================

#[derive(Debug)]
enum SlotState<T> {
    /// Slot holds an entity, either checked out (`active`) or sitting in a bucket
    Occupied { entity: T, active: bool },
    /// Slot is empty and points to next free slot (or usize::MAX if end of list)
    Vacant(usize),
}

#[derive(Debug)]
struct Slot<T> {
    /// Bumped every time the entity leaves the active state
    generation: u32,
    state: SlotState<T>,
}

// ============================================================================
// Object Pool
// ============================================================================

/// A pool of reusable entities keyed by [`Poolable::Key`].
///
/// Every resident entity lives in exactly one place: an available bucket or
/// the active set. Callers refer to active entities by [`EntityHandle`].
///
/// # Capacity
///
/// Limits from [`PoolConfig`] apply only when an entity is recycled. An
/// entity is kept if its bucket holds fewer than `max_per_type` entities and
/// all buckets together hold fewer than `max_total`; otherwise it is dropped.
/// Active entities never count against either limit.
pub struct ObjectPool<T: Poolable, F> {
    /// Storage for every resident entity
    slots: Vec<Slot<T>>,
    /// Head of the vacant slot list
    free_head: usize,
    /// Slot indices of inactive entities, per type key, LIFO
    available: FxHashMap<T::Key, Vec<usize>>,
    /// Handles of checked-out entities
    active: FxHashSet<EntityHandle>,
    /// Total number of entries across all buckets
    pooled: usize,
    factory: F,
    config: PoolConfig,
    counters: Counters,
}

impl<T: Poolable, F: Factory<T>> ObjectPool<T, F> {
    /// Sentinel value indicating end of free list.
    const NONE: usize = usize::MAX;

    /// Create an empty pool. Nothing is built until `preload` or `acquire`.
    #[must_use]
    pub fn new(factory: F, config: PoolConfig) -> Self {
        Self {
            slots: Vec::new(),
            free_head: Self::NONE,
            available: FxHashMap::default(),
            active: FxHashSet::default(),
            pooled: 0,
            factory,
            config,
            counters: Counters::default(),
        }
    }

    /// Create a pool with default capacity limits.
    #[must_use]
    pub fn with_factory(factory: F) -> Self {
        Self::new(factory, PoolConfig::default())
    }

    /// Capacity limits in effect.
    #[must_use]
    pub const fn config(&self) -> PoolConfig {
        self.config
    }

    /// Access the factory, e.g. to register more builders.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Build `count_per_type` entities for each key and put them in the
    /// available buckets.
    ///
    /// Additive across calls and not subject to the capacity limits.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ConstructionError`] for the first unrecognised
    /// key. Keys listed before it stay preloaded.
    pub fn preload(
        &mut self,
        keys: impl IntoIterator<Item = T::Key>,
        count_per_type: usize,
    ) -> Result<(), PoolError> {
        for key in keys {
            for _ in 0..count_per_type {
                let entity = self.construct(key)?;
                let index = self.insert(entity, false);
                self.available.entry(key).or_default().push(index);
                self.pooled += 1;
            }
            log::info!("Preloaded {count_per_type} x {key:?}");
        }
        Ok(())
    }

    /// Hand out an entity for `key`, reusing the most recently returned one
    /// if the bucket is not empty.
    ///
    /// Reused entities are reset before `params` is applied.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ConstructionError`] if the bucket is empty and the
    /// factory does not recognise `key`. Pool state is left untouched.
    pub fn acquire(&mut self, key: T::Key, params: T::Params) -> Result<EntityHandle, PoolError> {
        let (index, reused) = match self.available.get_mut(&key).and_then(Vec::pop) {
            Some(index) => {
                self.pooled -= 1;
                self.counters.hits += 1;
                (index, true)
            }
            None => {
                let entity = self.construct(key)?;
                self.counters.misses += 1;
                (self.insert(entity, false), false)
            }
        };

        let slot = &mut self.slots[index];
        let handle = EntityHandle::new(index, slot.generation);
        if let SlotState::Occupied { entity, active } = &mut slot.state {
            if reused {
                entity.reset();
            }
            entity.activate(params);
            *active = true;
        }
        self.active.insert(handle);

        log::trace!(
            "Acquired {key:?} {handle} ({})",
            if reused { "reused" } else { "built" }
        );
        Ok(handle)
    }

    /// `acquire`, then attach the entity to `presenter`.
    ///
    /// # Errors
    ///
    /// Same as [`acquire`](Self::acquire); the presenter is not called on failure.
    pub fn spawn<P: Presenter<T> + ?Sized>(
        &mut self,
        key: T::Key,
        params: T::Params,
        presenter: &mut P,
    ) -> Result<EntityHandle, PoolError> {
        let handle = self.acquire(key, params)?;
        if let Some(entity) = self.get_mut(handle) {
            presenter.attach(handle, entity);
        }
        Ok(handle)
    }

    /// Take ownership of an entity built elsewhere and make it active.
    ///
    /// Applies `params`, attaches it to `presenter` and adds it to the active
    /// set. The entity is not reset.
    pub fn activate<P: Presenter<T> + ?Sized>(
        &mut self,
        entity: T,
        params: T::Params,
        presenter: &mut P,
    ) -> EntityHandle {
        let index = self.insert(entity, true);
        let slot = &mut self.slots[index];
        let handle = EntityHandle::new(index, slot.generation);
        if let SlotState::Occupied { entity, .. } = &mut slot.state {
            entity.activate(params);
            presenter.attach(handle, entity);
        }
        self.active.insert(handle);

        log::trace!("Activated external entity {handle}");
        handle
    }

    /// Return an active entity to the pool.
    ///
    /// Detaches it from `presenter`, resets it and either appends it to its
    /// bucket or drops it if a capacity limit is reached.
    ///
    /// Returns `false` (and does nothing) if `handle` is not active, which
    /// makes a second recycle of the same handle harmless.
    pub fn recycle<P: Presenter<T> + ?Sized>(
        &mut self,
        handle: EntityHandle,
        presenter: &mut P,
    ) -> bool {
        if !self.active.remove(&handle) {
            log::trace!("Ignoring recycle of inactive {handle}");
            return false;
        }

        let index = handle.index();
        let SlotState::Occupied { entity, active } = &mut self.slots[index].state else {
            return false;
        };
        presenter.detach(handle, entity);
        entity.reset();
        *active = false;
        let key = entity.type_key();

        let bucket_len = self.available.get(&key).map_or(0, Vec::len);
        if bucket_len < self.config.max_per_type && self.pooled < self.config.max_total {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            self.available.entry(key).or_default().push(index);
            self.pooled += 1;
            log::trace!("Recycled {key:?} {handle}");
        } else {
            self.vacate(index);
            self.counters.dropped += 1;
            log::debug!(
                "Dropped {key:?} {handle}: bucket {bucket_len}/{}, pooled {}/{}",
                self.config.max_per_type,
                self.pooled,
                self.config.max_total
            );
        }
        true
    }

    /// Recycle every active entity.
    ///
    /// Works on a snapshot of the active set, in slot order. Returns the
    /// number of entities recycled.
    pub fn recycle_all<P: Presenter<T> + ?Sized>(&mut self, presenter: &mut P) -> usize {
        let mut snapshot: HandleBatch = self.active.iter().copied().collect();
        snapshot.sort_unstable();

        let mut recycled = 0;
        for handle in snapshot {
            if self.recycle(handle, presenter) {
                recycled += 1;
            }
        }
        recycled
    }

    /// Hard reset: detach all active entities, then drop everything.
    ///
    /// Capacity limits are not consulted. Handles issued before the call
    /// are stale afterwards.
    pub fn clear<P: Presenter<T> + ?Sized>(&mut self, presenter: &mut P) {
        let mut snapshot: HandleBatch = self.active.drain().collect();
        snapshot.sort_unstable();

        for &handle in &snapshot {
            if let Some(entity) = self.get_mut(handle) {
                presenter.detach(handle, entity);
            }
        }

        for index in 0..self.slots.len() {
            if matches!(self.slots[index].state, SlotState::Occupied { .. }) {
                self.vacate(index);
            }
        }
        self.available.clear();
        self.pooled = 0;

        log::info!("Pool cleared, {} active entities detached", snapshot.len());
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    /// Get an active entity.
    ///
    /// Returns `None` for stale handles.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        match &slot.state {
            SlotState::Occupied { entity, active: true }
                if slot.generation == handle.generation() =>
            {
                Some(entity)
            }
            _ => None,
        }
    }

    /// Get an active entity mutably.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        match &mut slot.state {
            SlotState::Occupied { entity, active: true } => Some(entity),
            _ => None,
        }
    }

    /// Check whether `handle` refers to a checked-out entity.
    #[must_use]
    #[inline]
    pub fn is_active(&self, handle: EntityHandle) -> bool {
        self.active.contains(&handle)
    }

    /// Iterate over active entities with their handles.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.state {
                SlotState::Occupied { entity, active: true } => {
                    Some((EntityHandle::new(index, slot.generation), entity))
                }
                _ => None,
            })
    }

    /// Iterate mutably over active entities, e.g. for a per-frame update.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let generation = slot.generation;
                match &mut slot.state {
                    SlotState::Occupied { entity, active: true } => {
                        Some((EntityHandle::new(index, generation), entity))
                    }
                    _ => None,
                }
            })
    }

    // ------------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------------

    /// Number of inactive entities waiting in the bucket for `key`.
    #[must_use]
    pub fn available_count(&self, key: T::Key) -> usize {
        self.available.get(&key).map_or(0, Vec::len)
    }

    /// Number of active entities.
    #[must_use]
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of active entities of type `key`.
    #[must_use]
    pub fn active_count_of(&self, key: T::Key) -> usize {
        self.iter_active()
            .filter(|(_, entity)| entity.type_key() == key)
            .count()
    }

    /// Number of inactive entities across all buckets.
    #[must_use]
    #[inline]
    pub const fn pooled_count(&self) -> usize {
        self.pooled
    }

    /// Active plus pooled entities.
    #[must_use]
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.active.len() + self.pooled
    }

    /// Acquires served from a bucket.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.counters.hits
    }

    /// Acquires that had to construct.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.counters.misses
    }

    /// Entities built by the factory, preload included.
    #[must_use]
    pub const fn constructed(&self) -> u64 {
        self.counters.constructed
    }

    /// Entities dropped on recycle because a limit was reached.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.counters.dropped
    }

    /// Fraction of acquires served from a bucket.
    #[must_use]
    pub fn hit_rate(&self) -> f32 {
        stats::hit_rate(self.counters.hits, self.counters.misses)
    }

    /// Zero the running counters. Resident entities are not touched.
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    /// Snapshot of counts and counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats<T::Key> {
        let available_by_type = self
            .available
            .iter()
            .map(|(&key, bucket)| (key, bucket.len()))
            .collect();

        let mut active_by_type = FxHashMap::default();
        for (_, entity) in self.iter_active() {
            *active_by_type.entry(entity.type_key()).or_insert(0) += 1;
        }

        PoolStats {
            available_by_type,
            active_by_type,
            total_active: self.active.len(),
            total_pooled: self.pooled,
            hits: self.counters.hits,
            misses: self.counters.misses,
            constructed: self.counters.constructed,
            dropped: self.counters.dropped,
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn construct(&mut self, key: T::Key) -> Result<T, PoolError> {
        let Some(entity) = self.factory.create(key) else {
            log::warn!("Factory has no entry for {key:?}");
            return Err(PoolError::construction(key));
        };
        let built = entity.type_key();
        if built != key {
            log::warn!("Factory built {built:?} when asked for {key:?}");
            return Err(PoolError::construction(key));
        }
        self.counters.constructed += 1;
        Ok(entity)
    }

    /// Place an entity in a vacant slot (or a new one) and return its index.
    fn insert(&mut self, entity: T, active: bool) -> usize {
        let state = SlotState::Occupied { entity, active };

        if self.free_head != Self::NONE {
            let index = self.free_head;
            if let SlotState::Vacant(next) = self.slots[index].state {
                self.free_head = next;
            }
            self.slots[index].state = state;
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                state,
            });
            self.slots.len() - 1
        }
    }

    /// Drop the entity in an occupied slot and push the slot on the free list.
    fn vacate(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = SlotState::Vacant(self.free_head);
        self.free_head = index;
    }
}

impl<T: Poolable, F> fmt::Debug for ObjectPool<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("slots", &self.slots.len())
            .field("active", &self.active.len())
            .field("pooled", &self.pooled)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Spike,
        Block,
        Saw,
        Laser,
        Bird,
        Pillar,
        Unknown,
    }

    const KINDS: [Kind; 6] = [
        Kind::Spike,
        Kind::Block,
        Kind::Saw,
        Kind::Laser,
        Kind::Bird,
        Kind::Pillar,
    ];

    #[derive(Debug)]
    struct Thing {
        id: u32,
        kind: Kind,
        x: f32,
        y: f32,
        health: f32,
        velocity: f32,
    }

    struct Place {
        x: f32,
        y: f32,
    }

    impl Poolable for Thing {
        type Key = Kind;
        type Params = Place;

        fn type_key(&self) -> Kind {
            self.kind
        }

        fn reset(&mut self) {
            self.x = 0.0;
            self.y = 0.0;
            self.health = 100.0;
            self.velocity = 0.0;
        }

        fn activate(&mut self, params: Place) {
            self.x = params.x;
            self.y = params.y;
        }
    }

    fn at(x: f32, y: f32) -> Place {
        Place { x, y }
    }

    fn thing_factory() -> impl FnMut(Kind) -> Option<Thing> {
        let mut next_id = 0;
        move |kind| {
            if kind == Kind::Unknown {
                return None;
            }
            next_id += 1;
            Some(Thing {
                id: next_id,
                kind,
                x: 0.0,
                y: 0.0,
                health: 100.0,
                velocity: 0.0,
            })
        }
    }

    fn pool_with(config: PoolConfig) -> ObjectPool<Thing, impl FnMut(Kind) -> Option<Thing>> {
        ObjectPool::new(thing_factory(), config)
    }

    fn pool() -> ObjectPool<Thing, impl FnMut(Kind) -> Option<Thing>> {
        pool_with(PoolConfig::default())
    }

    /// Active set, `active` flags and buckets agree with each other.
    fn assert_invariants<F: Factory<Thing>>(pool: &ObjectPool<Thing, F>) {
        let mut flagged_active = 0;
        for (index, slot) in pool.slots.iter().enumerate() {
            if let SlotState::Occupied { active, .. } = slot.state {
                let handle = EntityHandle::new(index, slot.generation);
                assert_eq!(active, pool.active.contains(&handle));
                if active {
                    flagged_active += 1;
                }
            }
        }
        assert_eq!(flagged_active, pool.active.len());

        let mut bucketed = 0;
        for (key, bucket) in &pool.available {
            for &index in bucket {
                bucketed += 1;
                match &pool.slots[index].state {
                    SlotState::Occupied { entity, active } => {
                        assert!(!active);
                        assert_eq!(entity.kind, *key);
                    }
                    SlotState::Vacant(_) => panic!("bucket points at vacant slot"),
                }
            }
        }
        assert_eq!(bucketed, pool.pooled);
    }

    #[derive(Default)]
    struct Recorder {
        attached: Vec<EntityHandle>,
        detached: Vec<EntityHandle>,
    }

    impl Presenter<Thing> for Recorder {
        fn attach(&mut self, handle: EntityHandle, _entity: &mut Thing) {
            self.attached.push(handle);
        }

        fn detach(&mut self, handle: EntityHandle, _entity: &mut Thing) {
            self.detached.push(handle);
        }
    }

    #[test]
    fn test_preload_serves_acquires_before_factory() {
        let mut pool = pool();
        pool.preload([Kind::Spike], 5).unwrap();
        assert_eq!(pool.constructed(), 5);

        for _ in 0..5 {
            pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        }
        assert_eq!(pool.constructed(), 5);
        assert_eq!(pool.hits(), 5);

        pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        assert_eq!(pool.constructed(), 6);
        assert_eq!(pool.misses(), 1);
        assert_invariants(&pool);
    }

    #[test]
    fn test_preload_is_additive() {
        let mut pool = pool();
        pool.preload([Kind::Saw, Kind::Bird], 2).unwrap();
        pool.preload([Kind::Saw], 3).unwrap();

        assert_eq!(pool.available_count(Kind::Saw), 5);
        assert_eq!(pool.available_count(Kind::Bird), 2);
        assert_eq!(pool.pooled_count(), 7);
        assert_invariants(&pool);
    }

    #[test]
    fn test_preload_unknown_key() {
        let mut pool = pool();
        let result = pool.preload([Kind::Spike, Kind::Unknown, Kind::Saw], 2);

        assert!(matches!(result, Err(PoolError::ConstructionError(_))));
        assert_eq!(pool.available_count(Kind::Spike), 2);
        assert_eq!(pool.available_count(Kind::Saw), 0);
    }

    #[test]
    fn test_block_scenario() {
        let mut pool = pool();
        pool.preload([Kind::Block], 5).unwrap();

        let handle = pool.acquire(Kind::Block, at(10.0, 20.0)).unwrap();
        let block = pool.get(handle).unwrap();
        assert_eq!((block.x, block.y), (10.0, 20.0));
        assert_eq!(pool.available_count(Kind::Block), 4);
        assert!(pool.is_active(handle));

        assert!(pool.recycle(handle, &mut ()));
        assert_eq!(pool.available_count(Kind::Block), 5);
        assert!(!pool.is_active(handle));
        assert_eq!(pool.active_count(), 0);
        assert_invariants(&pool);
    }

    #[test]
    fn test_recycle_is_idempotent() {
        let mut pool = pool();
        let handle = pool.acquire(Kind::Saw, at(1.0, 1.0)).unwrap();

        assert!(pool.recycle(handle, &mut ()));
        let after_first = (pool.pooled_count(), pool.active_count(), pool.dropped());

        assert!(!pool.recycle(handle, &mut ()));
        assert_eq!(
            (pool.pooled_count(), pool.active_count(), pool.dropped()),
            after_first
        );
        assert_invariants(&pool);
    }

    #[test]
    fn test_lifo_reuse() {
        let mut pool = pool();
        let a = pool.acquire(Kind::Laser, at(0.0, 0.0)).unwrap();
        let b = pool.acquire(Kind::Laser, at(0.0, 0.0)).unwrap();

        pool.recycle(a, &mut ());
        pool.recycle(b, &mut ());

        let next = pool.acquire(Kind::Laser, at(0.0, 0.0)).unwrap();
        assert_eq!(next.index(), b.index());
        let after = pool.acquire(Kind::Laser, at(0.0, 0.0)).unwrap();
        assert_eq!(after.index(), a.index());
    }

    #[test]
    fn test_reset_on_reacquire() {
        let mut pool = pool();
        let handle = pool.acquire(Kind::Bird, at(5.0, 5.0)).unwrap();
        let id = pool.get(handle).unwrap().id;
        {
            let bird = pool.get_mut(handle).unwrap();
            bird.health = 3.0;
            bird.velocity = -40.0;
        }
        pool.recycle(handle, &mut ());

        let again = pool.acquire(Kind::Bird, at(1.0, 2.0)).unwrap();
        let bird = pool.get(again).unwrap();
        assert_eq!(bird.id, id, "should reuse the same instance");
        assert_eq!(bird.health, 100.0);
        assert_eq!(bird.velocity, 0.0);
        assert_eq!((bird.x, bird.y), (1.0, 2.0));
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut pool = pool();
        let old = pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        pool.recycle(old, &mut ());
        let new = pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(pool.get(old).is_none());
        assert!(!pool.recycle(old, &mut ()), "stale handle must not recycle");
        assert!(pool.is_active(new));
    }

    #[test]
    fn test_per_type_capacity() {
        let mut pool = pool_with(PoolConfig::default().with_max_per_type(20));
        let handles: Vec<_> = (0..25)
            .map(|_| pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap())
            .collect();

        for handle in handles {
            pool.recycle(handle, &mut ());
        }

        assert_eq!(pool.available_count(Kind::Spike), 20);
        assert_eq!(pool.stats().available(&Kind::Spike), 20);
        assert_eq!(pool.dropped(), 5);
        assert_eq!(pool.active_count(), 0);
        assert_invariants(&pool);
    }

    #[test]
    fn test_global_capacity() {
        let mut pool = pool_with(
            PoolConfig::default()
                .with_max_per_type(20)
                .with_max_total(100),
        );
        let mut handles = Vec::new();
        for kind in KINDS {
            for _ in 0..20 {
                handles.push(pool.acquire(kind, at(0.0, 0.0)).unwrap());
            }
        }
        assert_eq!(pool.active_count(), 120);

        for handle in handles {
            pool.recycle(handle, &mut ());
        }

        assert_eq!(pool.pooled_count(), 100);
        assert_eq!(pool.dropped(), 20);
        assert_eq!(pool.available_count(Kind::Pillar), 0);
        assert!(KINDS.iter().all(|&kind| pool.available_count(kind) <= 20));
        assert_invariants(&pool);
    }

    #[test]
    fn test_dropped_slot_is_reused() {
        let mut pool = pool_with(PoolConfig::default().with_max_per_type(0));
        let first = pool.acquire(Kind::Block, at(0.0, 0.0)).unwrap();
        pool.recycle(first, &mut ());
        assert_eq!(pool.dropped(), 1);
        assert_eq!(pool.resident_count(), 0);

        let second = pool.acquire(Kind::Block, at(0.0, 0.0)).unwrap();
        assert_eq!(second.index(), first.index());
        assert_eq!(pool.slots.len(), 1);
        assert!(pool.get(first).is_none());
    }

    #[test]
    fn test_unknown_key_leaves_state_unchanged() {
        let mut pool = pool();
        pool.preload([Kind::Block], 3).unwrap();
        let live = pool.acquire(Kind::Block, at(0.0, 0.0)).unwrap();
        let before = pool.stats();

        let result = pool.acquire(Kind::Unknown, at(0.0, 0.0));

        assert!(matches!(result, Err(PoolError::ConstructionError(_))));
        let after = pool.stats();
        assert_eq!(after.available_by_type, before.available_by_type);
        assert_eq!(after.total_active, before.total_active);
        assert_eq!(after.hits, before.hits);
        assert_eq!(after.misses, before.misses);
        assert_eq!(after.constructed, before.constructed);
        assert!(pool.is_active(live));
        assert_invariants(&pool);
    }

    #[test]
    fn test_factory_building_wrong_kind_is_rejected() {
        let spikes_only = |_kind: Kind| {
            Some(Thing {
                id: 0,
                kind: Kind::Spike,
                x: 0.0,
                y: 0.0,
                health: 100.0,
                velocity: 0.0,
            })
        };
        let mut pool = ObjectPool::<Thing, _>::new(spikes_only, PoolConfig::default());

        let result = pool.acquire(Kind::Block, at(0.0, 0.0));
        assert!(matches!(result, Err(PoolError::ConstructionError(_))));
        assert!(matches!(
            pool.preload([Kind::Block], 1),
            Err(PoolError::ConstructionError(_))
        ));
        assert_eq!(pool.available_count(Kind::Block), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.constructed(), 0);
        assert_eq!(pool.misses(), 0);

        let spike = pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        assert_eq!(pool.get(spike).unwrap().kind, Kind::Spike);
        assert_invariants(&pool);
    }

    #[test]
    fn test_error_message() {
        let mut pool = pool();
        let err = pool.acquire(Kind::Unknown, at(0.0, 0.0)).unwrap_err();
        assert_eq!(err.to_string(), "No factory entry for type key Unknown");
    }

    #[test]
    fn test_spawn_and_recycle_call_presenter() {
        let mut pool = pool();
        let mut recorder = Recorder::default();

        let handle = pool.spawn(Kind::Saw, at(3.0, 4.0), &mut recorder).unwrap();
        assert_eq!(recorder.attached, vec![handle]);

        pool.recycle(handle, &mut recorder);
        pool.recycle(handle, &mut recorder);
        assert_eq!(recorder.detached, vec![handle]);
    }

    #[test]
    fn test_acquire_does_not_attach() {
        let mut pool = pool();
        let mut recorder = Recorder::default();
        pool.acquire(Kind::Saw, at(0.0, 0.0)).unwrap();
        assert!(recorder.attached.is_empty());
        pool.recycle_all(&mut recorder);
        assert_eq!(recorder.detached.len(), 1);
    }

    #[test]
    fn test_activate_external_entity() {
        let mut pool = pool();
        let mut recorder = Recorder::default();
        let outside = Thing {
            id: 999,
            kind: Kind::Pillar,
            x: 0.0,
            y: 0.0,
            health: 7.0,
            velocity: 0.0,
        };

        let handle = pool.activate(outside, at(8.0, 9.0), &mut recorder);
        let pillar = pool.get(handle).unwrap();
        assert_eq!((pillar.x, pillar.y), (8.0, 9.0));
        assert_eq!(pillar.health, 7.0, "activate does not reset");
        assert_eq!(recorder.attached, vec![handle]);
        assert!(pool.is_active(handle));
        assert_eq!(pool.constructed(), 0);

        pool.recycle(handle, &mut recorder);
        assert_eq!(pool.available_count(Kind::Pillar), 1);
        let reused = pool.acquire(Kind::Pillar, at(0.0, 0.0)).unwrap();
        assert_eq!(pool.get(reused).unwrap().id, 999);
        assert_invariants(&pool);
    }

    #[test]
    fn test_recycle_all() {
        let mut pool = pool();
        let mut recorder = Recorder::default();
        for kind in KINDS {
            pool.spawn(kind, at(0.0, 0.0), &mut recorder).unwrap();
        }

        assert_eq!(pool.recycle_all(&mut recorder), 6);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.pooled_count(), 6);
        assert_eq!(recorder.detached.len(), 6);
        assert_eq!(pool.recycle_all(&mut recorder), 0);
        assert_invariants(&pool);
    }

    #[test]
    fn test_clear() {
        let mut pool = pool_with(PoolConfig::default().with_max_total(1));
        let mut recorder = Recorder::default();
        pool.preload(KINDS, 4).unwrap();
        let a = pool.spawn(Kind::Spike, at(0.0, 0.0), &mut recorder).unwrap();
        let b = pool.spawn(Kind::Block, at(0.0, 0.0), &mut recorder).unwrap();

        pool.clear(&mut recorder);

        assert_eq!(recorder.detached, vec![a, b]);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.pooled_count(), 0);
        assert!(KINDS.iter().all(|&kind| pool.available_count(kind) == 0));
        assert!(pool.get(a).is_none());
        assert!(!pool.recycle(b, &mut recorder));
        assert_invariants(&pool);

        let fresh = pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        assert_ne!(fresh, a);
        assert_eq!(pool.misses(), 1);
    }

    #[test]
    fn test_hit_rate_tracking() {
        let mut pool = pool();
        assert_eq!(pool.hit_rate(), 0.0);

        pool.preload([Kind::Bird], 3).unwrap();
        for _ in 0..4 {
            pool.acquire(Kind::Bird, at(0.0, 0.0)).unwrap();
        }
        assert!((pool.hit_rate() - 0.75).abs() < f32::EPSILON);
        assert!((pool.stats().hit_rate() - 0.75).abs() < f32::EPSILON);

        pool.reset_counters();
        assert_eq!(pool.hit_rate(), 0.0);
        assert_eq!(pool.active_count(), 4);
    }

    #[test]
    fn test_iter_active_mut_updates() {
        let mut pool = pool();
        let a = pool.acquire(Kind::Spike, at(0.0, 0.0)).unwrap();
        let b = pool.acquire(Kind::Block, at(10.0, 0.0)).unwrap();
        let c = pool.acquire(Kind::Block, at(20.0, 0.0)).unwrap();
        pool.recycle(b, &mut ());

        for (_, thing) in pool.iter_active_mut() {
            thing.x += 1.0;
        }

        let handles: Vec<_> = pool.iter_active().map(|(handle, _)| handle).collect();
        assert_eq!(handles, vec![a, c]);
        assert_eq!(pool.get(a).unwrap().x, 1.0);
        assert_eq!(pool.get(c).unwrap().x, 21.0);
        assert_eq!(pool.active_count_of(Kind::Block), 1);
    }

    #[test]
    fn test_stats_snapshot() {
        let mut pool = pool();
        pool.preload([Kind::Saw], 2).unwrap();
        pool.acquire(Kind::Saw, at(0.0, 0.0)).unwrap();
        pool.acquire(Kind::Laser, at(0.0, 0.0)).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.available(&Kind::Saw), 1);
        assert_eq!(stats.active(&Kind::Saw), 1);
        assert_eq!(stats.active(&Kind::Laser), 1);
        assert_eq!(stats.total_active, 2);
        assert_eq!(stats.total_pooled, 1);
        assert_eq!(stats.constructed, 3);
    }
}
