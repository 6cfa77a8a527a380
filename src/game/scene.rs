//! Scene container for pooled obstacles
//!
//! Mirrors active obstacles into a hecs world so rendering and collision
//! systems can query them like any other entity.

use glam::Vec2;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::obstacle::Obstacle;
use crate::pool::{EntityHandle, Factory, ObjectPool, Presenter};

/// 2D transform component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Size of the bounding box
    pub size: Vec2,
}

impl From<&Obstacle> for Transform2D {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            position: obstacle.position,
            rotation: obstacle.rotation,
            size: obstacle.size,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

/// Links a scene entity back to its pool handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pooled(pub EntityHandle);

/// Scene graph holding one node per active obstacle.
pub struct Scene {
    world: hecs::World,
    nodes: FxHashMap<EntityHandle, Entity>,
}

impl Scene {
    /// Create an empty scene
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            nodes: FxHashMap::default(),
        }
    }

    /// Number of attached obstacles
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether an obstacle is attached
    #[must_use]
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// Scene entity for a pool handle
    #[must_use]
    pub fn entity(&self, handle: EntityHandle) -> Option<Entity> {
        self.nodes.get(&handle).copied()
    }

    /// Current transform of an attached obstacle
    #[must_use]
    pub fn transform(&self, handle: EntityHandle) -> Option<Transform2D> {
        let entity = self.entity(handle)?;
        self.world.get::<&Transform2D>(entity).ok().map(|t| *t)
    }

    /// The underlying hecs world
    #[must_use]
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    /// Copy positions of all active obstacles into their transforms.
    pub fn sync<F: Factory<Obstacle>>(&mut self, pool: &ObjectPool<Obstacle, F>) {
        for (handle, obstacle) in pool.iter_active() {
            if let Some(&entity) = self.nodes.get(&handle)
                && let Ok(mut transform) = self.world.get::<&mut Transform2D>(entity)
            {
                *transform = Transform2D::from(obstacle);
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter<Obstacle> for Scene {
    fn attach(&mut self, handle: EntityHandle, obstacle: &mut Obstacle) {
        let entity = self.world.spawn((
            Name(format!("{}#{}", obstacle.kind().name(), obstacle.id())),
            Transform2D::from(&*obstacle),
            Pooled(handle),
        ));

        if let Some(previous) = self.nodes.insert(handle, entity) {
            log::warn!("{handle} was already attached, replacing node");
            if self.world.despawn(previous).is_err() {
                log::warn!("Previous scene node for {handle} was already gone");
            }
        }
    }

    fn detach(&mut self, handle: EntityHandle, _obstacle: &mut Obstacle) {
        match self.nodes.remove(&handle) {
            Some(entity) => {
                if self.world.despawn(entity).is_err() {
                    log::warn!("Scene node for {handle} was already gone");
                }
            }
            None => log::debug!("Detach of {handle} with no scene node"),
        }
    }
}
