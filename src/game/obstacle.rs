//! Obstacles and their spawn parameters

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::pool::{FactoryRegistry, Poolable};

/// Global counter for generating unique obstacle IDs
static NEXT_OBSTACLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_OBSTACLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Vertical bob frequency for birds (radians per second)
const BOB_FREQUENCY: f32 = 4.0;

// ============================================================================
// Obstacle Kind
// ============================================================================

/// The kinds of obstacle the runner has to avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Spike,
    Block,
    Saw,
    Laser,
    Bird,
    Pillar,
}

impl ObstacleKind {
    /// Every kind, in pattern order.
    pub const ALL: [Self; 6] = [
        Self::Spike,
        Self::Block,
        Self::Saw,
        Self::Laser,
        Self::Bird,
        Self::Pillar,
    ];

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spike => "spike",
            Self::Block => "block",
            Self::Saw => "saw",
            Self::Laser => "laser",
            Self::Bird => "bird",
            Self::Pillar => "pillar",
        }
    }

    /// Default bounding size
    #[must_use]
    pub const fn size(self) -> Vec2 {
        match self {
            Self::Spike => Vec2::new(24.0, 24.0),
            Self::Block => Vec2::new(40.0, 40.0),
            Self::Saw => Vec2::new(48.0, 48.0),
            Self::Laser => Vec2::new(8.0, 120.0),
            Self::Bird => Vec2::new(32.0, 20.0),
            Self::Pillar => Vec2::new(36.0, 160.0),
        }
    }

    /// Hit points when freshly built or reset
    #[must_use]
    pub const fn base_health(self) -> f32 {
        match self {
            Self::Block => 3.0,
            Self::Pillar => 5.0,
            _ => 1.0,
        }
    }
}

// ============================================================================
// Spawn Parameters
// ============================================================================

/// Per-kind activation details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnDetails {
    Spike,
    Block {
        /// Overrides the base health
        health: f32,
    },
    Saw {
        /// Rotation speed in radians per second
        spin: f32,
    },
    Laser {
        /// Beam length
        length: f32,
    },
    Bird {
        /// Vertical bob amplitude
        amplitude: f32,
    },
    Pillar {
        /// Pillar height
        height: f32,
    },
}

impl SpawnDetails {
    /// The obstacle kind these details belong to.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        match self {
            Self::Spike => ObstacleKind::Spike,
            Self::Block { .. } => ObstacleKind::Block,
            Self::Saw { .. } => ObstacleKind::Saw,
            Self::Laser { .. } => ObstacleKind::Laser,
            Self::Bird { .. } => ObstacleKind::Bird,
            Self::Pillar { .. } => ObstacleKind::Pillar,
        }
    }

    /// Typical details for `kind`.
    #[must_use]
    pub const fn default_for(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Spike => Self::Spike,
            ObstacleKind::Block => Self::Block {
                health: ObstacleKind::Block.base_health(),
            },
            ObstacleKind::Saw => Self::Saw { spin: 6.0 },
            ObstacleKind::Laser => Self::Laser { length: 120.0 },
            ObstacleKind::Bird => Self::Bird { amplitude: 24.0 },
            ObstacleKind::Pillar => Self::Pillar { height: 160.0 },
        }
    }
}

/// Activation parameters for an [`Obstacle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpawn {
    /// World position of the obstacle centre
    pub position: Vec2,
    /// Initial velocity
    pub velocity: Vec2,
    /// Kind-specific settings
    pub details: SpawnDetails,
}

impl ObstacleSpawn {
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2, details: SpawnDetails) -> Self {
        Self {
            position,
            velocity,
            details,
        }
    }

    /// Spawn with the typical details for `kind`.
    #[must_use]
    pub const fn default_for(kind: ObstacleKind, position: Vec2, velocity: Vec2) -> Self {
        Self::new(position, velocity, SpawnDetails::default_for(kind))
    }

    /// Kind selected by the details.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.details.kind()
    }
}

// ============================================================================
// Obstacle
// ============================================================================

/// A pooled obstacle.
#[derive(Debug, Clone)]
pub struct Obstacle {
    id: u64,
    kind: ObstacleKind,
    /// Centre position
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    /// Current rotation (radians)
    pub rotation: f32,
    /// Rotation speed (radians per second)
    pub spin: f32,
    pub health: f32,
    /// Seconds since activation
    pub age: f32,
    pub bob_amplitude: f32,
    /// Y position the bob oscillates around
    pub base_y: f32,
}

impl Obstacle {
    /// Build a fresh obstacle with a new unique ID.
    #[must_use]
    pub fn new(kind: ObstacleKind) -> Self {
        Self {
            id: next_id(),
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: kind.size(),
            rotation: 0.0,
            spin: 0.0,
            health: kind.base_health(),
            age: 0.0,
            bob_amplitude: 0.0,
            base_y: 0.0,
        }
    }

    /// Unique ID, stable across reuse
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Advance motion by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.age += dt;
        self.position.x += self.velocity.x * dt;
        self.rotation += self.spin * dt;

        if self.kind == ObstacleKind::Bird {
            self.position.y = self.base_y + self.bob_amplitude * (self.age * BOB_FREQUENCY).sin();
        } else {
            self.position.y += self.velocity.y * dt;
        }
    }

    /// Whether the right edge has scrolled left of `x`.
    #[must_use]
    pub fn is_past(&self, x: f32) -> bool {
        self.position.x + self.size.x * 0.5 < x
    }

    /// Axis-aligned bounds as (min, max)
    #[must_use]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.size * 0.5;
        (self.position - half, self.position + half)
    }
}

impl Poolable for Obstacle {
    type Key = ObstacleKind;
    type Params = ObstacleSpawn;

    fn type_key(&self) -> ObstacleKind {
        self.kind
    }

    fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.size = self.kind.size();
        self.rotation = 0.0;
        self.spin = 0.0;
        self.health = self.kind.base_health();
        self.age = 0.0;
        self.bob_amplitude = 0.0;
        self.base_y = 0.0;
    }

    fn activate(&mut self, params: ObstacleSpawn) {
        self.position = params.position;
        self.velocity = params.velocity;
        self.base_y = params.position.y;

        if params.kind() != self.kind {
            log::warn!(
                "Spawn details for {:?} applied to {:?}, ignoring details",
                params.kind(),
                self.kind
            );
            return;
        }

        match params.details {
            SpawnDetails::Spike => {}
            SpawnDetails::Block { health } => self.health = health,
            SpawnDetails::Saw { spin } => self.spin = spin,
            SpawnDetails::Laser { length } => self.size.y = length,
            SpawnDetails::Bird { amplitude } => self.bob_amplitude = amplitude,
            SpawnDetails::Pillar { height } => self.size.y = height,
        }
    }
}

/// Factory with a builder for every [`ObstacleKind`].
#[must_use]
pub fn obstacle_factory() -> FactoryRegistry<Obstacle> {
    ObstacleKind::ALL
        .into_iter()
        .fold(FactoryRegistry::<Obstacle>::new(), |registry, kind| {
            registry.with(kind, Obstacle::new)
        })
}
