//! Simulation context
//!
//! Everything the per-frame pipeline reads or writes lives in [`SimState`]:
//! frame timestamps, fire/respawn edge state, the live collections and the
//! seeded RNG. It is created once and threaded through every tick.

use glam::{Mat4, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Behavior, Entity, EntityId, find, find_mut};
use crate::tuning::{ConfigError, Tuning};

/// Which afterburner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurnerSide {
    Left,
    Right,
}

/// Afterburner flame attached to the avatar; visual only
#[derive(Debug, Clone)]
pub struct Burner {
    pub side: BurnerSide,
    /// Offset in the parent's local frame
    pub position: Vec3,
    pub scale: Vec3,
    pub parent: EntityId,
    pub model: Mat4,
}

impl Burner {
    fn new(side: BurnerSide, offset: Vec2, scale: Vec2, parent: EntityId) -> Self {
        Self {
            side,
            position: offset.extend(0.0),
            scale: scale.extend(0.0),
            parent,
            model: Mat4::IDENTITY,
        }
    }

    /// Recompute the flame transform relative to its parent
    pub fn refresh_model(&mut self, parent: Option<&Mat4>) {
        let local = Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position);
        self.model = match parent {
            Some(parent) => *parent * local,
            None => local,
        };
    }
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct SimState {
    pub tuning: Tuning,
    /// Timestamp (ms) of the first frame
    pub first_frame_ms: u64,
    /// Timestamp (ms) of the previous frame
    pub last_frame_ms: u64,
    /// Timestamp (ms) of the last shot, if any
    pub last_fire_ms: Option<u64>,
    /// Fire input as seen on the previous tick
    pub last_fire_input: bool,
    /// Respawn input as seen on the previous tick
    pub last_respawn_input: bool,
    pub respawn_pending: bool,
    pub fire_pending: bool,
    pub avatar_id: EntityId,
    /// Avatar, asteroids and projectiles, in dispatch order
    pub entities: Vec<Entity>,
    /// Live explosion effects
    pub explosions: Vec<Entity>,
    pub burners: [Burner; 2],
    /// Projectiles fired this session
    pub shots_fired: u64,
    rng: Pcg32,
    next_id: u32,
}

impl SimState {
    /// Build the avatar and the initial asteroid field
    ///
    /// Tuning is validated first; the explosion animation divides by the
    /// sprite grid and frame count.
    pub fn new(tuning: Tuning, now_ms: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let rng = Pcg32::seed_from_u64(tuning.seed);
        let avatar_id = EntityId(1);
        let avatar = Entity::new(avatar_id, Behavior::Avatar)
            .at(tuning.avatar.spawn_point.extend(0.0))
            .with_drag(
                tuning.avatar.forward_drag,
                tuning.avatar.side_drag,
                tuning.avatar.angular_drag,
            );
        let flames = &tuning.flames;
        let burners = [
            Burner::new(BurnerSide::Left, flames.left_offset, flames.left_scale, avatar_id),
            Burner::new(BurnerSide::Right, flames.right_offset, flames.right_scale, avatar_id),
        ];

        let mut state = Self {
            tuning,
            first_frame_ms: now_ms,
            last_frame_ms: now_ms,
            last_fire_ms: None,
            last_fire_input: false,
            last_respawn_input: false,
            respawn_pending: false,
            fire_pending: false,
            avatar_id,
            entities: vec![avatar],
            explosions: Vec::new(),
            burners,
            shots_fired: 0,
            rng,
            next_id: avatar_id.0 + 1,
        };

        for _ in 0..state.tuning.asteroids.count {
            state.spawn_asteroid();
        }

        log::info!(
            "Simulation started: {} asteroids, seed {:#x}",
            state.tuning.asteroids.count,
            state.tuning.seed
        );
        Ok(state)
    }

    /// Empty field containing only the avatar (for scripted setups)
    pub fn with_avatar_only(mut tuning: Tuning, now_ms: u64) -> Result<Self, ConfigError> {
        tuning.asteroids.count = 0;
        Self::new(tuning, now_ms)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn avatar(&self) -> Option<&Entity> {
        find(&self.entities, self.avatar_id)
    }

    pub fn avatar_mut(&mut self) -> Option<&mut Entity> {
        find_mut(&mut self.entities, self.avatar_id)
    }

    pub fn avatar_destroyed(&self) -> bool {
        self.avatar().is_none_or(|a| a.destroyed)
    }

    /// Add an asteroid at a random spot inside the spawn box
    pub fn spawn_asteroid(&mut self) -> EntityId {
        let field = &self.tuning.asteroids;
        let (min, max) = (field.spawn_min, field.spawn_max);
        let (speed, spin) = (field.speed_range, field.spin_range);

        let position = Vec3::new(
            min.x + (max.x - min.x) * self.rng.random::<f32>(),
            min.y + (max.y - min.y) * self.rng.random::<f32>(),
            0.0,
        );
        let velocity = self.random_velocity(speed);
        let angular_velocity = self.random_symmetric(spin);

        let id = self.next_entity_id();
        self.entities.push(
            Entity::new(id, Behavior::Asteroid)
                .at(position)
                .moving(velocity, angular_velocity),
        );
        id
    }

    /// Place an entity directly into the primary collection
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_entity_id();
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Uniform sample in `[-range, range)`
    pub fn random_symmetric(&mut self, range: f32) -> f32 {
        (self.rng.random::<f32>() * 2.0 - 1.0) * range
    }

    /// In-plane velocity with each component in `[-range, range)`
    pub fn random_velocity(&mut self, range: f32) -> Vec3 {
        let x = self.random_symmetric(range);
        let y = self.random_symmetric(range);
        Vec3::new(x, y, 0.0)
    }

    /// Fair coin mapped to ±1
    pub fn random_sign(&mut self) -> f32 {
        if self.rng.random_bool(0.5) { 1.0 } else { -1.0 }
    }

    /// Seconds between two host timestamps
    pub fn seconds_between(earlier_ms: u64, later_ms: u64) -> f32 {
        later_ms.saturating_sub(earlier_ms) as f32 / 1000.0
    }
}
