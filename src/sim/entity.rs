//! Simulated entities
//!
//! Every object in the field is an [`Entity`] record. Per-kind logic is picked
//! by the closed [`Behavior`] tag rather than by attaching functions to
//! individual objects.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::explosion::Explosion;

/// Stable entity handle, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Which per-frame logic an entity runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Player craft: reads input, collides with everything but projectiles
    Avatar,
    /// Drifting rock: collides with everything, is struck by projectiles
    Asteroid,
    /// Projectile: passive, only integrates
    Ammo,
    /// Transient sprite-sheet effect, outside the physics pass
    Explosion(Explosion),
}

/// Mutable simulation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub behavior: Behavior,

    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading angle (radians)
    pub orientation: f32,
    pub angular_velocity: f32,

    /// Force accumulated by control, consumed by integration
    pub force: Vec3,
    pub torque: f32,
    /// Signed thrust magnitude from the last control step
    pub thrust: f32,

    pub inv_mass: f32,
    pub inv_angular_mass: f32,
    /// Per-second retention of the velocity component along the heading
    pub forward_drag: f32,
    /// Per-second retention of the velocity component across the heading
    pub side_drag: f32,
    pub angular_drag: f32,

    pub scale: Vec3,

    /// Excluded from every pass until swept
    pub destroyed: bool,
    /// Set by the resolver on rigid contact, consumed by the lifecycle pass
    pub collision: bool,

    /// Non-owning link used only for transform composition
    pub parent: Option<EntityId>,
    /// World transform, refreshed by `update`
    #[serde(skip, default = "identity")]
    pub model: Mat4,
}

fn identity() -> Mat4 {
    Mat4::IDENTITY
}

impl Entity {
    /// Blank entity at the origin with unit mass and no drag
    pub fn new(id: EntityId, behavior: Behavior) -> Self {
        Self {
            id,
            behavior,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            orientation: 0.0,
            angular_velocity: 0.0,
            force: Vec3::ZERO,
            torque: 0.0,
            thrust: 0.0,
            inv_mass: 1.0,
            inv_angular_mass: 1.0,
            forward_drag: 1.0,
            side_drag: 1.0,
            angular_drag: 1.0,
            scale: Vec3::ONE,
            destroyed: false,
            collision: false,
            parent: None,
            model: Mat4::IDENTITY,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: Vec3, angular_velocity: f32) -> Self {
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_drag(mut self, forward: f32, side: f32, angular: f32) -> Self {
        self.forward_drag = forward;
        self.side_drag = side;
        self.angular_drag = angular;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn is_avatar(&self) -> bool {
        matches!(self.behavior, Behavior::Avatar)
    }

    #[inline]
    pub fn is_ammo(&self) -> bool {
        matches!(self.behavior, Behavior::Ammo)
    }

    pub fn explosion(&self) -> Option<&Explosion> {
        match &self.behavior {
            Behavior::Explosion(explosion) => Some(explosion),
            _ => None,
        }
    }

    /// Whether an explosion effect has played its last frame
    pub fn is_finished_effect(&self) -> bool {
        self.explosion().is_some_and(|e| e.finished)
    }

    /// Clear accumulated control output
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = 0.0;
        self.thrust = 0.0;
    }

    /// Local transform: translate · rotate_z · scale
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_z(self.orientation),
            self.position,
        )
    }

    /// Recompute `model`, composing with a parent transform when given
    pub fn refresh_model(&mut self, parent: Option<&Mat4>) {
        let local = self.local_transform();
        self.model = match parent {
            Some(parent) => *parent * local,
            None => local,
        };
    }
}

/// Find an entity by id
pub fn find(entities: &[Entity], id: EntityId) -> Option<&Entity> {
    entities.iter().find(|e| e.id == id)
}

/// Find an entity by id, mutably
pub fn find_mut(entities: &mut [Entity], id: EntityId) -> Option<&mut Entity> {
    entities.iter_mut().find(|e| e.id == id)
}

/// Borrow two distinct entities mutably
///
/// Panics if `a == b` or either index is out of range.
pub fn pair_mut(entities: &mut [Entity], a: usize, b: usize) -> (&mut Entity, &mut Entity) {
    assert_ne!(a, b, "pair_mut requires distinct indices");
    if a < b {
        let (head, tail) = entities.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = entities.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}
