//! Per-kind control, movement and transform refresh
//!
//! Dispatch is a `match` over [`Behavior`]: `control` produces forces and
//! resolves contacts, `advance` integrates, `update` refreshes the transform
//! (and the sprite animation for explosions).

use glam::Mat4;

use super::collision::{ContactSummary, Resolver};
use super::entity::{Behavior, Entity};
use super::integrate::integrate;
use super::tick::TickInput;
use crate::heading;
use crate::tuning::Tuning;

/// Timing for the frame being simulated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Host timestamp (ms)
    pub now_ms: u64,
    /// Seconds since the first frame
    pub t: f32,
    /// Seconds since the previous frame
    pub dt: f32,
}

/// Run the control step for `entities[index]`
pub fn control(
    entities: &mut [Entity],
    index: usize,
    frame: &Frame,
    input: &TickInput,
    tuning: &Tuning,
) -> ContactSummary {
    match entities[index].behavior {
        Behavior::Avatar => {
            steer(&mut entities[index], input, tuning);
            let resolver = Resolver {
                profile: tuning.avatar.contact,
                thresholds: &tuning.contact,
                impact_relocation: tuning.world.impact_relocation.extend(0.0),
                ignore_ammo: true,
            };
            resolver.resolve(entities, index, frame.dt)
        }
        Behavior::Asteroid => {
            let resolver = Resolver {
                profile: tuning.asteroids.contact,
                thresholds: &tuning.contact,
                impact_relocation: tuning.world.impact_relocation.extend(0.0),
                ignore_ammo: false,
            };
            resolver.resolve(entities, index, frame.dt)
        }
        // Projectiles are detected by others; effects never collide
        Behavior::Ammo | Behavior::Explosion(_) => ContactSummary::default(),
    }
}

/// Turn the input snapshot into thrust, force and torque
///
/// Forward wins over back and left wins over right when both are held.
pub fn steer(avatar: &mut Entity, input: &TickInput, tuning: &Tuning) {
    avatar.thrust = if input.thrust_forward {
        tuning.avatar.thrust
    } else if input.thrust_back {
        -tuning.avatar.thrust
    } else {
        0.0
    };

    avatar.torque = if input.turn_left {
        tuning.avatar.turn_torque
    } else if input.turn_right {
        -tuning.avatar.turn_torque
    } else {
        0.0
    };

    avatar.force = heading(avatar.orientation) * avatar.thrust;
}

/// Integrate motion; explosions do not move
pub fn advance(entity: &mut Entity, dt: f32) {
    if !matches!(entity.behavior, Behavior::Explosion(_)) {
        integrate(entity, dt);
    }
}

/// Refresh the transform, animating explosion effects
pub fn update(entity: &mut Entity, parent: Option<&Mat4>, now_ms: u64, tuning: &Tuning) {
    if let Behavior::Explosion(boom) = &mut entity.behavior {
        boom.animate(now_ms, &tuning.explosion);
    }
    entity.refresh_model(parent);
}
