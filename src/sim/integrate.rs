//! Semi-implicit Euler integration with directional drag
//!
//! Velocity is split into the component along the heading and the remainder
//! across it; each is damped by `drag^dt`, so damping does not depend on the
//! frame rate and a craft coasts longer forward than sideways.

use super::entity::Entity;
use crate::heading;

/// Advance one entity's kinematics by `dt` seconds
pub fn integrate(entity: &mut Entity, dt: f32) {
    debug_assert!(
        entity.inv_mass >= 0.0 && entity.inv_angular_mass >= 0.0,
        "inverse masses must be non-negative"
    );

    let acceleration = entity.force * entity.inv_mass;
    entity.velocity += acceleration * dt;
    entity.position += entity.velocity * dt;

    let angular_acceleration = entity.torque * entity.inv_angular_mass;
    entity.angular_velocity += angular_acceleration * dt;
    entity.orientation += entity.angular_velocity * dt;

    let ahead = heading(entity.orientation);
    let forward = ahead * ahead.dot(entity.velocity);
    let side = entity.velocity - forward;

    entity.velocity = forward * entity.forward_drag.powf(dt) + side * entity.side_drag.powf(dt);
    entity.angular_velocity *= entity.angular_drag.powf(dt);
}
