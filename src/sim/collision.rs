//! Pairwise contact detection and impulse response
//!
//! A caller entity is tested against every other live entity. Two outcomes are
//! possible per candidate:
//! - projectile impact: a non-projectile caller struck by a projectile is
//!   destroyed and thrown past the despawn bound
//! - rigid contact: both bodies are pushed apart and exchange equal and
//!   opposite impulses along the contact normal and tangent
//!
//! Impulses treat both bodies as unit mass; inverse mass is only honored by
//! the integrator.

use glam::Vec3;

use super::entity::{Entity, pair_mut};
use crate::tuning::{ContactProfile, ContactTuning};
use crate::{direction_or, tangent_of};

/// What a resolver pass did to its caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactSummary {
    /// Number of rigid contacts resolved
    pub contacts: u32,
    /// Caller was struck by a projectile
    pub struck: bool,
}

/// Contact rules for one kind of caller
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub profile: ContactProfile,
    pub thresholds: &'a ContactTuning,
    /// Where a struck caller is sent
    pub impact_relocation: Vec3,
    /// Skip projectile candidates entirely (avatar rule)
    pub ignore_ammo: bool,
}

impl Resolver<'_> {
    /// Resolve every contact of `entities[index]` against the rest
    pub fn resolve(&self, entities: &mut [Entity], index: usize, dt: f32) -> ContactSummary {
        let mut summary = ContactSummary::default();

        for other in 0..entities.len() {
            if other == index {
                continue;
            }
            let (caller, candidate) = pair_mut(entities, index, other);
            if candidate.destroyed || (self.ignore_ammo && candidate.is_ammo()) {
                continue;
            }

            let diff = caller.position - candidate.position;
            let dist2 = diff.dot(diff);
            if dist2 >= self.thresholds.contact_radius_sq {
                continue;
            }

            if candidate.is_ammo() {
                if caller.is_ammo() {
                    continue;
                }
                if dist2 < self.thresholds.impact_radius_sq {
                    log::debug!("{:?} struck by projectile {:?}", caller.id, candidate.id);
                    caller.destroyed = true;
                    caller.collision = false;
                    caller.position = self.impact_relocation;
                    summary.struck = true;
                    return summary;
                }
                continue;
            }

            resolve_pair(caller, candidate, dt, &self.profile, self.thresholds.min_separation);
            caller.collision = true;
            summary.contacts += 1;
        }

        summary
    }
}

/// Rigid contact between two bodies
///
/// Separates them by `dt` along the normal, then applies the normal
/// (restitution) and tangential (friction) impulses. The friction impulse
/// adds the same angular velocity increment to both bodies.
pub fn resolve_pair(
    a: &mut Entity,
    b: &mut Entity,
    dt: f32,
    profile: &ContactProfile,
    min_separation: f32,
) {
    let diff = a.position - b.position;
    let normal = direction_or(Vec3::new(diff.x, diff.y, 0.0), min_separation, Vec3::X);
    let tangent = tangent_of(normal);

    a.position += normal * dt;
    b.position -= normal * dt;

    let spin = -(a.angular_velocity + b.angular_velocity) * profile.spin_coupling;
    let relative = a.velocity - b.velocity + tangent * spin;

    let impulse = normal.dot(relative) / 2.0 * (1.0 + profile.restitution);
    let friction = tangent.dot(relative) / 2.0 * profile.friction;

    a.velocity -= normal * impulse + tangent * friction;
    b.velocity += normal * impulse + tangent * friction;

    a.angular_velocity += friction;
    b.angular_velocity += friction;
}
