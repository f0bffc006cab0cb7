//! Spawn, destroy, respawn and despawn passes
//!
//! Each pass runs to completion over the live collections. Spawns are appended
//! outside of any iteration and removals only happen in the final sweep.

use glam::Vec3;

use super::entity::{Behavior, Entity};
use super::explosion::Explosion;
use super::state::SimState;
use super::tick::TickInput;
use crate::{heading, wrap_coordinate};

impl SimState {
    /// Wrap live non-projectiles across the ±wrap bound, per axis
    pub fn wrap_borders(&mut self) {
        let bound = self.tuning.world.wrap_bound;
        for entity in self.entities.iter_mut() {
            if entity.is_ammo() || entity.destroyed {
                continue;
            }
            entity.position.x = wrap_coordinate(entity.position.x, bound);
            entity.position.y = wrap_coordinate(entity.position.y, bound);
        }
    }

    /// Schedule a respawn on a rising respawn edge while the avatar is down
    pub fn latch_respawn(&mut self, input: &TickInput) {
        if input.respawn && !self.last_respawn_input && self.avatar_destroyed() {
            self.respawn_pending = true;
        }
    }

    /// Schedule a shot on a rising fire edge once the cooldown has elapsed
    pub fn latch_fire(&mut self, input: &TickInput, now_ms: u64) {
        if !input.fire || self.last_fire_input {
            return;
        }
        let cooled = match self.last_fire_ms {
            Some(last) => SimState::seconds_between(last, now_ms) >= self.tuning.ammo.fire_cooldown,
            None => true,
        };
        if cooled {
            self.fire_pending = true;
        }
    }

    /// Put the avatar back on the spawn point at rest
    pub fn apply_respawn(&mut self) {
        if !self.respawn_pending {
            return;
        }
        self.respawn_pending = false;

        let spawn = self.tuning.avatar.spawn_point.extend(0.0);
        match self.avatar_mut() {
            Some(avatar) => {
                avatar.velocity = Vec3::ZERO;
                avatar.angular_velocity = 0.0;
                avatar.orientation = 0.0;
                avatar.position = spawn;
                avatar.destroyed = false;
                log::info!("Avatar respawned at {spawn}");
            }
            None => log::warn!("Respawn requested but the avatar is gone"),
        }
    }

    /// Launch a projectile from the avatar, inheriting its velocity
    pub fn apply_fire(&mut self, now_ms: u64) {
        if !self.fire_pending {
            return;
        }
        self.fire_pending = false;

        let Some(avatar) = self.avatar() else {
            log::warn!("Fire requested but the avatar is gone");
            return;
        };
        let ammo_tuning = &self.tuning.ammo;
        let velocity = heading(avatar.orientation) * ammo_tuning.muzzle_speed + avatar.velocity;
        let mut ammo = Entity::new(avatar.id, Behavior::Ammo)
            .at(avatar.position)
            .moving(velocity, 0.0)
            .with_scale(Vec3::new(ammo_tuning.scale, ammo_tuning.scale, 0.0));
        ammo.orientation = avatar.orientation;

        let id = self.insert(ammo);
        self.last_fire_ms = Some(now_ms);
        self.shots_fired += 1;
        log::debug!("Fired {id:?} with velocity {velocity}");
    }

    /// Turn pending collision flags into explosions, then park or recycle
    ///
    /// Entities are handled in collection order and recycle around the
    /// avatar's position at that moment, so a rock flagged in the same pass
    /// as the avatar lands near the parking spot. Returns the number of
    /// explosions spawned.
    pub fn consume_collisions(&mut self, now_ms: u64) -> usize {
        let parking = self.tuning.world.avatar_parking.extend(0.0);
        let scale = self.tuning.explosion.scale;
        let mut booms = Vec::new();

        for index in 0..self.entities.len() {
            if !self.entities[index].collision {
                continue;
            }
            booms.push(self.entities[index].position);

            let avatar_position = self.avatar().map_or(Vec3::ZERO, |a| a.position);
            // Draw before borrowing the entity
            let sign = self.random_sign();
            let velocity = self.random_velocity(self.tuning.asteroids.speed_range);
            let spin = self.random_symmetric(self.tuning.asteroids.spin_range);
            let offset = self.tuning.asteroids.recycle_offset * sign;
            let modulus = self.tuning.asteroids.recycle_modulus;

            let entity = &mut self.entities[index];
            entity.clear_forces();
            entity.collision = false;

            if entity.is_avatar() {
                entity.position = parking;
                entity.destroyed = true;
                log::info!("Avatar destroyed");
            } else {
                entity.position.x = (avatar_position.x + offset) % modulus;
                entity.position.y = (avatar_position.y + offset) % modulus;
                entity.velocity = velocity;
                entity.angular_velocity = spin;
                log::debug!("Recycled {:?} to {}", entity.id, entity.position);
            }
        }

        let spawned = booms.len();
        for position in booms {
            let id = self.next_entity_id();
            let boom = Entity::new(id, Behavior::Explosion(Explosion::new(now_ms)))
                .at(position)
                .with_scale(Vec3::new(scale, scale, 0.0));
            self.explosions.push(boom);
        }
        spawned
    }

    /// Drop finished effects and anything beyond the ±despawn bound
    ///
    /// Returns the number of primary entities removed.
    pub fn despawn_sweep(&mut self) -> usize {
        self.explosions.retain(|boom| !boom.is_finished_effect());

        let bound = self.tuning.world.despawn_bound;
        let before = self.entities.len();
        self.entities.retain(|e| {
            let p = e.position;
            !(p.x < -bound || p.x > bound || p.y < -bound || p.y > bound)
        });
        let removed = before - self.entities.len();
        if removed > 0 {
            log::trace!("Despawned {removed} entities");
        }
        removed
    }

    /// Remember this tick's edge inputs and timestamp
    pub fn end_frame(&mut self, input: &TickInput, now_ms: u64) {
        self.last_respawn_input = input.respawn;
        self.last_fire_input = input.fire;
        self.last_frame_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use crate::tuning::Tuning;

    fn empty_field() -> SimState {
        SimState::with_avatar_only(Tuning::default(), 0).expect("valid tuning")
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_wrap_borders() {
        let mut state = empty_field();
        let left = state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(-50.0001, 10.0, 0.0)));
        let right = state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(50.0001, -50.5, 0.0)));
        let shot = state.insert(Entity::new(EntityId(0), Behavior::Ammo).at(Vec3::new(-50.0001, 0.0, 0.0)));
        state.wrap_borders();

        let pos = |id| crate::sim::entity::find(&state.entities, id).map(|e| e.position);
        assert_eq!(pos(left), Some(Vec3::new(50.0, 10.0, 0.0)));
        assert_eq!(pos(right), Some(Vec3::new(-50.0, 50.0, 0.0)));
        assert_eq!(pos(shot), Some(Vec3::new(-50.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_wrap_skips_destroyed() {
        let mut state = empty_field();
        let avatar = state.avatar_mut().expect("avatar");
        avatar.destroyed = true;
        avatar.position = Vec3::new(-60.0, -60.0, 0.0);
        state.wrap_borders();
        assert_eq!(state.avatar().map(|a| a.position), Some(Vec3::new(-60.0, -60.0, 0.0)));
    }

    #[test]
    fn test_respawn_needs_destroyed_avatar() {
        let mut state = empty_field();
        let input = TickInput {
            respawn: true,
            ..Default::default()
        };
        state.latch_respawn(&input);
        assert!(!state.respawn_pending);
    }

    #[test]
    fn test_respawn_resets_avatar() {
        let mut state = empty_field();
        {
            let avatar = state.avatar_mut().expect("avatar");
            avatar.destroyed = true;
            avatar.position = Vec3::new(-60.0, -60.0, 0.0);
            avatar.velocity = Vec3::new(3.0, 1.0, 0.0);
            avatar.angular_velocity = 2.0;
            avatar.orientation = 1.2;
        }
        let input = TickInput {
            respawn: true,
            ..Default::default()
        };
        state.latch_respawn(&input);
        state.apply_respawn();

        let avatar = state.avatar().expect("avatar");
        assert!(!avatar.destroyed);
        assert_eq!(avatar.position, Vec3::new(-49.0, -49.0, 0.0));
        assert_eq!(avatar.velocity, Vec3::ZERO);
        assert_eq!(avatar.angular_velocity, 0.0);
        assert_eq!(avatar.orientation, 0.0);
        assert!(!state.respawn_pending);
    }

    #[test]
    fn test_fire_requires_rising_edge() {
        let mut state = empty_field();
        state.last_fire_input = true;
        state.latch_fire(&fire(), 10_000);
        assert!(!state.fire_pending);
    }

    #[test]
    fn test_fire_spawns_projectile() {
        let mut state = empty_field();
        if let Some(avatar) = state.avatar_mut() {
            avatar.velocity = Vec3::new(1.0, 2.0, 0.0);
            avatar.orientation = std::f32::consts::FRAC_PI_2;
        }
        state.latch_fire(&fire(), 500);
        state.apply_fire(500);

        assert_eq!(state.entities.len(), 2);
        let shot = &state.entities[1];
        assert!(shot.is_ammo());
        assert_eq!(shot.position, Vec3::new(-49.0, -49.0, 0.0));
        assert!((shot.velocity - Vec3::new(1.0, 17.0, 0.0)).length() < 1e-4);
        assert_eq!(shot.orientation, std::f32::consts::FRAC_PI_2);
        assert_eq!(shot.scale, Vec3::new(0.3, 0.3, 0.0));
        assert_ne!(shot.id, state.avatar_id);
        assert_eq!(state.last_fire_ms, Some(500));
        assert!(!state.fire_pending);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut state = empty_field();
        state.latch_fire(&fire(), 1_000);
        state.apply_fire(1_000);
        state.end_frame(&TickInput::default(), 1_000);

        // 1.0s later: still cooling down
        state.latch_fire(&fire(), 2_000);
        assert!(!state.fire_pending);
        state.end_frame(&TickInput::default(), 2_000);

        // 2.0s after the first shot
        state.latch_fire(&fire(), 3_000);
        assert!(state.fire_pending);
    }

    #[test]
    fn test_fire_cooldown_is_inclusive() {
        let mut state = empty_field();
        state.latch_fire(&fire(), 1_000);
        state.apply_fire(1_000);
        state.end_frame(&TickInput::default(), 1_000);

        // Exactly 1.5s later
        state.latch_fire(&fire(), 2_500);
        assert!(state.fire_pending);
    }

    #[test]
    fn test_avatar_collision_parks_and_explodes() {
        let mut state = empty_field();
        if let Some(avatar) = state.avatar_mut() {
            avatar.collision = true;
            avatar.thrust = 4.0;
            avatar.torque = 4.0;
            avatar.force = Vec3::X;
        }
        let spawned = state.consume_collisions(1_234);

        assert_eq!(spawned, 1);
        let avatar = state.avatar().expect("avatar");
        assert!(avatar.destroyed);
        assert!(!avatar.collision);
        assert_eq!(avatar.position, Vec3::new(-60.0, -60.0, 0.0));
        assert_eq!(avatar.force, Vec3::ZERO);
        assert_eq!(avatar.torque, 0.0);
        assert_eq!(avatar.thrust, 0.0);

        let boom = &state.explosions[0];
        assert_eq!(boom.position, Vec3::new(-49.0, -49.0, 0.0));
        assert_eq!(boom.explosion().map(|e| e.spawn_ms), Some(1_234));

        // Parked avatar survives the sweep
        state.despawn_sweep();
        assert!(state.avatar().is_some());
    }

    #[test]
    fn test_asteroid_collision_recycles_near_avatar() {
        let mut state = empty_field();
        let id = state.insert(
            Entity::new(EntityId(0), Behavior::Asteroid)
                .at(Vec3::new(20.0, 20.0, 0.0))
                .moving(Vec3::new(100.0, 100.0, 0.0), 50.0),
        );
        if let Some(rock) = crate::sim::entity::find_mut(&mut state.entities, id) {
            rock.collision = true;
        }
        state.consume_collisions(0);

        let rock = crate::sim::entity::find(&state.entities, id).expect("recycled, not removed");
        assert!(!rock.destroyed);
        assert!(!rock.collision);
        // -49 ± 15, remainder 50
        let expected = [-34.0, -14.0];
        assert!(expected.iter().any(|&x| (rock.position.x - x).abs() < 1e-4));
        assert_eq!(rock.position.x, rock.position.y);
        assert!(rock.velocity.x.abs() <= 5.0 && rock.velocity.y.abs() <= 5.0);
        assert!(rock.angular_velocity.abs() <= 2.0);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].position, Vec3::new(20.0, 20.0, 0.0));
    }

    #[test]
    fn test_same_pass_rock_recycles_near_parked_avatar() {
        let mut state = empty_field();
        if let Some(avatar) = state.avatar_mut() {
            avatar.position = Vec3::new(10.0, 10.0, 0.0);
            avatar.collision = true;
        }
        let id = state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(11.0, 10.0, 0.0)));
        if let Some(rock) = crate::sim::entity::find_mut(&mut state.entities, id) {
            rock.collision = true;
        }
        assert_eq!(state.consume_collisions(0), 2);

        // Avatar is handled first, so the rock uses (-60 ± 15) % 50
        let rock = crate::sim::entity::find(&state.entities, id).expect("recycled");
        let expected = [-45.0, -25.0];
        assert!(expected.iter().any(|&x| (rock.position.x - x).abs() < 1e-4));
        assert_eq!(rock.position.x, rock.position.y);
        assert_eq!(state.explosions[0].position, Vec3::new(10.0, 10.0, 0.0));
        assert_eq!(state.explosions[1].position, Vec3::new(11.0, 10.0, 0.0));
    }

    #[test]
    fn test_despawn_sweep() {
        let mut state = empty_field();
        state.insert(Entity::new(EntityId(0), Behavior::Ammo).at(Vec3::new(60.5, 0.0, 0.0)));
        state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(0.0, -70.0, 0.0)));
        let kept = state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(59.0, -60.0, 0.0)));

        let mut done = Explosion::new(0);
        done.finished = true;
        state.explosions.push(Entity::new(EntityId(90), Behavior::Explosion(done)));
        state.explosions.push(Entity::new(EntityId(91), Behavior::Explosion(Explosion::new(0))));

        let removed = state.despawn_sweep();
        assert_eq!(removed, 2);
        assert_eq!(state.entities.len(), 2);
        assert!(crate::sim::entity::find(&state.entities, kept).is_some());
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].id, EntityId(91));
    }
}
