//! Variable-timestep simulation tick
//!
//! One call advances the whole field by the wall time elapsed since the
//! previous call. Passes run in a fixed order and each finishes over the live
//! collections before the next begins:
//!
//! 1. border wrap
//! 2. camera follow
//! 3. respawn edge
//! 4. fire edge
//! 5. apply respawn
//! 6. apply fire
//! 7. consume collision flags
//! 8. dispatch (control, move, update)
//! 9. render submission
//! 10. despawn sweep
//! 11. remember edge inputs and timestamp

use serde::{Deserialize, Serialize};

use super::behavior::{self, Frame};
use super::entity::find;
use super::state::{BurnerSide, SimState};
use crate::renderer::{Camera, Drawable, Renderer};

/// Input snapshot for a single tick
///
/// `fire` and `respawn` act on their rising edge; the others are read every
/// tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub thrust_forward: bool,
    pub thrust_back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub fire: bool,
    pub respawn: bool,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Seconds since the first tick
    pub t: f32,
    pub respawned: bool,
    pub fired: bool,
    pub explosions_spawned: usize,
    /// Rigid contacts resolved during dispatch
    pub contacts: u32,
    /// Entities struck by projectiles during dispatch
    pub struck: u32,
    pub despawned: usize,
}

/// Advance the simulation to `now_ms`
pub fn tick(
    state: &mut SimState,
    input: &TickInput,
    now_ms: u64,
    camera: &mut dyn Camera,
    renderer: &mut dyn Renderer,
) -> TickReport {
    let frame = Frame {
        now_ms,
        t: SimState::seconds_between(state.first_frame_ms, now_ms),
        dt: SimState::seconds_between(state.last_frame_ms, now_ms),
    };
    let mut report = TickReport {
        dt: frame.dt,
        t: frame.t,
        ..Default::default()
    };

    state.wrap_borders();

    if let Some(avatar) = state.avatar().filter(|a| !a.destroyed) {
        camera.set_position(avatar.position);
    }
    camera.update();

    state.latch_respawn(input);
    state.latch_fire(input, now_ms);

    report.respawned = state.respawn_pending;
    state.apply_respawn();
    report.fired = state.fire_pending;
    state.apply_fire(now_ms);

    report.explosions_spawned = state.consume_collisions(now_ms);

    dispatch(state, &frame, input, &mut report);
    submit(state, now_ms, camera, renderer);

    report.despawned = state.despawn_sweep();
    state.end_frame(input, now_ms);
    report
}

/// Control, then move, then update every live entity in collection order
fn dispatch(state: &mut SimState, frame: &Frame, input: &TickInput, report: &mut TickReport) {
    for index in 0..state.entities.len() {
        if state.entities[index].destroyed {
            continue;
        }
        let summary = behavior::control(&mut state.entities, index, frame, input, &state.tuning);
        report.contacts += summary.contacts;
        report.struck += u32::from(summary.struck);
    }

    for entity in state.entities.iter_mut().filter(|e| !e.destroyed) {
        behavior::advance(entity, frame.dt);
    }

    for index in 0..state.entities.len() {
        if state.entities[index].destroyed {
            continue;
        }
        let parent = state.entities[index]
            .parent
            .and_then(|id| find(&state.entities, id))
            .map(|p| p.model);
        behavior::update(&mut state.entities[index], parent.as_ref(), frame.now_ms, &state.tuning);
    }
}

/// Hand entities, explosions and afterburners to the renderer
fn submit(state: &mut SimState, now_ms: u64, camera: &mut dyn Camera, renderer: &mut dyn Renderer) {
    let camera: &dyn Camera = camera;

    for entity in state.entities.iter().filter(|e| !e.destroyed) {
        renderer.draw(Drawable::Entity(entity), camera);
    }

    for boom in state.explosions.iter_mut() {
        let parent = boom
            .parent
            .and_then(|id| find(&state.entities, id))
            .map(|p| p.model);
        behavior::update(boom, parent.as_ref(), now_ms, &state.tuning);
    }
    for boom in &state.explosions {
        renderer.draw(Drawable::Explosion(boom), camera);
    }

    let Some(avatar) = state.avatar().filter(|a| !a.destroyed) else {
        return;
    };
    let avatar_model = avatar.model;
    let lit: &[BurnerSide] = if avatar.torque > 0.0 {
        &[BurnerSide::Left]
    } else if avatar.torque < 0.0 {
        &[BurnerSide::Right]
    } else if avatar.thrust > 0.0 {
        &[BurnerSide::Left, BurnerSide::Right]
    } else {
        &[]
    };

    for burner in state.burners.iter_mut().filter(|b| lit.contains(&b.side)) {
        burner.refresh_model(Some(&avatar_model));
        renderer.draw(Drawable::Flame(burner), camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Clock, ManualClock};
    use crate::renderer::{FollowCamera, HeadlessRenderer};
    use crate::sim::entity::{Behavior, Entity, EntityId};
    use crate::tuning::Tuning;
    use glam::Vec3;

    struct Harness {
        state: SimState,
        clock: ManualClock,
        camera: FollowCamera,
        renderer: HeadlessRenderer,
    }

    impl Harness {
        fn empty() -> Self {
            Self::with_state(SimState::with_avatar_only(Tuning::default(), 0).expect("valid tuning"))
        }

        fn with_state(state: SimState) -> Self {
            Self {
                state,
                clock: ManualClock::starting_at(0),
                camera: FollowCamera::default(),
                renderer: HeadlessRenderer::new(),
            }
        }

        fn step(&mut self, ms: u64, input: TickInput) -> TickReport {
            self.renderer.clear();
            let now = self.clock.advance(ms);
            tick(&mut self.state, &input, now, &mut self.camera, &mut self.renderer)
        }

        fn count_ammo(&self) -> usize {
            self.state.entities.iter().filter(|e| e.is_ammo()).count()
        }
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_dt_and_t_from_timestamps() {
        let mut h = Harness::empty();
        let first = h.step(16, TickInput::default());
        assert!((first.dt - 0.016).abs() < 1e-6);
        let second = h.step(34, TickInput::default());
        assert!((second.dt - 0.034).abs() < 1e-6);
        assert!((second.t - 0.050).abs() < 1e-6);
        assert_eq!(h.state.last_frame_ms, h.clock.now_ms());
    }

    #[test]
    fn test_new_projectile_moves_same_frame() {
        let mut h = Harness::empty();
        let report = h.step(100, fire());
        assert!(report.fired);
        let shot = h.state.entities.iter().find(|e| e.is_ammo()).expect("projectile");
        // 0.1s at 15 units/s from the spawn point
        assert!((shot.position.x - (-49.0 + 1.5)).abs() < 1e-4);
        assert!(h.renderer.calls.contains(&crate::renderer::DrawCall::Entity(shot.id)));
    }

    #[test]
    fn test_fire_cooldown_one_second() {
        let mut h = Harness::empty();
        h.step(16, fire());
        h.step(16, TickInput::default());
        // Second edge exactly 1.0s after the first shot
        h.step(984, fire());
        assert_eq!(h.count_ammo(), 1);
        assert_eq!(h.state.shots_fired, 1);
    }

    #[test]
    fn test_fire_cooldown_two_seconds() {
        let mut h = Harness::empty();
        h.step(16, fire());
        h.step(16, TickInput::default());
        h.step(1_984, fire());
        assert_eq!(h.count_ammo(), 2);
    }

    #[test]
    fn test_held_fire_does_not_repeat() {
        let mut h = Harness::empty();
        h.step(16, fire());
        h.step(2_000, fire());
        assert_eq!(h.count_ammo(), 1);
    }

    #[test]
    fn test_avatar_crash_then_respawn() {
        let mut h = Harness::empty();
        h.state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(-48.0, -49.0, 0.0)));

        // Contact flags the avatar during dispatch...
        let report = h.step(16, TickInput::default());
        assert!(report.contacts > 0);
        assert!(h.state.avatar().is_some_and(|a| a.collision));

        // ...and the next tick turns it into an explosion
        let report = h.step(16, TickInput::default());
        assert!(report.explosions_spawned >= 1);
        assert!(h.state.avatar_destroyed());
        assert!(!h.state.explosions.is_empty());
        assert!(h.renderer.explosion_draws() >= 1);
        // Only the recycled rock is drawn as an entity
        assert_eq!(h.renderer.entity_draws(), 1);
        assert!(!h.renderer.calls.contains(&crate::renderer::DrawCall::Entity(h.state.avatar_id)));

        let respawn = TickInput {
            respawn: true,
            ..Default::default()
        };
        let report = h.step(16, respawn);
        assert!(report.respawned);
        let avatar = h.state.avatar().expect("avatar");
        assert!(!avatar.destroyed);
    }

    #[test]
    fn test_respawn_ignored_while_alive() {
        let mut h = Harness::empty();
        let respawn = TickInput {
            respawn: true,
            ..Default::default()
        };
        let report = h.step(16, respawn);
        assert!(!report.respawned);
    }

    #[test]
    fn test_projectile_impact_removes_asteroid() {
        let mut h = Harness::empty();
        let rock = h.state.insert(Entity::new(EntityId(0), Behavior::Asteroid).at(Vec3::new(0.0, 0.0, 0.0)));
        let shot = h.state.insert(Entity::new(EntityId(0), Behavior::Ammo).at(Vec3::new(0.5, 0.0, 0.0)));

        let report = h.step(16, TickInput::default());
        assert_eq!(report.struck, 1);
        assert!(find(&h.state.entities, rock).is_none());
        assert!(find(&h.state.entities, shot).is_some());
    }

    #[test]
    fn test_explosion_removed_when_finished() {
        let mut h = Harness::empty();
        if let Some(avatar) = h.state.avatar_mut() {
            avatar.collision = true;
        }
        h.step(16, TickInput::default());
        assert_eq!(h.state.explosions.len(), 1);

        // Spawned at 16ms; frame 35 is 975ms later
        h.step(975, TickInput::default());
        assert!(h.state.explosions.is_empty());
    }

    #[test]
    fn test_explosion_removed_at_coarse_frame_rate() {
        let mut h = Harness::empty();
        if let Some(avatar) = h.state.avatar_mut() {
            avatar.collision = true;
        }
        // 20 Hz never samples the last sprite frame exactly
        for _ in 0..200 {
            h.step(50, TickInput::default());
        }
        assert!(h.state.explosions.is_empty());
    }

    #[test]
    fn test_camera_follows_live_avatar() {
        let mut h = Harness::empty();
        h.step(16, TickInput::default());
        assert_eq!(h.camera.position(), Vec3::new(-49.0, -49.0, 0.0));

        if let Some(avatar) = h.state.avatar_mut() {
            avatar.collision = true;
        }
        h.step(16, TickInput::default());
        assert!(h.state.avatar_destroyed());

        // Parked avatar is not followed
        h.step(16, TickInput::default());
        assert_eq!(h.camera.position(), Vec3::new(-49.0, -49.0, 0.0));
    }

    #[test]
    fn test_flames_follow_controls() {
        let mut h = Harness::empty();

        h.step(16, TickInput { turn_left: true, ..Default::default() });
        assert_eq!(h.renderer.flames(), vec![BurnerSide::Left]);

        h.step(16, TickInput { turn_right: true, thrust_forward: true, ..Default::default() });
        assert_eq!(h.renderer.flames(), vec![BurnerSide::Right]);

        h.step(16, TickInput { thrust_forward: true, ..Default::default() });
        assert_eq!(h.renderer.flames(), vec![BurnerSide::Left, BurnerSide::Right]);

        h.step(16, TickInput { thrust_back: true, ..Default::default() });
        assert!(h.renderer.flames().is_empty());
    }

    #[test]
    fn test_projectiles_leave_and_despawn() {
        let mut h = Harness::empty();
        h.step(16, fire());
        // 15 units/s from x = -49 clears x = 60 in a little over 7s
        for _ in 0..80 {
            h.step(100, TickInput::default());
        }
        assert_eq!(h.count_ammo(), 0);
        assert!(h.state.avatar().is_some());
    }

    #[test]
    fn test_full_field_is_deterministic() {
        let mut a = Harness::with_state(SimState::new(Tuning::default(), 0).expect("valid tuning"));
        let mut b = Harness::with_state(SimState::new(Tuning::default(), 0).expect("valid tuning"));
        let script = [
            TickInput { thrust_forward: true, ..Default::default() },
            TickInput { turn_left: true, fire: true, ..Default::default() },
            TickInput::default(),
            TickInput { turn_right: true, ..Default::default() },
        ];
        for _ in 0..30 {
            for input in &script {
                a.step(16, *input);
                b.step(16, *input);
            }
        }
        assert_eq!(a.state.entities.len(), b.state.entities.len());
        for (x, y) in a.state.entities.iter().zip(&b.state.entities) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.position, y.position);
        }
        for e in &a.state.entities {
            assert!(e.position.is_finite());
            assert!(e.velocity.is_finite());
        }
    }
}
