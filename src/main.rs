//! Space Raider entry point
//!
//! Runs a scripted headless session on a manual 60 Hz clock and logs a
//! summary. Usage: `space-raider [tuning.json] [frames]`.

use space_raider::platform::{Clock, ManualClock};
use space_raider::renderer::{FollowCamera, HeadlessRenderer};
use space_raider::sim::{SimState, TickInput, tick};
use space_raider::{ConfigError, Tuning};

/// Milliseconds per frame at ~60 Hz
const FRAME_MS: u64 = 16;
const DEFAULT_FRAMES: u64 = 3_600;

/// Scripted pilot: always thrusting, weaving, firing every second
fn scripted_input(frame: u64, avatar_down: bool) -> TickInput {
    let phase = frame % 240;
    TickInput {
        thrust_forward: true,
        turn_left: phase < 40,
        turn_right: (120..160).contains(&phase),
        fire: frame % 60 == 0,
        respawn: avatar_down && frame % 30 == 0,
        ..Default::default()
    }
}

fn main() -> Result<(), ConfigError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid(format!("frame count {raw:?}: {e}")))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Space Raider headless session: {frames} frames");

    let mut clock = ManualClock::starting_at(0);
    let mut state = SimState::new(tuning, clock.now_ms())?;
    let mut camera = FollowCamera::default();
    let mut renderer = HeadlessRenderer::new();

    let mut deaths = 0u32;
    let mut explosions = 0usize;
    let mut despawned = 0usize;

    for frame in 0..frames {
        let now = clock.advance(FRAME_MS);
        let input = scripted_input(frame, state.avatar_destroyed());
        renderer.clear();

        let was_down = state.avatar_destroyed();
        let report = tick(&mut state, &input, now, &mut camera, &mut renderer);
        if !was_down && state.avatar_destroyed() {
            deaths += 1;
        }
        explosions += report.explosions_spawned;
        despawned += report.despawned;

        if frame % 600 == 0 {
            log::info!(
                "t={:.1}s entities={} explosions={} draws={}",
                report.t,
                state.entities.len(),
                state.explosions.len(),
                renderer.calls.len()
            );
        }
    }

    log::info!(
        "Session over: {} shots, {} explosions, {} deaths, {} despawned, {} draw calls",
        state.shots_fired,
        explosions,
        deaths,
        despawned,
        renderer.total
    );
    Ok(())
}
