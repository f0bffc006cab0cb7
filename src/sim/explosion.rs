//! Sprite-sheet explosion effect
//!
//! Explosions do not take part in physics or collisions. Each render pass
//! advances the animation from the wall time elapsed since spawn; the effect
//! is swept once it reaches its last logical frame.

use serde::{Deserialize, Serialize};

use crate::tuning::ExplosionTuning;

/// Animation state carried by an explosion entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Timestamp (ms) at which the effect was spawned
    pub spawn_ms: u64,
    /// Current logical frame, `0..frame_count`
    pub phase: u32,
    /// Sprite sheet cell as (column, row)
    pub sprite_offset: (u32, u32),
    /// Latched once the last frame has been shown
    pub finished: bool,
}

impl Explosion {
    pub fn new(spawn_ms: u64) -> Self {
        Self {
            spawn_ms,
            phase: 0,
            sprite_offset: (0, 0),
            finished: false,
        }
    }

    /// Advance the animation to `now_ms`
    ///
    /// The finish check uses the unwrapped frame count, so a long frame gap
    /// that jumps past the last frame still ends the effect.
    pub fn animate(&mut self, now_ms: u64, tuning: &ExplosionTuning) {
        let elapsed = now_ms.saturating_sub(self.spawn_ms) as f32 / 1000.0;
        let frames = (elapsed * tuning.anim_speed).floor() as u32;
        let rows = (elapsed * tuning.anim_speed * tuning.size_factor).floor() as u32;

        self.phase = frames % tuning.frame_count;
        self.sprite_offset = (frames % tuning.grid, rows % tuning.grid);

        if frames >= tuning.frame_count - 1 {
            self.finished = true;
        }
    }
}
