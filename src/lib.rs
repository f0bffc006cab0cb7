//! Space Raider - a wraparound asteroid field arcade simulation
//!
//! Core modules:
//! - `sim`: Simulation engine (integration, collisions, behaviors, lifecycle)
//! - `renderer`: Rendering collaborator contract and a headless backend
//! - `platform`: Monotonic clock abstraction
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::{ConfigError, Tuning};

use glam::Vec3;

/// Unit heading vector for an orientation (radians), z = 0
#[inline]
pub fn heading(orientation: f32) -> Vec3 {
    Vec3::new(orientation.cos(), orientation.sin(), 0.0)
}

/// In-plane tangent of a contact normal (normal rotated +90°)
#[inline]
pub fn tangent_of(normal: Vec3) -> Vec3 {
    Vec3::new(-normal.y, normal.x, 0.0)
}

/// Normalize `v`, or return `fallback` when its length is below `min_len`
#[inline]
pub fn direction_or(v: Vec3, min_len: f32, fallback: Vec3) -> Vec3 {
    let len = v.length();
    if len < min_len || !len.is_finite() {
        fallback
    } else {
        v / len
    }
}

/// Wrap a single coordinate across a symmetric ±bound border
///
/// Crossing `-bound` reappears at `+bound` and vice versa. Values inside the
/// border are returned unchanged.
#[inline]
pub fn wrap_coordinate(value: f32, bound: f32) -> f32 {
    if value < -bound {
        bound
    } else if value > bound {
        -bound
    } else {
        value
    }
}
