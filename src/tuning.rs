//! Data-driven game balance
//!
//! Every gameplay constant lives here so a session can be retuned from a JSON
//! file without touching the simulation. Missing fields fall back to defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a tuning file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Impulse response parameters used by one kind of collision caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactProfile {
    /// Bounce elasticity for the normal impulse
    pub restitution: f32,
    /// Friction coefficient for the tangential impulse
    pub friction: f32,
    /// Angular velocity to surface speed coupling, applied to both bodies
    pub spin_coupling: f32,
}

/// World boundaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Border-wrap bound (±) for non-projectiles
    pub wrap_bound: f32,
    /// Hard despawn bound (±), must be strictly outside `wrap_bound`
    pub despawn_bound: f32,
    /// Where a destroyed avatar waits (inside the despawn bound)
    pub avatar_parking: Vec2,
    /// Where a projectile-struck entity is sent (outside the despawn bound)
    pub impact_relocation: Vec2,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            wrap_bound: 50.0,
            despawn_bound: 60.0,
            avatar_parking: Vec2::new(-60.0, -60.0),
            impact_relocation: Vec2::new(-70.0, -70.0),
        }
    }
}

/// Player craft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarTuning {
    pub spawn_point: Vec2,
    /// Thrust magnitude for forward/back input
    pub thrust: f32,
    /// Torque magnitude for left/right input
    pub turn_torque: f32,
    pub forward_drag: f32,
    pub side_drag: f32,
    pub angular_drag: f32,
    pub contact: ContactProfile,
}

impl Default for AvatarTuning {
    fn default() -> Self {
        Self {
            spawn_point: Vec2::new(-49.0, -49.0),
            thrust: 4.0,
            turn_torque: 4.0,
            forward_drag: 0.7,
            side_drag: 0.05,
            angular_drag: 0.1,
            contact: ContactProfile {
                restitution: 0.8,
                friction: 0.5,
                spin_coupling: 1.5,
            },
        }
    }
}

/// Asteroid field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    /// Asteroids created at simulation start
    pub count: usize,
    pub spawn_min: Vec2,
    pub spawn_max: Vec2,
    /// Velocity components are drawn from ±speed_range
    pub speed_range: f32,
    /// Angular velocity is drawn from ±spin_range
    pub spin_range: f32,
    /// Per-axis offset from the avatar when recycling after a collision
    pub recycle_offset: f32,
    /// Remainder modulus applied to recycled coordinates
    pub recycle_modulus: f32,
    pub contact: ContactProfile,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            count: 100,
            spawn_min: Vec2::new(-40.0, -40.0),
            spawn_max: Vec2::new(50.0, 50.0),
            speed_range: 5.0,
            spin_range: 2.0,
            recycle_offset: 15.0,
            recycle_modulus: 50.0,
            contact: ContactProfile {
                restitution: 0.7,
                friction: 0.5,
                spin_coupling: 1.75,
            },
        }
    }
}

/// Projectiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmoTuning {
    pub muzzle_speed: f32,
    /// Seconds that must elapse between shots
    pub fire_cooldown: f32,
    pub scale: f32,
}

impl Default for AmmoTuning {
    fn default() -> Self {
        Self {
            muzzle_speed: 15.0,
            fire_cooldown: 1.5,
            scale: 0.3,
        }
    }
}

/// Pairwise contact thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    /// Squared distance under which two bodies touch
    pub contact_radius_sq: f32,
    /// Squared distance under which a projectile strikes
    pub impact_radius_sq: f32,
    /// Separation below which the contact normal falls back to +X
    pub min_separation: f32,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            contact_radius_sq: 3.5,
            impact_radius_sq: 1.5,
            min_separation: 1e-6,
        }
    }
}

/// Explosion sprite animation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    /// Logical frames per second
    pub anim_speed: f32,
    /// Row advance factor relative to the column advance
    pub size_factor: f32,
    /// Total logical frames; the effect ends on the last one
    pub frame_count: u32,
    /// Sprite sheet is `grid × grid`
    pub grid: u32,
    pub scale: f32,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self {
            anim_speed: 36.0,
            size_factor: 1.0 / 6.0,
            frame_count: 36,
            grid: 6,
            scale: 1.5,
        }
    }
}

/// Afterburner flame attachments (local to the avatar)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameTuning {
    pub left_offset: Vec2,
    pub left_scale: Vec2,
    pub right_offset: Vec2,
    pub right_scale: Vec2,
}

impl Default for FlameTuning {
    fn default() -> Self {
        Self {
            left_offset: Vec2::new(-1.65, 0.48),
            left_scale: Vec2::new(-0.8, -0.25),
            right_offset: Vec2::new(-1.65, -0.48),
            right_scale: Vec2::new(-0.8, 0.25),
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// RNG seed for the asteroid field and recycling
    pub seed: u64,
    pub world: WorldTuning,
    pub avatar: AvatarTuning,
    pub asteroids: AsteroidTuning,
    pub ammo: AmmoTuning,
    pub contact: ContactTuning,
    pub explosion: ExplosionTuning,
    pub flames: FlameTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x5eed_cafe,
            world: WorldTuning::default(),
            avatar: AvatarTuning::default(),
            asteroids: AsteroidTuning::default(),
            ammo: AmmoTuning::default(),
            contact: ContactTuning::default(),
            explosion: ExplosionTuning::default(),
            flames: FlameTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if !(world.wrap_bound > 0.0 && world.wrap_bound < world.despawn_bound) {
            return Err(ConfigError::Invalid(format!(
                "wrap bound {} must be positive and strictly inside despawn bound {}",
                world.wrap_bound, world.despawn_bound
            )));
        }
        if !self.within_despawn(world.avatar_parking) {
            return Err(ConfigError::Invalid(format!(
                "avatar parking spot {} lies outside the despawn bound",
                world.avatar_parking
            )));
        }
        if self.within_despawn(world.impact_relocation) {
            return Err(ConfigError::Invalid(format!(
                "impact relocation spot {} must lie outside the despawn bound",
                world.impact_relocation
            )));
        }
        if self.ammo.fire_cooldown <= 0.0 {
            return Err(ConfigError::Invalid("fire cooldown must be positive".into()));
        }
        if self.explosion.anim_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "explosion animation speed must be positive".into(),
            ));
        }
        if self.explosion.grid == 0 || self.explosion.frame_count == 0 {
            return Err(ConfigError::Invalid(
                "explosion grid and frame count must be non-zero".into(),
            ));
        }
        if self.contact.impact_radius_sq > self.contact.contact_radius_sq {
            return Err(ConfigError::Invalid(
                "impact radius must not exceed contact radius".into(),
            ));
        }
        Ok(())
    }

    /// Whether a point survives the despawn sweep
    pub fn within_despawn(&self, p: Vec2) -> bool {
        let b = self.world.despawn_bound;
        !(p.x < -b || p.x > b || p.y < -b || p.y > b)
    }
}
