//! Rendering collaborator contract
//!
//! The simulation never touches GPU resources. During render submission it
//! hands read-only [`Drawable`]s and the active [`Camera`] to a [`Renderer`]
//! implementation supplied by the host.

pub mod headless;

pub use headless::{DrawCall, HeadlessRenderer};

use glam::{Mat4, Vec3};

use crate::sim::entity::Entity;
use crate::sim::state::Burner;

/// Something the renderer is asked to draw this frame
#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    /// Avatar, asteroid or projectile
    Entity(&'a Entity),
    /// Explosion effect with its current sprite cell
    Explosion(&'a Entity),
    /// Afterburner attached to the avatar
    Flame(&'a Burner),
}

/// View into the world
pub trait Camera {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Recompute view matrices after a move
    fn update(&mut self);
}

/// Draw submission backend
pub trait Renderer {
    fn draw(&mut self, drawable: Drawable<'_>, camera: &dyn Camera);
}

/// Orthographic camera that tracks a target position
#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub position: Vec3,
    /// Half of the visible world height
    pub half_height: f32,
    pub aspect: f32,
    pub view_proj: Mat4,
}

impl FollowCamera {
    pub fn new(half_height: f32, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            half_height,
            aspect,
            view_proj: Mat4::IDENTITY,
        };
        camera.update();
        camera
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update();
    }
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::new(20.0, 16.0 / 9.0)
    }
}

impl Camera for FollowCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn update(&mut self) {
        let half_width = self.half_height * self.aspect;
        let projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -self.half_height,
            self.half_height,
            -1.0,
            1.0,
        );
        let view = Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));
        self.view_proj = projection * view;
    }
}
