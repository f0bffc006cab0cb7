//! Renderer that records draw calls instead of issuing them
//!
//! Used by the headless binary and by tests that check what a frame submits.

use super::{Camera, Drawable, Renderer};
use crate::sim::entity::EntityId;
use crate::sim::state::BurnerSide;

/// One recorded submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Entity(EntityId),
    Explosion { id: EntityId, cell: (u32, u32) },
    Flame(BurnerSide),
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    /// Calls recorded since the last `clear`
    pub calls: Vec<DrawCall>,
    /// Calls recorded over the whole session
    pub total: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn entity_draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Entity(_)))
            .count()
    }

    pub fn explosion_draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Explosion { .. }))
            .count()
    }

    pub fn flames(&self) -> Vec<BurnerSide> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Flame(side) => Some(*side),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, drawable: Drawable<'_>, _camera: &dyn Camera) {
        let call = match drawable {
            Drawable::Entity(entity) => DrawCall::Entity(entity.id),
            Drawable::Explosion(entity) => DrawCall::Explosion {
                id: entity.id,
                cell: entity.explosion().map_or((0, 0), |e| e.sprite_offset),
            },
            Drawable::Flame(burner) => DrawCall::Flame(burner.side),
        };
        self.calls.push(call);
        self.total += 1;
    }
}
