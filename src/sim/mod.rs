//! Simulation module
//!
//! All gameplay logic lives here. The module has no rendering or platform
//! dependencies:
//! - Time arrives as host timestamps; `dt` may vary from frame to frame
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - Rendering is reached only through the `renderer` traits

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod explosion;
pub mod integrate;
pub mod lifecycle;
pub mod state;
pub mod tick;

pub use behavior::Frame;
pub use collision::{ContactSummary, Resolver, resolve_pair};
pub use entity::{Behavior, Entity, EntityId};
pub use explosion::Explosion;
pub use integrate::integrate;
pub use state::{Burner, BurnerSide, SimState};
pub use tick::{TickInput, TickReport, tick};
