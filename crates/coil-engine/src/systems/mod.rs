//! Gameplay systems.
//!
//! Tick systems share one signature, [`SystemFn`](crate::tick::SystemFn):
//! they read the store through a [`SystemContext`], write entity changes into
//! a [`CommandBuffer`](coil_ecs::command::CommandBuffer), and may touch the
//! non-entity resources (grid, RNG, contact list) directly. Registration order
//! in [`register_tick_systems`] is the execution order.
//!
//! The keyboard and render passes run outside the tick: keyboard on every
//! frame before the tick gate, render whenever the host wants a frame.

use coil_ecs::store::EntityStore;
use rand_pcg::Pcg64;

use crate::grid::Grid;
use crate::tick::TickLoop;

pub mod ai_follow;
pub mod collision;
pub mod food_spawn;
pub mod grid_object;
pub mod keyboard;
pub mod movement;
pub mod render;

use collision::{Contact, OverlapMode};

/// What a tick system may see and touch.
///
/// The store is shared so that systems can iterate it; entity mutations are
/// queued and applied when the system returns.
pub struct SystemContext<'a> {
    pub store: &'a EntityStore,
    pub grid: &'a mut Grid,
    pub rng: &'a mut Pcg64,
    pub overlap: OverlapMode,
    /// Reactions produced this tick, consumed by the event pass.
    pub contacts: &'a mut Vec<Contact>,
}

/// Register the tick systems in execution order.
pub fn register_tick_systems(tick_loop: &mut TickLoop) {
    tick_loop.add_system(grid_object::SYSTEM_NAME, grid_object::run);
    tick_loop.add_system(food_spawn::SYSTEM_NAME, food_spawn::run);
    tick_loop.add_system(movement::SYSTEM_NAME, movement::run);
    tick_loop.add_system(ai_follow::SYSTEM_NAME, ai_follow::run);
    tick_loop.add_system(collision::SYSTEM_NAME, collision::run);
}
