//! Coil Engine -- grid Snake on top of [`coil_ecs`].
//!
//! This crate owns everything above the entity store: the spatial [`Grid`](grid::Grid),
//! the gameplay systems, the [`World`](world::World) with its snake and game
//! state, the [`EventSystem`](events::EventSystem) that turns collision
//! contacts into state transitions, and the fixed-rate [`TickLoop`](tick::TickLoop)
//! that drives them in order. Drawing goes through the [`Canvas`](canvas::Canvas)
//! trait; the wgpu window lives behind the `renderer` feature.
//!
//! # Quick Start
//!
//! ```
//! use coil_engine::prelude::*;
//!
//! let config = GameConfig { seed: Some(7), ..GameConfig::default() };
//! let mut game = Game::new(config).unwrap();
//!
//! for _ in 0..5 {
//!     game.tick().unwrap();
//! }
//! assert_eq!(game.tick_count(), 5);
//! assert_eq!(game.world().state().status, GameStatus::InGame);
//! ```

#![deny(unsafe_code)]

pub mod archetype;
pub mod canvas;
pub mod config;
pub mod events;
pub mod game;
pub mod grid;
pub mod hud;
pub mod input;
pub mod render;
pub mod snake;
pub mod state;
pub mod systems;
pub mod tick;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use coil_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that escape a tick or a world (re)build.
///
/// Collisions, defeat and reset are ordinary state transitions and never
/// show up here. Anything in this enum indicates a bug or a bad config.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Ecs(#[from] coil_ecs::EcsError),

    #[error(transparent)]
    Grid(#[from] grid::GridError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("failed to serialize world state: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use coil_ecs::prelude::*;

    pub use crate::canvas::{Anchor, Canvas, DrawCommand, DrawList};
    pub use crate::config::{ConfigError, GameConfig};
    pub use crate::events::EventSystem;
    pub use crate::game::Game;
    pub use crate::grid::{Grid, GridError};
    pub use crate::input::{Key, KeyboardInput};
    pub use crate::snake::Snake;
    pub use crate::state::{GameState, GameStatus};
    pub use crate::systems::collision::{Contact, OverlapMode};
    pub use crate::systems::SystemContext;
    pub use crate::tick::{SystemFn, TickDiagnostics, TickLoop, TickSchedule};
    pub use crate::world::World;
    pub use crate::GameError;
}
