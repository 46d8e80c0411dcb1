//! Coil ECS -- entity/component store with a fixed component set.
//!
//! Entities are generational handles ([`entity::EntityId`]) owning a small
//! fixed-size table with one slot per [`component::ComponentKind`]. Systems
//! read through statically typed tuple queries and write either directly
//! between passes or through a [`command::CommandBuffer`] applied in FIFO
//! order.
//!
//! # Quick Start
//!
//! ```
//! use coil_ecs::prelude::*;
//!
//! let mut store = EntityStore::new();
//! let head = store.spawn(
//!     EntityKind::Snake,
//!     ComponentBundle::new()
//!         .with(Transform::square(100, 100, 20).unwrap())
//!         .with(PhysicsBody::new().with_direction(1, 0))
//!         .with(PlayerController),
//! );
//!
//! let (id, (t, body)) = store.query::<(&Transform, &PhysicsBody)>().next().unwrap();
//! assert_eq!(id, head);
//! assert_eq!((t.x, body.direction()), (100, (1, 0)));
//! ```

#![deny(unsafe_code)]

pub mod command;
pub mod component;
pub mod entity;
pub mod query;
pub mod store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (stale generation or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// A transform was built with a non-positive extent.
    #[error("transform extent must be positive, got {width}x{height}")]
    InvalidExtent { width: i32, height: i32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::command::{ApplyReport, Command, CommandBuffer, CommandKind};
    pub use crate::component::{
        AiFollow, Color, Component, ComponentKind, ComponentTable, ComponentType, EntityKind,
        PhysicsBody, PlayerController, Reaction, Sprite, Transform,
    };
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::query::{Query, QueryItem, QueryIter};
    pub use crate::store::{ComponentBundle, EntityStore};
    pub use crate::EcsError;
}
