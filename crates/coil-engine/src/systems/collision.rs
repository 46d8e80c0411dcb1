//! Sweep-and-prune collision detection.
//!
//! # Broad phase
//!
//! Every entity with a `PhysicsBody` and a `Transform` becomes a
//! [`Collider`]. Colliders are stable-sorted by `x` and walked once; a new
//! group starts whenever a collider's x-interval does not touch the previous
//! collider's. Touching counts, so a run of adjacent grid cells lands in one
//! group while a gap of one empty column splits it. Singleton groups are
//! dropped.
//!
//! # Narrow phase
//!
//! Within a group each unordered pair is tested on both axes with the
//! configured [`OverlapMode`]. On a hit each side looks up the reactions its
//! body registered for the other side's [`EntityKind`] and emits a
//! [`Contact`] per reaction. Contacts are only collected here; the event pass
//! applies them after the tick's systems have run.

use std::ops::Range;

use coil_ecs::command::CommandBuffer;
use coil_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::SystemContext;
use crate::GameError;

pub const SYSTEM_NAME: &str = "collision";

// ---------------------------------------------------------------------------
// OverlapMode
// ---------------------------------------------------------------------------

/// The interval test used by the narrow phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Intervals collide only when both edges coincide. Exact for a board of
    /// grid-aligned, equally sized entities and blind to partial overlap.
    #[default]
    ExactEdges,
    /// Standard half-open overlap: `a.lo < b.hi && a.hi > b.lo`.
    Aabb,
}

impl OverlapMode {
    /// Test two half-open intervals `[lo, hi)`.
    pub fn intervals_overlap(self, a: (i32, i32), b: (i32, i32)) -> bool {
        match self {
            OverlapMode::ExactEdges => a.0 == b.0 && a.1 == b.1,
            OverlapMode::Aabb => a.0 < b.1 && a.1 > b.0,
        }
    }

    pub fn boxes_overlap(self, a: &Transform, b: &Transform) -> bool {
        self.intervals_overlap((a.left(), a.right()), (b.left(), b.right()))
            && self.intervals_overlap((a.top(), a.bottom()), (b.top(), b.bottom()))
    }
}

// ---------------------------------------------------------------------------
// Contact / Collider
// ---------------------------------------------------------------------------

/// One reaction fired by `entity` on touching `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub entity: EntityId,
    pub other: EntityId,
    pub other_kind: EntityKind,
    pub reaction: Reaction,
}

/// A participant in the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub bounds: Transform,
}

/// Colliders for every entity with a body and a transform, in spawn order.
pub fn gather_colliders(store: &EntityStore) -> Vec<Collider> {
    store
        .query::<(&PhysicsBody, &Transform)>()
        .filter_map(|(entity, (_, bounds))| {
            let kind = store.kind_of(entity)?;
            Some(Collider {
                entity,
                kind,
                bounds: *bounds,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Broad phase
// ---------------------------------------------------------------------------

/// Sort `colliders` by `x` (stable) and return the index ranges of every
/// group with at least two members.
pub fn sweep_groups(colliders: &mut [Collider]) -> Vec<Range<usize>> {
    colliders.sort_by_key(|c| c.bounds.x);

    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=colliders.len() {
        let split = i == colliders.len() || !x_touches(&colliders[i - 1], &colliders[i]);
        if split {
            if i - start > 1 {
                groups.push(start..i);
            }
            start = i;
        }
    }
    groups
}

fn x_touches(a: &Collider, b: &Collider) -> bool {
    a.bounds.left() <= b.bounds.right() && b.bounds.left() <= a.bounds.right()
}

// ---------------------------------------------------------------------------
// Narrow phase
// ---------------------------------------------------------------------------

/// Run both phases over the store and return the contacts in a deterministic
/// order: group by group, pair by pair, first member's reactions first.
pub fn detect_contacts(store: &EntityStore, mode: OverlapMode) -> Vec<Contact> {
    let mut colliders = gather_colliders(store);
    let groups = sweep_groups(&mut colliders);

    let mut contacts = Vec::new();
    for group in groups {
        let members = &colliders[group];
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                // Sorted by x: nothing further right can reach `a`.
                if b.bounds.left() > a.bounds.right() {
                    break;
                }
                if mode.boxes_overlap(&a.bounds, &b.bounds) {
                    dispatch(store, a, b, &mut contacts);
                    dispatch(store, b, a, &mut contacts);
                }
            }
        }
    }
    contacts
}

fn dispatch(store: &EntityStore, me: &Collider, other: &Collider, out: &mut Vec<Contact>) {
    let Some(body) = store.get_component::<PhysicsBody>(me.entity) else {
        return;
    };
    for &reaction in body.reactions_for(other.kind) {
        out.push(Contact {
            entity: me.entity,
            other: other.entity,
            other_kind: other.kind,
            reaction,
        });
    }
}

/// Tick system: append this tick's contacts to the context.
pub fn run(ctx: &mut SystemContext<'_>, _cmds: &mut CommandBuffer) -> Result<(), GameError> {
    let contacts = detect_contacts(ctx.store, ctx.overlap);
    if !contacts.is_empty() {
        tracing::debug!(count = contacts.len(), "contacts detected");
    }
    ctx.contacts.extend(contacts);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
