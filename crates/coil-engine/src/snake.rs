//! The player's snake: an ordered list of segment ids.
//!
//! `segments[0]` is the head. Each later segment carries an `AiFollow` aimed
//! at the segment that was the tail when it was appended. That target is
//! fixed at creation and never repointed.

use coil_ecs::prelude::*;

use crate::archetype;
use crate::grid::Grid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snake {
    segments: Vec<EntityId>,
}

impl Snake {
    /// Spawn a snake of `length` segments with the head in `start_cell`,
    /// laid out leftwards and all moving right.
    pub fn spawn(
        store: &mut EntityStore,
        grid: &Grid,
        start_cell: (i32, i32),
        length: u32,
    ) -> Result<Self, EcsError> {
        let size = grid.cell_size();
        let direction = (1, 0);
        let (cx, cy) = start_cell;

        let (hx, hy) = grid.cell_position(cx, cy);
        let head = store.spawn(
            EntityKind::Snake,
            archetype::snake_head(hx, hy, size, direction)?,
        );
        let mut segments = vec![head];
        let mut ahead = head;
        for i in 1..length as i32 {
            let (x, y) = grid.cell_position(cx - i, cy);
            let bundle = archetype::snake_segment(x, y, size, direction, ahead)?;
            ahead = store.spawn(EntityKind::Snake, bundle);
            segments.push(ahead);
        }
        Ok(Self { segments })
    }

    /// Grow by one segment placed on the current tail, standing still until
    /// the follow pass steers it. `None` when the snake is empty.
    pub fn append(&mut self, store: &mut EntityStore) -> Result<Option<EntityId>, EcsError> {
        let Some(tail) = self.tail() else {
            return Ok(None);
        };
        let t = *store
            .get_component::<Transform>(tail)
            .ok_or(EcsError::StaleEntity { entity: tail })?;
        let bundle = archetype::snake_segment(t.x, t.y, t.width, (0, 0), tail)?;
        let segment = store.spawn(EntityKind::Snake, bundle);
        self.segments.push(segment);
        Ok(Some(segment))
    }

    pub fn head(&self) -> Option<EntityId> {
        self.segments.first().copied()
    }

    pub fn tail(&self) -> Option<EntityId> {
        self.segments.last().copied()
    }

    pub fn segments(&self) -> &[EntityId] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Forget every segment. The entities themselves are owned by the store.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}
