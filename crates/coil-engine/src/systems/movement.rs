//! Grid-locked stepping: one cell per tick along the body's direction.

use coil_ecs::command::CommandBuffer;
use coil_ecs::component::{PhysicsBody, Transform};

use super::SystemContext;
use crate::GameError;

pub const SYSTEM_NAME: &str = "movement";

/// Move every body one cell along `(x_dir, y_dir)`, snapping to the cell
/// grid. A zero direction keeps the body in its cell but still snaps it.
/// Only bodies whose position changes get a command.
pub fn run(ctx: &mut SystemContext<'_>, cmds: &mut CommandBuffer) -> Result<(), GameError> {
    for (entity, (t, body)) in ctx.store.query::<(&Transform, &PhysicsBody)>() {
        let (dx, dy) = body.direction();
        let (cx, cy) = ctx.grid.cell_of(t.x, t.y);
        let (x, y) = ctx.grid.cell_position(cx + dx, cy + dy);
        if (x, y) != (t.x, t.y) {
            cmds.insert(entity, Transform { x, y, ..*t }, SYSTEM_NAME);
        }
    }
    Ok(())
}
