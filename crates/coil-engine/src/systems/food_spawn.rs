//! Keeps exactly one piece of food on the board.

use coil_ecs::command::CommandBuffer;
use coil_ecs::component::EntityKind;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64;

use super::SystemContext;
use crate::archetype;
use crate::grid::Grid;
use crate::GameError;

pub const SYSTEM_NAME: &str = "food_spawn";

/// When no food exists, queue one in a random empty cell of this tick's grid.
/// A full board logs a warning and spawns nothing.
pub fn run(ctx: &mut SystemContext<'_>, cmds: &mut CommandBuffer) -> Result<(), GameError> {
    if ctx.store.count_kind(EntityKind::Food) > 0 {
        return Ok(());
    }
    let Some((cx, cy)) = pick_food_cell(ctx.grid, ctx.rng) else {
        tracing::warn!(
            columns = ctx.grid.columns(),
            rows = ctx.grid.rows(),
            "board full, no cell left for food"
        );
        return Ok(());
    };
    let (x, y) = ctx.grid.cell_position(cx, cy);
    let bundle = archetype::food(x, y, ctx.grid.cell_size())?;
    cmds.spawn(EntityKind::Food, bundle, SYSTEM_NAME);
    tracing::debug!(cx, cy, "food queued");
    Ok(())
}

/// Uniform pick among the grid's empty cells.
pub fn pick_food_cell(grid: &Grid, rng: &mut Pcg64) -> Option<(i32, i32)> {
    grid.empty_cells().choose(rng).copied()
}
