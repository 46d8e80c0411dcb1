//! Rebuilds the grid from every entity's transform.

use coil_ecs::command::CommandBuffer;
use coil_ecs::component::Transform;
use coil_ecs::store::EntityStore;

use super::SystemContext;
use crate::grid::{Grid, GridError};
use crate::GameError;

pub const SYSTEM_NAME: &str = "grid_object";

pub fn run(ctx: &mut SystemContext<'_>, _cmds: &mut CommandBuffer) -> Result<(), GameError> {
    rebuild(ctx.store, ctx.grid)?;
    Ok(())
}

/// Clear the grid, then register each entity with a transform in the cell
/// holding its top-left corner.
pub fn rebuild(store: &EntityStore, grid: &mut Grid) -> Result<(), GridError> {
    grid.clear_all();
    for (entity, (t,)) in store.query::<(&Transform,)>() {
        let (cx, cy) = grid.cell_of(t.x, t.y);
        grid.add(cx, cy, entity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::collision::OverlapMode;
    use coil_ecs::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn run_on(store: &EntityStore, grid: &mut Grid) -> Result<(), GameError> {
        let mut rng = Pcg64::seed_from_u64(0);
        let mut contacts = Vec::new();
        let mut ctx = SystemContext {
            store,
            grid,
            rng: &mut rng,
            overlap: OverlapMode::ExactEdges,
            contacts: &mut contacts,
        };
        run(&mut ctx, &mut CommandBuffer::new())
    }

    #[test]
    fn registers_entities_in_their_cells() {
        let mut store = EntityStore::new();
        let a = store.spawn(
            EntityKind::Wall,
            ComponentBundle::new().with(Transform::square(40, 20, 20).unwrap()),
        );
        let b = store.spawn(
            EntityKind::Food,
            ComponentBundle::new().with(Transform::square(0, 0, 20).unwrap()),
        );
        let mut grid = Grid::new(0, 0, 100, 100, 20).unwrap();
        grid.add(4, 4, EntityId::new(99, 0)).unwrap();

        run_on(&store, &mut grid).unwrap();

        assert_eq!(grid.get(2, 1).unwrap(), &[a]);
        assert_eq!(grid.get(0, 0).unwrap(), &[b]);
        assert!(grid.get(4, 4).unwrap().is_empty(), "stale registrations cleared");
        assert_eq!(grid.occupant_count(), 2);
    }

    #[test]
    fn entity_without_transform_is_skipped() {
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Snake, ComponentBundle::new().with(PlayerController));
        let mut grid = Grid::new(0, 0, 100, 100, 20).unwrap();
        run_on(&store, &mut grid).unwrap();
        assert_eq!(grid.occupant_count(), 0);
    }

    #[test]
    fn off_board_entity_fails_the_pass() {
        let mut store = EntityStore::new();
        store.spawn(
            EntityKind::Snake,
            ComponentBundle::new().with(Transform::square(-20, 0, 20).unwrap()),
        );
        let mut grid = Grid::new(0, 0, 100, 100, 20).unwrap();
        let err = run_on(&store, &mut grid).unwrap_err();
        assert!(matches!(
            err,
            GameError::Grid(GridError::OutOfRange { cx: -1, cy: 0, .. })
        ));
    }
}
