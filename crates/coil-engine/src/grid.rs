//! Uniform spatial grid.
//!
//! The board is split into `columns x rows` square cells. Each cell holds the
//! ids registered into it this tick, in registration order. The grid is
//! rebuilt from scratch every tick: [`Grid::clear_all`] and then the
//! grid-object pass re-adds every entity with a transform.

use coil_ecs::entity::EntityId;

/// Upper bound on `columns * rows`.
pub const MAX_CELLS: usize = 1 << 20;

/// Raised when a cell coordinate falls outside the board.
///
/// Out-of-range access means a movement or spawn computation is wrong, so it
/// propagates out of the tick instead of being clamped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell ({cx}, {cy}) is outside the {columns}x{rows} grid")]
    OutOfRange {
        cx: i32,
        cy: i32,
        columns: i32,
        rows: i32,
    },

    #[error("a {columns}x{rows} grid exceeds {max} cells")]
    TooLarge { columns: i32, rows: i32, max: usize },
}

#[derive(Debug, Clone)]
pub struct Grid {
    offset_x: i32,
    offset_y: i32,
    cell_size: i32,
    columns: i32,
    rows: i32,
    /// Column-major: cell `(cx, cy)` lives at `cx * rows + cy`.
    cells: Vec<Vec<EntityId>>,
}

impl Grid {
    /// Build a grid covering `width x height` pixels starting at
    /// `(offset_x, offset_y)`. Partial trailing cells are dropped.
    ///
    /// # Errors
    ///
    /// [`GridError::TooLarge`] when the board has more than [`MAX_CELLS`]
    /// cells.
    pub fn new(
        offset_x: i32,
        offset_y: i32,
        width: i32,
        height: i32,
        cell_size: i32,
    ) -> Result<Self, GridError> {
        let cell_size = cell_size.max(1);
        let columns = (width / cell_size).max(0);
        let rows = (height / cell_size).max(0);
        let cell_count = (columns as usize)
            .checked_mul(rows as usize)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(GridError::TooLarge {
                columns,
                rows,
                max: MAX_CELLS,
            })?;
        Ok(Self {
            offset_x,
            offset_y,
            cell_size,
            columns,
            rows,
            cells: vec![Vec::new(); cell_count],
        })
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    pub fn contains(&self, cx: i32, cy: i32) -> bool {
        (0..self.columns).contains(&cx) && (0..self.rows).contains(&cy)
    }

    /// Append `entity` to the cell's occupant list.
    pub fn add(&mut self, cx: i32, cy: i32, entity: EntityId) -> Result<(), GridError> {
        let slot = self.slot(cx, cy)?;
        self.cells[slot].push(entity);
        Ok(())
    }

    /// Empty one cell.
    pub fn clear(&mut self, cx: i32, cy: i32) -> Result<(), GridError> {
        let slot = self.slot(cx, cy)?;
        self.cells[slot].clear();
        Ok(())
    }

    /// Empty every cell. Allocations are kept for the next tick.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Occupants of a cell, in registration order. Empty for an empty cell.
    pub fn get(&self, cx: i32, cy: i32) -> Result<&[EntityId], GridError> {
        let slot = self.slot(cx, cy)?;
        Ok(&self.cells[slot])
    }

    /// The cell containing world point `(wx, wy)`. Uses floor division, so
    /// points left of or above the offset map to negative cells.
    pub fn cell_of(&self, wx: i32, wy: i32) -> (i32, i32) {
        (
            (wx - self.offset_x).div_euclid(self.cell_size),
            (wy - self.offset_y).div_euclid(self.cell_size),
        )
    }

    /// World position of the top-left corner of a cell.
    pub fn cell_position(&self, cx: i32, cy: i32) -> (i32, i32) {
        (
            cx * self.cell_size + self.offset_x,
            cy * self.cell_size + self.offset_y,
        )
    }

    /// Every cell with no occupants, column by column.
    pub fn empty_cells(&self) -> Vec<(i32, i32)> {
        let mut empty = Vec::new();
        for cx in 0..self.columns {
            for cy in 0..self.rows {
                if self.cells[self.index_of(cx, cy)].is_empty() {
                    empty.push((cx, cy));
                }
            }
        }
        empty
    }

    /// Total registrations across all cells.
    pub fn occupant_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn slot(&self, cx: i32, cy: i32) -> Result<usize, GridError> {
        if !self.contains(cx, cy) {
            return Err(GridError::OutOfRange {
                cx,
                cy,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(self.index_of(cx, cy))
    }

    /// Column-major slot of an in-range cell.
    fn index_of(&self, cx: i32, cy: i32) -> usize {
        cx as usize * self.rows as usize + cy as usize
    }
}
