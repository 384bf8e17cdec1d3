//! Collision model answering rectangle queries against terrain and agents.

use tilewalk_core::{AgentId, CellCoord, LayerKind, PixelRect, TileGrid};

use crate::World;

/// Cells overlapped by `rect`. Cells outside the grid are reported as `None`.
pub(crate) fn covered_cells(
    grid: &TileGrid,
    rect: &PixelRect,
) -> impl Iterator<Item = Option<CellCoord>> {
    let size = i64::from(grid.tile_size().max(1));
    let (columns, rows) = (i64::from(grid.columns()), i64::from(grid.rows()));
    let (first_column, last_column, first_row, last_row) = if rect.is_empty() {
        (0, -1, 0, -1)
    } else {
        (
            i64::from(rect.x).div_euclid(size),
            (i64::from(rect.right()) - 1).div_euclid(size),
            i64::from(rect.y).div_euclid(size),
            (i64::from(rect.bottom()) - 1).div_euclid(size),
        )
    };

    (first_row..=last_row).flat_map(move |row| {
        (first_column..=last_column).map(move |column| {
            if column < 0 || row < 0 || column >= columns || row >= rows {
                return None;
            }
            let column = u32::try_from(column).ok()?;
            let row = u32::try_from(row).ok()?;
            Some(CellCoord::new(column, row))
        })
    })
}

/// Reports whether `rect` overlaps a colliding static tile or leaves the grid.
///
/// Every cell the rectangle covers is probed, so a diagonal step always checks
/// both orthogonal neighbours alongside the diagonal one.
pub(crate) fn static_collision(world: &World, rect: &PixelRect) -> bool {
    let grid = world.grid();
    covered_cells(grid, rect).any(|cell| match cell {
        None => true,
        Some(cell) => cell_collides(world, cell, rect),
    })
}

fn cell_collides(world: &World, cell: CellCoord, rect: &PixelRect) -> bool {
    let grid = world.grid();
    let Some(index) = grid.index(cell) else {
        return true;
    };
    let bounds = grid.cell_bounds(cell);

    world
        .layers()
        .filter(|(_, layer)| layer.kind() == LayerKind::Static)
        .filter_map(|(_, layer)| {
            layer
                .value(index)
                .and_then(|value| world.resolve_tile(layer, value))
        })
        .any(|tile| tile.collision().intersects(&bounds, rect))
}

/// Reports whether `rect` overlaps another live agent standing on its cell.
///
/// Agents that vacated their cell for the current update are invisible.
pub(crate) fn dynamic_collision(world: &World, mover: AgentId, rect: &PixelRect) -> bool {
    let grid = world.grid();
    world
        .present_agents()
        .filter(|agent| agent.id != mover)
        .any(|agent| agent.bounds(grid).intersects(rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covered_cells_follow_pixel_bounds() {
        let grid = TileGrid::new(4, 4, 16);
        let aligned: Vec<_> = covered_cells(&grid, &PixelRect::new(16, 16, 16, 16)).collect();
        assert_eq!(aligned, vec![Some(CellCoord::new(1, 1))]);

        let straddling: Vec<_> = covered_cells(&grid, &PixelRect::new(20, 16, 16, 16)).collect();
        assert_eq!(
            straddling,
            vec![Some(CellCoord::new(1, 1)), Some(CellCoord::new(2, 1))]
        );
    }

    #[test]
    fn cells_beyond_the_grid_are_reported_as_none() {
        let grid = TileGrid::new(2, 2, 16);
        let cells: Vec<_> = covered_cells(&grid, &PixelRect::new(-1, 0, 16, 16)).collect();
        assert_eq!(cells, vec![None, Some(CellCoord::new(0, 0))]);
    }
}
