//! Builds the passability snapshot consumed by the pathfinder.

use tilewalk_core::{CatalogId, LayerKind, WalkabilityGrid};

use crate::World;

/// Combines static terrain with live agent occupancy into a fresh grid.
///
/// Partial tiles block their whole cell at grid resolution.
pub(crate) fn build(world: &World, ignored: &[CatalogId]) -> WalkabilityGrid {
    let grid = world.grid();
    let mut walkability = WalkabilityGrid::open(grid.columns(), grid.rows());

    for (layer_index, layer) in world.layers() {
        for (index, value) in layer.cells() {
            let Some(cell) = world.cell_at(index) else {
                continue;
            };
            let blocked = match layer.kind() {
                LayerKind::Static => world
                    .resolve_tile(layer, value)
                    .is_some_and(|tile| tile.collision().blocks_cell()),
                LayerKind::Dynamic => world
                    .agents_at(layer_index, cell, value)
                    .any(|agent| !ignored.contains(&agent.catalog)),
            };
            if blocked {
                walkability.block(cell);
            }
        }
    }

    walkability
}
