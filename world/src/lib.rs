#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for tilewalk.
//!
//! The world owns the tile grid, the catalogs, every layer and the agent
//! roster. Mutations only happen through [`apply`]; everything else reads
//! through the [`query`] module.

mod collision;
mod kinematics;
mod layer;
mod level;
mod walkability;

use std::collections::HashSet;

use tilewalk_core::{
    AgentId, AgentKind, CatalogId, CellCoord, Collision, Command, Event, LayerKind, PixelOffset,
    PixelPoint, PixelRect, Polygon, Tile, TileCatalog, TileGrid, TileValue,
};

use crate::layer::Layer;

pub use level::{
    AgentDefinition, CollisionKind, LayerDefinition, LevelDefinition, LevelError,
    OffsetDefinition, PointDefinition, TileDefinition, TilesetDefinition, TilesetReference,
};

/// Represents the authoritative tilewalk world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: TileGrid,
    catalogs: Vec<TileCatalog>,
    layers: Vec<Layer>,
    agents: Vec<Agent>,
}

impl World {
    /// Builds a world from a parsed level, rejecting inconsistent data.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] describing the first inconsistency found.
    pub fn from_definition(definition: &LevelDefinition) -> Result<Self, LevelError> {
        if definition.width == 0 || definition.height == 0 || definition.tile_size == 0 {
            return Err(LevelError::EmptyGrid {
                width: definition.width,
                height: definition.height,
                tile_size: definition.tile_size,
            });
        }

        let grid = TileGrid::new(definition.width, definition.height, definition.tile_size);
        let catalogs = build_catalogs(&definition.tilesets)?;
        let layers = build_layers(&grid, &catalogs, &definition.layers)?;
        let mut world = Self {
            grid,
            catalogs,
            layers,
            agents: Vec::new(),
        };
        world.agents = world.place_agents(&definition.agents)?;

        log::info!(
            "loaded level: {}x{} tiles of {}px, {} layers, {} agents",
            grid.columns(),
            grid.rows(),
            grid.tile_size(),
            world.layers.len(),
            world.agents.len()
        );
        Ok(world)
    }

    fn place_agents(&self, definitions: &[AgentDefinition]) -> Result<Vec<Agent>, LevelError> {
        if !definitions.is_empty()
            && !self
                .layers
                .iter()
                .any(|layer| layer.kind() == LayerKind::Dynamic)
        {
            return Err(LevelError::MissingDynamicLayer);
        }

        let half_tile = self.grid.half_tile();
        let mut claimed: HashSet<(usize, usize)> = HashSet::new();
        let mut agents = Vec::with_capacity(definitions.len());

        for (index, definition) in definitions.iter().enumerate() {
            let catalog = self.catalog_named(&definition.tileset).ok_or_else(|| {
                LevelError::UnknownAgentCatalog {
                    agent: definition.name.clone(),
                    name: definition.tileset.clone(),
                }
            })?;

            if definition.speed == 0 || i64::from(definition.speed) > i64::from(half_tile) {
                return Err(LevelError::InvalidSpeed {
                    agent: definition.name.clone(),
                    speed: definition.speed,
                    limit: half_tile,
                });
            }

            let offset = PixelOffset::new(definition.offset.column, definition.offset.row);
            if offset.dx.abs() > half_tile || offset.dy.abs() > half_tile {
                return Err(LevelError::InvalidOffset {
                    agent: definition.name.clone(),
                    column: offset.dx,
                    row: offset.dy,
                });
            }

            let (layer, cell_index, tile_value) =
                self.find_placement(catalog, &claimed).ok_or_else(|| {
                    if self.layers.iter().any(|layer| {
                        layer.kind() == LayerKind::Dynamic && layer.uses(catalog)
                    }) {
                        LevelError::AgentNotPlaced {
                            agent: definition.name.clone(),
                        }
                    } else {
                        LevelError::AgentCatalogDetached {
                            agent: definition.name.clone(),
                            name: definition.tileset.clone(),
                        }
                    }
                })?;
            let _ = claimed.insert((layer, cell_index));
            let cell = self
                .cell_at(cell_index)
                .ok_or_else(|| LevelError::AgentNotPlaced {
                    agent: definition.name.clone(),
                })?;

            let id = AgentId::new(u32::try_from(index).unwrap_or(u32::MAX));
            agents.push(Agent {
                id,
                name: definition.name.clone(),
                kind: definition.kind,
                catalog,
                layer,
                cell,
                offset,
                tile_value,
                speed: definition.speed,
                health: definition.health,
                alive: true,
                present: true,
            });
        }

        Ok(agents)
    }

    fn find_placement(
        &self,
        catalog: CatalogId,
        claimed: &HashSet<(usize, usize)>,
    ) -> Option<(usize, usize, TileValue)> {
        let range = self.catalog(catalog)?;
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.kind() == LayerKind::Dynamic && layer.uses(catalog))
            .find_map(|(layer_index, layer)| {
                layer
                    .cells()
                    .find(|(index, value)| {
                        range.contains(*value) && !claimed.contains(&(layer_index, *index))
                    })
                    .map(|(index, value)| (layer_index, index, value))
            })
    }

    fn catalog_named(&self, name: &str) -> Option<CatalogId> {
        self.catalogs
            .iter()
            .position(|catalog| catalog.name() == name)
            .and_then(|index| u32::try_from(index).ok())
            .map(CatalogId::new)
    }

    pub(crate) fn catalog(&self, id: CatalogId) -> Option<&TileCatalog> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.catalogs.get(index))
    }

    pub(crate) const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub(crate) fn layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers.iter().enumerate()
    }

    pub(crate) fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let columns = usize::try_from(self.grid.columns()).ok()?;
        if columns == 0 || index >= self.grid.cell_count() {
            return None;
        }
        let column = u32::try_from(index % columns).ok()?;
        let row = u32::try_from(index / columns).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Resolves the catalog tile for a value stored in the provided layer.
    pub(crate) fn resolve_tile(&self, layer: &Layer, value: TileValue) -> Option<&Tile> {
        layer
            .catalogs()
            .iter()
            .filter_map(|id| self.catalog(*id))
            .find(|catalog| catalog.contains(value))
            .and_then(|catalog| catalog.tile(value))
    }

    /// Live agents represented by `value` at `cell` of the given layer.
    pub(crate) fn agents_at(
        &self,
        layer: usize,
        cell: CellCoord,
        value: TileValue,
    ) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(move |agent| {
            agent.alive
                && agent.layer == layer
                && agent.cell == cell
                && self
                    .catalog(agent.catalog)
                    .is_some_and(|catalog| catalog.contains(value))
        })
    }

    /// Live agents currently standing on their dynamic-layer cell.
    pub(crate) fn present_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|agent| agent.alive && agent.present)
    }

    pub(crate) fn agent(&self, id: AgentId) -> Option<&Agent> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.agents.get(index))
    }

    pub(crate) fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.agents.get_mut(index))
    }

    fn vacate(&mut self, id: AgentId) {
        let Some(agent) = self.agent_mut(id) else {
            return;
        };
        agent.present = false;
        let (layer_index, cell, catalog) = (agent.layer, agent.cell, agent.catalog);
        let Some(index) = self.grid.index(cell) else {
            return;
        };
        let holds_agent = self.layers.get(layer_index).and_then(|layer| layer.value(index));
        let owned = holds_agent.is_some_and(|value| {
            self.catalog(catalog)
                .is_some_and(|catalog| catalog.contains(value))
        });
        if owned {
            if let Some(layer) = self.layers.get_mut(layer_index) {
                layer.set(index, None);
            }
        }
    }

    fn occupy(&mut self, id: AgentId, tile_value: TileValue) {
        let grid = self.grid;
        let Some(agent) = self.agent_mut(id) else {
            return;
        };
        if !agent.alive {
            return;
        }
        agent.tile_value = tile_value;
        agent.present = true;
        let (layer_index, cell) = (agent.layer, agent.cell);
        if let (Some(index), Some(layer)) = (grid.index(cell), self.layers.get_mut(layer_index)) {
            layer.set(index, Some(tile_value));
        }
    }

    fn refresh_liveness(&mut self, out_events: &mut Vec<Event>) {
        let fallen: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|agent| agent.alive && agent.health < 1)
            .map(|agent| agent.id)
            .collect();

        for id in fallen {
            self.vacate(id);
            if let Some(agent) = self.agent_mut(id) {
                agent.alive = false;
                log::info!("agent `{}` died at {:?}", agent.name, agent.cell);
                out_events.push(Event::AgentDied {
                    agent: id,
                    cell: agent.cell,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::VacateCell { agent } => world.vacate(agent),
        Command::MoveAgent { agent, motion } => {
            match kinematics::try_move(world, agent, motion) {
                kinematics::MoveOutcome::Moved { from, to, offset } => {
                    out_events.push(Event::AgentMoved {
                        agent,
                        from,
                        to,
                        offset,
                    });
                }
                kinematics::MoveOutcome::Blocked => {
                    log::trace!("agent {} move {:?} rejected", agent.get(), motion);
                    out_events.push(Event::MoveRejected { agent, motion });
                }
                kinematics::MoveOutcome::Stationary => {}
            }
        }
        Command::OccupyCell { agent, tile_value } => world.occupy(agent, tile_value),
        Command::SetHealth { agent, health } => {
            if let Some(agent) = world.agent_mut(agent) {
                agent.health = health;
            }
        }
        Command::RefreshLiveness => world.refresh_liveness(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilewalk_core::{
        AgentId, AgentSnapshot, AgentView, CatalogId, CellCoord, LayerKind, PixelRect,
        TileCatalog, TileGrid, TileValue, WalkabilityGrid,
    };

    use super::World;

    /// Provides the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> TileGrid {
        world.grid
    }

    /// Provides read-only access to a catalog.
    #[must_use]
    pub fn catalog(world: &World, id: CatalogId) -> Option<&TileCatalog> {
        world.catalog(id)
    }

    /// Captures a read-only view of every agent in roster order.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(
            world
                .agents
                .iter()
                .map(|agent| agent.snapshot(&world.grid))
                .collect(),
        )
    }

    /// Captures the state of a single agent.
    #[must_use]
    pub fn agent(world: &World, id: AgentId) -> Option<AgentSnapshot> {
        world.agent(id).map(|agent| agent.snapshot(&world.grid))
    }

    /// Builds a fresh walkability snapshot.
    ///
    /// Cells occupied by live agents whose catalog is listed in `ignored`
    /// stay walkable.
    #[must_use]
    pub fn walkability(world: &World, ignored: &[CatalogId]) -> WalkabilityGrid {
        super::walkability::build(world, ignored)
    }

    /// Reports whether the rectangle overlaps static terrain or leaves the grid.
    #[must_use]
    pub fn collides_with_terrain(world: &World, rect: &PixelRect) -> bool {
        super::collision::static_collision(world, rect)
    }

    /// Value held by the first dynamic layer at the cell, if any.
    #[must_use]
    pub fn dynamic_value(world: &World, cell: CellCoord) -> Option<TileValue> {
        let index = world.grid.index(cell)?;
        world
            .layers
            .iter()
            .filter(|layer| layer.kind() == LayerKind::Dynamic)
            .find_map(|layer| layer.value(index))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) name: String,
    pub(crate) kind: AgentKind,
    pub(crate) catalog: CatalogId,
    pub(crate) layer: usize,
    pub(crate) cell: CellCoord,
    pub(crate) offset: PixelOffset,
    pub(crate) tile_value: TileValue,
    pub(crate) speed: u32,
    pub(crate) health: i32,
    pub(crate) alive: bool,
    pub(crate) present: bool,
}

impl Agent {
    pub(crate) fn bounds(&self, grid: &TileGrid) -> PixelRect {
        grid.cell_bounds(self.cell)
            .translated(self.offset.dx, self.offset.dy)
    }

    fn snapshot(&self, grid: &TileGrid) -> tilewalk_core::AgentSnapshot {
        tilewalk_core::AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            catalog: self.catalog,
            speed: self.speed,
            cell: self.cell,
            offset: self.offset,
            bounds: self.bounds(grid),
            tile_value: self.tile_value,
            health: self.health,
            alive: self.alive,
        }
    }
}

fn build_catalogs(definitions: &[TilesetDefinition]) -> Result<Vec<TileCatalog>, LevelError> {
    let mut names: HashSet<&str> = HashSet::new();
    let mut catalogs = Vec::with_capacity(definitions.len());

    for definition in definitions {
        if !names.insert(definition.name.as_str()) {
            return Err(LevelError::DuplicateCatalog {
                name: definition.name.clone(),
            });
        }

        let in_range = definition.first_value >= 1
            && definition.count >= 1
            && definition.first_value.checked_add(definition.count).is_some();
        if !in_range {
            return Err(LevelError::InvalidCatalogRange {
                name: definition.name.clone(),
            });
        }

        let tiles = build_tiles(definition)?;
        catalogs.push(TileCatalog::new(
            definition.name.clone(),
            TileValue::new(definition.first_value),
            definition.count,
            tiles,
        ));
    }

    Ok(catalogs)
}

fn build_tiles(definition: &TilesetDefinition) -> Result<Vec<Tile>, LevelError> {
    let mut tiles: Vec<Tile> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    for tile in &definition.tiles {
        if tile.id >= definition.count {
            return Err(LevelError::TileOutOfRange {
                catalog: definition.name.clone(),
                id: tile.id,
                count: definition.count,
            });
        }
        if !seen.insert(tile.id) {
            return Err(LevelError::DuplicateTile {
                catalog: definition.name.clone(),
                id: tile.id,
            });
        }

        let slot = usize::try_from(tile.id).unwrap_or(usize::MAX);
        while tiles.len() <= slot {
            let id = u32::try_from(tiles.len()).unwrap_or(u32::MAX);
            tiles.push(Tile::new(id, Collision::None));
        }

        let collision = match tile.collision {
            CollisionKind::None => Collision::None,
            CollisionKind::Full => Collision::Full,
            CollisionKind::Partial => Collision::Partial(Polygon::new(
                tile.polygon
                    .iter()
                    .map(|point| PixelPoint::new(point.x, point.y))
                    .collect(),
            )),
        };
        tiles[slot] = Tile::new(tile.id, collision);
    }

    Ok(tiles)
}

fn build_layers(
    grid: &TileGrid,
    catalogs: &[TileCatalog],
    definitions: &[LayerDefinition],
) -> Result<Vec<Layer>, LevelError> {
    let expected = grid.cell_count();
    let mut layers = Vec::with_capacity(definitions.len());

    for (layer_index, definition) in definitions.iter().enumerate() {
        if definition.data.len() != expected {
            return Err(LevelError::DimensionMismatch {
                layer: layer_index,
                expected,
                actual: definition.data.len(),
            });
        }

        let mut used: Vec<CatalogId> = Vec::with_capacity(definition.tilesets.len());
        for reference in &definition.tilesets {
            let position = catalogs
                .iter()
                .position(|catalog| catalog.name() == reference.name)
                .and_then(|index| u32::try_from(index).ok())
                .ok_or_else(|| LevelError::UnknownCatalog {
                    layer: layer_index,
                    name: reference.name.clone(),
                })?;
            used.push(CatalogId::new(position));
        }

        let resolved: Vec<&TileCatalog> = used
            .iter()
            .filter_map(|id| usize::try_from(id.get()).ok())
            .filter_map(|index| catalogs.get(index))
            .collect();
        for (position, first) in resolved.iter().enumerate() {
            if let Some(second) = resolved
                .iter()
                .skip(position + 1)
                .find(|other| first.overlaps(other))
            {
                return Err(LevelError::OverlappingCatalogs {
                    layer: layer_index,
                    first: first.name().to_owned(),
                    second: second.name().to_owned(),
                });
            }
        }

        let mut cells = Vec::with_capacity(expected);
        let mut unclaimed = 0_usize;
        for (index, raw) in definition.data.iter().copied().enumerate() {
            if raw <= 0 {
                cells.push(None);
                continue;
            }
            let value = u32::try_from(raw)
                .map(TileValue::new)
                .map_err(|_| LevelError::InvalidCellValue {
                    layer: layer_index,
                    index,
                    value: raw,
                })?;
            if !resolved.iter().any(|catalog| catalog.contains(value)) {
                unclaimed += 1;
            }
            cells.push(Some(value));
        }
        if unclaimed > 0 {
            log::warn!(
                "layer {layer_index}: {unclaimed} cells hold values outside its tilesets and are treated as open"
            );
        }

        layers.push(Layer::new(definition.kind, used, cells));
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewalk_core::MotionVector;

    fn definition() -> LevelDefinition {
        serde_json::from_str(
            r#"{
                "width": 3,
                "height": 2,
                "tilewidth": 16,
                "tilesets": [
                    {"name": "terrain", "firstgid": 1, "tilecount": 2,
                     "tiles": [{"id": 1, "isCollision": "full collision"}]},
                    {"name": "hero", "firstgid": 3, "tilecount": 32},
                    {"name": "ghost", "firstgid": 35, "tilecount": 32}
                ],
                "layers": [
                    {"type": "static", "tilesets": [{"name": "terrain"}], "data": [1, 1, 2, 1, 1, 1]},
                    {"type": "dynamic", "tilesets": [{"name": "hero"}, {"name": "ghost"}],
                     "data": [3, 0, 0, 0, 0, 35]}
                ],
                "agents": [
                    {"name": "hero", "kind": "player", "tileset": "hero", "speed": 2, "health": 3},
                    {"name": "ghost", "kind": "autonomous", "tileset": "ghost", "speed": 1}
                ]
            }"#,
        )
        .expect("fixture parses")
    }

    #[test]
    fn agents_start_on_the_first_cell_holding_their_catalog() {
        let world = World::from_definition(&definition()).expect("valid level");
        let view = query::agent_view(&world);
        let cells: Vec<CellCoord> = view.iter().map(|agent| agent.cell).collect();
        assert_eq!(cells, vec![CellCoord::new(0, 0), CellCoord::new(2, 1)]);
        assert_eq!(
            view.get(AgentId::new(1)).map(|agent| agent.tile_value),
            Some(TileValue::new(35))
        );
    }

    #[test]
    fn mismatched_layer_dimensions_are_rejected() {
        let mut definition = definition();
        let _ = definition.layers[0].data.pop();
        assert_eq!(
            World::from_definition(&definition).err(),
            Some(LevelError::DimensionMismatch {
                layer: 0,
                expected: 6,
                actual: 5,
            })
        );
    }

    #[test]
    fn overlapping_catalogs_on_one_layer_are_rejected() {
        let mut definition = definition();
        definition.tilesets[2].first_value = 20;
        let error = World::from_definition(&definition).err();
        assert!(matches!(
            error,
            Some(LevelError::OverlappingCatalogs { layer: 1, .. })
        ));
    }

    #[test]
    fn agents_missing_from_dynamic_layers_are_rejected() {
        let mut definition = definition();
        definition.layers[1].data[5] = 0;
        assert_eq!(
            World::from_definition(&definition).err(),
            Some(LevelError::AgentNotPlaced {
                agent: "ghost".to_owned(),
            })
        );
    }

    #[test]
    fn speeds_beyond_half_a_tile_are_rejected() {
        let mut definition = definition();
        definition.agents[0].speed = 9;
        assert!(matches!(
            World::from_definition(&definition).err(),
            Some(LevelError::InvalidSpeed { speed: 9, limit: 8, .. })
        ));
    }

    #[test]
    fn tiles_beyond_catalog_count_are_rejected() {
        let mut definition = definition();
        definition.tilesets[0].tiles[0].id = 2;
        assert!(matches!(
            World::from_definition(&definition).err(),
            Some(LevelError::TileOutOfRange { id: 2, count: 2, .. })
        ));
    }

    #[test]
    fn vacate_and_occupy_rewrite_the_dynamic_cell() {
        let mut world = World::from_definition(&definition()).expect("valid level");
        let mut events = Vec::new();
        let hero = AgentId::new(0);

        apply(&mut world, Command::VacateCell { agent: hero }, &mut events);
        assert_eq!(query::dynamic_value(&world, CellCoord::new(0, 0)), None);

        apply(
            &mut world,
            Command::OccupyCell {
                agent: hero,
                tile_value: TileValue::new(7),
            },
            &mut events,
        );
        assert_eq!(
            query::dynamic_value(&world, CellCoord::new(0, 0)),
            Some(TileValue::new(7))
        );
        assert!(events.is_empty());
    }

    #[test]
    fn dead_agents_are_cleared_and_stop_moving() {
        let mut world = World::from_definition(&definition()).expect("valid level");
        let mut events = Vec::new();
        let ghost = AgentId::new(1);

        apply(
            &mut world,
            Command::SetHealth {
                agent: ghost,
                health: 0,
            },
            &mut events,
        );
        apply(&mut world, Command::RefreshLiveness, &mut events);
        assert_eq!(
            events,
            vec![Event::AgentDied {
                agent: ghost,
                cell: CellCoord::new(2, 1),
            }]
        );
        assert_eq!(query::dynamic_value(&world, CellCoord::new(2, 1)), None);

        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                agent: ghost,
                motion: MotionVector::new(-1, 0),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::agent(&world, ghost).is_some_and(|agent| !agent.alive));
    }
}
