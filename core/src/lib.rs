#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tilewalk simulation.
//!
//! This crate defines the value types that connect the authoritative world,
//! the pure systems (pathfinding, steering, animation) and the simulation
//! loop. The world owns mutable state; systems consume immutable snapshots
//! such as [`WalkabilityGrid`] and respond with plain values such as
//! [`MotionVector`] or waypoint lists.

mod geometry;
mod tiles;

use serde::{Deserialize, Serialize};

pub use geometry::{PixelPoint, PixelRect, Polygon};
pub use tiles::{CatalogId, Collision, LayerKind, Tile, TileCatalog, TileValue};

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the cell displaced by the provided signed amounts.
    ///
    /// `None` signals a coordinate left of column zero or above row zero,
    /// which always lies outside the world.
    #[must_use]
    pub fn offset(self, column_delta: i32, row_delta: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(Self::new(column, row))
    }
}

/// Describes the discrete tile layout shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_size: u32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Half of the tile side; offsets beyond it move an agent to the next cell.
    #[must_use]
    pub const fn half_tile(&self) -> i32 {
        (self.tile_size / 2) as i32
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Upper-left pixel of the cell.
    #[must_use]
    pub const fn cell_origin(&self, cell: CellCoord) -> PixelPoint {
        let size = self.tile_size as i32;
        PixelPoint::new(cell.column() as i32 * size, cell.row() as i32 * size)
    }

    /// Pixel bounds covered by the cell. Works for any cell, including ones
    /// outside the grid.
    #[must_use]
    pub const fn cell_bounds(&self, cell: CellCoord) -> PixelRect {
        let origin = self.cell_origin(cell);
        let size = self.tile_size as i32;
        PixelRect::new(origin.x, origin.y, size, size)
    }
}

/// Sub-tile displacement of an agent from its cell origin, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelOffset {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl PixelOffset {
    /// Creates a new offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Integer pixel displacement proposed for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionVector {
    /// Horizontal component.
    pub dx: i32,
    /// Vertical component.
    pub dy: i32,
}

impl MotionVector {
    /// Vector that proposes no movement.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new motion vector.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Scales the unit direction from `from` to `to` by `speed`.
    ///
    /// Each component is rounded away from zero so a nonzero direction never
    /// collapses to a zero step, then clamped to `speed`. Identical points
    /// yield [`MotionVector::ZERO`].
    #[must_use]
    pub fn toward(from: PixelPoint, to: PixelPoint, speed: u32) -> Self {
        let dx = f64::from(to.x) - f64::from(from.x);
        let dy = f64::from(to.y) - f64::from(from.y);
        let distance = dx.hypot(dy);
        if distance == 0.0 {
            return Self::ZERO;
        }

        let scale = f64::from(speed) / distance;
        let limit = i32::try_from(speed).unwrap_or(i32::MAX);
        Self::new(
            round_away_from_zero(dx * scale).clamp(-limit, limit),
            round_away_from_zero(dy * scale).clamp(-limit, limit),
        )
    }

    /// Reports whether the vector proposes no movement.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

fn round_away_from_zero(value: f64) -> i32 {
    let magnitude = value.abs().ceil() as i32;
    if value < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Directions of travel reported for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionFlags {
    /// Movement toward decreasing row indices.
    pub up: bool,
    /// Movement toward increasing row indices.
    pub down: bool,
    /// Movement toward decreasing column indices.
    pub left: bool,
    /// Movement toward increasing column indices.
    pub right: bool,
}

impl DirectionFlags {
    /// Derives the flags from the signs of a motion vector.
    #[must_use]
    pub const fn from_motion(motion: MotionVector) -> Self {
        Self {
            up: motion.dy < 0,
            down: motion.dy > 0,
            left: motion.dx < 0,
            right: motion.dx > 0,
        }
    }

    /// Reports whether any direction is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Boolean passability snapshot, `true` marking a walkable cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkabilityGrid {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl WalkabilityGrid {
    /// Creates a grid with every cell walkable.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![true; count],
        }
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell exists and is walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Marks the cell as impassable. Cells outside the grid are ignored.
    pub fn block(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = false;
        }
    }

    /// Number of walkable cells.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|walkable| **walkable).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Unique identifier assigned to an agent; equal to its roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Controller family an agent belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Driven by player input.
    Player,
    /// Driven by the wander and follow behaviours.
    Autonomous,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Clears the dynamic-layer cell currently holding the agent.
    VacateCell {
        /// Agent whose cell should be cleared.
        agent: AgentId,
    },
    /// Requests that the agent move by the provided pixel delta.
    ///
    /// The delta is applied entirely or not at all.
    MoveAgent {
        /// Agent attempting to move.
        agent: AgentId,
        /// Proposed displacement for this tick.
        motion: MotionVector,
    },
    /// Writes the agent's tile value into the dynamic-layer cell it occupies.
    OccupyCell {
        /// Agent claiming its current cell.
        agent: AgentId,
        /// Tile value representing the agent after this tick.
        tile_value: TileValue,
    },
    /// Overwrites the health of an agent.
    SetHealth {
        /// Agent whose health changes.
        agent: AgentId,
        /// New health value. Values below one mark the agent for removal.
        health: i32,
    },
    /// Marks every agent whose health dropped below one as dead.
    RefreshLiveness,
}

/// Events emitted by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that an agent applied its proposed displacement.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
        /// Sub-tile offset after the move.
        offset: PixelOffset,
    },
    /// Reports that a proposed displacement collided and was discarded.
    MoveRejected {
        /// Agent whose move was rejected.
        agent: AgentId,
        /// Displacement that was rejected.
        motion: MotionVector,
    },
    /// Announces that an agent left the simulation.
    AgentDied {
        /// Agent that died.
        agent: AgentId,
        /// Cell the agent occupied when it died.
        cell: CellCoord,
    },
}

/// Immutable representation of a single agent used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Name declared in the level definition.
    pub name: String,
    /// Controller family of the agent.
    pub kind: AgentKind,
    /// Catalog whose value range represents the agent.
    pub catalog: CatalogId,
    /// Maximum pixel displacement per tick and axis.
    pub speed: u32,
    /// Grid cell currently occupied by the agent.
    pub cell: CellCoord,
    /// Sub-tile offset from the cell origin.
    pub offset: PixelOffset,
    /// Pixel rectangle covered by the agent.
    pub bounds: PixelRect,
    /// Tile value currently representing the agent on its dynamic layer.
    pub tile_value: TileValue,
    /// Remaining health.
    pub health: i32,
    /// Whether the agent still takes part in the simulation.
    pub alive: bool,
}

/// Read-only snapshot describing every agent in roster order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot for the provided agent, if present.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}
