//! Tile catalog contracts shared by the world and the systems.

use serde::{Deserialize, Serialize};

use crate::{geometry::PixelRect, Polygon};

/// Raw value stored in a layer cell.
///
/// Values are global across catalogs: each catalog claims the contiguous range
/// `[first_value, first_value + count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileValue(u32);

impl TileValue {
    /// Creates a tile value wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the value shifted forward by `delta` entries.
    #[must_use]
    pub const fn offset(self, delta: u32) -> Self {
        Self(self.0 + delta)
    }
}

/// Collision behaviour of a catalog tile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collision {
    /// The tile never blocks movement.
    #[default]
    None,
    /// The tile blocks any rectangle that overlaps its cell.
    Full,
    /// The tile blocks rectangles overlapping the polygon, given in
    /// tile-local pixel coordinates.
    Partial(Polygon),
}

impl Collision {
    /// Reports whether the tile makes its whole cell impassable for path
    /// planning. Partial tiles count as blocking at grid resolution.
    #[must_use]
    pub const fn blocks_cell(&self) -> bool {
        matches!(self, Self::Full | Self::Partial(_))
    }

    /// Reports whether the tile placed at `cell_bounds` intersects `rect`.
    #[must_use]
    pub fn intersects(&self, cell_bounds: &PixelRect, rect: &PixelRect) -> bool {
        match self {
            Self::None => false,
            Self::Full => cell_bounds.intersects(rect),
            Self::Partial(polygon) => polygon
                .translated(cell_bounds.x, cell_bounds.y)
                .intersects_rect(rect),
        }
    }
}

/// Immutable catalog entry loaded from the world definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    id: u32,
    collision: Collision,
}

impl Tile {
    /// Creates a tile with the provided catalog-local identifier.
    #[must_use]
    pub const fn new(id: u32, collision: Collision) -> Self {
        Self { id, collision }
    }

    /// Catalog-local identifier of the tile.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Collision behaviour attached to the tile.
    #[must_use]
    pub const fn collision(&self) -> &Collision {
        &self.collision
    }
}

/// Index of a catalog within the world's catalog arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogId(u32);

impl CatalogId {
    /// Creates a catalog identifier.
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

/// Contiguous range of tile values mapped onto tile entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCatalog {
    name: String,
    first_value: TileValue,
    count: u32,
    tiles: Vec<Tile>,
}

impl TileCatalog {
    /// Creates a catalog covering `[first_value, first_value + count)`.
    ///
    /// `tiles` may be shorter than `count`; values without an entry resolve
    /// to no tile and are treated as open.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        first_value: TileValue,
        count: u32,
        tiles: Vec<Tile>,
    ) -> Self {
        Self {
            name: name.into(),
            first_value,
            count,
            tiles,
        }
    }

    /// Name used by layers to reference the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First value claimed by the catalog.
    #[must_use]
    pub const fn first_value(&self) -> TileValue {
        self.first_value
    }

    /// Number of consecutive values claimed by the catalog.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Tile entries in catalog-local order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reports whether the value falls inside the catalog range.
    #[must_use]
    pub const fn contains(&self, value: TileValue) -> bool {
        value.get() >= self.first_value.get()
            && (value.get() - self.first_value.get()) < self.count
    }

    /// Reports whether the two catalogs claim at least one common value.
    #[must_use]
    pub const fn overlaps(&self, other: &TileCatalog) -> bool {
        let start = self.first_value.get() as u64;
        let end = start + self.count as u64;
        let other_start = other.first_value.get() as u64;
        let other_end = other_start + other.count as u64;
        start < other_end && other_start < end
    }

    /// Resolves the tile entry for a value claimed by the catalog.
    #[must_use]
    pub fn tile(&self, value: TileValue) -> Option<&Tile> {
        if !self.contains(value) {
            return None;
        }
        let index = usize::try_from(value.get() - self.first_value.get()).ok()?;
        self.tiles.get(index)
    }
}

/// Role of a layer within the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Terrain layer consulted for static collision.
    Static,
    /// Occupancy layer recording the cell each agent stands on.
    Dynamic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelPoint;

    fn catalog() -> TileCatalog {
        TileCatalog::new(
            "terrain",
            TileValue::new(10),
            4,
            vec![
                Tile::new(0, Collision::None),
                Tile::new(1, Collision::Full),
            ],
        )
    }

    #[test]
    fn catalog_range_is_half_open() {
        let catalog = catalog();
        assert!(!catalog.contains(TileValue::new(9)));
        assert!(catalog.contains(TileValue::new(10)));
        assert!(catalog.contains(TileValue::new(13)));
        assert!(!catalog.contains(TileValue::new(14)));
    }

    #[test]
    fn values_without_entries_resolve_to_nothing() {
        let catalog = catalog();
        assert_eq!(
            catalog.tile(TileValue::new(11)).map(Tile::collision),
            Some(&Collision::Full)
        );
        assert!(catalog.tile(TileValue::new(12)).is_none());
        assert!(catalog.tile(TileValue::new(42)).is_none());
    }

    #[test]
    fn overlapping_ranges_are_detected() {
        let terrain = catalog();
        let adjacent = TileCatalog::new("props", TileValue::new(14), 2, Vec::new());
        let clashing = TileCatalog::new("clash", TileValue::new(13), 2, Vec::new());
        assert!(!terrain.overlaps(&adjacent));
        assert!(terrain.overlaps(&clashing));
        assert!(clashing.overlaps(&terrain));
    }

    #[test]
    fn full_collision_requires_overlap_with_cell() {
        let cell = PixelRect::new(16, 16, 16, 16);
        assert!(Collision::Full.intersects(&cell, &PixelRect::new(1, 16, 16, 16)));
        assert!(!Collision::Full.intersects(&cell, &PixelRect::new(0, 16, 16, 16)));
    }

    #[test]
    fn partial_collision_translates_polygon_to_cell() {
        let upper_half = Polygon::new(vec![
            PixelPoint::new(0, 0),
            PixelPoint::new(16, 0),
            PixelPoint::new(16, 8),
            PixelPoint::new(0, 8),
        ]);
        let collision = Collision::Partial(upper_half);
        let cell = PixelRect::new(32, 16, 16, 16);
        assert!(collision.intersects(&cell, &PixelRect::new(32, 10, 16, 16)));
        assert!(!collision.intersects(&cell, &PixelRect::new(32, 24, 16, 16)));
        assert!(collision.blocks_cell());
        assert!(!Collision::None.blocks_cell());
    }
}
