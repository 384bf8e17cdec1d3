//! Level definitions consumed at load time and their validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilewalk_core::{AgentKind, LayerKind};

/// Parsed level description laid out like a Tiled map export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Number of columns in every layer.
    pub width: u32,
    /// Number of rows in every layer.
    pub height: u32,
    /// Side length of a tile in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_size: u32,
    /// Catalogs available to the layers.
    #[serde(default)]
    pub tilesets: Vec<TilesetDefinition>,
    /// Layers in drawing order.
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
    /// Agent roster in update order.
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}

/// Catalog declaration mapping a value range onto tile metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetDefinition {
    /// Name used by layers and agents to reference the catalog.
    pub name: String,
    /// First value claimed by the catalog.
    #[serde(rename = "firstgid")]
    pub first_value: u32,
    /// Number of consecutive values claimed by the catalog.
    #[serde(rename = "tilecount")]
    pub count: u32,
    /// Metadata for the tiles that carry any. Missing tiles are open.
    #[serde(default)]
    pub tiles: Vec<TileDefinition>,
}

/// Metadata attached to a single catalog tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    /// Catalog-local tile identifier.
    pub id: u32,
    /// Collision classification of the tile.
    #[serde(rename = "isCollision", default)]
    pub collision: CollisionKind,
    /// Outline for partially colliding tiles, in tile-local pixels.
    #[serde(default)]
    pub polygon: Vec<PointDefinition>,
}

/// Collision classification accepted in level files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Tile never collides.
    #[default]
    #[serde(rename = "none", alias = "no collision")]
    None,
    /// Tile collides across its whole cell.
    #[serde(rename = "full", alias = "full collision")]
    Full,
    /// Tile collides inside its polygon only.
    #[serde(rename = "partial", alias = "half collision")]
    Partial,
}

/// Polygon vertex in tile-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDefinition {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

/// Layer declaration holding row-major cell values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDefinition {
    /// Role of the layer.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Catalogs used by the layer.
    #[serde(default)]
    pub tilesets: Vec<TilesetReference>,
    /// Row-major cell values. Zero or negative values mark empty cells.
    pub data: Vec<i64>,
}

/// Reference from a layer to a catalog by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetReference {
    /// Name of the referenced catalog.
    pub name: String,
}

/// Agent declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Display name of the agent.
    pub name: String,
    /// Controller family of the agent.
    pub kind: AgentKind,
    /// Catalog whose values represent the agent on a dynamic layer.
    pub tileset: String,
    /// Pixel displacement per tick and axis.
    pub speed: u32,
    /// Starting health.
    #[serde(default = "default_health")]
    pub health: i32,
    /// Starting sub-tile offset in pixels.
    #[serde(default)]
    pub offset: OffsetDefinition,
}

/// Sub-tile pixel offset declared for an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetDefinition {
    /// Vertical offset.
    pub row: i32,
    /// Horizontal offset.
    pub column: i32,
}

fn default_health() -> i32 {
    1
}

/// Reasons a level definition is rejected before the simulation starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The grid has no cells or the tiles have no area.
    #[error("level dimensions must be positive (width {width}, height {height}, tile size {tile_size})")]
    EmptyGrid {
        /// Declared column count.
        width: u32,
        /// Declared row count.
        height: u32,
        /// Declared tile size.
        tile_size: u32,
    },
    /// Two catalogs share a name.
    #[error("tileset `{name}` is declared more than once")]
    DuplicateCatalog {
        /// Conflicting name.
        name: String,
    },
    /// A catalog claims no values or a range past the value space.
    #[error("tileset `{name}` declares an invalid value range")]
    InvalidCatalogRange {
        /// Catalog name.
        name: String,
    },
    /// A tile identifier does not fit inside its catalog.
    #[error("tileset `{catalog}` declares tile {id} but only holds {count} tiles")]
    TileOutOfRange {
        /// Catalog name.
        catalog: String,
        /// Offending tile identifier.
        id: u32,
        /// Catalog capacity.
        count: u32,
    },
    /// A tile identifier appears twice within one catalog.
    #[error("tileset `{catalog}` declares tile {id} more than once")]
    DuplicateTile {
        /// Catalog name.
        catalog: String,
        /// Offending tile identifier.
        id: u32,
    },
    /// A layer's cell count differs from the grid dimensions.
    #[error("layer {layer} holds {actual} cells, expected {expected}")]
    DimensionMismatch {
        /// Index of the layer.
        layer: usize,
        /// Cell count implied by the grid.
        expected: usize,
        /// Cell count found in the layer.
        actual: usize,
    },
    /// A layer references a catalog that does not exist.
    #[error("layer {layer} references unknown tileset `{name}`")]
    UnknownCatalog {
        /// Index of the layer.
        layer: usize,
        /// Referenced name.
        name: String,
    },
    /// Two catalogs used by the same layer claim a common value.
    #[error("layer {layer} uses overlapping tilesets `{first}` and `{second}`")]
    OverlappingCatalogs {
        /// Index of the layer.
        layer: usize,
        /// First catalog name.
        first: String,
        /// Second catalog name.
        second: String,
    },
    /// A cell value does not fit the tile value space.
    #[error("layer {layer} cell {index} holds out-of-range value {value}")]
    InvalidCellValue {
        /// Index of the layer.
        layer: usize,
        /// Row-major cell index.
        index: usize,
        /// Raw value.
        value: i64,
    },
    /// Agents were declared but no dynamic layer exists.
    #[error("agents are declared but the level has no dynamic layer")]
    MissingDynamicLayer,
    /// An agent references a catalog that does not exist.
    #[error("agent `{agent}` references unknown tileset `{name}`")]
    UnknownAgentCatalog {
        /// Agent name.
        agent: String,
        /// Referenced name.
        name: String,
    },
    /// No dynamic layer uses the agent's catalog.
    #[error("agent `{agent}` uses tileset `{name}` which no dynamic layer references")]
    AgentCatalogDetached {
        /// Agent name.
        agent: String,
        /// Catalog name.
        name: String,
    },
    /// No dynamic layer cell holds a value of the agent's catalog.
    #[error("agent `{agent}` does not appear on any dynamic layer")]
    AgentNotPlaced {
        /// Agent name.
        agent: String,
    },
    /// The agent's speed cannot be stepped within one tile.
    #[error("agent `{agent}` speed {speed} must lie within 1..={limit}")]
    InvalidSpeed {
        /// Agent name.
        agent: String,
        /// Declared speed.
        speed: u32,
        /// Largest accepted speed.
        limit: i32,
    },
    /// The agent's starting offset exceeds half a tile.
    #[error("agent `{agent}` offset ({column}, {row}) exceeds half a tile")]
    InvalidOffset {
        /// Agent name.
        agent: String,
        /// Declared horizontal offset.
        column: i32,
        /// Declared vertical offset.
        row: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_kinds_accept_both_spellings() {
        let parsed: Vec<CollisionKind> = serde_json::from_str(
            r#"["none", "no collision", "full", "full collision", "partial", "half collision"]"#,
        )
        .expect("parse collision kinds");
        assert_eq!(
            parsed,
            vec![
                CollisionKind::None,
                CollisionKind::None,
                CollisionKind::Full,
                CollisionKind::Full,
                CollisionKind::Partial,
                CollisionKind::Partial,
            ]
        );
    }

    #[test]
    fn tiled_layout_deserializes() {
        let level: LevelDefinition = serde_json::from_str(
            r#"{
                "width": 2,
                "height": 1,
                "tilewidth": 16,
                "tilesets": [
                    {"name": "terrain", "firstgid": 1, "tilecount": 2,
                     "tiles": [{"id": 1, "isCollision": "half collision",
                                "polygon": [{"x": 0, "y": 0}, {"x": 16, "y": 0}, {"x": 0, "y": 16}]}]}
                ],
                "layers": [{"type": "static", "tilesets": [{"name": "terrain"}], "data": [1, 2]}],
                "agents": [{"name": "hero", "kind": "player", "tileset": "hero", "speed": 2,
                            "offset": {"row": 0, "column": 3}}]
            }"#,
        )
        .expect("parse level");

        assert_eq!(level.tile_size, 16);
        assert_eq!(level.layers[0].kind, LayerKind::Static);
        assert_eq!(level.tilesets[0].tiles[0].collision, CollisionKind::Partial);
        assert_eq!(level.tilesets[0].tiles[0].polygon.len(), 3);
        assert_eq!(level.agents[0].health, 1);
        assert_eq!(level.agents[0].offset.column, 3);
    }
}
