//! Tile map records
//!
//! A map is a `width` x `height` diamond grid of tiles plus decorative
//! objects placed on grid cells. Field names follow the camelCase JSON of
//! the map data bundle; fields the renderer does not use are ignored on load.

use serde::{Deserialize, Serialize};

/// A single grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile type id, also the tile texture id
    #[serde(rename = "type")]
    pub tile_type: String,
    /// Grid column
    pub x: i32,
    /// Grid row
    pub y: i32,
}

impl Tile {
    /// Create a new tile
    pub fn new(tile_type: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            tile_type: tile_type.into(),
            x,
            y,
        }
    }
}

/// An object placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObjectInstance {
    /// Object type id, also the object texture id
    #[serde(rename = "type")]
    pub object_type: String,
    /// Grid column
    pub x: i32,
    /// Grid row
    pub y: i32,
    /// Mirror the sprite horizontally
    #[serde(default)]
    pub flip_x: bool,
    /// Per-instance horizontal origin override (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<f64>,
    /// Per-instance vertical origin override (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<f64>,
}

impl MapObjectInstance {
    /// Create an unflipped instance using the type's default origin
    pub fn new(object_type: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            object_type: object_type.into(),
            x,
            y,
            flip_x: false,
            origin_x: None,
            origin_y: None,
        }
    }

    /// Set horizontal flip
    pub fn with_flip_x(mut self, flip: bool) -> Self {
        self.flip_x = flip;
        self
    }

    /// Override the origin fractions
    pub fn with_origin(mut self, x: Option<f64>, y: Option<f64>) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Grid depth key: cells further down-screen have a larger sum
    pub fn depth_key(&self) -> i32 {
        self.x + self.y
    }
}

/// One map of the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMap {
    /// Map id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Column count
    pub width: u32,
    /// Row count
    pub height: u32,
    /// Tiles, in draw order
    #[serde(default)]
    pub map_tiles: Vec<Tile>,
    /// Placed objects
    #[serde(default)]
    pub map_objects: Vec<MapObjectInstance>,
}

impl TileMap {
    /// Create an empty map
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            width,
            height,
            map_tiles: Vec::new(),
            map_objects: Vec::new(),
        }
    }

    /// Add a tile
    pub fn with_tile(mut self, tile: Tile) -> Self {
        self.map_tiles.push(tile);
        self
    }

    /// Add an object
    pub fn with_object(mut self, object: MapObjectInstance) -> Self {
        self.map_objects.push(object);
        self
    }

    /// Name usable as a file stem (path separators replaced)
    pub fn file_stem(&self) -> String {
        self.name.replace(['/', '\\'], "_")
    }
}
