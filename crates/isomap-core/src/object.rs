//! Object type catalog
//!
//! Object types carry the default sprite origin and the optional depth-point
//! polyline used to resolve occlusion between overlapping sprites.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point in an object's local pixel space, relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthPoint {
    pub x: f64,
    pub y: f64,
}

impl DepthPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Reference metadata for an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObjectType {
    /// Type id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Default horizontal origin fraction (0-1)
    pub origin_x: f64,
    /// Default vertical origin fraction (0-1)
    pub origin_y: f64,
    /// Occlusion polyline, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depth_points: Vec<DepthPoint>,
}

impl MapObjectType {
    /// Create a type with the given default origin and no depth points
    pub fn new(id: impl Into<String>, origin_x: f64, origin_y: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            origin_x,
            origin_y,
            depth_points: Vec::new(),
        }
    }

    /// Set the depth-point polyline
    pub fn with_depth_points(mut self, points: Vec<DepthPoint>) -> Self {
        self.depth_points = points;
        self
    }
}

/// Object types by id
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    types: HashMap<String, MapObjectType>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, replacing any previous type with the same id
    pub fn insert(&mut self, object_type: MapObjectType) {
        self.types.insert(object_type.id.clone(), object_type);
    }

    pub fn get(&self, id: &str) -> Option<&MapObjectType> {
        self.types.get(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<MapObjectType> for ObjectCatalog {
    fn from_iter<I: IntoIterator<Item = MapObjectType>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for object_type in iter {
            catalog.insert(object_type);
        }
        catalog
    }
}
