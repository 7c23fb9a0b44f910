//! Object placement
//!
//! Resolves each object instance to a sprite and a pixel rectangle, and
//! precomputes everything the depth sorter needs so that comparisons never
//! touch projection math.

use crate::depth::Divider;
use crate::error::RenderWarning;
use crate::projector::{ScreenPoint, object_anchor};
use crate::texture::TextureCache;
use isomap_core::{ImageFrame, MapObjectInstance, MapObjectType, ObjectCatalog, TileMap};
use std::sync::Arc;
use tracing::warn;

/// Axis-aligned pixel rectangle, `(x1, y1)` inclusive top-left to
/// `(x2, y2)` bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl BoundingBox {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Closed-box intersection; boxes sharing only an edge intersect
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.x2 < other.x1 || self.x1 > other.x2 || self.y2 < other.y1 || self.y1 > other.y2)
    }
}

/// Running extremes of everything drawn, seeded with the base canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Bounds {
    /// Bounds of an empty `width` x `height` canvas
    pub fn from_base(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width as i64,
            max_y: height as i64,
        }
    }

    /// Grow to include a box
    pub fn include(self, bbox: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.min(bbox.x1),
            min_y: self.min_y.min(bbox.y1),
            max_x: self.max_x.max(bbox.x2),
            max_y: self.max_y.max(bbox.y2),
        }
    }
}

/// An object instance resolved to screen space
#[derive(Debug, Clone)]
pub struct PlacedObject<'a> {
    pub instance: &'a MapObjectInstance,
    pub object_type: &'a MapObjectType,
    /// Sprite as drawn (already mirrored for flipped instances)
    pub sprite: Arc<ImageFrame>,
    /// Screen point the origin fraction aligns to
    pub anchor: ScreenPoint,
    /// Top-left pixel
    pub position: (i64, i64),
    pub bbox: BoundingBox,
    /// Occlusion line in screen space, for types with two or more depth points
    pub divider: Option<Divider>,
    /// Point tested against other objects' dividers
    pub representative: ScreenPoint,
}

impl<'a> PlacedObject<'a> {
    /// Derive the bounding box and occlusion data for a sprite at `position`
    pub fn new(
        instance: &'a MapObjectInstance,
        object_type: &'a MapObjectType,
        sprite: Arc<ImageFrame>,
        anchor: ScreenPoint,
        position: (i64, i64),
    ) -> Self {
        let bbox = BoundingBox::new(
            position.0,
            position.1,
            position.0 + sprite.width as i64,
            position.1 + sprite.height as i64,
        );

        Self {
            instance,
            object_type,
            sprite,
            anchor,
            position,
            bbox,
            divider: Divider::from_depth_points(anchor, &object_type.depth_points),
            representative: representative_point(anchor, object_type),
        }
    }

    /// Grid depth key used when no divider decides
    pub fn depth_key(&self) -> i32 {
        self.instance.depth_key()
    }
}

/// Output of the placement step
#[derive(Debug)]
pub struct Placement<'a> {
    /// Placed objects in input order
    pub objects: Vec<PlacedObject<'a>>,
    pub bounds: Bounds,
    pub warnings: Vec<RenderWarning>,
}

/// Top-left pixel of a sprite whose origin fraction sits on `anchor`.
///
/// Each axis is rounded half-to-even.
pub fn sprite_position(anchor: ScreenPoint, origin: (f64, f64), size: (u32, u32)) -> (i64, i64) {
    let x = anchor.x - origin.0 * size.0 as f64;
    let y = anchor.y - origin.1 * size.1 as f64;
    (x.round_ties_even() as i64, y.round_ties_even() as i64)
}

/// Anchor, or anchor plus the mean of the local depth points
fn representative_point(anchor: ScreenPoint, object_type: &MapObjectType) -> ScreenPoint {
    let points = &object_type.depth_points;
    if points.is_empty() {
        return anchor;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    anchor.offset(mean_x, mean_y)
}

/// Place every object of `map`, skipping (with a warning) instances whose
/// type or sprite cannot be resolved.
pub fn place_objects<'a>(
    map: &'a TileMap,
    catalog: &'a ObjectCatalog,
    textures: &mut TextureCache<'_>,
    base_size: (u32, u32),
) -> Placement<'a> {
    let rows = map.height;
    let mut objects = Vec::with_capacity(map.map_objects.len());
    let mut warnings = Vec::new();
    let mut bounds = Bounds::from_base(base_size.0, base_size.1);

    for instance in &map.map_objects {
        let Some(object_type) = catalog.get(&instance.object_type) else {
            let warning = RenderWarning::UnknownObjectType {
                map: map.id.clone(),
                object_type: instance.object_type.clone(),
            };
            warn!(map = %map.id, object_type = %instance.object_type, "{}", warning);
            warnings.push(warning);
            continue;
        };

        let Some(base_sprite) = textures.object(&object_type.id) else {
            let warning = RenderWarning::MissingObjectTexture {
                map: map.id.clone(),
                object_type: object_type.id.clone(),
            };
            warn!(map = %map.id, object_type = %object_type.id, "{}", warning);
            warnings.push(warning);
            continue;
        };

        let sprite = if instance.flip_x {
            Arc::new(base_sprite.flipped_horizontal())
        } else {
            base_sprite
        };

        let anchor = object_anchor(instance.x, instance.y, rows);
        let origin = (
            instance.origin_x.unwrap_or(object_type.origin_x),
            instance.origin_y.unwrap_or(object_type.origin_y),
        );
        let position = sprite_position(anchor, origin, sprite.dimensions());
        let placed = PlacedObject::new(instance, object_type, sprite, anchor, position);

        bounds = bounds.include(&placed.bbox);
        objects.push(placed);
    }

    Placement {
        objects,
        bounds,
        warnings,
    }
}
