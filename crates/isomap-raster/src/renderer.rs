//! Single-map render session
//!
//! ```text
//! TileMap ─► compose_tiles ─────────────────────────────┐
//!        └─► place_objects ─► sort_back_to_front ─► compose_canvas ─► ImageFrame
//! ```
//!
//! Each call to [`MapRenderer::render`] owns its texture cache and
//! intermediate buffers; nothing carries over between maps.

use crate::compositor::{Padding, compose_canvas};
use crate::depth::sort_back_to_front;
use crate::error::{RenderWarning, Result};
use crate::placer::place_objects;
use crate::projector::base_canvas_size;
use crate::texture::{TextureCache, TextureSource};
use crate::tiles::compose_tiles;
use isomap_core::{ImageFrame, ObjectCatalog, TileMap};
use std::time::Instant;
use tracing::{Level, debug, span};

/// A fully composited map
#[derive(Debug, Clone)]
pub struct RenderedMap {
    /// Final image, base canvas plus padding
    pub frame: ImageFrame,
    /// Margin added around the tile grid
    pub padding: Padding,
    /// Size of the unpadded tile grid canvas
    pub base_size: (u32, u32),
    /// Objects actually drawn
    pub objects_drawn: usize,
    /// Objects skipped, and why
    pub warnings: Vec<RenderWarning>,
}

impl RenderedMap {
    /// Final image dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}

/// Renders maps against a shared object catalog and texture source
pub struct MapRenderer<'a> {
    catalog: &'a ObjectCatalog,
    textures: &'a dyn TextureSource,
}

impl<'a> MapRenderer<'a> {
    pub fn new(catalog: &'a ObjectCatalog, textures: &'a dyn TextureSource) -> Self {
        Self { catalog, textures }
    }

    /// Render one map.
    ///
    /// A missing tile texture aborts the render. Unknown object types and
    /// missing object sprites only skip the affected object and are
    /// reported in [`RenderedMap::warnings`].
    pub fn render(&self, map: &TileMap) -> Result<RenderedMap> {
        let span = span!(Level::DEBUG, "render_map", map = %map.id);
        let _enter = span.enter();

        let start = Instant::now();
        let mut cache = TextureCache::new(self.textures);

        let base = compose_tiles(map, &mut cache)?;
        let base_size = base_canvas_size(map.width, map.height);

        let placement = place_objects(map, self.catalog, &mut cache, base_size);
        let padding = Padding::from_bounds(&placement.bounds, base_size.0, base_size.1);
        let objects = sort_back_to_front(placement.objects);

        let frame = compose_canvas(&base, &objects, padding);

        debug!(
            objects = objects.len(),
            skipped = placement.warnings.len(),
            ?padding,
            width = frame.width,
            height = frame.height,
            cache_lookups = cache.stats().lookups,
            cache_hits = cache.stats().hits,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Map rendered"
        );

        Ok(RenderedMap {
            frame,
            padding,
            base_size,
            objects_drawn: objects.len(),
            warnings: placement.warnings,
        })
    }
}
