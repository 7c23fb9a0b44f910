//! Tile layer
//!
//! Tiles never overlap, so they are composited in input order with no
//! sorting.

use crate::compositor::alpha_over;
use crate::error::{RenderError, Result};
use crate::projector::{base_canvas_size, tile_position};
use crate::texture::TextureCache;
use isomap_core::{ImageFrame, TileMap};
use tracing::debug;

/// Draw every tile of `map` onto a transparent base canvas.
///
/// Fails on the first tile whose texture cannot be resolved; no partial
/// canvas is returned.
pub fn compose_tiles(map: &TileMap, textures: &mut TextureCache<'_>) -> Result<ImageFrame> {
    let (width, height) = base_canvas_size(map.width, map.height);
    let mut canvas = ImageFrame::new_rgba8(width, height);

    for tile in &map.map_tiles {
        let texture = textures
            .tile(&tile.tile_type)
            .ok_or_else(|| RenderError::MissingTileTexture {
                map: map.id.clone(),
                tile_type: tile.tile_type.clone(),
            })?;

        let (x, y) = tile_position(tile.x, tile.y, map.height);
        alpha_over(&mut canvas, &texture, x as i64, y as i64);
    }

    debug!(
        map = %map.id,
        tiles = map.map_tiles.len(),
        width,
        height,
        "Tile layer composited"
    );

    Ok(canvas)
}
