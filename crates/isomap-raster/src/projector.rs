//! Isometric projection
//!
//! Grid cells are diamonds 64 pixels wide and 32 high. Column `x` runs
//! down-right and row `y` runs down-left on screen; the whole grid is shifted
//! right by `rows * 32` so that the left corner of the last row lands at
//! screen x = 0.

/// Half of a tile's screen width
pub const TILE_HALF_WIDTH: i32 = 32;
/// Half of a tile's screen height
pub const TILE_HALF_HEIGHT: i32 = 16;

/// A point in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a local offset
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Top-left pixel of a tile texture
pub fn tile_position(x: i32, y: i32, rows: u32) -> (i32, i32) {
    let screen_x = (x - y) * TILE_HALF_WIDTH - TILE_HALF_WIDTH + rows as i32 * TILE_HALF_WIDTH;
    let screen_y = (x + y) * TILE_HALF_HEIGHT;
    (screen_x, screen_y)
}

/// Screen anchor of an object standing on cell `(x, y)`.
///
/// This is the bottom corner of the cell's diamond, one row deeper than the
/// tile's top-left position.
pub fn object_anchor(x: i32, y: i32, rows: u32) -> ScreenPoint {
    let anchor_x = (x - y) * TILE_HALF_WIDTH + rows as i32 * TILE_HALF_WIDTH;
    let anchor_y = (x + y + 1) * TILE_HALF_HEIGHT;
    ScreenPoint::new(anchor_x as f64, anchor_y as f64)
}

/// Size of the canvas that exactly holds a `width` x `height` grid
pub fn base_canvas_size(width: u32, height: u32) -> (u32, u32) {
    let span = width + height;
    (
        span * TILE_HALF_WIDTH as u32,
        span * TILE_HALF_HEIGHT as u32,
    )
}
