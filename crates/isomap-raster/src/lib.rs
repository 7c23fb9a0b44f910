//! isomap raster backend
//!
//! Renders one isometric tile map into a single RGBA frame:
//!
//! 1. [`tiles`] draws the tile grid onto a transparent base canvas.
//! 2. [`placer`] resolves every object to a sprite, pixel position and
//!    bounding box, tracking how far sprites reach past the grid.
//! 3. [`depth`] orders the objects back to front using depth-point dividers.
//! 4. [`compositor`] pads the canvas and composites everything.
//!
//! The pipeline is synchronous and does no I/O. Textures come in already
//! decoded through a [`TextureSource`].

pub mod compositor;
pub mod depth;
pub mod error;
pub mod placer;
pub mod projector;
pub mod renderer;
pub mod texture;
pub mod tiles;

pub use compositor::Padding;
pub use error::{RenderError, RenderWarning};
pub use placer::{Bounds, BoundingBox, PlacedObject};
pub use renderer::{MapRenderer, RenderedMap};
pub use texture::{MemoryTextures, TextureCache, TextureSource};
