//! isomap core - map data and raster types
//!
//! Plain data shared by the renderer and its loaders. Nothing in this crate
//! touches the filesystem.
//!
//! ```text
//! maps.json        ─► TileMap       ─┐
//! mapObjects.json  ─► ObjectCatalog ─┼─► isomap-raster ─► ImageFrame
//! textures/*.png   ─► ImageFrame    ─┘
//! ```

pub mod frame;
pub mod map;
pub mod object;

pub use frame::{FrameError, ImageFrame};
pub use map::{MapObjectInstance, Tile, TileMap};
pub use object::{DepthPoint, MapObjectType, ObjectCatalog};
