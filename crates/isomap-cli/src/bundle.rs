//! Data bundle loading
//!
//! A bundle directory holds the JSON map data and the PNG textures the
//! renderer consumes:
//!
//! ```text
//! <bundle>/data/maps.json
//! <bundle>/data/mapObjects.json
//! <bundle>/textures/mapTiles/<tile type>.png
//! <bundle>/textures/mapObjects/<object type>.png
//! ```

use isomap_core::{FrameError, ImageFrame, MapObjectType, ObjectCatalog, TileMap};
use isomap_raster::TextureSource;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Bundle errors
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Bundle file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Cannot decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),
}

/// File locations inside a bundle, relative to its root
#[derive(Debug, Clone)]
pub struct BundleLayout {
    pub maps_file: PathBuf,
    pub object_types_file: PathBuf,
    pub tile_textures_dir: PathBuf,
    pub object_textures_dir: PathBuf,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            maps_file: PathBuf::from("data/maps.json"),
            object_types_file: PathBuf::from("data/mapObjects.json"),
            tile_textures_dir: PathBuf::from("textures/mapTiles"),
            object_textures_dir: PathBuf::from("textures/mapObjects"),
        }
    }
}

/// Map data loaded from a bundle
#[derive(Debug)]
pub struct Bundle {
    pub root: PathBuf,
    pub layout: BundleLayout,
    pub maps: Vec<TileMap>,
    pub catalog: ObjectCatalog,
}

impl Bundle {
    /// Load a bundle with the default layout
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, BundleError> {
        Self::load_with_layout(root, BundleLayout::default())
    }

    pub fn load_with_layout(
        root: impl Into<PathBuf>,
        layout: BundleLayout,
    ) -> Result<Self, BundleError> {
        let root = root.into();

        let maps: Vec<TileMap> = read_json(&root.join(&layout.maps_file))?;
        let object_types: Vec<MapObjectType> = read_json(&root.join(&layout.object_types_file))?;
        let catalog: ObjectCatalog = object_types.into_iter().collect();

        debug!(
            root = %root.display(),
            maps = maps.len(),
            object_types = catalog.len(),
            "Bundle loaded"
        );

        Ok(Self {
            root,
            layout,
            maps,
            catalog,
        })
    }

    /// Texture source reading this bundle's texture directories
    pub fn textures(&self) -> DirTextureSource {
        DirTextureSource::new(
            self.root.join(&self.layout.tile_textures_dir),
            self.root.join(&self.layout.object_textures_dir),
        )
    }

    /// Look up a map by id
    pub fn map(&self, id: &str) -> Option<&TileMap> {
        self.maps.iter().find(|m| m.id == id)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BundleError> {
    if !path.exists() {
        return Err(BundleError::NotFound(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| BundleError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a PNG (or any format `image` recognizes) into an RGBA frame
pub fn decode_texture(path: &Path) -> Result<ImageFrame, BundleError> {
    let img = image::open(path)
        .map_err(|source| BundleError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let (width, height) = img.dimensions();
    Ok(ImageFrame::from_rgba8(width, height, img.into_raw())?)
}

/// Textures decoded on demand from `<dir>/<id>.png`
#[derive(Debug, Clone)]
pub struct DirTextureSource {
    tiles_dir: PathBuf,
    objects_dir: PathBuf,
}

impl DirTextureSource {
    pub fn new(tiles_dir: impl Into<PathBuf>, objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            tiles_dir: tiles_dir.into(),
            objects_dir: objects_dir.into(),
        }
    }

    fn load(dir: &Path, id: &str) -> Option<ImageFrame> {
        let path = dir.join(format!("{id}.png"));
        if !path.exists() {
            return None;
        }

        match decode_texture(&path) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "Treating undecodable texture as missing");
                None
            }
        }
    }
}

impl TextureSource for DirTextureSource {
    fn tile_texture(&self, id: &str) -> Option<ImageFrame> {
        Self::load(&self.tiles_dir, id)
    }

    fn object_texture(&self, id: &str) -> Option<ImageFrame> {
        Self::load(&self.objects_dir, id)
    }
}
