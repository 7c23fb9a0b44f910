//! Render errors and warnings

use thiserror::Error;

/// Fatal render errors. The map produces no image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("map '{map}': missing tile texture '{tile_type}'")]
    MissingTileTexture { map: String, tile_type: String },
}

/// Recoverable conditions. The offending object is skipped and the map
/// still renders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderWarning {
    #[error("map '{map}': unknown object type '{object_type}'")]
    UnknownObjectType { map: String, object_type: String },

    #[error("map '{map}': missing object texture '{object_type}'")]
    MissingObjectTexture { map: String, object_type: String },
}

impl RenderWarning {
    /// Object type id the warning refers to
    pub fn object_type(&self) -> &str {
        match self {
            Self::UnknownObjectType { object_type, .. }
            | Self::MissingObjectTexture { object_type, .. } => object_type,
        }
    }
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
