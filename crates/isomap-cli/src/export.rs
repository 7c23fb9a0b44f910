//! Map image export
//!
//! Every rendered map is written once per resolution tier, and a
//! `metadata.json` index describes all exported maps for the map viewer.

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use isomap_core::ImageFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Output file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Maps '{first}' and '{second}' would both be written to {file}")]
    DuplicateOutput {
        file: String,
        first: String,
        second: String,
    },

    #[error("Cannot export an empty {0}x{1} frame")]
    EmptyFrame(u32, u32),

    #[error("Frame buffer does not match its dimensions")]
    InvalidFrame,

    #[error("Image encoding failed for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One output resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTier {
    /// Subdirectory name
    pub name: String,
    /// Integer downscale factor (1 = full size)
    pub divisor: u32,
}

impl ResolutionTier {
    pub fn new(name: impl Into<String>, divisor: u32) -> Self {
        Self {
            name: name.into(),
            divisor: divisor.max(1),
        }
    }

    /// Output size for a `width` x `height` frame, never below 1x1
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        ((width / self.divisor).max(1), (height / self.divisor).max(1))
    }

    /// The standard tier set: full, 1/2, 1/3, 1/4, 1/5
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("default", 1),
            Self::new("low", 2),
            Self::new("small", 3),
            Self::new("tiny", 4),
            Self::new("micro", 5),
        ]
    }
}

impl FromStr for ResolutionTier {
    type Err = String;

    /// Parse `name=divisor`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, divisor) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=DIVISOR, got '{s}'"))?;

        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(format!("invalid tier name '{name}'"));
        }

        let divisor: u32 = divisor
            .trim()
            .parse()
            .map_err(|e| format!("invalid divisor '{divisor}': {e}"))?;
        if divisor == 0 {
            return Err("divisor must be at least 1".to_string());
        }

        Ok(Self::new(name, divisor))
    }
}

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Root output directory
    pub output_dir: PathBuf,
    /// Resolutions to write
    pub tiers: Vec<ResolutionTier>,
    /// Replace existing files instead of failing
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("maps"),
            tiers: ResolutionTier::defaults(),
            overwrite: false,
        }
    }
}

impl ExportConfig {
    /// Path of a map image within a tier
    pub fn tier_path(&self, tier: &ResolutionTier, file_name: &str) -> PathBuf {
        self.output_dir.join(&tier.name).join(file_name)
    }

    /// Path of the metadata index
    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join("metadata.json")
    }
}

/// Image file name for a map file stem
pub fn output_file_name(stem: &str) -> String {
    format!("{stem}.png")
}

/// Write `frame` once per tier as `<tier>/<stem>.png` and return the file name.
///
/// Existing files are checked for every tier before the first one is
/// written.
pub fn export_map(frame: &ImageFrame, stem: &str, config: &ExportConfig) -> Result<String, ExportError> {
    if frame.is_empty() {
        return Err(ExportError::EmptyFrame(frame.width, frame.height));
    }

    let file_name = output_file_name(stem);
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or(ExportError::InvalidFrame)?;

    let targets: Vec<(&ResolutionTier, PathBuf)> = config
        .tiers
        .iter()
        .map(|tier| (tier, config.tier_path(tier, &file_name)))
        .collect();

    if !config.overwrite {
        if let Some((_, path)) = targets.iter().find(|(_, path)| path.exists()) {
            return Err(ExportError::AlreadyExists(path.clone()));
        }
    }

    for (tier, path) in targets {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (width, height) = tier.scaled_size(frame.width, frame.height);
        let result = if tier.divisor == 1 {
            image.save_with_format(&path, ImageFormat::Png)
        } else {
            imageops::resize(&image, width, height, FilterType::CatmullRom)
                .save_with_format(&path, ImageFormat::Png)
        };
        result.map_err(|source| ExportError::Encode {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), width, height, "Tier written");
    }

    Ok(file_name)
}

/// One entry of the map viewer index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Map id
    pub id: String,
    /// Image file name within each tier directory
    pub file: String,
    /// Full-resolution size `[width, height]`
    pub size: [u32; 2],
    /// Viewer placement `[x, y]`, maintained by hand
    #[serde(default)]
    pub pos: [i64; 2],
}

impl MapMetadata {
    pub fn new(id: impl Into<String>, file: impl Into<String>, size: (u32, u32)) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            size: [size.0, size.1],
            pos: [0, 0],
        }
    }
}

/// Merge freshly exported entries into a previous index.
///
/// Exported entries replace previous ones with the same id but keep their
/// `pos`; previous entries that were not exported stay as they are. The
/// result is sorted by case-folded id.
pub fn merge_metadata(mut entries: Vec<MapMetadata>, previous: &[MapMetadata]) -> Vec<MapMetadata> {
    for entry in &mut entries {
        if let Some(old) = previous.iter().find(|old| old.id == entry.id) {
            entry.pos = old.pos;
        }
    }

    let kept: Vec<MapMetadata> = previous
        .iter()
        .filter(|old| !entries.iter().any(|e| e.id == old.id))
        .cloned()
        .collect();
    entries.extend(kept);

    entries.sort_by_key(|e| e.id.to_lowercase());
    entries
}

/// Write the metadata index at `path`, merged into an existing index there.
/// Returns the full index as written.
pub fn write_metadata(path: &Path, entries: Vec<MapMetadata>) -> Result<Vec<MapMetadata>, ExportError> {
    let previous: Vec<MapMetadata> = if path.exists() {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ExportError::Metadata {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        Vec::new()
    };

    let merged = merge_metadata(entries, &previous);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(&merged).map_err(|source| ExportError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');
    std::fs::write(path, json)?;

    Ok(merged)
}
