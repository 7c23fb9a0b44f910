//! Render command
//!
//! Renders maps of a bundle in parallel on the blocking thread pool and
//! exports each one at every resolution tier.

use crate::bundle::Bundle;
use crate::export::{
    ExportConfig, ExportError, MapMetadata, export_map, output_file_name, write_metadata,
};
use isomap_core::TileMap;
use isomap_raster::{MapRenderer, RenderError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Failure of a single map
#[derive(Debug, Error)]
pub enum MapJobError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Summary of a render run
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub rendered: Vec<MapMetadata>,
    pub failed: Vec<String>,
    pub warnings: usize,
}

/// Run options beyond the export configuration
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Only render these map ids (all maps when empty)
    pub only: Vec<String>,
    /// Maximum maps rendered at once
    pub jobs: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

fn render_one(
    bundle: &Bundle,
    index: usize,
    config: &ExportConfig,
) -> Result<(MapMetadata, usize), MapJobError> {
    let map = &bundle.maps[index];
    let textures = bundle.textures();
    let rendered = MapRenderer::new(&bundle.catalog, &textures).render(map)?;

    let file = export_map(&rendered.frame, &map.file_stem(), config)?;
    let metadata = MapMetadata::new(map.id.clone(), file, rendered.dimensions());

    Ok((metadata, rendered.warnings.len()))
}

/// Refuse a run in which two maps would write the same image file
fn check_unique_outputs<'a>(maps: impl IntoIterator<Item = &'a TileMap>) -> Result<(), ExportError> {
    let mut owners: HashMap<String, &str> = HashMap::new();

    for map in maps {
        let file = output_file_name(&map.file_stem());
        if let Some(first) = owners.get(&file) {
            return Err(ExportError::DuplicateOutput {
                file,
                first: first.to_string(),
                second: map.id.clone(),
            });
        }
        owners.insert(file, &map.id);
    }

    Ok(())
}

/// Render and export, returning what succeeded and what failed
pub async fn render_bundle(
    bundle: Bundle,
    config: ExportConfig,
    options: RenderOptions,
) -> Result<RenderSummary, Box<dyn std::error::Error>> {
    let bundle = Arc::new(bundle);
    let config = Arc::new(config);
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));

    for id in &options.only {
        if bundle.map(id).is_none() {
            warn!(map = %id, "Requested map not in bundle");
        }
    }

    let selected: Vec<usize> = bundle
        .maps
        .iter()
        .enumerate()
        .filter(|(_, m)| options.only.is_empty() || options.only.contains(&m.id))
        .map(|(i, _)| i)
        .collect();
    let total = selected.len();
    check_unique_outputs(selected.iter().map(|&i| &bundle.maps[i]))?;

    let mut tasks = JoinSet::new();
    for index in selected {
        let permit = semaphore.clone().acquire_owned().await?;
        let bundle = bundle.clone();
        let config = config.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let id = bundle.maps[index].id.clone();
            (id, render_one(&bundle, index, &config))
        });
    }

    let mut summary = RenderSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (id, result) = joined?;
        match result {
            Ok((metadata, warnings)) => {
                summary.warnings += warnings;
                summary.rendered.push(metadata);
                info!(
                    map = %id,
                    done = summary.rendered.len() + summary.failed.len(),
                    total,
                    "Map exported"
                );
            }
            Err(e) => {
                error!(map = %id, error = %e, "Map failed");
                summary.failed.push(id);
            }
        }
    }

    summary.rendered.sort_by_key(|m| m.id.to_lowercase());
    let index = write_metadata(&config.metadata_path(), summary.rendered.clone())?;
    debug!(entries = index.len(), "Metadata index written");

    Ok(summary)
}

pub async fn run(
    bundle_dir: &Path,
    config: ExportConfig,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading bundle from {}", bundle_dir.display());
    let bundle = Bundle::load(bundle_dir)?;
    let output_dir = config.output_dir.clone();

    let summary = render_bundle(bundle, config, options).await?;

    info!(
        rendered = summary.rendered.len(),
        failed = summary.failed.len(),
        skipped_objects = summary.warnings,
        "Export finished in {}",
        output_dir.display()
    );

    if !summary.failed.is_empty() {
        return Err(format!("{} map(s) failed: {}", summary.failed.len(), summary.failed.join(", ")).into());
    }

    Ok(())
}
