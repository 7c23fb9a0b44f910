//! isomap CLI - isometric map exporter
//!
//! Renders every map of a data bundle to layered-and-sorted PNG images at
//! several resolutions, plus a metadata index for the map viewer.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod bundle;
mod commands;
mod export;

use commands::render::RenderOptions;
use export::{ExportConfig, ResolutionTier};

/// isomap - isometric map exporter
#[derive(Parser)]
#[command(name = "isomap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render maps of a bundle and export them
    Render {
        /// Bundle directory (containing data/ and textures/)
        bundle: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "maps")]
        out: PathBuf,

        /// Only render the map with this id (repeatable)
        #[arg(short, long = "map")]
        maps: Vec<String>,

        /// Resolution tier as NAME=DIVISOR (repeatable, replaces the defaults)
        #[arg(short, long = "tier")]
        tiers: Vec<ResolutionTier>,

        /// Maps rendered in parallel (defaults to the CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,
    },

    /// List the maps of a bundle
    List {
        /// Bundle directory
        bundle: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Render {
            bundle,
            out,
            maps,
            tiers,
            jobs,
            overwrite,
        } => {
            let mut config = ExportConfig {
                output_dir: out,
                overwrite,
                ..Default::default()
            };
            if !tiers.is_empty() {
                config.tiers = tiers;
            }

            let mut options = RenderOptions {
                only: maps,
                ..Default::default()
            };
            if let Some(jobs) = jobs {
                options.jobs = jobs;
            }

            commands::render::run(&bundle, config, options).await?;
        }

        Commands::List { bundle } => {
            commands::list::run(&bundle)?;
        }
    }

    Ok(())
}
