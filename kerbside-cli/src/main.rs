//! Shows roads and traffic signs of a region stored in CityGML files.
//!
//! # Usage
//!
//! ```bash
//! kerbside /data/city area.geojson --road-function 1
//! kerbside /data/city area.geojson --output area.png --size 1024
//! ```
//!
//! The working directory is expected to contain `Road Kerb` and `Traffic Sign` subdirectories with
//! `.gml` files, unless other directories are given with options or in the configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kerbside::{EnvironmentConfig, FeatureCategory, ImageRenderer, RegionFilter, Renderer};
use kerbside_egui::EguiRenderer;

#[derive(Debug, Parser)]
#[command(name = "kerbside")]
#[command(about = "Show roads and traffic signs of a region stored in CityGML files")]
struct Args {
    /// Directory with the default `Road Kerb` and `Traffic Sign` subdirectories
    working_dir: PathBuf,

    /// GeoJSON file with the region of interest
    region: PathBuf,

    /// Directory with road files
    #[arg(long)]
    road_dir: Option<PathBuf>,

    /// Directory with traffic sign files
    #[arg(long)]
    traffic_sign_dir: Option<PathBuf>,

    /// Load only roads with this `function` code
    #[arg(long)]
    road_function: Option<i64>,

    /// Load only traffic signs with this `function` code
    #[arg(long)]
    traffic_sign_function: Option<i64>,

    /// JSON configuration file. Command line options take precedence over its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a PNG image to this file instead of opening a window
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Width and height of the view in pixels
    #[arg(long)]
    size: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(&Args::parse())
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    let region = RegionFilter::from_geojson_file(&args.region)
        .with_context(|| format!("failed to load region from {}", args.region.display()))?;
    let env = config.build_environment(region, &args.working_dir);

    let polygons = env.generate_all()?;
    log::info!("Found {} polygons in the region", polygons.len());
    if polygons.is_empty() {
        log::warn!("Nothing to show in the region");
    }

    match &args.output {
        Some(path) => ImageRenderer::new(path).render(&polygons, &config.render)?,
        None => EguiRenderer::new().render(&polygons, &config.render)?,
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<EnvironmentConfig> {
    let mut config = match &args.config {
        Some(path) => EnvironmentConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => EnvironmentConfig::default(),
    };

    if args.road_dir.is_some() || args.traffic_sign_dir.is_some() {
        let mut directories = config.directories_in(&args.working_dir);
        if let Some(dir) = &args.road_dir {
            directories = directories.with(FeatureCategory::Road, dir);
        }
        if let Some(dir) = &args.traffic_sign_dir {
            directories = directories.with(FeatureCategory::TrafficSign, dir);
        }

        config.directories = Some(directories);
    }

    if args.road_function.is_some() {
        config.road_function = args.road_function;
    }
    if args.traffic_sign_function.is_some() {
        config.traffic_sign_function = args.traffic_sign_function;
    }
    if let Some(size) = args.size {
        config.render.size = [size, size];
    }

    Ok(config)
}
