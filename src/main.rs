use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use mapmark::annotator::Annotator;
use mapmark::geo::ImageRef;
use mapmark::surface::{RasterLoader, RasterSurface};
use mapmark::{Config, script};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mapmark")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MAPMARK_GIT_HASH"), ")"),
    about = "Pin, circle and freehand polygon annotations over an image map"
)]
struct Cli {
    /// Configuration file (defaults to ~/.config/mapmark/config.toml)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an annotation file over the base image to PNG
    Render {
        /// Annotation payload ({"data": [...]})
        #[arg(long, short = 'a', value_name = "FILE")]
        annotations: PathBuf,

        /// Output PNG
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Replay recorded host events and print the resulting annotations
    Replay {
        /// Event script (JSON array of events)
        #[arg(long, short = 's', value_name = "FILE")]
        script: PathBuf,

        /// Annotations to load before replaying
        #[arg(long, short = 'a', value_name = "FILE")]
        annotations: Option<PathBuf>,

        /// Also render the final state to this PNG
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ImageArgs {
    /// Base image (PNG) to annotate instead of the configured overlay
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Image bounds in map units as HEIGHT,WIDTH
    #[arg(long, value_name = "H,W", value_parser = parse_bounds)]
    bounds: Option<[f64; 2]>,
}

impl ImageArgs {
    fn resolve(&self, config: &Config) -> ImageRef {
        let mut image = config.base_image();
        if let Some(path) = &self.image {
            image.url = path.display().to_string();
        }
        if let Some(bounds) = self.bounds {
            image.bounds = bounds;
        }
        image
    }
}

fn parse_bounds(value: &str) -> Result<[f64; 2], String> {
    let (height, width) = value
        .split_once(',')
        .ok_or_else(|| format!("expected HEIGHT,WIDTH, got '{value}'"))?;
    let parse = |part: &str| -> Result<f64, String> {
        let number: f64 = part
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", part.trim()))?;
        if number.is_finite() && number > 0.0 {
            Ok(number)
        } else {
            Err(format!("bounds must be positive, got {number}"))
        }
    };
    Ok([parse(height)?, parse(width)?])
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            annotations,
            output,
            image,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let image = image.resolve(&config);
            let payload = script::load_payload(&annotations)?;
            let mut annotator = open(&config, image)?;
            annotator.populate_markers(payload);
            write_png(&annotator, &output)?;
        }
        Command::Replay {
            script: script_path,
            annotations,
            output,
            image,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let image = image.resolve(&config);
            let events = script::load_script(&script_path)?;
            let mut annotator = open(&config, image)?;
            if let Some(path) = annotations {
                annotator.populate_markers(script::load_payload(&path)?);
            }
            script::replay(&mut annotator, &events);

            let json = annotator
                .snapshot()
                .to_json_pretty()
                .context("Failed to serialize annotations")?;
            println!("{json}");

            if let Some(output) = output {
                write_png(&annotator, &output)?;
            }
        }
        Command::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::get_config_path()?,
            };
            init_config(&path, force)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Loads a raster surface for `image` and places it under a new annotator.
fn open(config: &Config, image: ImageRef) -> Result<Annotator<RasterSurface>> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let loader = RasterLoader::new()
        .preload(&image)
        .preload_url(&config.marker.icon_url);
    let mut annotator = Annotator::new(config, Vec::new(), vec![image]);
    runtime
        .block_on(annotator.initialize(&loader))
        .context("Failed to initialize map surface")?;
    Ok(annotator)
}

fn write_png(annotator: &Annotator<RasterSurface>, output: &Path) -> Result<()> {
    let surface = annotator
        .surface()
        .context("Map surface is not initialized")?;
    let mut file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    surface
        .render_png(&mut file)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
