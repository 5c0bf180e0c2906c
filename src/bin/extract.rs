use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image_theme_palette::{ExtractConfig, Palette, Shades, ThemeStore, try_extract};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Extract theme palettes from images and print them as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON file with extraction settings (missing keys keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fix the k-means seed for repeatable output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Include 13-step tone ramps for every role
    #[arg(long)]
    shades: bool,

    /// Include CSS custom properties
    #[arg(long)]
    css: bool,

    /// Register each palette's semantic tokens as a theme in this store file
    #[arg(long)]
    theme_store: Option<PathBuf>,

    /// Fail on undecodable or colorless images instead of printing the fallback palette
    #[arg(long)]
    strict: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => ExtractConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut store = args.theme_store.as_ref().map(ThemeStore::open);

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let palette = match try_extract(bytes, &config) {
            Ok(palette) => palette,
            Err(e) if args.strict => {
                return Err(e).with_context(|| format!("extracting palette from {}", input.display()));
            }
            Err(e) => {
                info!(input = %input.display(), error = %e, "using fallback palette");
                Palette::fallback()
            }
        };

        let shades = Shades::generate(&palette);
        let mut doc = json!({
            "input": input.display().to_string(),
            "palette": palette,
        });
        if args.shades {
            doc["shades"] = serde_json::to_value(&shades)?;
        }
        if args.css {
            let mut vars = serde_json::Map::new();
            for (k, v) in palette.to_css_variables() {
                vars.insert(k, v.into());
            }
            doc["css"] = vars.into();
        }

        if let Some(store) = store.as_mut() {
            let name = input.file_stem().unwrap_or_default().to_string_lossy().to_string();
            store
                .register(&name, shades.semantic_tokens())
                .with_context(|| format!("saving theme {name}"))?;
            info!(theme = %name, "registered theme");
        }

        println!("{}", serde_json::to_string_pretty(&doc)?);
    }

    Ok(())
}
