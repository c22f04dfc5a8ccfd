//! Command-line entry point: discover images, load their annotations, split
//! 80/20, and export the training and validation archives.

use clap::Parser;
use log::warn;
use std::path::PathBuf;

use boxlabel::config::{AppConfig, add_recent_export, load_config, save_config};
use boxlabel::export::export_split;
use boxlabel::state::{build_collection, discover_images, find_data_dir};

/// Export drawn annotations as COCO training/validation archives.
#[derive(Debug, Parser)]
#[command(name = "boxlabel", version, about)]
struct Args {
    /// Folder containing the images and their annotation sidecars
    #[arg(long)]
    image_root: Option<String>,

    /// Folder that receives the training and validation archives
    #[arg(long)]
    output_root: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut config = load_config();

    let image_root = resolve_image_root(&args, &config)?;
    let output_root = args
        .output_root
        .as_deref()
        .or(config.export.output_root.as_deref())
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .unwrap_or_else(|| PathBuf::from("."));

    let pairs = discover_images(&image_root)?;
    let collection = build_collection(pairs)?;

    let result = export_split(collection, &output_root)?;

    println!("Training Data Set Size: {}", result.training_size);
    println!("Validation Data Set Size: {}", result.validation_size);

    // Remembering the output folder is best-effort; the export already
    // succeeded.
    add_recent_export(&mut config, output_root.display().to_string());
    if let Err(e) = save_config(&config) {
        warn!("{e}");
    }

    Ok(())
}

fn resolve_image_root(args: &Args, config: &AppConfig) -> Result<PathBuf, String> {
    if let Some(root) = args
        .image_root
        .as_deref()
        .or(config.data.image_root.as_deref())
    {
        return Ok(PathBuf::from(shellexpand::tilde(root).as_ref()));
    }

    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to determine working directory: {e}"))?;
    find_data_dir(&cwd, &config.data.data_dir_name).ok_or_else(|| {
        format!(
            "No '{}' directory found under {}",
            config.data.data_dir_name,
            cwd.display()
        )
    })
}
