use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use iso_raster::{import::load_tileset, persist, render};

/// Render an isometric block map to PNG
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Map description (JSON)
    map: PathBuf,

    /// Output path for the indexed PNG
    output: PathBuf,

    /// Also write a true-color RGBA PNG here
    #[arg(long)]
    rgba: Option<PathBuf>,

    /// Opacity cap for low-priority pixels in the RGBA output
    #[arg(long, default_value_t = 255)]
    low_priority_opacity: u8,

    /// Opacity cap for high-priority pixels in the RGBA output
    #[arg(long, default_value_t = 255)]
    high_priority_opacity: u8,
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let map = persist::load_map(&args.map)?;
    let tileset = load_tileset(&map.tileset)?;
    let palettes = render::map_palettes(&map);
    let buffer = render::render_map(&map, &tileset)
        .with_context(|| format!("Unable to render {}", args.map.display()))?;

    buffer.write_png(&args.output, &palettes)?;
    if let Some(path) = &args.rgba {
        let bitmap = buffer.make_bitmap(
            &palettes,
            true,
            args.low_priority_opacity,
            args.high_priority_opacity,
        );
        persist::save_rgba_png(path, &bitmap)?;
    }
    info!("Done.");
    Ok(())
}
