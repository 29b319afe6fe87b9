use std::{fs, io::Write, path::Path};

use anyhow::{ensure, Context, Result};
use log::info;
use serde::de::DeserializeOwned;

use crate::{common::Palette, image_buffer::Bitmap, state::MapFile};

const MAX_PALETTES: usize = 16;

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes =
        fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("Unable to parse {}", path.display()))?;
    Ok(data)
}

// Writes only after the whole image has been encoded, so a failed export
// never leaves a truncated file behind.
fn save_bytes(path: &Path, data: &[u8]) -> Result<()> {
    info!("Saving {}", path.display());
    fs::write(path, data).with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(())
}

/// Color and transparency tables: 256 entries, 16 per palette, unused entries zero.
fn png_color_tables(palettes: &[Palette]) -> (Vec<u8>, Vec<u8>) {
    let mut plte = vec![0u8; 256 * 3];
    let mut trns = vec![0u8; 256];
    for (p, pal) in palettes.iter().take(MAX_PALETTES).enumerate() {
        for (i, color) in pal.colors.iter().enumerate() {
            let entry = p * 16 + i;
            plte[entry * 3] = color.red;
            plte[entry * 3 + 1] = color.green;
            plte[entry * 3 + 2] = color.blue;
            trns[entry] = color.alpha;
        }
    }
    (plte, trns)
}

pub fn encode_indexed_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    pixels: &[u8],
    palettes: &[Palette],
) -> Result<()> {
    ensure!(
        pixels.len() == width * height,
        "pixel data length {} does not match {} x {}",
        pixels.len(),
        width,
        height
    );
    let (plte, trns) = png_color_tables(palettes);
    let mut encoder = png::Encoder::new(writer, width.try_into()?, height.try_into()?);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte);
    encoder.set_trns(trns);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()?;
    Ok(())
}

pub fn save_indexed_png(
    path: &Path,
    width: usize,
    height: usize,
    pixels: &[u8],
    palettes: &[Palette],
) -> Result<()> {
    let mut data = vec![];
    encode_indexed_png(&mut data, width, height, pixels, palettes)
        .with_context(|| format!("Unable to encode {}", path.display()))?;
    save_bytes(path, &data)
}

pub fn encode_rgba_png<W: Write>(writer: W, bitmap: &Bitmap) -> Result<()> {
    let mut encoder = png::Encoder::new(writer, bitmap.width.try_into()?, bitmap.height.try_into()?);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&bitmap.to_rgba())?;
    writer.finish()?;
    Ok(())
}

pub fn save_rgba_png(path: &Path, bitmap: &Bitmap) -> Result<()> {
    let mut data = vec![];
    encode_rgba_png(&mut data, bitmap)
        .with_context(|| format!("Unable to encode {}", path.display()))?;
    save_bytes(path, &data)
}

/// Loads and validates a map file. The returned tileset path is resolved
/// against the map file's directory.
pub fn load_map(path: &Path) -> Result<MapFile> {
    let mut map: MapFile = load_json(path)?;
    ensure!(
        map.cells.len() == map.width * map.height,
        "map has {} cells, expected {} x {}",
        map.cells.len(),
        map.width,
        map.height
    );
    ensure!(
        map.tile_width > 0 && map.tile_height > 0 && map.tile_height % 2 == 0,
        "invalid tile size {} x {}",
        map.tile_width,
        map.tile_height
    );
    ensure!(
        (map.palette as usize) < map.palettes.len().min(MAX_PALETTES),
        "palette {} not available ({} palettes defined)",
        map.palette,
        map.palettes.len()
    );
    for (i, cell) in map.cells.iter().enumerate() {
        ensure!(
            (cell.block as usize) < map.blocks.len(),
            "cell {} references block {} but only {} blocks are defined",
            i,
            cell.block,
            map.blocks.len()
        );
    }
    if let Some(dir) = path.parent() {
        map.tileset = dir.join(&map.tileset);
    }
    Ok(map)
}
