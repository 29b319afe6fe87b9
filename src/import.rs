use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::info;

use crate::{
    common::{Color, Palette, TilePixels, Tileset, TILE_SIZE},
    helpers::scale_color,
};

const BYTES_PER_TILE: usize = 32;

/// Decodes packed 4bpp tile graphics: 4 bytes per row, high nibble first.
pub fn decode_4bpp_tiles(data: &[u8]) -> Result<Tileset> {
    ensure!(
        data.len() % BYTES_PER_TILE == 0,
        "Unexpected tile data length: {} (not a multiple of {})",
        data.len(),
        BYTES_PER_TILE
    );
    let mut tiles = Vec::with_capacity(data.len() / BYTES_PER_TILE);
    for chunk in data.chunks_exact(BYTES_PER_TILE) {
        let mut tile: TilePixels = [[0; TILE_SIZE]; TILE_SIZE];
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let b = chunk[y * 4 + x / 2];
                tile[y][x] = if x % 2 == 0 { b >> 4 } else { b & 0x0F };
            }
        }
        tiles.push(tile);
    }
    Ok(Tileset::new(tiles))
}

pub fn load_tileset(path: &Path) -> Result<Tileset> {
    info!("Loading tiles from {}", path.display());
    let data = std::fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let tileset = decode_4bpp_tiles(&data)
        .with_context(|| format!("Unable to decode tiles in {}", path.display()))?;
    info!("Loaded {} tiles", tileset.len());
    Ok(tileset)
}

/// Builds a palette from color RAM words (`----BBB-GGG-RRR-`).
/// Entry 0 is the transparent color.
pub fn palette_from_cram(words: &[u16; 16]) -> Palette {
    let mut colors = [Color::default(); 16];
    for (i, &c) in words.iter().enumerate() {
        let r = (c >> 1) & 7;
        let g = (c >> 5) & 7;
        let b = (c >> 9) & 7;
        colors[i] = Color::rgba(
            scale_color(r as u8),
            scale_color(g as u8),
            scale_color(b as u8),
            if i == 0 { 0 } else { 255 },
        );
    }
    Palette::new(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tiles() {
        let mut data = vec![0u8; 64];
        data[0] = 0x12;
        data[3] = 0xF0;
        data[31] = 0x0A;
        data[32 + 4] = 0x70;
        let tileset = decode_4bpp_tiles(&data).unwrap();
        assert_eq!(tileset.len(), 2);
        assert_eq!(tileset.tiles[0][0][0], 1);
        assert_eq!(tileset.tiles[0][0][1], 2);
        assert_eq!(tileset.tiles[0][0][6], 15);
        assert_eq!(tileset.tiles[0][0][7], 0);
        assert_eq!(tileset.tiles[0][7][7], 10);
        assert_eq!(tileset.tiles[1][1][0], 7);
    }

    #[test]
    fn test_decode_tiles_bad_length() {
        assert!(decode_4bpp_tiles(&[0; 33]).is_err());
        assert!(decode_4bpp_tiles(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_palette_from_cram() {
        let mut words = [0u16; 16];
        words[0] = 0x0EEE;
        words[1] = 0x000E; // red
        words[2] = 0x00E0; // green
        words[3] = 0x0E00; // blue
        words[4] = 0x0444;
        let pal = palette_from_cram(&words);
        assert_eq!(pal.colors[0], Color::rgba(255, 255, 255, 0));
        assert_eq!(pal.colors[1], Color::rgba(255, 0, 0, 255));
        assert_eq!(pal.colors[2], Color::rgba(0, 255, 0, 255));
        assert_eq!(pal.colors[3], Color::rgba(0, 0, 255, 255));
        assert_eq!(pal.colors[4], Color::rgba(72, 72, 72, 255));
    }
}
