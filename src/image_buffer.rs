//! Two-plane raster canvas that tiles and blocks are composited onto.
//!
//! Each pixel byte holds a palette index in the high nibble and a color index
//! in the low nibble. A parallel priority plane records whether the tile that
//! last drew the pixel was a high-priority (foreground) tile.

use std::path::Path;

use anyhow::Result;

use crate::{
    common::{Block, ColorIdx, Palette, PaletteIdx, Tile, TileLookup, BLOCK_SIZE, TILE_SIZE},
    diagnostic::{Diagnostic, DiagnosticSink, LogDiagnostics},
    persist,
};

/// Owned RGB (and optionally alpha) pixels produced from an [`ImageBuffer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl Bitmap {
    /// Interleaves into RGBA8. Pixels are fully opaque when there is no alpha plane.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for (i, rgb) in self.rgb.chunks_exact(3).enumerate() {
            out.extend_from_slice(rgb);
            out.push(self.alpha.as_ref().map_or(255, |a| a[i]));
        }
        out
    }
}

#[derive(Debug)]
pub struct ImageBuffer<D: DiagnosticSink = LogDiagnostics> {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    priority: Vec<u8>,
    diagnostics: D,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_diagnostics(width, height, LogDiagnostics)
    }
}

impl Default for ImageBuffer {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<D: DiagnosticSink> ImageBuffer<D> {
    pub fn with_diagnostics(width: usize, height: usize, diagnostics: D) -> Self {
        ImageBuffer {
            width,
            height,
            pixels: vec![0; width * height],
            priority: vec![0; width * height],
            diagnostics,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn priority(&self) -> &[u8] {
        &self.priority
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.priority.fill(0);
    }

    /// Changes the canvas size. Previous contents are discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width * height];
        self.priority = vec![0; width * height];
    }

    // Whether a `size` x `size` square with its top-left corner at (x, y) lies
    // entirely inside the canvas.
    fn fits(&self, x: usize, y: usize, size: usize) -> bool {
        x < self.width.saturating_sub(size - 1) && y < self.height.saturating_sub(size - 1)
    }

    /// Draws an 8x8 tile with its top-left corner at pixel (x, y).
    ///
    /// Transparent (zero) tile pixels leave the canvas untouched. A tile that
    /// does not fit entirely inside the canvas is not drawn at all; a
    /// diagnostic is reported instead.
    pub fn insert_tile<T: TileLookup + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        palette_index: PaletteIdx,
        tile: &Tile,
        tileset: &T,
    ) {
        if !self.fits(x, y, TILE_SIZE) {
            self.diagnostics.report(Diagnostic::TileOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
            return;
        }

        let tile_bits = tileset.get_tile(tile);
        let pal_bits = (palette_index & 0x0F) << 4;
        let priority = tile.priority as u8;
        for (row, src_row) in tile_bits.chunks_exact(TILE_SIZE).enumerate() {
            let offset = (y + row) * self.width + x;
            let dst = &mut self.pixels[offset..offset + TILE_SIZE];
            let pri = &mut self.priority[offset..offset + TILE_SIZE];
            for (i, &c) in src_row.iter().enumerate() {
                if c != 0 {
                    dst[i] = pal_bits | (c & 0x0F);
                    pri[i] = priority;
                }
            }
        }
    }

    /// Draws a 16x16 block as four tiles sharing one palette.
    ///
    /// The whole block is skipped if any part of it would fall outside the canvas.
    pub fn insert_block<T: TileLookup + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        palette_index: PaletteIdx,
        block: &Block,
        tileset: &T,
    ) {
        if !self.fits(x, y, BLOCK_SIZE) {
            self.diagnostics.report(Diagnostic::BlockOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
            return;
        }

        self.insert_tile(x, y, palette_index, block.get_tile(0), tileset);
        self.insert_tile(x + TILE_SIZE, y, palette_index, block.get_tile(1), tileset);
        self.insert_tile(x, y + TILE_SIZE, palette_index, block.get_tile(2), tileset);
        self.insert_tile(
            x + TILE_SIZE,
            y + TILE_SIZE,
            palette_index,
            block.get_tile(3),
            tileset,
        );
    }

    /// Resolves every pixel to RGB triplets, row-major.
    ///
    /// # Panics
    ///
    /// Panics if a pixel refers to a palette index not present in `palettes`.
    pub fn get_rgb(&self, palettes: &[Palette]) -> Vec<u8> {
        let mut out = Vec::new();
        self.get_rgb_into(palettes, &mut out);
        out
    }

    /// Like [`get_rgb`](Self::get_rgb), but reuses `out` (resized as needed).
    pub fn get_rgb_into(&self, palettes: &[Palette], out: &mut Vec<u8>) {
        out.resize(self.width * self.height * 3, 0);
        for (&pixel, dst) in self.pixels.iter().zip(out.chunks_exact_mut(3)) {
            let (pal, idx) = split_pixel(palettes, pixel);
            dst[0] = pal.red(idx);
            dst[1] = pal.green(idx);
            dst[2] = pal.blue(idx);
        }
    }

    /// Per-pixel opacity: the palette's alpha, capped by `high_pri_max_opacity`
    /// for high-priority pixels and by `low_pri_max_opacity` otherwise.
    ///
    /// # Panics
    ///
    /// Panics if a pixel refers to a palette index not present in `palettes`.
    pub fn get_alpha(
        &self,
        palettes: &[Palette],
        low_pri_max_opacity: u8,
        high_pri_max_opacity: u8,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        self.get_alpha_into(palettes, low_pri_max_opacity, high_pri_max_opacity, &mut out);
        out
    }

    pub fn get_alpha_into(
        &self,
        palettes: &[Palette],
        low_pri_max_opacity: u8,
        high_pri_max_opacity: u8,
        out: &mut Vec<u8>,
    ) {
        out.resize(self.width * self.height, 0);
        for ((&pixel, &pri), dst) in self.pixels.iter().zip(&self.priority).zip(out.iter_mut()) {
            let (pal, idx) = split_pixel(palettes, pixel);
            let max_opacity = if pri != 0 {
                high_pri_max_opacity
            } else {
                low_pri_max_opacity
            };
            *dst = pal.alpha(idx).min(max_opacity);
        }
    }

    pub fn make_bitmap(
        &self,
        palettes: &[Palette],
        use_alpha: bool,
        low_pri_max_opacity: u8,
        high_pri_max_opacity: u8,
    ) -> Bitmap {
        Bitmap {
            width: self.width,
            height: self.height,
            rgb: self.get_rgb(palettes),
            alpha: use_alpha
                .then(|| self.get_alpha(palettes, low_pri_max_opacity, high_pri_max_opacity)),
        }
    }

    /// Writes the canvas as an 8-bit indexed PNG whose color table is the
    /// concatenation of `palettes`.
    pub fn write_png(&self, path: &Path, palettes: &[Palette]) -> Result<()> {
        let result = persist::save_indexed_png(path, self.width, self.height, &self.pixels, palettes);
        if let Err(e) = &result {
            self.diagnostics.report(Diagnostic::WriteFailed {
                path: path.to_owned(),
                reason: format!("{:#}", e),
            });
        }
        result
    }

    /// Encodes the canvas as an indexed PNG into any writer.
    pub fn encode_png<W: std::io::Write>(&self, writer: W, palettes: &[Palette]) -> Result<()> {
        persist::encode_indexed_png(writer, self.width, self.height, &self.pixels, palettes)
    }
}

fn split_pixel(palettes: &[Palette], pixel: u8) -> (&Palette, ColorIdx) {
    (&palettes[(pixel >> 4) as usize], pixel & 0x0F)
}
