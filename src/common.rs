use log::warn;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

pub type ColorValue = u8; // Color channel value (0-255)
pub type ColorIdx = u8; // Index into 4bpp palette (0-15)
pub type PaletteIdx = u8; // Index into the palette list supplied at export time (0-15)
pub type TileIdx = u16; // Index into tileset

pub const TILE_SIZE: usize = 8;
pub const BLOCK_SIZE: usize = 16;

pub type TilePixels = [[ColorIdx; TILE_SIZE]; TILE_SIZE];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub red: ColorValue,
    pub green: ColorValue,
    pub blue: ColorValue,
    pub alpha: ColorValue,
}

impl Color {
    pub const fn rgba(red: ColorValue, green: ColorValue, blue: ColorValue, alpha: ColorValue) -> Self {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: [Color; 16],
}

impl Palette {
    pub fn new(colors: [Color; 16]) -> Self {
        Palette { colors }
    }

    pub fn red(&self, idx: ColorIdx) -> ColorValue {
        self.colors[idx as usize].red
    }

    pub fn green(&self, idx: ColorIdx) -> ColorValue {
        self.colors[idx as usize].green
    }

    pub fn blue(&self, idx: ColorIdx) -> ColorValue {
        self.colors[idx as usize].blue
    }

    pub fn alpha(&self, idx: ColorIdx) -> ColorValue {
        self.colors[idx as usize].alpha
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Flip {
    #[default]
    None = 0,
    Horizontal = 1,
    Vertical = 2,
    Both = 3,
}

impl Flip {
    pub fn apply_to_tile(self, mut tile: TilePixels) -> TilePixels {
        if matches!(self, Flip::Horizontal | Flip::Both) {
            for row in tile.iter_mut() {
                row.reverse();
            }
        }
        if matches!(self, Flip::Vertical | Flip::Both) {
            tile.reverse();
        }
        tile
    }
}

/// Reference to a tileset entry, together with the attributes it is drawn with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub index: TileIdx,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub flip: Flip,
}

impl Tile {
    pub fn new(index: TileIdx) -> Self {
        Tile {
            index,
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }
}

/// 16x16 unit made of four tiles: top-left, top-right, bottom-left, bottom-right.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block {
    pub tiles: [Tile; 4],
}

impl Block {
    pub fn new(tiles: [Tile; 4]) -> Self {
        Block { tiles }
    }

    pub fn get_tile(&self, i: usize) -> &Tile {
        &self.tiles[i]
    }
}

/// Source of tile graphics. Color indices come back row-major, 0 meaning transparent.
pub trait TileLookup {
    fn get_tile(&self, tile: &Tile) -> [ColorIdx; TILE_SIZE * TILE_SIZE];
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tileset {
    pub tiles: Vec<TilePixels>,
}

impl Tileset {
    pub fn new(tiles: Vec<TilePixels>) -> Self {
        Tileset { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileLookup for Tileset {
    fn get_tile(&self, tile: &Tile) -> [ColorIdx; TILE_SIZE * TILE_SIZE] {
        let mut out = [0; TILE_SIZE * TILE_SIZE];
        let Some(&pixels) = self.tiles.get(tile.index as usize) else {
            warn!(
                "Tile index {} out of bounds ({} tiles loaded)",
                tile.index,
                self.tiles.len()
            );
            return out;
        };
        let pixels = tile.flip.apply_to_tile(pixels);
        for (dst, src) in out.chunks_exact_mut(TILE_SIZE).zip(pixels.iter()) {
            dst.copy_from_slice(src);
        }
        out
    }
}
