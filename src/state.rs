use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    blockmap::GridGeometry,
    common::{Block, PaletteIdx},
};

pub type BlockIdx = u16; // Index into MapFile::blocks
pub type Elevation = i32; // Height layer of a cell; each unit raises it one tile height

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCell {
    pub block: BlockIdx,
    #[serde(default)]
    pub z: Elevation,
}

fn default_tile_width() -> i32 {
    GridGeometry::DEFAULT_TILE_WIDTH
}

fn default_tile_height() -> i32 {
    GridGeometry::DEFAULT_TILE_HEIGHT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub palettes: Vec<[u16; 16]>, // Color RAM words
    pub tileset: PathBuf,         // Relative to the map file
    pub blocks: Vec<Block>,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub palette: PaletteIdx,
    #[serde(default = "default_tile_width")]
    pub tile_width: i32,
    #[serde(default = "default_tile_height")]
    pub tile_height: i32,
    pub cells: Vec<MapCell>, // Row-major, width * height
}

impl MapFile {
    pub fn get_cell(&self, x: usize, y: usize) -> Option<&MapCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn max_elevation(&self) -> Elevation {
        self.cells.iter().map(|c| c.z).max().unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let map: MapFile = serde_json::from_str(
            r#"{
                "palettes": [],
                "tileset": "tiles.bin",
                "blocks": [],
                "width": 2,
                "height": 1,
                "cells": [{"block": 0}, {"block": 0, "z": 3}]
            }"#,
        )
        .unwrap();
        assert_eq!(map.palette, 0);
        assert_eq!((map.tile_width, map.tile_height), (16, 16));
        assert_eq!(map.get_cell(1, 0), Some(&MapCell { block: 0, z: 3 }));
        assert_eq!(map.get_cell(2, 0), None);
        assert_eq!(map.max_elevation(), 3);
    }
}
