//! Draws a whole isometric map onto an image buffer.

use anyhow::{ensure, Result};
use itertools::{iproduct, Itertools};
use log::{info, warn};

use crate::{
    blockmap::{GridGeometry, GridProjection, IsometricProjection, TilePoint3D},
    common::{Palette, TileLookup, BLOCK_SIZE},
    diagnostic::DiagnosticSink,
    image_buffer::ImageBuffer,
    import::palette_from_cram,
    state::MapFile,
};

/// Projection for a map, with the origin pushed down far enough that the
/// highest elevation still lands inside the canvas.
pub fn map_projection(map: &MapFile) -> IsometricProjection {
    let top = map.max_elevation() * map.tile_height;
    IsometricProjection::new(
        GridGeometry::new(map.width, map.height)
            .with_origin(0, top)
            .with_tile_size(map.tile_width, map.tile_height),
    )
}

pub fn map_palettes(map: &MapFile) -> Vec<Palette> {
    map.palettes.iter().map(palette_from_cram).collect()
}

/// Canvas size needed for the map: at least the grid's bitmap size (plus the
/// room reserved above it for elevated cells), grown to cover every block at
/// its projected position.
pub fn canvas_size(map: &MapFile, projection: &impl GridProjection) -> (usize, usize) {
    let g = projection.geometry();
    let mut width = projection.bitmap_width().max(BLOCK_SIZE);
    let mut height = projection.bitmap_height() + g.top.max(0) as usize;
    for (y, x) in iproduct!(0..map.height, 0..map.width) {
        let z = map.get_cell(x, y).map_or(0, |c| c.z);
        let p = projection.tile_to_pixel_3d(TilePoint3D::new(x as i32, y as i32, z));
        width = width.max(p.x.max(0) as usize + BLOCK_SIZE);
        height = height.max(p.y.max(0) as usize + BLOCK_SIZE);
    }
    (width, height)
}

/// Draws every cell back to front into `buffer`, which is resized to fit.
pub fn draw_map<D: DiagnosticSink, T: TileLookup + ?Sized>(
    map: &MapFile,
    tileset: &T,
    buffer: &mut ImageBuffer<D>,
) -> Result<()> {
    ensure!(
        map.cells.len() == map.width * map.height,
        "map has {} cells, expected {} x {}",
        map.cells.len(),
        map.width,
        map.height
    );
    let projection = map_projection(map);
    let (width, height) = canvas_size(map, &projection);
    info!(
        "Rendering {} x {} map onto {} x {} canvas",
        map.width, map.height, width, height
    );
    buffer.resize(width, height);

    let order = iproduct!(0..map.height, 0..map.width)
        .map(|(y, x)| (x, y, map.cells[y * map.width + x]))
        .sorted_by_key(|&(x, y, cell)| (x + y, cell.z, y));
    for (x, y, cell) in order {
        let Some(block) = map.blocks.get(cell.block as usize) else {
            warn!("Cell ({}, {}) references missing block {}", x, y, cell.block);
            continue;
        };
        let p = projection.tile_to_pixel_3d(TilePoint3D::new(x as i32, y as i32, cell.z));
        let (Ok(px), Ok(py)) = (usize::try_from(p.x), usize::try_from(p.y)) else {
            warn!("Cell ({}, {}) at z={} lands off-canvas at {:?}", x, y, cell.z, p);
            continue;
        };
        buffer.insert_block(px, py, map.palette, block, tileset);
    }
    Ok(())
}

pub fn render_map<T: TileLookup + ?Sized>(map: &MapFile, tileset: &T) -> Result<ImageBuffer> {
    let mut buffer = ImageBuffer::default();
    draw_map(map, tileset, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{Block, Tile, Tileset},
        diagnostic::CollectDiagnostics,
        state::MapCell,
    };

    fn solid_tileset() -> Tileset {
        let mut tiles = vec![];
        for c in 1..=4u8 {
            tiles.push([[c; 8]; 8]);
        }
        Tileset::new(tiles)
    }

    fn sample_map(cells: Vec<MapCell>, width: usize, height: usize) -> MapFile {
        MapFile {
            palettes: vec![[0x0EEE; 16]],
            tileset: "unused.bin".into(),
            blocks: vec![
                Block::new([Tile::new(0); 4]),
                Block::new([Tile::new(0), Tile::new(1), Tile::new(2), Tile::new(3)]),
            ],
            width,
            height,
            palette: 0,
            tile_width: 16,
            tile_height: 16,
            cells,
        }
    }

    #[test]
    fn test_render_flat_map() {
        let cells = vec![MapCell { block: 1, z: 0 }; 12];
        let map = sample_map(cells, 4, 3);
        let mut buffer = ImageBuffer::with_diagnostics(0, 0, CollectDiagnostics::new());
        draw_map(&map, &solid_tileset(), &mut buffer).unwrap();

        assert_eq!((buffer.width(), buffer.height()), (112, 64));
        assert!(buffer.diagnostics().is_empty());
        // Cell (2, 1) sits at (48, 24); it is drawn after (1, 1) and (2, 0).
        let w = buffer.width();
        assert_eq!(buffer.pixels()[24 * w + 48], 0x01);
        assert_eq!(buffer.pixels()[24 * w + 48 + 8], 0x02);
    }

    #[test]
    fn test_render_elevated_map() {
        let mut cells = vec![MapCell { block: 0, z: 0 }; 4];
        cells[3] = MapCell { block: 1, z: 2 };
        let map = sample_map(cells, 2, 2);
        let mut buffer = ImageBuffer::with_diagnostics(0, 0, CollectDiagnostics::new());
        draw_map(&map, &solid_tileset(), &mut buffer).unwrap();

        assert!(buffer.diagnostics().is_empty());
        let projection = map_projection(&map);
        assert_eq!(projection.geometry().top, 32);
        // Cell (1, 1) at z=2 is raised to the top of the canvas.
        let p = projection.tile_to_pixel_3d(TilePoint3D::new(1, 1, 2));
        assert_eq!((p.x, p.y), (16, 16));
        let w = buffer.width();
        assert_eq!(buffer.pixels()[p.y as usize * w + p.x as usize], 0x01);
        assert_eq!(buffer.pixels()[(p.y as usize + 8) * w + p.x as usize + 8], 0x04);
    }

    #[test]
    fn test_render_below_ground() {
        let map = sample_map(vec![MapCell { block: 1, z: -1 }], 1, 1);
        let mut buffer = ImageBuffer::with_diagnostics(0, 0, CollectDiagnostics::new());
        draw_map(&map, &solid_tileset(), &mut buffer).unwrap();

        assert!(buffer.diagnostics().is_empty());
        // z=-1 lowers the cell by one tile height: origin at (0, 16).
        assert_eq!((buffer.width(), buffer.height()), (32, 32));
        let w = buffer.width();
        assert_eq!(buffer.pixels()[16 * w], 0x01);
        assert_eq!(buffer.pixels()[31 * w + 15], 0x04);
    }

    #[test]
    fn test_render_narrow_tiles() {
        let mut map = sample_map(vec![MapCell { block: 1, z: 0 }; 3], 3, 1);
        map.tile_width = 4;
        let mut buffer = ImageBuffer::with_diagnostics(0, 0, CollectDiagnostics::new());
        draw_map(&map, &solid_tileset(), &mut buffer).unwrap();

        assert!(buffer.diagnostics().is_empty());
        // Rightmost cell (2, 0) sits at x=8, so its block ends at x=23.
        assert_eq!(buffer.width(), 24);
        let w = buffer.width();
        let p = map_projection(&map).tile_to_pixel(crate::blockmap::TilePoint::new(2, 0));
        assert_eq!((p.x, p.y), (8, 16));
        assert_eq!(buffer.pixels()[(p.y as usize + 15) * w + 23], 0x04);
    }

    #[test]
    fn test_render_rejects_bad_cell_count() {
        let map = sample_map(vec![], 2, 2);
        assert!(render_map(&map, &solid_tileset()).is_err());
    }
}
