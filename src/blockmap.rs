//! Mapping between tile-grid coordinates and pixel space.
//!
//! Division rounds toward negative infinity throughout, so pixels left of or
//! above the grid origin land on negative tile coordinates instead of being
//! folded onto row/column zero.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub fn new(x: i32, y: i32) -> Self {
        TilePoint { x, y }
    }
}

/// Tile-grid coordinate with an elevation layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TilePoint3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePoint3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        TilePoint3D { x, y, z }
    }
}

impl From<TilePoint> for TilePoint3D {
    fn from(p: TilePoint) -> Self {
        TilePoint3D::new(p.x, p.y, 0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        PixelPoint { x, y }
    }
}

/// Grid size in tiles, pixel-space origin, and per-tile pixel size.
///
/// `tile_width` and `tile_height` must be positive. `tile_height` should be
/// even for tile origins to map back onto their own cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub width: usize,
    pub height: usize,
    pub left: i32,
    pub top: i32,
    pub tile_width: i32,
    pub tile_height: i32,
}

impl GridGeometry {
    pub const DEFAULT_TILE_WIDTH: i32 = 16;
    pub const DEFAULT_TILE_HEIGHT: i32 = 16;

    pub fn new(width: usize, height: usize) -> Self {
        GridGeometry {
            width,
            height,
            left: 0,
            top: 0,
            tile_width: Self::DEFAULT_TILE_WIDTH,
            tile_height: Self::DEFAULT_TILE_HEIGHT,
        }
    }

    pub fn with_origin(mut self, left: i32, top: i32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_tile_size(mut self, tile_width: i32, tile_height: i32) -> Self {
        self.tile_width = tile_width;
        self.tile_height = tile_height;
        self
    }
}

pub trait GridProjection {
    fn geometry(&self) -> &GridGeometry;

    /// Tile cell containing the given pixel. Many pixels map to the same cell.
    fn pixel_to_tile(&self, point: PixelPoint) -> TilePoint;

    /// Pixel position of a tile cell's origin.
    fn tile_to_pixel(&self, point: TilePoint) -> PixelPoint;

    fn tile_to_pixel_3d(&self, point: TilePoint3D) -> PixelPoint;

    /// Minimum canvas width needed to draw the whole grid.
    fn bitmap_width(&self) -> usize;

    /// Minimum canvas height needed to draw the whole grid (at elevation 0).
    fn bitmap_height(&self) -> usize;
}

/// 2:1 diamond projection. Tile (0, height - 1) sits at the left edge and
/// tile (0, 0) at the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IsometricProjection {
    geometry: GridGeometry,
}

impl IsometricProjection {
    pub fn new(geometry: GridGeometry) -> Self {
        debug_assert!(
            geometry.tile_width > 0 && geometry.tile_height > 0,
            "tile size must be positive, got {} x {}",
            geometry.tile_width,
            geometry.tile_height
        );
        IsometricProjection { geometry }
    }

    fn height_offset(&self) -> i32 {
        self.geometry.height as i32 - 1
    }
}

impl GridProjection for IsometricProjection {
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn pixel_to_tile(&self, point: PixelPoint) -> TilePoint {
        let g = &self.geometry;
        let xgrid = (point.x - g.left).div_euclid(g.tile_width);
        let ygrid = (2 * (point.y - g.top)).div_euclid(g.tile_height);
        TilePoint {
            x: (ygrid + xgrid - self.height_offset()).div_euclid(2),
            y: (ygrid - xgrid + self.height_offset()).div_euclid(2),
        }
    }

    fn tile_to_pixel(&self, point: TilePoint) -> PixelPoint {
        self.tile_to_pixel_3d(point.into())
    }

    fn tile_to_pixel_3d(&self, point: TilePoint3D) -> PixelPoint {
        let g = &self.geometry;
        PixelPoint {
            x: (point.x - point.y + self.height_offset()) * g.tile_width + g.left,
            y: ((point.x + point.y - 2 * point.z) * g.tile_height).div_euclid(2) + g.top,
        }
    }

    fn bitmap_width(&self) -> usize {
        let g = &self.geometry;
        (g.width + g.height) * g.tile_width.max(0) as usize
    }

    fn bitmap_height(&self) -> usize {
        let g = &self.geometry;
        (g.width + g.height + 1) * g.tile_height.max(0) as usize / 2
    }
}
