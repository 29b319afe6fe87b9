pub mod blockmap;
pub mod common;
pub mod diagnostic;
pub mod helpers;
pub mod image_buffer;
pub mod import;
pub mod persist;
pub mod render;
pub mod state;

pub use blockmap::{GridGeometry, GridProjection, IsometricProjection, PixelPoint, TilePoint, TilePoint3D};
pub use common::{Block, Color, Flip, Palette, Tile, TileLookup, Tileset};
pub use diagnostic::{CollectDiagnostics, Diagnostic, DiagnosticSink, LogDiagnostics};
pub use image_buffer::{Bitmap, ImageBuffer};
