//! Screen tiling for the tile-based strategies.
//!
//! Divides the target into fixed-size tiles and bins triangles by the
//! tiles their bounding boxes overlap.

use crate::raster::{PixelRect, TriangleSetup};
use crate::target::RenderTarget;

/// Tile size of the tile z-buffer strategy.
pub const ZBUFFER_TILE_SIZE: u32 = 16;

/// Tile size of the tile rasterizer (and the hybrid strategy).
pub const RASTER_TILE_SIZE: u32 = 8;

/// A rectangular region of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Row-major position in the grid
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Inclusive pixel bounds.
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.x + self.width - 1, self.y + self.height - 1)
    }

    /// Farthest depth currently stored under the tile.
    pub fn max_depth(&self, target: &RenderTarget) -> f32 {
        let r = self.rect();
        target.max_depth_in(r.x0, r.y0, r.x1, r.y1)
    }
}

/// Generate tiles covering the target in row-major order. Edge tiles are
/// cut to fit.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, index));
            index += 1;
            x += tile_size;
        }
        y += tile_size;
    }

    tiles
}

/// Tiles plus the triangles overlapping each one.
#[derive(Debug, Clone)]
pub struct TileGrid {
    pub tile_size: u32,
    pub columns: u32,
    pub tiles: Vec<Tile>,
    /// Triangle indices per tile, in submission order
    pub bins: Vec<Vec<usize>>,
}

impl TileGrid {
    /// Bin triangles by bounding box.
    pub fn bin(width: u32, height: u32, tile_size: u32, triangles: &[TriangleSetup]) -> Self {
        let tile_size = tile_size.max(1);
        let tiles = generate_tiles(width, height, tile_size);
        let columns = width.div_ceil(tile_size);
        let mut bins = vec![Vec::new(); tiles.len()];

        for (i, triangle) in triangles.iter().enumerate() {
            let b = triangle.bounds;
            for ty in (b.y0 / tile_size)..=(b.y1 / tile_size) {
                for tx in (b.x0 / tile_size)..=(b.x1 / tile_size) {
                    bins[(ty * columns + tx) as usize].push(i);
                }
            }
        }

        Self {
            tile_size,
            columns,
            tiles,
            bins,
        }
    }

    /// Non-empty tiles with their bins.
    pub fn occupied(&self) -> impl Iterator<Item = (&Tile, &[usize])> {
        self.tiles
            .iter()
            .zip(&self.bins)
            .filter(|(_, bin)| !bin.is_empty())
            .map(|(tile, bin)| (tile, bin.as_slice()))
    }
}
