//! Tile rasterizer: 8x8 tiles with per-triangle edge coefficients.
//!
//! Edge functions are set up once per triangle. Each tile then rejects
//! triangles whose edges exclude all four tile corners, or whose nearest
//! depth is behind the tile's farthest stored depth, before stepping the
//! edge functions over the tile's pixels.

use crate::frame::FrameGeometry;
use crate::target::RenderTarget;
use crate::tile::{TileGrid, RASTER_TILE_SIZE};

use super::{fill_triangle, setup_triangles, sort_front_to_back};

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    let mut triangles = setup_triangles(frame);
    sort_front_to_back(&mut triangles);
    let grid = TileGrid::bin(target.width(), target.height(), RASTER_TILE_SIZE, &triangles);

    let (mut edge_rejects, mut depth_rejects) = (0usize, 0usize);
    for (tile, bin) in grid.occupied() {
        let rect = tile.rect();
        let mut tile_max = tile.max_depth(target);

        for &i in bin {
            let triangle = &triangles[i];
            if triangle.misses_rect(&rect) {
                edge_rejects += 1;
                continue;
            }
            if triangle.min_depth > tile_max {
                depth_rejects += 1;
                continue;
            }
            if fill_triangle(target, triangle, &rect) {
                tile_max = tile.max_depth(target);
            }
        }
    }

    log::trace!(
        "tile-rasterizer rejected {} by edges, {} by depth",
        edge_rejects,
        depth_rejects
    );
}
