//! Tiled z-buffer with front-to-back ordering.
//!
//! Triangles are binned into 16x16 tiles. Tiles are visited nearest first
//! (by the closest triangle they hold) and each tile draws its triangles
//! front to back, skipping any whose nearest depth is already behind
//! everything stored in the tile.

use crate::frame::FrameGeometry;
use crate::target::RenderTarget;
use crate::tile::{TileGrid, ZBUFFER_TILE_SIZE};

use super::{fill_triangle, setup_triangles, sort_front_to_back};

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    let mut triangles = setup_triangles(frame);
    // Sorting before binning leaves every bin front to back
    sort_front_to_back(&mut triangles);
    let grid = TileGrid::bin(target.width(), target.height(), ZBUFFER_TILE_SIZE, &triangles);

    let mut tiles: Vec<_> = grid
        .occupied()
        .map(|(tile, bin)| (tile, bin, triangles[bin[0]].min_depth))
        .collect();
    tiles.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut skipped = 0usize;
    for (tile, bin, _) in tiles {
        let rect = tile.rect();
        let mut tile_max = tile.max_depth(target);

        for (n, &i) in bin.iter().enumerate() {
            let triangle = &triangles[i];
            if triangle.min_depth > tile_max {
                // Bins are sorted, so everything after is hidden too
                skipped += bin.len() - n;
                break;
            }
            if fill_triangle(target, triangle, &rect) {
                tile_max = tile.max_depth(target);
            }
        }
    }

    log::trace!("tile-zbuffer skipped {} tile/triangle pairs", skipped);
}
