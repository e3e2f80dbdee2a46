//! The eight visibility strategies.
//!
//! Each module exposes a `render` function drawing a [`FrameGeometry`]
//! into a cleared [`RenderTarget`]. All of them except the painter keep the
//! depth buffer holding the nearest surface per pixel.

pub mod depth_pass;
pub mod hybrid;
pub mod painter;
pub mod raytrace;
pub mod scanline;
pub mod tile_rasterizer;
pub mod tile_zbuffer;
pub mod zbuffer;

use crate::frame::FrameGeometry;
use crate::raster::{PixelRect, TriangleSetup};
use crate::target::RenderTarget;

/// Set up every filled triangle of the frame, dropping ones that cover no
/// pixel.
pub(crate) fn setup_triangles(frame: &FrameGeometry<'_>) -> Vec<TriangleSetup> {
    frame
        .screen_triangles()
        .filter_map(|(polygon, color, triangle)| {
            TriangleSetup::new(&triangle, color, polygon, frame.width, frame.height)
        })
        .collect()
}

/// Nearest triangles first; ties keep submission order.
pub(crate) fn sort_front_to_back(triangles: &mut [TriangleSetup]) {
    triangles.sort_by(|a, b| a.min_depth.total_cmp(&b.min_depth));
}

/// Depth-tested fill of one triangle restricted to `rect`. Returns whether
/// any pixel was written.
pub(crate) fn fill_triangle(target: &mut RenderTarget, triangle: &TriangleSetup, rect: &PixelRect) -> bool {
    let mut wrote = false;
    triangle.rasterize(rect, |x, y, depth, _| {
        wrote |= target.write_fragment(x, y, depth, triangle.color);
    });
    wrote
}

/// The whole target as a rectangle.
pub(crate) fn full_rect(target: &RenderTarget) -> PixelRect {
    PixelRect::new(
        0,
        0,
        target.width().saturating_sub(1),
        target.height().saturating_sub(1),
    )
}
