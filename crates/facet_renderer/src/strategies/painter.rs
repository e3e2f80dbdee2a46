//! Painter's algorithm: polygons sorted back to front and drawn over each
//! other without a depth buffer.
//!
//! The only strategy that samples textures (nearest texel, affine UVs).

use crate::frame::{FrameGeometry, FramePolygon};
use crate::raster::TriangleSetup;
use crate::target::RenderTarget;
use crate::wireframe;

use super::full_rect;

/// Sort key: a blend of average and nearest depth, which orders
/// intersecting neighbours better than either alone.
pub fn sort_depth(polygon: &FramePolygon<'_>) -> f32 {
    0.5 * polygon.average_depth() + 0.5 * polygon.min_depth()
}

/// Polygon indices farthest first. Ties keep submission order.
pub fn draw_order(frame: &FrameGeometry<'_>) -> Vec<usize> {
    let keys: Vec<f32> = frame.polygons.iter().map(sort_depth).collect();
    let mut order: Vec<usize> = (0..frame.polygons.len()).collect();
    order.sort_by(|&a, &b| keys[b].total_cmp(&keys[a]));
    order
}

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    let rect = full_rect(target);

    for index in draw_order(frame) {
        let polygon = &frame.polygons[index];

        if polygon.mode.fills() {
            for triangle in polygon.screen_triangles() {
                let Some(setup) = TriangleSetup::new(&triangle, polygon.color, index, frame.width, frame.height)
                else {
                    continue;
                };
                setup.rasterize(&rect, |x, y, _, weights| {
                    target.set_pixel(x, y, polygon.shade_at(setup.affine_uv(weights)));
                });
            }
        }

        if polygon.mode.outlines() {
            wireframe::draw_outline(target, polygon, false);
        }
    }
}
