//! Classic z-buffer: each triangle fills its bounding box with a per-pixel
//! depth test.

use crate::frame::FrameGeometry;
use crate::target::RenderTarget;

use super::{fill_triangle, full_rect, setup_triangles};

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    let rect = full_rect(target);
    for triangle in setup_triangles(frame) {
        fill_triangle(target, &triangle, &rect);
    }
}
