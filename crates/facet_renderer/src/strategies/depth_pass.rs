//! Depth pass with hierarchical Z rejection.
//!
//! Triangles are drawn front to back. Before rasterizing, each one is
//! tested against the HZB pyramid at the level where its bounding box
//! spans at most 2x2 texels; every accepted depth write is propagated up
//! the pyramid. Depth of field runs afterwards when enabled.

use crate::dof::apply_depth_of_field;
use crate::frame::FrameGeometry;
use crate::settings::DepthOfFieldSettings;
use crate::target::RenderTarget;

use super::{setup_triangles, sort_front_to_back};

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget, dof: &DepthOfFieldSettings) {
    let mut triangles = setup_triangles(frame);
    sort_front_to_back(&mut triangles);

    let mut hzb = target.take_hzb();
    let mut rejected = 0usize;

    for triangle in &triangles {
        if hzb.is_occluded(target.depth(), &triangle.bounds, triangle.min_depth) {
            rejected += 1;
            continue;
        }
        triangle.rasterize(&triangle.bounds, |x, y, depth, _| {
            if target.write_fragment(x, y, depth, triangle.color) {
                hzb.update(target.depth(), x, y);
            }
        });
    }

    target.store_hzb(hzb);
    log::trace!(
        "depth-pass rejected {} of {} triangles by HZB",
        rejected,
        triangles.len()
    );

    if dof.enabled {
        apply_depth_of_field(target, dof);
    }
}
