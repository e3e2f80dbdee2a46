//! Ray casting: one primary ray through each pixel center.
//!
//! Rays start at the camera origin in camera space and keep the nearest
//! hit, either by testing every triangle or through a frame-local BVH.

use facet_math::{Interval, Ray, Vec3};

use crate::bvh::Bvh;
use crate::camera::View;
use crate::frame::FrameGeometry;
use crate::target::RenderTarget;
use crate::triangle::RayTriangle;

pub fn render(
    frame: &FrameGeometry<'_>,
    target: &mut RenderTarget,
    view: &View,
    accelerate: bool,
    leaf_size: usize,
) {
    let triangles = frame.ray_triangles();
    if triangles.is_empty() {
        return;
    }

    if accelerate {
        let bvh = Bvh::build(triangles, leaf_size);
        log::debug!(
            "Built BVH: {} triangles, depth {}, {} leaves",
            bvh.triangles().len(),
            bvh.depth(),
            bvh.leaf_count()
        );
        trace_pixels(target, view, |ray| {
            bvh.trace_ray(ray, Interval::FORWARD)
                .map(|hit| (hit.t, bvh.triangles()[hit.triangle]))
        });
    } else {
        trace_pixels(target, view, |ray| nearest_hit(&triangles, ray));
    }
}

/// Brute-force nearest hit.
fn nearest_hit(triangles: &[RayTriangle], ray: &Ray) -> Option<(f32, RayTriangle)> {
    let mut closest: Option<(f32, RayTriangle)> = None;
    for triangle in triangles {
        let max_t = closest.map_or(f32::INFINITY, |(t, _)| t);
        if let Some(hit) = triangle.intersect(ray, Interval::new(0.0, max_t)) {
            closest = Some((hit.t, *triangle));
        }
    }
    closest
}

fn trace_pixels(
    target: &mut RenderTarget,
    view: &View,
    trace: impl Fn(&Ray) -> Option<(f32, RayTriangle)>,
) {
    for y in 0..target.height() {
        for x in 0..target.width() {
            let direction = view.screen_to_ray_direction(x as f32 + 0.5, y as f32 + 0.5);
            let ray = Ray::new(Vec3::ZERO, direction);
            if let Some((t, triangle)) = trace(&ray) {
                target.write_fragment(x, y, ray.at(t).x, triangle.color);
            }
        }
    }
}
