//! Polygon outlines for wireframe render modes.
//!
//! Lines are clipped to the target first (Liang-Barsky) and then walked
//! with Bresenham. Depth along the line is interpolated as `1/z`. In the
//! depth-buffered strategies outlines are depth tested with a small bias
//! but never write depth, so wireframe-only faces leave the buffer alone.

use facet_core::Rgba;

use crate::frame::{FrameGeometry, FramePolygon, ScreenVertex};
use crate::target::RenderTarget;

/// Relative slack so outlines on a filled face are not hidden by it.
const DEPTH_BIAS: f32 = 1e-3;

/// Draw every outlined polygon on top of a depth-buffered frame.
pub fn draw_overlay(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    for polygon in frame.polygons.iter().filter(|p| p.mode.outlines()) {
        draw_outline(target, polygon, true);
    }
}

/// Draw a closed polygon outline in its wireframe color.
pub fn draw_outline(target: &mut RenderTarget, polygon: &FramePolygon<'_>, depth_tested: bool) {
    let n = polygon.screen.len();
    for i in 0..n {
        let a = &polygon.screen[i];
        let b = &polygon.screen[(i + 1) % n];
        draw_line(target, a, b, polygon.wireframe_color, depth_tested);
    }
}

/// Draw one segment. Only pixels whose interpolated depth is within the
/// bias of the stored depth are written when `depth_tested` is set.
pub fn draw_line(
    target: &mut RenderTarget,
    a: &ScreenVertex,
    b: &ScreenVertex,
    color: Rgba,
    depth_tested: bool,
) {
    let Some((t0, t1)) = clip_to_target(a, b, target.width() as f32, target.height() as f32) else {
        return;
    };

    let inv_a = 1.0 / a.depth;
    let inv_b = 1.0 / b.depth;
    let point = |t: f32| (a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);

    let (sx, sy) = point(t0);
    let (ex, ey) = point(t1);
    let (mut x, mut y) = (sx.floor() as i32, sy.floor() as i32);
    let (x_end, y_end) = (ex.floor() as i32, ey.floor() as i32);

    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let step_x = if x < x_end { 1 } else { -1 };
    let step_y = if y < y_end { 1 } else { -1 };
    let steps = dx.max(-dy).max(1) as f32;
    let mut err = dx + dy;
    let mut walked = 0.0f32;

    loop {
        if target.in_bounds(x, y) {
            let t = t0 + (t1 - t0) * (walked / steps);
            let depth = 1.0 / (inv_a + (inv_b - inv_a) * t);
            let (px, py) = (x as u32, y as u32);
            if !depth_tested || depth <= target.depth_at(px, py) * (1.0 + DEPTH_BIAS) + DEPTH_BIAS {
                target.set_pixel(px, py, color);
            }
        }

        if x == x_end && y == y_end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
        walked += 1.0;
    }
}

/// Liang-Barsky clip of segment `a -> b` to `[0, width) x [0, height)`.
/// Returns the surviving parameter range.
fn clip_to_target(a: &ScreenVertex, b: &ScreenVertex, width: f32, height: f32) -> Option<(f32, f32)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let max_x = width - 1e-3;
    let max_y = height - 1e-3;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [(-dx, a.x), (dx, max_x - a.x), (-dy, a.y), (dy, max_y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    (t0.is_finite() && t1.is_finite()).then_some((t0, t1))
}
