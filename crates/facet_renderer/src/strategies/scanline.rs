//! Scanline rasterization with an active edge table.
//!
//! Each polygon is rasterized whole, without triangulation: its edges go
//! into a table keyed by first scanline, the active set is refreshed per
//! row, and spans between x-sorted edge pairs are filled with depth
//! interpolated as `1/z`.

use crate::frame::{FrameGeometry, ScreenVertex};
use crate::target::RenderTarget;

/// One non-horizontal polygon edge, stepped one scanline at a time.
#[derive(Debug, Clone, Copy)]
struct Edge {
    /// First row whose center lies on the edge
    y_start: u32,
    /// Row after the last one
    y_end: u32,
    /// x at the current row center
    x: f32,
    dx_dy: f32,
    /// 1/z at the current row center
    inv_z: f32,
    dinv_z_dy: f32,
}

impl Edge {
    fn new(a: &ScreenVertex, b: &ScreenVertex, height: u32) -> Option<Self> {
        let (top, bottom) = if a.y <= b.y { (a, b) } else { (b, a) };
        let dy = bottom.y - top.y;
        if dy <= f32::EPSILON {
            return None;
        }

        let first = (top.y - 0.5).ceil().max(0.0);
        let last = (bottom.y - 0.5).ceil().min(height as f32);
        if first >= last {
            return None;
        }

        let dx_dy = (bottom.x - top.x) / dy;
        let dinv_z_dy = (1.0 / bottom.depth - 1.0 / top.depth) / dy;
        let offset = first + 0.5 - top.y;

        Some(Self {
            y_start: first as u32,
            y_end: last as u32,
            x: top.x + dx_dy * offset,
            dx_dy,
            inv_z: 1.0 / top.depth + dinv_z_dy * offset,
            dinv_z_dy,
        })
    }

    fn step(&mut self) {
        self.x += self.dx_dy;
        self.inv_z += self.dinv_z_dy;
    }
}

pub fn render(frame: &FrameGeometry<'_>, target: &mut RenderTarget) {
    for (_, polygon) in frame.filled() {
        fill_polygon(target, &polygon.screen, polygon.color);
    }
}

fn fill_polygon(target: &mut RenderTarget, vertices: &[ScreenVertex], color: facet_core::Rgba) {
    let height = target.height();
    let width = target.width() as f32;

    // Edge table: edges bucketed by first scanline
    let mut edge_table: Vec<Vec<Edge>> = vec![Vec::new(); height as usize];
    let mut first_row = u32::MAX;
    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        if let Some(edge) = Edge::new(a, b, height) {
            first_row = first_row.min(edge.y_start);
            edge_table[edge.y_start as usize].push(edge);
        }
    }
    if first_row == u32::MAX {
        return;
    }

    let mut active: Vec<Edge> = Vec::new();
    for y in first_row..height {
        active.retain(|edge| edge.y_end > y);
        active.extend(edge_table[y as usize].drain(..));
        if active.is_empty() {
            if edge_table[y as usize..].iter().all(Vec::is_empty) {
                break;
            }
            continue;
        }

        active.sort_by(|a, b| a.x.total_cmp(&b.x));

        for pair in active.chunks_exact(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let span = right.x - left.x;
            let x_start = (left.x - 0.5).ceil().max(0.0);
            let x_end = (right.x - 0.5).ceil().min(width);
            if x_start >= x_end {
                continue;
            }

            let dinv_z_dx = if span > f32::EPSILON {
                (right.inv_z - left.inv_z) / span
            } else {
                0.0
            };
            let mut inv_z = left.inv_z + dinv_z_dx * (x_start + 0.5 - left.x);
            for x in x_start as u32..x_end as u32 {
                target.write_fragment(x, y, 1.0 / inv_z, color);
                inv_z += dinv_z_dx;
            }
        }

        for edge in &mut active {
            edge.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::Rgba;
    use facet_math::Vec2;

    fn vertex(x: f32, y: f32, depth: f32) -> ScreenVertex {
        ScreenVertex {
            x,
            y,
            depth,
            uv: Vec2::ZERO,
        }
    }

    #[test]
    fn test_square_fills_exact_pixels() {
        let mut target = RenderTarget::new(8, 8);
        let square = [vertex(2.0, 2.0, 1.0), vertex(6.0, 2.0, 1.0), vertex(6.0, 6.0, 1.0), vertex(2.0, 6.0, 1.0)];
        fill_polygon(&mut target, &square, Rgba::WHITE);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                assert_eq!(target.depth_at(x, y).is_finite(), inside, "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn test_depth_interpolates_inverse() {
        let mut target = RenderTarget::new(16, 4);
        let quad = [vertex(0.0, 0.0, 1.0), vertex(16.0, 0.0, 4.0), vertex(16.0, 4.0, 4.0), vertex(0.0, 4.0, 1.0)];
        fill_polygon(&mut target, &quad, Rgba::WHITE);

        let t = 8.5 / 16.0;
        let expected = 1.0 / ((1.0 - t) + t / 4.0);
        assert!((target.depth_at(8, 2) - expected).abs() < 1e-3);
        assert!(target.depth_at(0, 0) >= 1.0 && target.depth_at(15, 3) <= 4.0);
    }

    #[test]
    fn test_polygon_off_screen_is_clamped() {
        let mut target = RenderTarget::new(8, 8);
        let big = [vertex(-100.0, -50.0, 2.0), vertex(200.0, -50.0, 2.0), vertex(200.0, 300.0, 2.0), vertex(-100.0, 300.0, 2.0)];
        fill_polygon(&mut target, &big, Rgba::WHITE);
        assert!(target.depth().iter().all(|&d| (d - 2.0).abs() < 1e-6));
    }
}
