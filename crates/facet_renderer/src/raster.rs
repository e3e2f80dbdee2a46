//! Edge-function triangle setup shared by the rasterizing strategies.
//!
//! Pixels are sampled at their centers. Depth is interpolated as `1/z`
//! across the screen and inverted per pixel, so stored depths are true
//! camera depths.

use facet_core::Rgba;
use facet_math::Vec2;

use crate::frame::{ScreenTriangle, ScreenVertex};

/// Twice-areas below this are degenerate.
const MIN_AREA: f32 = 1e-8;

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Overlap of two rectangles.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let rect = PixelRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (rect.x0 <= rect.x1 && rect.y0 <= rect.y1).then_some(rect)
    }
}

/// `a*x + b*y + c`, positive on the inside of a triangle edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFunction {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EdgeFunction {
    /// Edge from `p` to `q`.
    pub fn new(p: Vec2, q: Vec2) -> Self {
        let a = p.y - q.y;
        let b = q.x - p.x;
        let c = (q.y - p.y) * p.x - (q.x - p.x) * p.y;
        Self { a, b, c }
    }

    #[inline]
    pub fn eval(&self, x: f32, y: f32) -> f32 {
        self.a * x + self.b * y + self.c
    }

    fn negated(self) -> Self {
        Self {
            a: -self.a,
            b: -self.b,
            c: -self.c,
        }
    }
}

/// Per-triangle constants computed once before rasterization.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    /// Edge opposite each vertex, oriented so the inside is positive
    pub edges: [EdgeFunction; 3],
    inv_area: f32,
    inv_depth: [f32; 3],
    uvs: [Vec2; 3],
    /// Screen bounding box clamped to the target
    pub bounds: PixelRect,
    /// Nearest vertex depth
    pub min_depth: f32,
    pub color: Rgba,
    /// Frame polygon this triangle belongs to
    pub polygon: usize,
}

impl TriangleSetup {
    /// Prepare a triangle for a `width x height` target. Returns `None` for
    /// degenerate triangles and triangles that cover no pixel center.
    pub fn new(
        triangle: &ScreenTriangle,
        color: Rgba,
        polygon: usize,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let [v0, v1, v2] = triangle.vertices;
        let (p0, p1, p2) = (v0.position(), v1.position(), v2.position());

        let mut edges = [
            EdgeFunction::new(p1, p2),
            EdgeFunction::new(p2, p0),
            EdgeFunction::new(p0, p1),
        ];
        let mut area = edges[2].eval(p2.x, p2.y);
        if !area.is_finite() || area.abs() < MIN_AREA {
            return None;
        }
        if area < 0.0 {
            edges = edges.map(EdgeFunction::negated);
            area = -area;
        }

        let bounds = pixel_bounds(&triangle.vertices, width, height)?;

        Some(Self {
            edges,
            inv_area: 1.0 / area,
            inv_depth: [1.0 / v0.depth, 1.0 / v1.depth, 1.0 / v2.depth],
            uvs: [v0.uv, v1.uv, v2.uv],
            bounds,
            min_depth: v0.depth.min(v1.depth).min(v2.depth),
            color,
            polygon,
        })
    }

    /// Perspective-correct depth from screen-space barycentrics.
    #[inline]
    pub fn depth(&self, weights: [f32; 3]) -> f32 {
        1.0 / (weights[0] * self.inv_depth[0]
            + weights[1] * self.inv_depth[1]
            + weights[2] * self.inv_depth[2])
    }

    /// Screen-space (affine) UV.
    #[inline]
    pub fn affine_uv(&self, weights: [f32; 3]) -> Vec2 {
        self.uvs[0] * weights[0] + self.uvs[1] * weights[1] + self.uvs[2] * weights[2]
    }

    /// True when some edge has all four corners of `rect` outside it.
    pub fn misses_rect(&self, rect: &PixelRect) -> bool {
        let (x0, y0) = (rect.x0 as f32 + 0.5, rect.y0 as f32 + 0.5);
        let (x1, y1) = (rect.x1 as f32 + 0.5, rect.y1 as f32 + 0.5);
        self.edges.iter().any(|e| {
            e.eval(x0, y0) < 0.0 && e.eval(x1, y0) < 0.0 && e.eval(x0, y1) < 0.0 && e.eval(x1, y1) < 0.0
        })
    }

    /// Visit every covered pixel center inside `rect`, passing the pixel,
    /// its depth and its normalized barycentric weights. Edge values step
    /// incrementally along each row.
    pub fn rasterize(&self, rect: &PixelRect, mut visit: impl FnMut(u32, u32, f32, [f32; 3])) {
        let Some(area) = self.bounds.intersect(rect) else {
            return;
        };
        let [e0, e1, e2] = self.edges;

        let start_x = area.x0 as f32 + 0.5;
        for y in area.y0..=area.y1 {
            let py = y as f32 + 0.5;
            let mut w0 = e0.eval(start_x, py);
            let mut w1 = e1.eval(start_x, py);
            let mut w2 = e2.eval(start_x, py);

            for x in area.x0..=area.x1 {
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let weights = [w0 * self.inv_area, w1 * self.inv_area, w2 * self.inv_area];
                    visit(x, y, self.depth(weights), weights);
                }
                w0 += e0.a;
                w1 += e1.a;
                w2 += e2.a;
            }
        }
    }
}

/// Pixels whose centers fall inside the vertices' bounding box.
fn pixel_bounds(vertices: &[ScreenVertex; 3], width: u32, height: u32) -> Option<PixelRect> {
    if width == 0 || height == 0 {
        return None;
    }
    let min_x = vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = vertices.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
    let max_y = vertices.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = (min_x - 0.5).ceil().max(0.0);
    let y0 = (min_y - 0.5).ceil().max(0.0);
    let x1 = (max_x - 0.5).floor().min(width as f32 - 1.0);
    let y1 = (max_y - 0.5).floor().min(height as f32 - 1.0);
    if !(x0 <= x1 && y0 <= y1) {
        return None;
    }

    Some(PixelRect::new(x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}
