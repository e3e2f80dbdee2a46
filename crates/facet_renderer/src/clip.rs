//! Sutherland-Hodgman clipping against the near and far depth planes.
//!
//! Clipping happens in camera space before projection, so every vertex
//! that reaches the projector has a positive depth.

use facet_math::{Vec2, Vec3};

/// Tolerance applied to both clip planes.
pub const CLIP_EPSILON: f32 = 0.001;

/// Denominators below this produce `t = 0` instead of dividing.
const MIN_DENOMINATOR: f32 = 1e-10;

/// A vertex the clipper can split.
pub trait ClipVertex: Copy {
    /// Camera-space depth.
    fn depth(&self) -> f32;

    /// Linear interpolation towards `other`.
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// The same vertex with its depth replaced.
    fn with_depth(self, depth: f32) -> Self;
}

impl ClipVertex for Vec3 {
    #[inline]
    fn depth(&self) -> f32 {
        self.x
    }

    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }

    #[inline]
    fn with_depth(mut self, depth: f32) -> Self {
        self.x = depth;
        self
    }
}

/// Camera-space position with its texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedPoint {
    pub position: Vec3,
    pub uv: Vec2,
}

impl TexturedPoint {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }
}

impl ClipVertex for TexturedPoint {
    #[inline]
    fn depth(&self) -> f32 {
        self.position.x
    }

    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }

    #[inline]
    fn with_depth(mut self, depth: f32) -> Self {
        self.position.x = depth;
        self
    }
}

/// Which half-space of a depth plane survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSide {
    /// Keep `depth >= plane - epsilon`
    Near,
    /// Keep `depth <= plane + epsilon`
    Far,
}

impl ClipSide {
    #[inline]
    fn keeps(self, depth: f32, plane: f32) -> bool {
        match self {
            ClipSide::Near => depth >= plane - CLIP_EPSILON,
            ClipSide::Far => depth <= plane + CLIP_EPSILON,
        }
    }
}

/// Clip a convex polygon against a single depth plane.
///
/// Edges are walked with wrap-around starting from the last vertex, so a
/// polygon lying entirely on the kept side comes back unchanged. The
/// result may have fewer than three vertices; callers drop those.
pub fn clip_against_plane<V: ClipVertex>(vertices: &[V], plane: f32, side: ClipSide) -> Vec<V> {
    let Some(&last) = vertices.last() else {
        return Vec::new();
    };

    let mut output = Vec::with_capacity(vertices.len() + 2);
    let mut prev = last;
    let mut prev_inside = side.keeps(prev.depth(), plane);

    for &curr in vertices {
        let curr_inside = side.keeps(curr.depth(), plane);

        match (prev_inside, curr_inside) {
            (true, true) => output.push(curr),
            (true, false) => output.push(intersect(&prev, &curr, plane)),
            (false, true) => {
                output.push(intersect(&prev, &curr, plane));
                output.push(curr);
            }
            (false, false) => {}
        }

        prev = curr;
        prev_inside = curr_inside;
    }

    output
}

/// Clip against the near plane, then the far plane.
pub fn clip_near_far<V: ClipVertex>(vertices: &[V], near: f32, far: f32) -> Vec<V> {
    let near_clipped = clip_against_plane(vertices, near, ClipSide::Near);
    if near_clipped.len() < 3 {
        return near_clipped;
    }
    clip_against_plane(&near_clipped, far, ClipSide::Far)
}

/// Point on segment `a -> b` at `plane`, snapped exactly onto it.
fn intersect<V: ClipVertex>(a: &V, b: &V, plane: f32) -> V {
    let denom = b.depth() - a.depth();
    let t = if denom.abs() < MIN_DENOMINATOR {
        0.0
    } else {
        ((plane - a.depth()) / denom).clamp(0.0, 1.0)
    };
    a.lerp(b, t).with_depth(plane)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(depth_a: f32, depth_b: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(depth_a, -1.0, -1.0),
            Vec3::new(depth_a, -1.0, 1.0),
            Vec3::new(depth_b, 1.0, 1.0),
            Vec3::new(depth_b, 1.0, -1.0),
        ]
    }

    #[test]
    fn test_fully_inside_is_unchanged() {
        let poly = quad(2.0, 5.0);
        assert_eq!(clip_against_plane(&poly, 1.0, ClipSide::Near), poly);
        assert_eq!(clip_near_far(&poly, 1.0, 100.0), poly);
    }

    #[test]
    fn test_fully_outside_is_empty() {
        let poly = quad(0.1, 0.2);
        assert!(clip_against_plane(&poly, 1.0, ClipSide::Near).is_empty());

        let poly = quad(200.0, 300.0);
        assert!(clip_against_plane(&poly, 100.0, ClipSide::Far).is_empty());
    }

    #[test]
    fn test_straddling_near_plane_snaps_to_plane() {
        // Half the quad is behind the near plane
        let poly = quad(-1.0, 3.0);
        let clipped = clip_against_plane(&poly, 1.0, ClipSide::Near);

        assert_eq!(clipped.len(), 4);
        for v in &clipped {
            assert!(v.x >= 1.0 - CLIP_EPSILON);
        }
        let on_plane: Vec<_> = clipped.iter().filter(|v| v.x == 1.0).collect();
        assert_eq!(on_plane.len(), 2);
        // Halfway along y from -1 to 1
        for v in on_plane {
            assert!(v.y.abs() < 1e-5);
        }
    }

    #[test]
    fn test_clipping_is_idempotent() {
        let polys = [
            quad(-1.0, 3.0),
            quad(0.5, 150.0),
            vec![
                Vec3::new(-3.0, 0.0, 2.0),
                Vec3::new(50.0, 4.0, -1.0),
                Vec3::new(120.0, -2.0, 0.5),
            ],
        ];

        for poly in &polys {
            let once = clip_near_far(poly, 1.0, 100.0);
            let twice = clip_near_far(&once, 1.0, 100.0);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_uvs_interpolate_with_position() {
        let poly = [
            TexturedPoint::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
            TexturedPoint::new(Vec3::new(2.0, 0.0, 1.0), Vec2::new(1.0, 0.0)),
            TexturedPoint::new(Vec3::new(2.0, 1.0, 0.0), Vec2::new(0.0, 1.0)),
        ];
        let clipped = clip_against_plane(&poly, 1.0, ClipSide::Near);

        assert_eq!(clipped.len(), 4);
        let cut = clipped
            .iter()
            .find(|p| p.position.x == 1.0 && p.position.z > 0.0)
            .expect("cut along the first edge");
        assert!((cut.uv.x - 0.5).abs() < 1e-5);
        assert!((cut.position.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_parallel_edge_on_plane_does_not_divide_by_zero() {
        let poly = [
            Vec3::new(1.0 - CLIP_EPSILON * 2.0, 0.0, 0.0),
            Vec3::new(1.0 - CLIP_EPSILON * 2.0, 1.0, 0.0),
            Vec3::new(3.0, 0.0, 1.0),
        ];
        let clipped = clip_against_plane(&poly, 1.0, ClipSide::Near);
        assert!(clipped.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_input() {
        let empty: [Vec3; 0] = [];
        assert!(clip_near_far(&empty, 1.0, 10.0).is_empty());
    }
}
