//! Camera-space triangle for ray queries.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use facet_core::Rgba;
use facet_math::{Aabb, Interval, Ray, Vec3};

/// Determinants below this mean the ray runs parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Hits at or before this distance are discarded.
const MIN_HIT_DISTANCE: f32 = 1e-6;

/// A flat-shaded triangle in camera space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTriangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Shaded fill color
    pub color: Rgba,
    /// Index of the frame polygon this triangle came from
    pub source: usize,
    bbox: Aabb,
}

/// Result of a single triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Barycentric weight of `v1`
    pub u: f32,
    /// Barycentric weight of `v2`
    pub v: f32,
}

impl RayTriangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, color: Rgba, source: usize) -> Self {
        Self {
            v0,
            v1,
            v2,
            color,
            source,
            bbox: Aabb::from_triangle(v0, v1, v2),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Möller-Trumbore intersection restricted to `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<TriangleHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t <= MIN_HIT_DISTANCE || !ray_t.contains(t) {
            return None;
        }

        Some(TriangleHit { t, u, v })
    }
}
