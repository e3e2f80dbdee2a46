//! Facet math types.
//!
//! Re-exports glam and adds the small set of geometric primitives the
//! renderer needs for ray queries: [`Interval`], [`Aabb`] and [`Ray`].

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Read one component of a vector by axis index (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
