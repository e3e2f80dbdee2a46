use crate::{axis_component, Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// Stored as one interval per axis so the slab test can walk the axes
/// uniformly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// A box that contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create an AABB from two corner points.
    ///
    /// Axes thinner than a small delta are padded, so axis-aligned
    /// triangles still produce a box a ray can enter.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Bounding box of a triangle.
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test. Returns the part of `ray_t` spent inside the box, or
    /// `None` when the ray misses it within that range.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> Option<Interval> {
        let inv = ray.inv_direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = axis_component(ray.origin, axis);
            let inv_d = axis_component(inv, axis);

            let mut t0 = (slab.min - origin) * inv_d;
            let mut t1 = (slab.max - origin) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            // f32::max/min drop NaN, which covers origins lying on a slab
            // plane with a zero direction component.
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return None;
            }
        }

        Some(ray_t)
    }

    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        for interval in [&mut self.x, &mut self.y, &mut self.z] {
            if interval.size() < delta {
                *interval = Interval::new(interval.min - delta * 0.5, interval.max + delta * 0.5);
            }
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }
}
