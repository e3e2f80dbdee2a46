//! Bounding Volume Hierarchy (BVH) over camera-space triangles.
//!
//! Built once per frame by the ray-traced strategies and dropped when the
//! frame ends. Nodes store index ranges into a reordered triangle list.

use std::ops::Range;

use facet_math::{axis_component, Aabb, Interval, Ray};

use crate::triangle::{RayTriangle, TriangleHit};

/// Leaf size for primary visibility rays.
pub const PRIMARY_LEAF_SIZE: usize = 4;

/// Leaf size for ambient occlusion rays.
pub const AO_LEAF_SIZE: usize = 8;

/// BVH node - either a branch with two children or a leaf with triangles.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node referencing a slice of the reordered triangles.
    Leaf { range: Range<usize>, bbox: Aabb },
    /// Empty tree.
    Empty,
}

/// Closest hit found by [`Bvh::trace_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhHit {
    /// Index into [`Bvh::triangles`]
    pub triangle: usize,
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// A triangle BVH with median splits.
#[derive(Debug)]
pub struct Bvh {
    triangles: Vec<RayTriangle>,
    root: BvhNode,
}

impl Bvh {
    /// Build a BVH. Leaves hold at most `max_leaf_size` triangles.
    pub fn build(triangles: Vec<RayTriangle>, max_leaf_size: usize) -> Self {
        let max_leaf_size = max_leaf_size.max(1);
        let mut order: Vec<usize> = (0..triangles.len()).collect();

        let root = if triangles.is_empty() {
            BvhNode::Empty
        } else {
            build_node(&triangles, &mut order, 0, max_leaf_size)
        };

        // Reorder so every leaf range is contiguous
        let triangles = order.iter().map(|&i| triangles[i]).collect();

        Self { triangles, root }
    }

    /// Triangles in BVH order; hit indices refer to this slice.
    pub fn triangles(&self) -> &[RayTriangle] {
        &self.triangles
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest hit along the ray within `ray_t`.
    pub fn trace_ray(&self, ray: &Ray, ray_t: Interval) -> Option<BvhHit> {
        self.trace_node(&self.root, ray, ray_t)
    }

    fn trace_node(&self, node: &BvhNode, ray: &Ray, ray_t: Interval) -> Option<BvhHit> {
        match node {
            BvhNode::Empty => None,

            BvhNode::Leaf { range, bbox } => {
                bbox.hit(ray, ray_t)?;

                let mut closest: Option<BvhHit> = None;
                let mut max_t = ray_t.max;
                for index in range.clone() {
                    let interval = Interval::new(ray_t.min, max_t);
                    if let Some(TriangleHit { t, u, v }) = self.triangles[index].intersect(ray, interval) {
                        max_t = t;
                        closest = Some(BvhHit {
                            triangle: index,
                            t,
                            u,
                            v,
                        });
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                bbox.hit(ray, ray_t)?;

                let hit_left = self.trace_node(left, ray, ray_t);

                // Only check right up to the closest hit so far; whatever it
                // returns is nearer than the left hit.
                let right_max = hit_left.map_or(ray_t.max, |hit| hit.t);
                let hit_right = self.trace_node(right, ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }

    /// Whether anything blocks the ray within `ray_t`. Stops at the first hit.
    pub fn occluded(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.occluded_node(&self.root, ray, ray_t)
    }

    fn occluded_node(&self, node: &BvhNode, ray: &Ray, ray_t: Interval) -> bool {
        match node {
            BvhNode::Empty => false,
            BvhNode::Leaf { range, bbox } => {
                bbox.hit(ray, ray_t).is_some()
                    && self.triangles[range.clone()]
                        .iter()
                        .any(|tri| tri.intersect(ray, ray_t).is_some())
            }
            BvhNode::Branch { left, right, bbox } => {
                bbox.hit(ray, ray_t).is_some()
                    && (self.occluded_node(left, ray, ray_t) || self.occluded_node(right, ray, ray_t))
            }
        }
    }

    /// Every triangle the ray intersects within `ray_t`, sorted by index.
    pub fn hit_triangles(&self, ray: &Ray, ray_t: Interval) -> Vec<usize> {
        let mut hits = Vec::new();
        self.collect_hits(&self.root, ray, ray_t, &mut hits);
        hits.sort_unstable();
        hits
    }

    fn collect_hits(&self, node: &BvhNode, ray: &Ray, ray_t: Interval, hits: &mut Vec<usize>) {
        match node {
            BvhNode::Empty => {}
            BvhNode::Leaf { range, bbox } => {
                if bbox.hit(ray, ray_t).is_some() {
                    hits.extend(
                        range
                            .clone()
                            .filter(|&i| self.triangles[i].intersect(ray, ray_t).is_some()),
                    );
                }
            }
            BvhNode::Branch { left, right, bbox } => {
                if bbox.hit(ray, ray_t).is_some() {
                    self.collect_hits(left, ray, ray_t, hits);
                    self.collect_hits(right, ray, ray_t, hits);
                }
            }
        }
    }

    /// Maximum root-to-leaf depth (a single leaf has depth 1).
    pub fn depth(&self) -> usize {
        fn depth_of(node: &BvhNode) -> usize {
            match node {
                BvhNode::Empty => 0,
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn leaves(node: &BvhNode) -> usize {
            match node {
                BvhNode::Empty => 0,
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        leaves(&self.root)
    }
}

/// Recursive BVH construction.
///
/// Simple median-split approach: sort triangles by centroid on the
/// longest axis of the node bounds, split in half, recurse. `order` is the
/// slice of triangle indices this node owns, starting at `offset` in the
/// final ordering.
fn build_node(
    triangles: &[RayTriangle],
    order: &mut [usize],
    offset: usize,
    max_leaf_size: usize,
) -> BvhNode {
    let bounds = order.iter().fold(Aabb::EMPTY, |acc, &i| {
        Aabb::surrounding(&acc, &triangles[i].bounding_box())
    });

    let n = order.len();
    if n <= max_leaf_size {
        return BvhNode::Leaf {
            range: offset..offset + n,
            bbox: bounds,
        };
    }

    let axis = bounds.longest_axis();
    order.sort_unstable_by(|&a, &b| {
        let a_val = axis_component(triangles[a].centroid(), axis);
        let b_val = axis_component(triangles[b].centroid(), axis);
        a_val.total_cmp(&b_val)
    });

    let mid = n / 2;
    let (left_order, right_order) = order.split_at_mut(mid);
    let left = build_node(triangles, left_order, offset, max_leaf_size);
    let right = build_node(triangles, right_order, offset + mid, max_leaf_size);

    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bbox: bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::Rgba;
    use facet_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn quad_triangles(depth: f32, y: f32, z: f32, size: f32, source: usize) -> [RayTriangle; 2] {
        let a = Vec3::new(depth, y - size, z - size);
        let b = Vec3::new(depth, y - size, z + size);
        let c = Vec3::new(depth, y + size, z + size);
        let d = Vec3::new(depth, y + size, z - size);
        [
            RayTriangle::new(a, b, c, Rgba::WHITE, source),
            RayTriangle::new(a, c, d, Rgba::WHITE, source),
        ]
    }

    fn random_triangles(count: usize, seed: u64) -> Vec<RayTriangle> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let center = Vec3::new(
                    rng.gen_range(2.0..40.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let mut corner = || {
                    center
                        + Vec3::new(
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                        )
                };
                RayTriangle::new(corner(), corner(), corner(), Rgba::WHITE, i)
            })
            .collect()
    }

    fn brute_force_hits(triangles: &[RayTriangle], ray: &Ray, ray_t: Interval) -> Vec<usize> {
        let mut hits: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.intersect(ray, ray_t).is_some())
            .map(|(i, _)| i)
            .collect();
        hits.sort_unstable();
        hits
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(vec![], PRIMARY_LEAF_SIZE);
        assert!(matches!(bvh.root(), BvhNode::Empty));
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);

        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(bvh.trace_ray(&ray, Interval::FORWARD).is_none());
        assert!(!bvh.occluded(&ray, Interval::FORWARD));
    }

    #[test]
    fn test_bvh_single_leaf() {
        let bvh = Bvh::build(quad_triangles(5.0, 0.0, 0.0, 1.0, 0).to_vec(), PRIMARY_LEAF_SIZE);
        assert!(matches!(bvh.root(), BvhNode::Leaf { .. }));
        assert_eq!(bvh.leaf_count(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.05, 0.1));
        let hit = bvh.trace_ray(&ray, Interval::FORWARD).expect("ray should hit");
        assert!((hit.t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_trace_returns_nearest_hit() {
        // Three quads stacked along the ray, listed far to near, plus
        // clutter off to the side so the tree has several levels.
        let mut triangles = Vec::new();
        triangles.extend(quad_triangles(9.0, 0.0, 0.0, 2.0, 0));
        triangles.extend(quad_triangles(3.0, 0.0, 0.0, 2.0, 1));
        triangles.extend(quad_triangles(6.0, 0.0, 0.0, 2.0, 2));
        for i in 0..6 {
            triangles.extend(quad_triangles(20.0 + i as f32, 30.0, 30.0, 1.0, 3));
        }

        for leaf_size in [1, 2, 4, 8] {
            let bvh = Bvh::build(triangles.clone(), leaf_size);
            let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.05, 0.02));
            let hit = bvh.trace_ray(&ray, Interval::FORWARD).expect("ray should hit");

            assert_eq!(bvh.triangles()[hit.triangle].source, 1);
            assert!((ray.at(hit.t).x - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_pruning_matches_brute_force() {
        let triangles = random_triangles(300, 7);
        let bvh = Bvh::build(triangles, PRIMARY_LEAF_SIZE);
        assert!(bvh.depth() > 1);

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let direction = Vec3::new(
                1.0,
                rng.gen_range(-0.4..0.4),
                rng.gen_range(-0.4..0.4),
            );
            let ray = Ray::new(Vec3::ZERO, direction);
            let ray_t = Interval::FORWARD;

            let expected = brute_force_hits(bvh.triangles(), &ray, ray_t);
            assert_eq!(bvh.hit_triangles(&ray, ray_t), expected);
            assert_eq!(bvh.occluded(&ray, ray_t), !expected.is_empty());

            let nearest = expected
                .iter()
                .filter_map(|&i| bvh.triangles()[i].intersect(&ray, ray_t))
                .map(|hit| hit.t)
                .fold(f32::INFINITY, f32::min);
            match bvh.trace_ray(&ray, ray_t) {
                Some(hit) => assert!((hit.t - nearest).abs() < 1e-5),
                None => assert!(expected.is_empty()),
            }
        }
    }

    #[test]
    fn test_occlusion_respects_ray_length() {
        let bvh = Bvh::build(quad_triangles(5.0, 0.0, 0.0, 1.0, 0).to_vec(), AO_LEAF_SIZE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.05, 0.1));
        assert!(bvh.occluded(&ray, Interval::new(0.0, 10.0)));
        assert!(!bvh.occluded(&ray, Interval::new(0.0, 4.0)));
    }
}
