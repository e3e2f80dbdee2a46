//! Hybrid: tile rasterization for visibility, ray-traced ambient occlusion
//! on top.
//!
//! Every `stride`-th pixel rebuilds its camera-space position and normal
//! from the depth buffer, fires cosine-weighted rays over the hemisphere
//! and darkens its `stride x stride` block by the occluded fraction.

use std::f32::consts::TAU;

use facet_math::{Interval, Ray, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bvh::{Bvh, AO_LEAF_SIZE};
use crate::camera::View;
use crate::frame::FrameGeometry;
use crate::settings::AmbientOcclusionSettings;
use crate::target::RenderTarget;

use super::tile_rasterizer;

/// Fixed seed so repeated frames give identical noise.
const AO_SEED: u64 = 0x0A0C_C105;

pub fn render(
    frame: &FrameGeometry<'_>,
    target: &mut RenderTarget,
    view: &View,
    ao: &AmbientOcclusionSettings,
) {
    tile_rasterizer::render(frame, target);

    let bvh = Bvh::build(frame.ray_triangles(), AO_LEAF_SIZE);
    if bvh.is_empty() {
        return;
    }
    apply_ambient_occlusion(target, view, &bvh, ao);
}

/// Darken `target` by ambient occlusion against `bvh`. Never brightens.
pub fn apply_ambient_occlusion(
    target: &mut RenderTarget,
    view: &View,
    bvh: &Bvh,
    ao: &AmbientOcclusionSettings,
) {
    let stride = ao.stride.max(1);
    let samples = ao.samples.max(1);
    let strength = ao.strength.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(AO_SEED);

    let (width, height) = (target.width(), target.height());
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            let Some(position) = position_at(target, view, x, y) else {
                continue;
            };
            let normal = normal_at(target, view, x, y, position);

            let bias = 1e-3 * position.x.max(1.0);
            let origin = position + normal * bias;
            let (tangent, bitangent) = orthonormal_basis(normal);

            let mut occluded = 0u32;
            for _ in 0..samples {
                let (r1, r2): (f32, f32) = (rng.gen(), rng.gen());
                let phi = TAU * r1;
                let r = r2.sqrt();
                let direction =
                    tangent * (r * phi.cos()) + bitangent * (r * phi.sin()) + normal * (1.0 - r2).sqrt();
                let ray = Ray::new(origin, direction);
                if bvh.occluded(&ray, Interval::new(1e-4, ao.radius)) {
                    occluded += 1;
                }
            }

            let factor = 1.0 - strength * occluded as f32 / samples as f32;
            if factor < 1.0 {
                darken_block(target, x, y, stride, factor);
            }
        }
    }
}

/// Camera-space surface point seen through pixel `(x, y)`.
fn position_at(target: &RenderTarget, view: &View, x: u32, y: u32) -> Option<Vec3> {
    let depth = target.depth_at(x, y);
    depth
        .is_finite()
        .then(|| view.screen_to_ray_direction(x as f32 + 0.5, y as f32 + 0.5) * depth)
}

/// Surface normal from neighbouring depth samples, facing the camera.
/// Falls back to the reversed view ray.
fn normal_at(target: &RenderTarget, view: &View, x: u32, y: u32, position: Vec3) -> Vec3 {
    let neighbour = |forward: Option<(u32, u32)>, backward: Option<(u32, u32)>| {
        forward
            .and_then(|(nx, ny)| position_at(target, view, nx, ny).map(|p| p - position))
            .or_else(|| {
                backward.and_then(|(nx, ny)| position_at(target, view, nx, ny).map(|p| position - p))
            })
    };

    let right = (x + 1 < target.width()).then_some((x + 1, y));
    let left = x.checked_sub(1).map(|nx| (nx, y));
    let down = (y + 1 < target.height()).then_some((x, y + 1));
    let up = y.checked_sub(1).map(|ny| (x, ny));

    let fallback = -position.normalize_or_zero();
    let normal = match (neighbour(right, left), neighbour(down, up)) {
        (Some(dx), Some(dy)) => dx.cross(dy).normalize_or_zero(),
        _ => Vec3::ZERO,
    };
    if normal == Vec3::ZERO {
        return fallback;
    }
    if normal.dot(-position) < 0.0 {
        -normal
    } else {
        normal
    }
}

fn orthonormal_basis(normal: Vec3) -> (Vec3, Vec3) {
    let helper = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    let tangent = normal.cross(helper).normalize();
    let bitangent = normal.cross(tangent);
    (tangent, bitangent)
}

fn darken_block(target: &mut RenderTarget, x0: u32, y0: u32, stride: u32, factor: f32) {
    let x1 = (x0 + stride).min(target.width());
    let y1 = (y0 + stride).min(target.height());
    for y in y0..y1 {
        for x in x0..x1 {
            if target.depth_at(x, y).is_finite() {
                let color = target.pixel(x, y).scaled(factor);
                target.set_pixel(x, y, color);
            }
        }
    }
}
