//! Camera configuration.
//!
//! Hosts edit a [`CameraSettings`] and hand it to
//! [`Camera::apply_settings`](crate::Camera::apply_settings), which clamps
//! every field into range before it takes effect.

use facet_core::Rgba;
use facet_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::method::RenderMethod;

pub const FOV_RANGE: (f32, f32) = (1.0, 179.0);
pub const NEAR_RANGE: (f32, f32) = (0.01, 10.0);
pub const FAR_RANGE: (f32, f32) = (10.0, 10000.0);
pub const LIGHT_INTENSITY_RANGE: (f32, f32) = (0.0, 2.0);
pub const AMBIENT_RANGE: (f32, f32) = (0.0, 1.0);
pub const OUTPUT_SIZE_RANGE: (u32, u32) = (64, 2048);
pub const BVH_LEAF_RANGE: (usize, usize) = (1, 64);

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    /// Turn about the vertical axis; positive turns right
    pub yaw: f32,
    /// Tilt about the horizontal axis
    pub pitch: f32,
    /// Spin about the view axis
    pub roll: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// Depth-of-field post pass (depth-pass mode only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthOfFieldSettings {
    pub enabled: bool,
    /// Camera depth that stays sharp
    pub focal_distance: f32,
    /// Blur growth with distance from the focal plane
    pub aperture: f32,
    /// Largest blur radius in pixels
    pub max_blur_radius: f32,
}

impl Default for DepthOfFieldSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            focal_distance: 10.0,
            aperture: 1.0,
            max_blur_radius: 4.0,
        }
    }
}

/// Ambient occlusion pass of the hybrid strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmbientOcclusionSettings {
    /// Only every `stride`-th pixel in each direction casts rays
    pub stride: u32,
    /// Rays per sampled pixel
    pub samples: u32,
    /// Ray length in camera units
    pub radius: f32,
    /// Darkening at full occlusion
    pub strength: f32,
}

impl Default for AmbientOcclusionSettings {
    fn default() -> Self {
        Self {
            stride: 2,
            samples: 8,
            radius: 2.0,
            strength: 0.6,
        }
    }
}

/// Everything a host can configure on a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    /// Inactive cameras clear their target and draw nothing
    pub active: bool,
    /// Offset from the owner's origin
    pub position: Vec3,
    pub rotation: Rotation,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub background_color: Rgba,
    pub output_width: u32,
    pub output_height: u32,
    pub rendering_method: RenderMethod,
    pub enable_backface_culling: bool,
    /// Turns off whole-face FOV rejection
    pub disable_culling: bool,
    /// FOV used for visibility tests when backface culling is off
    pub culling_field_of_view: f32,
    pub light_direction: Vec3,
    pub light_color: Rgba,
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub depth_of_field: DepthOfFieldSettings,
    pub ambient_occlusion: AmbientOcclusionSettings,
    /// Trace primary rays through a BVH instead of every triangle
    pub accelerate_ray_tracing: bool,
    pub bvh_leaf_size: usize,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            active: true,
            position: Vec3::ZERO,
            rotation: Rotation::default(),
            field_of_view: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            background_color: Rgba::rgb(20, 20, 28),
            output_width: 320,
            output_height: 240,
            rendering_method: RenderMethod::default(),
            enable_backface_culling: true,
            disable_culling: false,
            culling_field_of_view: 90.0,
            light_direction: Vec3::new(-1.0, -0.5, 1.0),
            light_color: Rgba::WHITE,
            light_intensity: 1.0,
            ambient_intensity: 0.3,
            depth_of_field: DepthOfFieldSettings::default(),
            ambient_occlusion: AmbientOcclusionSettings::default(),
            accelerate_ray_tracing: true,
            bvh_leaf_size: crate::bvh::PRIMARY_LEAF_SIZE,
        }
    }
}

impl CameraSettings {
    /// Aspect ratio (width / height) of the output.
    pub fn aspect(&self) -> f32 {
        self.output_width as f32 / self.output_height.max(1) as f32
    }

    /// Copy with every field clamped into range. Non-finite numbers fall
    /// back to their defaults. Logs a warning per corrected field.
    pub fn validated(&self) -> Self {
        let defaults = Self::default();
        let dof_defaults = DepthOfFieldSettings::default();
        let ao_defaults = AmbientOcclusionSettings::default();
        let mut s = self.clone();

        s.position = finite_vec("position", s.position, defaults.position);
        s.rotation = Rotation {
            yaw: finite("rotation.yaw", s.rotation.yaw, 0.0),
            pitch: finite("rotation.pitch", s.rotation.pitch, 0.0),
            roll: finite("rotation.roll", s.rotation.roll, 0.0),
        };
        s.field_of_view = clamp_f32("fieldOfView", s.field_of_view, FOV_RANGE, defaults.field_of_view);
        s.near_plane = clamp_f32("nearPlane", s.near_plane, NEAR_RANGE, defaults.near_plane);
        s.far_plane = clamp_f32("farPlane", s.far_plane, FAR_RANGE, defaults.far_plane);
        if s.far_plane <= s.near_plane {
            log::warn!("farPlane {} not beyond nearPlane {}; adjusting", s.far_plane, s.near_plane);
            s.far_plane = (s.near_plane * 2.0).clamp(FAR_RANGE.0, FAR_RANGE.1);
        }
        s.output_width = clamp_u32("outputWidth", s.output_width, OUTPUT_SIZE_RANGE);
        s.output_height = clamp_u32("outputHeight", s.output_height, OUTPUT_SIZE_RANGE);
        s.culling_field_of_view = clamp_f32(
            "cullingFieldOfView",
            s.culling_field_of_view,
            FOV_RANGE,
            defaults.culling_field_of_view,
        );
        s.light_direction = finite_vec("lightDirection", s.light_direction, defaults.light_direction);
        s.light_intensity = clamp_f32(
            "lightIntensity",
            s.light_intensity,
            LIGHT_INTENSITY_RANGE,
            defaults.light_intensity,
        );
        s.ambient_intensity = clamp_f32(
            "ambientIntensity",
            s.ambient_intensity,
            AMBIENT_RANGE,
            defaults.ambient_intensity,
        );

        let dof = &mut s.depth_of_field;
        dof.focal_distance = clamp_f32(
            "depthOfField.focalDistance",
            dof.focal_distance,
            (0.1, 10000.0),
            dof_defaults.focal_distance,
        );
        dof.aperture = clamp_f32("depthOfField.aperture", dof.aperture, (0.0, 10.0), dof_defaults.aperture);
        dof.max_blur_radius = clamp_f32(
            "depthOfField.maxBlurRadius",
            dof.max_blur_radius,
            (0.0, 32.0),
            dof_defaults.max_blur_radius,
        );

        let ao = &mut s.ambient_occlusion;
        ao.stride = clamp_u32("ambientOcclusion.stride", ao.stride, (1, 16));
        ao.samples = clamp_u32("ambientOcclusion.samples", ao.samples, (1, 64));
        ao.radius = clamp_f32("ambientOcclusion.radius", ao.radius, (0.01, 100.0), ao_defaults.radius);
        ao.strength = clamp_f32("ambientOcclusion.strength", ao.strength, (0.0, 1.0), ao_defaults.strength);

        let leaf = s.bvh_leaf_size.clamp(BVH_LEAF_RANGE.0, BVH_LEAF_RANGE.1);
        if leaf != s.bvh_leaf_size {
            log::warn!("bvhLeafSize {} out of range; clamped to {}", s.bvh_leaf_size, leaf);
            s.bvh_leaf_size = leaf;
        }

        s
    }
}

fn finite(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{} is not finite; using {}", name, fallback);
        fallback
    }
}

fn finite_vec(name: &str, value: Vec3, fallback: Vec3) -> Vec3 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{} is not finite; using {:?}", name, fallback);
        fallback
    }
}

fn clamp_f32(name: &str, value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    let value = finite(name, value, fallback);
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{} {} out of range; clamped to {}", name, value, clamped);
    }
    clamped
}

fn clamp_u32(name: &str, value: u32, (min, max): (u32, u32)) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{} {} out of range; clamped to {}", name, value, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let defaults = CameraSettings::default();
        assert_eq!(defaults.validated(), defaults);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings = CameraSettings {
            field_of_view: 500.0,
            near_plane: -1.0,
            far_plane: 1e9,
            output_width: 10,
            output_height: 4096,
            light_intensity: 7.0,
            ambient_intensity: -0.5,
            culling_field_of_view: 0.0,
            ..Default::default()
        }
        .validated();

        assert_eq!(settings.field_of_view, 179.0);
        assert_eq!(settings.near_plane, 0.01);
        assert_eq!(settings.far_plane, 10000.0);
        assert_eq!(settings.output_width, 64);
        assert_eq!(settings.output_height, 2048);
        assert_eq!(settings.light_intensity, 2.0);
        assert_eq!(settings.ambient_intensity, 0.0);
        assert_eq!(settings.culling_field_of_view, 1.0);
    }

    #[test]
    fn test_nested_settings_are_clamped() {
        let mut settings = CameraSettings::default();
        settings.depth_of_field.aperture = 50.0;
        settings.depth_of_field.max_blur_radius = -3.0;
        settings.ambient_occlusion.stride = 0;
        settings.ambient_occlusion.samples = 1000;
        settings.ambient_occlusion.strength = f32::NAN;
        let settings = settings.validated();

        assert_eq!(settings.depth_of_field.aperture, 10.0);
        assert_eq!(settings.depth_of_field.max_blur_radius, 0.0);
        assert_eq!(settings.ambient_occlusion.stride, 1);
        assert_eq!(settings.ambient_occlusion.samples, 64);
        assert_eq!(
            settings.ambient_occlusion.strength,
            AmbientOcclusionSettings::default().strength
        );
    }

    #[test]
    fn test_far_stays_beyond_near() {
        let settings = CameraSettings {
            near_plane: 10.0,
            far_plane: 10.0,
            ..Default::default()
        }
        .validated();
        assert!(settings.far_plane > settings.near_plane);
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let json = r#"{ "fieldOfView": 75.0, "renderingMethod": "depth-pass", "depthOfField": { "enabled": true } }"#;
        let settings: CameraSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.field_of_view, 75.0);
        assert_eq!(settings.rendering_method, RenderMethod::DepthPass);
        assert!(settings.depth_of_field.enabled);
        assert_eq!(settings.depth_of_field.focal_distance, 10.0);
        assert_eq!(settings.output_width, 320);
    }
}
