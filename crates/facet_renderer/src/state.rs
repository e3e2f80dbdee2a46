//! Flat, serializable camera state for save/restore.
//!
//! Unlike [`CameraSettings`], the state is a single level of key/value
//! pairs so hosts can store it next to other per-object properties.

use std::path::Path;

use facet_core::Rgba;
use facet_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::Camera;
use crate::method::RenderMethod;
use crate::settings::{AmbientOcclusionSettings, CameraSettings, DepthOfFieldSettings, Rotation};

/// Errors that can occur when saving or loading camera state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read or write camera state: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid camera state JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every camera setting as a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraState {
    pub active: bool,
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub background_color: Rgba,
    pub output_width: u32,
    pub output_height: u32,
    /// Kept as text so unknown names degrade to a warning
    pub rendering_method: String,
    pub enable_backface_culling: bool,
    pub disable_culling: bool,
    pub culling_field_of_view: f32,
    pub light_direction: [f32; 3],
    pub light_color: Rgba,
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub dof_enabled: bool,
    pub dof_focal_distance: f32,
    pub dof_aperture: f32,
    pub dof_max_blur_radius: f32,
    pub ao_stride: u32,
    pub ao_samples: u32,
    pub ao_radius: f32,
    pub ao_strength: f32,
    pub accelerate_ray_tracing: bool,
    pub bvh_leaf_size: usize,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from(&CameraSettings::default())
    }
}

impl From<&CameraSettings> for CameraState {
    fn from(s: &CameraSettings) -> Self {
        Self {
            active: s.active,
            position: s.position.to_array(),
            yaw: s.rotation.yaw,
            pitch: s.rotation.pitch,
            roll: s.rotation.roll,
            field_of_view: s.field_of_view,
            near_plane: s.near_plane,
            far_plane: s.far_plane,
            background_color: s.background_color,
            output_width: s.output_width,
            output_height: s.output_height,
            rendering_method: s.rendering_method.name().to_string(),
            enable_backface_culling: s.enable_backface_culling,
            disable_culling: s.disable_culling,
            culling_field_of_view: s.culling_field_of_view,
            light_direction: s.light_direction.to_array(),
            light_color: s.light_color,
            light_intensity: s.light_intensity,
            ambient_intensity: s.ambient_intensity,
            dof_enabled: s.depth_of_field.enabled,
            dof_focal_distance: s.depth_of_field.focal_distance,
            dof_aperture: s.depth_of_field.aperture,
            dof_max_blur_radius: s.depth_of_field.max_blur_radius,
            ao_stride: s.ambient_occlusion.stride,
            ao_samples: s.ambient_occlusion.samples,
            ao_radius: s.ambient_occlusion.radius,
            ao_strength: s.ambient_occlusion.strength,
            accelerate_ray_tracing: s.accelerate_ray_tracing,
            bvh_leaf_size: s.bvh_leaf_size,
        }
    }
}

impl CameraState {
    /// Settings described by this state (not yet validated). An unknown
    /// render method name falls back to the default with a warning.
    pub fn to_settings(&self) -> CameraSettings {
        let rendering_method = self.rendering_method.parse().unwrap_or_else(|err| {
            let fallback = RenderMethod::default();
            log::warn!("{}; using {}", err, fallback);
            fallback
        });

        CameraSettings {
            active: self.active,
            position: Vec3::from_array(self.position),
            rotation: Rotation::new(self.yaw, self.pitch, self.roll),
            field_of_view: self.field_of_view,
            near_plane: self.near_plane,
            far_plane: self.far_plane,
            background_color: self.background_color,
            output_width: self.output_width,
            output_height: self.output_height,
            rendering_method,
            enable_backface_culling: self.enable_backface_culling,
            disable_culling: self.disable_culling,
            culling_field_of_view: self.culling_field_of_view,
            light_direction: Vec3::from_array(self.light_direction),
            light_color: self.light_color,
            light_intensity: self.light_intensity,
            ambient_intensity: self.ambient_intensity,
            depth_of_field: DepthOfFieldSettings {
                enabled: self.dof_enabled,
                focal_distance: self.dof_focal_distance,
                aperture: self.dof_aperture,
                max_blur_radius: self.dof_max_blur_radius,
            },
            ambient_occlusion: AmbientOcclusionSettings {
                stride: self.ao_stride,
                samples: self.ao_samples,
                radius: self.ao_radius,
                strength: self.ao_strength,
            },
            accelerate_ray_tracing: self.accelerate_ray_tracing,
            bvh_leaf_size: self.bvh_leaf_size,
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse state; keys missing from the JSON take default values.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl Camera {
    /// Snapshot of the current settings.
    pub fn save_state(&self) -> CameraState {
        CameraState::from(self.settings())
    }

    /// Restore settings from a snapshot, reallocating the render target
    /// for the stored output size.
    pub fn load_state(&mut self, state: &CameraState) {
        self.apply_settings(state.to_settings());
    }

    pub fn from_state(state: &CameraState) -> Self {
        Camera::new(state.to_settings())
    }
}
