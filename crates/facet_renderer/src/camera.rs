//! Camera: pose, projection and the per-frame render entry point.
//!
//! A [`View`] snapshots everything the projection math needs for one frame
//! (the camera pose combined with its owner's pose, plus the lens and
//! culling parameters). [`Camera`] owns the settings and the render target
//! and drives a frame through the pre-pass and the selected strategy.

use facet_core::{OwnerPose, SceneProvider};
use facet_math::{Mat3, Vec3};

use crate::frame::FrameGeometry;
use crate::lighting::Lighting;
use crate::method::{RenderMethod, RenderParams};
use crate::settings::CameraSettings;
use crate::target::RenderTarget;

/// Points at or before this depth cannot be projected.
const MIN_PROJECT_DEPTH: f32 = 1e-6;

/// A projected point: pixel coordinates plus the camera depth it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Frame-constant projection state.
#[derive(Debug, Clone, Copy)]
pub struct View {
    /// World-space camera origin
    pub origin: Vec3,
    /// World-to-camera rotation
    rotation: Mat3,
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
    /// Vertical field of view, radians
    fov: f32,
    /// Field of view for visibility tests, radians
    culling_fov: f32,
    pub backface_culling: bool,
    pub disable_culling: bool,
}

impl View {
    pub fn new(settings: &CameraSettings, owner: &OwnerPose) -> Self {
        let yaw = (owner.rotation + settings.rotation.yaw).to_radians();
        let pitch = settings.rotation.pitch.to_radians();
        let roll = settings.rotation.roll.to_radians();

        // Undo yaw first, then pitch, then roll
        let rotation =
            Mat3::from_rotation_x(-roll) * Mat3::from_rotation_y(-pitch) * Mat3::from_rotation_z(-yaw);

        Self {
            origin: owner.origin() + settings.position,
            rotation,
            width: settings.output_width,
            height: settings.output_height,
            near: settings.near_plane,
            far: settings.far_plane,
            fov: settings.field_of_view.to_radians(),
            culling_fov: settings.culling_field_of_view.to_radians(),
            backface_culling: settings.enable_backface_culling,
            disable_culling: settings.disable_culling,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Cone used by visibility tests: the culling FOV once backface
    /// culling is off (or FOV culling is overridden), else the lens FOV.
    fn cone_fov(&self) -> f32 {
        if self.disable_culling || !self.backface_culling {
            self.culling_fov
        } else {
            self.fov
        }
    }

    /// World point into camera space (x depth, y right, z up).
    pub fn world_to_camera(&self, world: Vec3) -> Vec3 {
        self.rotation * (world - self.origin)
    }

    /// Perspective projection to pixel coordinates. `None` when the point
    /// is at or behind the camera.
    ///
    /// The frame pre-pass always projects through the lens FOV. Passing
    /// `use_culling_fov` maps through the wider culling cone instead (when
    /// backface or FOV culling is off), which hosts use to place points
    /// that sit just outside the visible frame, e.g. for edge markers or
    /// picking against the culling region.
    pub fn project_camera_point(&self, point: Vec3, use_culling_fov: bool) -> Option<ScreenPoint> {
        let depth = point.x;
        if depth <= MIN_PROJECT_DEPTH {
            return None;
        }

        let fov = if use_culling_fov { self.cone_fov() } else { self.fov };
        let f = 1.0 / (fov * 0.5).tan();
        let ndc_h = (point.y / depth) * (f / self.aspect());
        let ndc_v = (point.z / depth) * f;

        Some(ScreenPoint {
            x: (ndc_h + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc_v) * 0.5 * self.height as f32,
            depth,
        })
    }

    /// Camera-space direction through a pixel position, with depth 1.
    pub fn screen_to_ray_direction(&self, sx: f32, sy: f32) -> Vec3 {
        let f = 1.0 / (self.fov * 0.5).tan();
        let ndc_h = sx / self.width as f32 * 2.0 - 1.0;
        let ndc_v = 1.0 - sy / self.height as f32 * 2.0;
        Vec3::new(1.0, ndc_h * self.aspect() / f, ndc_v / f)
    }

    /// Depth-range test, plus a cone test when `check_fov` is set and FOV
    /// culling is not disabled.
    pub fn is_point_visible(&self, point: Vec3, check_fov: bool) -> bool {
        let depth = point.x;
        if depth < self.near || depth > self.far {
            return false;
        }
        if !check_fov || self.disable_culling {
            return true;
        }

        let tan_half = (self.cone_fov() * 0.5).tan();
        (point.y / depth).abs() <= tan_half * self.aspect() && (point.z / depth).abs() <= tan_half
    }

    /// Whole-face FOV rejection. Only true when every point lies outside
    /// the same side of the view cone, or entirely outside the depth range,
    /// so partially visible faces are never rejected.
    pub fn face_outside_fov(&self, points: &[Vec3]) -> bool {
        if self.disable_culling || points.is_empty() {
            return false;
        }

        let tan_v = (self.cone_fov() * 0.5).tan();
        let tan_h = tan_v * self.aspect();
        // near, far, right, left, top, bottom
        let mut outside = [true; 6];
        for p in points {
            let sides = [
                p.x < self.near,
                p.x > self.far,
                p.y > tan_h * p.x,
                -p.y > tan_h * p.x,
                p.z > tan_v * p.x,
                -p.z > tan_v * p.x,
            ];
            for (all, side) in outside.iter_mut().zip(sides) {
                *all &= side;
            }
        }
        outside.contains(&true)
    }
}

/// A software camera with its own render target.
#[derive(Debug, Clone)]
pub struct Camera {
    settings: CameraSettings,
    target: RenderTarget,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        let settings = settings.validated();
        let target = RenderTarget::new(settings.output_width, settings.output_height);
        Self { settings, target }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Validate and apply new settings, reallocating the target if the
    /// output size changed.
    pub fn apply_settings(&mut self, settings: CameraSettings) {
        self.settings = settings.validated();
        self.target
            .resize(self.settings.output_width, self.settings.output_height);
    }

    /// Edit the current settings in place, then validate and apply them.
    pub fn configure(&mut self, edit: impl FnOnce(&mut CameraSettings)) {
        let mut settings = self.settings.clone();
        edit(&mut settings);
        self.apply_settings(settings);
    }

    /// Switch strategy by name. Unknown names keep the current method.
    pub fn set_rendering_method_by_name(&mut self, name: &str) -> bool {
        match name.parse::<RenderMethod>() {
            Ok(method) => {
                self.settings.rendering_method = method;
                true
            }
            Err(err) => {
                log::warn!("{}; keeping {}", err, self.settings.rendering_method);
                false
            }
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Projection state for a given owner pose.
    pub fn view(&self, owner: &OwnerPose) -> View {
        View::new(&self.settings, owner)
    }

    pub fn lighting(&self) -> Lighting {
        Lighting {
            direction: self.settings.light_direction,
            color: self.settings.light_color,
            intensity: self.settings.light_intensity,
            ambient: self.settings.ambient_intensity,
        }
    }

    pub fn world_to_camera(&self, world: Vec3, owner: &OwnerPose) -> Vec3 {
        self.view(owner).world_to_camera(world)
    }

    pub fn project_camera_point(&self, point: Vec3, use_culling_fov: bool) -> Option<ScreenPoint> {
        self.view(&OwnerPose::default())
            .project_camera_point(point, use_culling_fov)
    }

    pub fn screen_to_ray_direction(&self, sx: f32, sy: f32) -> Vec3 {
        self.view(&OwnerPose::default()).screen_to_ray_direction(sx, sy)
    }

    pub fn is_point_visible(&self, point: Vec3, check_fov: bool) -> bool {
        self.view(&OwnerPose::default()).is_point_visible(point, check_fov)
    }

    /// Render one frame of `scene` as seen from a camera carried by `owner`.
    ///
    /// Never fails: bad geometry is skipped and logged at trace level.
    pub fn render(&mut self, scene: &dyn SceneProvider, owner: &OwnerPose) {
        self.target
            .resize(self.settings.output_width, self.settings.output_height);
        self.target.clear(self.settings.background_color);

        if !self.settings.active {
            return;
        }

        let view = self.view(owner);
        let frame = FrameGeometry::build(scene, &view, &self.lighting());

        let params = RenderParams {
            view,
            accelerate_ray_tracing: self.settings.accelerate_ray_tracing,
            bvh_leaf_size: self.settings.bvh_leaf_size,
            depth_of_field: self.settings.depth_of_field,
            ambient_occlusion: self.settings.ambient_occlusion,
        };
        let method = self.settings.rendering_method;
        method.render(&frame, &mut self.target, &params);

        log::debug!(
            "Rendered {}x{} with {}: {} polygons from {} faces ({} culled, {} clipped away, {} outside FOV, {} invalid)",
            self.target.width(),
            self.target.height(),
            method,
            frame.polygons.len(),
            frame.stats.faces,
            frame.stats.backface_culled,
            frame.stats.clipped_away,
            frame.stats.outside_fov,
            frame.stats.invalid,
        );
    }
}
