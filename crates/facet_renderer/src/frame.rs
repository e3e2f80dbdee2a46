//! Per-frame geometry pre-pass shared by every strategy.
//!
//! For each face of each active renderable: transform to camera space,
//! reject faces wholly outside the view cone, clip against the near and
//! far planes, cull back faces, flat shade, and project. Strategies only
//! ever see the surviving [`FramePolygon`]s.

use facet_core::{RenderMode, Rgba, SceneProvider, Texture};
use facet_math::{Vec2, Vec3};

use crate::camera::View;
use crate::clip::{clip_near_far, TexturedPoint};
use crate::cull::{face_normal, should_cull_face};
use crate::lighting::{modulate, Lighting, DEFAULT_NORMAL};
use crate::triangle::RayTriangle;

/// A projected vertex: pixel position, camera depth and texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub uv: Vec2,
}

impl ScreenVertex {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Three projected vertices from a polygon fan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub vertices: [ScreenVertex; 3],
}

/// A clipped, shaded and projected face.
#[derive(Debug, Clone)]
pub struct FramePolygon<'a> {
    /// Clipped camera-space vertices
    pub camera: Vec<Vec3>,
    /// Projected vertices, one per camera vertex
    pub screen: Vec<ScreenVertex>,
    /// World-space unit normal
    pub normal: Vec3,
    /// Lit flat color
    pub color: Rgba,
    /// Per-channel light multiplier, for modulating texels
    pub tint: Vec3,
    pub wireframe_color: Rgba,
    pub mode: RenderMode,
    /// Set only when the face carries usable UVs
    pub texture: Option<&'a Texture>,
}

impl FramePolygon<'_> {
    pub fn min_depth(&self) -> f32 {
        self.camera.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn average_depth(&self) -> f32 {
        self.camera.iter().map(|p| p.x).sum::<f32>() / self.camera.len() as f32
    }

    /// Lit texel color at `uv`, or the flat color for untextured faces.
    #[inline]
    pub fn shade_at(&self, uv: Vec2) -> Rgba {
        match self.texture {
            Some(texture) => modulate(texture.sample_nearest(uv.x, uv.y), self.tint),
            None => self.color,
        }
    }

    /// Fan triangulation around the first screen vertex.
    pub fn screen_triangles(&self) -> impl Iterator<Item = ScreenTriangle> + '_ {
        (1..self.screen.len().saturating_sub(1)).map(move |i| ScreenTriangle {
            vertices: [self.screen[0], self.screen[i], self.screen[i + 1]],
        })
    }

    /// Fan triangulation of the camera-space vertices.
    pub fn camera_triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (1..self.camera.len().saturating_sub(1))
            .map(move |i| [self.camera[0], self.camera[i], self.camera[i + 1]])
    }
}

/// Counters reported in the per-frame debug log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub renderables: usize,
    pub faces: usize,
    /// Too few indices or indices out of range
    pub invalid: usize,
    pub outside_fov: usize,
    pub clipped_away: usize,
    pub backface_culled: usize,
}

/// Everything the strategies draw in one frame.
#[derive(Debug, Clone)]
pub struct FrameGeometry<'a> {
    pub width: u32,
    pub height: u32,
    pub polygons: Vec<FramePolygon<'a>>,
    pub stats: FrameStats,
}

impl<'a> FrameGeometry<'a> {
    /// Run the pre-pass over every active renderable in `scene`.
    pub fn build(scene: &'a dyn SceneProvider, view: &View, lighting: &Lighting) -> Self {
        let mut polygons = Vec::new();
        let mut stats = FrameStats::default();

        for renderable in scene.renderables() {
            if !renderable.is_active() {
                continue;
            }
            stats.renderables += 1;

            let vertices = renderable.vertices();
            let texture = renderable.texture();
            let mode = renderable.render_mode();

            for (face_index, face) in renderable.faces().iter().enumerate() {
                stats.faces += 1;

                if face.indices.len() < 3 || face.indices.iter().any(|&i| i as usize >= vertices.len()) {
                    log::trace!("Skipping face {}: bad index list {:?}", face_index, face.indices);
                    stats.invalid += 1;
                    continue;
                }

                let world: Vec<Vec3> = face.indices.iter().map(|&i| vertices[i as usize]).collect();
                let camera: Vec<Vec3> = world.iter().map(|&p| view.world_to_camera(p)).collect();

                if view.face_outside_fov(&camera) {
                    log::trace!("Skipping face {}: outside view cone", face_index);
                    stats.outside_fov += 1;
                    continue;
                }

                let uvs = texture.and(face.valid_uvs());
                let points: Vec<TexturedPoint> = camera
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| TexturedPoint::new(p, uvs.map_or(Vec2::ZERO, |uvs| uvs[i])))
                    .collect();

                let clipped = clip_near_far(&points, view.near, view.far);
                if clipped.len() < 3 {
                    log::trace!("Skipping face {}: clipped away", face_index);
                    stats.clipped_away += 1;
                    continue;
                }

                let clipped_camera: Vec<Vec3> = clipped.iter().map(|p| p.position).collect();
                if view.backface_culling && should_cull_face(&clipped_camera) {
                    stats.backface_culled += 1;
                    continue;
                }

                let screen: Vec<ScreenVertex> = clipped
                    .iter()
                    .filter_map(|p| {
                        view.project_camera_point(p.position, false).map(|s| ScreenVertex {
                            x: s.x,
                            y: s.y,
                            depth: s.depth,
                            uv: p.uv,
                        })
                    })
                    .collect();
                if screen.len() < 3 || screen.len() != clipped.len() {
                    log::trace!("Skipping face {}: projection failed", face_index);
                    stats.clipped_away += 1;
                    continue;
                }

                let normal = face_normal(&world).unwrap_or(DEFAULT_NORMAL);
                let tint = lighting.tint(normal);
                let base = face.color.unwrap_or_else(|| renderable.color());

                polygons.push(FramePolygon {
                    camera: clipped_camera,
                    screen,
                    normal,
                    color: modulate(base, tint),
                    tint,
                    wireframe_color: renderable.wireframe_color(),
                    mode,
                    texture: uvs.and(texture),
                });
            }
        }

        Self {
            width: view.width,
            height: view.height,
            polygons,
            stats,
        }
    }

    /// Polygons that are filled (solid or both).
    pub fn filled(&self) -> impl Iterator<Item = (usize, &FramePolygon<'a>)> + '_ {
        self.polygons
            .iter()
            .enumerate()
            .filter(|(_, polygon)| polygon.mode.fills())
    }

    /// Camera-space triangles of all filled polygons, for ray queries.
    pub fn ray_triangles(&self) -> Vec<RayTriangle> {
        self.filled()
            .flat_map(|(index, polygon)| {
                polygon
                    .camera_triangles()
                    .map(move |[a, b, c]| RayTriangle::new(a, b, c, polygon.color, index))
            })
            .collect()
    }

    /// Screen-space triangles of all filled polygons, with their fill color
    /// and polygon index. Textures are not sampled by the depth-buffered
    /// strategies.
    pub fn screen_triangles(&self) -> impl Iterator<Item = (usize, Rgba, ScreenTriangle)> + '_ {
        self.filled().flat_map(|(index, polygon)| {
            polygon
                .screen_triangles()
                .map(move |triangle| (index, polygon.color, triangle))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CameraSettings;
    use facet_core::{Face, Mesh, OwnerPose, Scene};

    fn view(settings: CameraSettings) -> View {
        View::new(&settings.validated(), &OwnerPose::default())
    }

    fn default_view() -> View {
        view(CameraSettings::default())
    }

    #[test]
    fn test_front_facing_billboard_survives() {
        let scene = Scene::new().with_mesh(Mesh::billboard(Vec3::new(5.0, 0.0, 0.0), 1.0));
        let frame = FrameGeometry::build(&scene, &default_view(), &Lighting::default());

        assert_eq!(frame.polygons.len(), 1);
        let polygon = &frame.polygons[0];
        assert_eq!(polygon.screen.len(), 4);
        assert_eq!(polygon.screen_triangles().count(), 2);
        assert!((polygon.normal - Vec3::X).length() < 1e-5);
        assert!(polygon.texture.is_none());
    }

    #[test]
    fn test_back_face_culled_unless_disabled() {
        let mut mesh = Mesh::billboard(Vec3::new(5.0, 0.0, 0.0), 1.0);
        mesh.faces[0].indices.reverse();
        let scene = Scene::new().with_mesh(mesh);

        let frame = FrameGeometry::build(&scene, &default_view(), &Lighting::default());
        assert!(frame.polygons.is_empty());
        assert_eq!(frame.stats.backface_culled, 1);

        let no_culling = view(CameraSettings {
            enable_backface_culling: false,
            ..Default::default()
        });
        let frame = FrameGeometry::build(&scene, &no_culling, &Lighting::default());
        assert_eq!(frame.polygons.len(), 1);
    }

    #[test]
    fn test_invalid_faces_and_inactive_meshes_skipped() {
        let mut mesh = Mesh::triangle(Vec3::new(5.0, -1.0, -1.0), Vec3::new(5.0, 1.0, 1.0), Vec3::new(5.0, -1.0, 1.0));
        mesh.faces.push(Face::new(vec![0, 1]));
        mesh.faces.push(Face::new(vec![0, 1, 7]));
        let mut hidden = Mesh::cube(Vec3::new(5.0, 0.0, 0.0), 1.0);
        hidden.active = false;
        let scene = Scene::new().with_mesh(mesh).with_mesh(hidden);

        let frame = FrameGeometry::build(&scene, &default_view(), &Lighting::default());
        assert_eq!(frame.polygons.len(), 1);
        assert_eq!(frame.stats.renderables, 1);
        assert_eq!(frame.stats.invalid, 2);
    }

    #[test]
    fn test_near_plane_crossing_is_clipped() {
        // Quad from depth -1 to 3, wide enough to stay inside the cone
        let mesh = Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -0.5),
                Vec3::new(-1.0, -1.0, 0.5),
                Vec3::new(3.0, 1.0, 0.5),
                Vec3::new(3.0, 1.0, -0.5),
            ],
            vec![Face::new(vec![0, 1, 2, 3])],
        );
        let scene = Scene::new().with_mesh(mesh);
        let no_culling = view(CameraSettings {
            enable_backface_culling: false,
            near_plane: 1.0,
            ..Default::default()
        });
        let frame = FrameGeometry::build(&scene, &no_culling, &Lighting::default());

        assert_eq!(frame.polygons.len(), 1);
        let polygon = &frame.polygons[0];
        assert!(polygon.camera.iter().all(|p| p.x >= 1.0 - crate::CLIP_EPSILON));
        assert!(polygon.screen.iter().all(|s| s.depth.is_finite() && s.depth > 0.0));
    }

    #[test]
    fn test_textured_face_keeps_uvs() {
        let texture = std::sync::Arc::new(Texture::solid_color(Rgba::rgb(0, 200, 0)));
        let mesh = Mesh::billboard(Vec3::new(5.0, 0.0, 0.0), 1.0).with_texture(texture);
        let scene = Scene::new().with_mesh(mesh);
        let lighting = Lighting {
            direction: Vec3::X,
            ambient: 1.0,
            ..Default::default()
        };
        let frame = FrameGeometry::build(&scene, &default_view(), &lighting);

        let polygon = &frame.polygons[0];
        assert!(polygon.texture.is_some());
        assert_eq!(polygon.screen[3].uv, Vec2::new(0.0, 0.0));
        assert_eq!(polygon.shade_at(Vec2::splat(0.5)), Rgba::rgb(0, 200, 0));
    }

    #[test]
    fn test_face_color_overrides_mesh_color() {
        let mut mesh = Mesh::billboard(Vec3::new(5.0, 0.0, 0.0), 1.0).with_color(Rgba::rgb(10, 10, 10));
        mesh.faces[0].color = Some(Rgba::rgb(200, 0, 0));
        let scene = Scene::new().with_mesh(mesh);
        let lighting = Lighting {
            ambient: 1.0,
            ..Default::default()
        };
        let frame = FrameGeometry::build(&scene, &default_view(), &lighting);
        assert_eq!(frame.polygons[0].color, Rgba::rgb(200, 0, 0));
    }

    #[test]
    fn test_ray_triangles_skip_wireframe_only() {
        let solid = Mesh::billboard(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let wire = Mesh::billboard(Vec3::new(6.0, 0.0, 0.0), 1.0).with_render_mode(RenderMode::Wireframe);
        let scene = Scene::new().with_mesh(solid).with_mesh(wire);
        let frame = FrameGeometry::build(&scene, &default_view(), &Lighting::default());

        assert_eq!(frame.polygons.len(), 2);
        let triangles = frame.ray_triangles();
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|t| t.source == 0));
    }
}
