//! Mesh geometry as the renderer consumes it.
//!
//! A mesh is a list of world-space vertex positions plus polygon faces
//! indexing into it. Faces may be any convex polygon; the renderer clips
//! and fans them itself.
//!
//! Winding convention: with x forward, y right and z up, a face is front
//! facing when `(p1 - p0) x (p2 - p0)` points along the viewing direction,
//! into the surface. Such a face appears counter-clockwise to a viewer in
//! front of it.

use std::sync::Arc;

use facet_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Rgba, Texture};

/// How a mesh's faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Filled faces only
    #[default]
    Solid,
    /// Outlines only; faces are not filled and write no depth
    Wireframe,
    /// Filled faces with an outline on top
    Both,
}

impl RenderMode {
    pub fn fills(self) -> bool {
        matches!(self, RenderMode::Solid | RenderMode::Both)
    }

    pub fn outlines(self) -> bool {
        matches!(self, RenderMode::Wireframe | RenderMode::Both)
    }
}

/// A polygon face referencing mesh vertices by index.
#[derive(Clone, Debug, Default)]
pub struct Face {
    /// Vertex indices, in winding order
    pub indices: Vec<u32>,

    /// Flat color overriding the mesh color
    pub color: Option<Rgba>,

    /// One UV per index (only used when the mesh has a texture)
    pub uvs: Option<Vec<Vec2>>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self {
            indices,
            color: None,
            uvs: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// UVs, if present and matching the index count.
    pub fn valid_uvs(&self) -> Option<&[Vec2]> {
        self.uvs
            .as_deref()
            .filter(|uvs| uvs.len() == self.indices.len())
    }
}

/// A renderable mesh with world-space vertices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// World-space vertex positions
    pub vertices: Vec<Vec3>,

    /// Polygon faces
    pub faces: Vec<Face>,

    /// Default flat color for faces without their own
    pub color: Rgba,

    /// Outline color for wireframe modes
    pub wireframe_color: Rgba,

    pub render_mode: RenderMode,

    /// Texture sampled with per-face UVs
    pub texture: Option<Arc<Texture>>,

    /// Inactive meshes are skipped entirely
    pub active: bool,
}

impl Mesh {
    /// Create a new grey solid mesh.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces,
            color: Rgba::rgb(180, 180, 180),
            wireframe_color: Rgba::WHITE,
            render_mode: RenderMode::Solid,
            texture: None,
            active: true,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_wireframe_color(mut self, color: Rgba) -> Self {
        self.wireframe_color = color;
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// A single triangle.
    pub fn triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self::new(vec![v0, v1, v2], vec![Face::new(vec![0, 1, 2])])
    }

    /// An axis-aligned quad seen from the front by a camera looking down
    /// +X, centered at `center` with the given half extent. Its winding
    /// normal is +X. Carries full-face UVs so it can be textured.
    pub fn billboard(center: Vec3, half_extent: f32) -> Self {
        let h = half_extent;
        let vertices = vec![
            center + Vec3::new(0.0, -h, -h),
            center + Vec3::new(0.0, h, -h),
            center + Vec3::new(0.0, h, h),
            center + Vec3::new(0.0, -h, h),
        ];
        let uvs = vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        Self::new(vertices, vec![Face::new(vec![0, 1, 2, 3]).with_uvs(uvs)])
    }

    /// Axis-aligned cube whose quads are front facing from outside, so
    /// their winding normals point inward.
    pub fn cube(center: Vec3, half_extent: f32) -> Self {
        let mut vertices = Vec::with_capacity(24);
        let mut faces = Vec::with_capacity(6);

        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let outward = Vec3::AXES[axis] * sign;
                // u x w must equal the inward normal
                let (mut u, mut w) = match axis {
                    0 => (Vec3::Y, Vec3::Z),
                    1 => (Vec3::Z, Vec3::X),
                    _ => (Vec3::X, Vec3::Y),
                };
                if sign > 0.0 {
                    std::mem::swap(&mut u, &mut w);
                }

                let h = half_extent;
                let corner = center + (outward - u - w) * h;
                let base = vertices.len() as u32;
                vertices.push(corner);
                vertices.push(corner + u * 2.0 * h);
                vertices.push(corner + (u + w) * 2.0 * h);
                vertices.push(corner + w * 2.0 * h);
                faces.push(Face::new(vec![base, base + 1, base + 2, base + 3]));
            }
        }

        Self::new(vertices, faces)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &Mesh, face: &Face) -> Vec3 {
        let p0 = mesh.vertices[face.indices[0] as usize];
        let p1 = mesh.vertices[face.indices[1] as usize];
        let p2 = mesh.vertices[face.indices[2] as usize];
        (p1 - p0).cross(p2 - p0).normalize()
    }

    #[test]
    fn test_cube_faces_wind_inward() {
        let center = Vec3::new(5.0, 1.0, -2.0);
        let mesh = Mesh::cube(center, 1.0);

        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertex_count(), 24);

        for face in &mesh.faces {
            let normal = face_normal(&mesh, face);
            let face_center = face
                .indices
                .iter()
                .map(|&i| mesh.vertices[i as usize])
                .sum::<Vec3>()
                / 4.0;
            let inward = (center - face_center).normalize();
            assert!(
                normal.dot(inward) > 0.99,
                "normal {:?} should match inward {:?}",
                normal,
                inward
            );
        }
    }

    #[test]
    fn test_billboard_winds_along_view_axis() {
        let mesh = Mesh::billboard(Vec3::new(10.0, 0.0, 0.0), 1.0);
        let normal = face_normal(&mesh, &mesh.faces[0]);
        assert!((normal - Vec3::X).length() < 1e-5);
        assert!(mesh.faces[0].valid_uvs().is_some());
    }

    #[test]
    fn test_render_mode_flags() {
        assert!(RenderMode::Solid.fills() && !RenderMode::Solid.outlines());
        assert!(!RenderMode::Wireframe.fills() && RenderMode::Wireframe.outlines());
        assert!(RenderMode::Both.fills() && RenderMode::Both.outlines());
    }

    #[test]
    fn test_mismatched_uvs_ignored() {
        let face = Face::new(vec![0, 1, 2]).with_uvs(vec![Vec2::ZERO; 2]);
        assert!(face.valid_uvs().is_none());
    }
}
