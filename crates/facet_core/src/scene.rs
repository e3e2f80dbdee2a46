//! Scene access for the renderer.
//!
//! The renderer does not own a scene graph. The host passes a
//! [`SceneProvider`] into each render call, and the camera's carrier
//! object is described by an [`OwnerPose`].

use facet_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Face, Mesh, RenderMode, Rgba, Texture};

/// Read-only view of one renderable object.
pub trait Renderable {
    /// Inactive or disabled objects are skipped.
    fn is_active(&self) -> bool;

    /// World-space vertex positions.
    fn vertices(&self) -> &[Vec3];

    fn faces(&self) -> &[Face];

    /// Flat color for faces without an override.
    fn color(&self) -> Rgba;

    fn wireframe_color(&self) -> Rgba;

    fn render_mode(&self) -> RenderMode;

    fn texture(&self) -> Option<&Texture>;
}

impl Renderable for Mesh {
    fn is_active(&self) -> bool {
        self.active
    }

    fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    fn faces(&self) -> &[Face] {
        &self.faces
    }

    fn color(&self) -> Rgba {
        self.color
    }

    fn wireframe_color(&self) -> Rgba {
        self.wireframe_color
    }

    fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    fn texture(&self) -> Option<&Texture> {
        self.texture.as_deref()
    }
}

/// Source of renderables for one frame.
pub trait SceneProvider {
    fn renderables(&self) -> Box<dyn Iterator<Item = &dyn Renderable> + '_>;
}

/// A flat list of meshes.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its index.
    pub fn add(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }
}

impl SceneProvider for Scene {
    fn renderables(&self) -> Box<dyn Iterator<Item = &dyn Renderable> + '_> {
        Box::new(self.meshes.iter().map(|m| m as &dyn Renderable))
    }
}

/// World pose of the object a camera is attached to.
///
/// The host engine places objects on a plane (`position`) with a
/// separate layering `depth`, which the renderer uses as the vertical
/// coordinate. `rotation` is a yaw in degrees about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OwnerPose {
    pub position: Vec2,
    pub rotation: f32,
    pub depth: f32,
}

impl OwnerPose {
    pub fn new(position: Vec2, rotation: f32, depth: f32) -> Self {
        Self {
            position,
            rotation,
            depth,
        }
    }

    /// World-space origin of the owner.
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_provider_lists_meshes() {
        let mut scene = Scene::new();
        scene.add(Mesh::cube(Vec3::ZERO, 1.0));
        let mut hidden = Mesh::cube(Vec3::X * 4.0, 1.0);
        hidden.active = false;
        scene.add(hidden);

        assert_eq!(scene.mesh_count(), 2);
        assert_eq!(scene.face_count(), 12);

        let active: Vec<bool> = scene.renderables().map(|r| r.is_active()).collect();
        assert_eq!(active, vec![true, false]);
    }

    #[test]
    fn test_owner_origin() {
        let pose = OwnerPose::new(Vec2::new(1.0, 2.0), 45.0, 3.0);
        assert_eq!(pose.origin(), Vec3::new(1.0, 2.0, 3.0));
    }
}
