//! Facet Core - the scene data a camera renders.
//!
//! This crate provides the types the host scene hands to the renderer:
//!
//! - **Colors and textures**: `Rgba`, `Texture`
//! - **Geometry**: `Face`, `Mesh`, `RenderMode`
//! - **Scene access**: the `Renderable` and `SceneProvider` traits, a plain
//!   `Scene` container, and the `OwnerPose` of the object carrying a camera
//!
//! Vertex positions are expected in world space; the renderer never
//! transforms meshes itself.

pub mod color;
pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use color::Rgba;
pub use mesh::{Face, Mesh, RenderMode};
pub use scene::{OwnerPose, Renderable, Scene, SceneProvider};
pub use texture::Texture;
