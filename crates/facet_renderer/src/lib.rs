//! Facet Renderer - CPU camera rendering
//!
//! Turns a [`SceneProvider`](facet_core::SceneProvider) into an RGBA pixel
//! buffer plus a depth buffer. A shared pre-pass transforms, clips, culls,
//! shades and projects every face; one of eight interchangeable
//! strategies ([`RenderMethod`]) then rasterizes or ray traces the result.
//!
//! Coordinates: camera space stores depth (forward) in `x`, horizontal
//! (right) in `y` and vertical (up) in `z`.

mod bvh;
mod camera;
mod clip;
mod cull;
mod dof;
mod frame;
mod hzb;
mod lighting;
mod method;
mod raster;
mod settings;
mod state;
pub mod strategies;
mod target;
mod tile;
mod triangle;
mod wireframe;

pub use bvh::{Bvh, BvhHit, BvhNode, AO_LEAF_SIZE, PRIMARY_LEAF_SIZE};
pub use camera::{Camera, ScreenPoint, View};
pub use clip::{clip_against_plane, clip_near_far, ClipSide, ClipVertex, TexturedPoint, CLIP_EPSILON};
pub use cull::{face_normal, should_cull_face, VIEW_DIRECTION};
pub use dof::{apply_depth_of_field, blur_radius};
pub use frame::{FrameGeometry, FramePolygon, FrameStats, ScreenTriangle, ScreenVertex};
pub use hzb::HzbPyramid;
pub use lighting::Lighting;
pub use method::{RenderMethod, RenderParams, UnknownRenderMethod};
pub use raster::{EdgeFunction, PixelRect, TriangleSetup};
pub use settings::{AmbientOcclusionSettings, CameraSettings, DepthOfFieldSettings, Rotation};
pub use state::{CameraState, StateError};
pub use target::RenderTarget;
pub use tile::{generate_tiles, Tile, TileGrid, RASTER_TILE_SIZE, ZBUFFER_TILE_SIZE};
pub use triangle::{RayTriangle, TriangleHit};
pub use wireframe::{draw_line, draw_outline, draw_overlay};

/// Re-export common math types from facet_math
pub use facet_math::{Aabb, Interval, Ray, Vec2, Vec3};
