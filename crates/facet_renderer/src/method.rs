//! Render strategy selection and dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::camera::View;
use crate::frame::FrameGeometry;
use crate::settings::{AmbientOcclusionSettings, DepthOfFieldSettings};
use crate::strategies::{
    depth_pass, hybrid, painter, raytrace, scanline, tile_rasterizer, tile_zbuffer, zbuffer,
};
use crate::target::RenderTarget;
use crate::wireframe;

/// The interchangeable visibility strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderMethod {
    /// Back-to-front polygon sort, no depth buffer
    #[serde(rename = "painter")]
    Painter,
    /// Per-triangle bounding-box fill with a depth test
    #[default]
    #[serde(rename = "zbuffer")]
    ZBuffer,
    /// Active edge table per polygon
    #[serde(rename = "scanline")]
    Scanline,
    /// 16x16 tiles ordered front to back with tile depth early-out
    #[serde(rename = "tile-zbuffer", alias = "hzb-lite")]
    TileZBuffer,
    /// Hierarchical Z-buffer rejection, optional depth of field
    #[serde(rename = "depth-pass")]
    DepthPass,
    /// 8x8 tiles with precomputed edge functions
    #[serde(rename = "tile-rasterizer")]
    TileRasterizer,
    /// One primary ray per pixel
    #[serde(rename = "raytrace")]
    Raytrace,
    /// Tile rasterizer plus ray-traced ambient occlusion
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl RenderMethod {
    pub const ALL: [RenderMethod; 8] = [
        RenderMethod::Painter,
        RenderMethod::ZBuffer,
        RenderMethod::Scanline,
        RenderMethod::TileZBuffer,
        RenderMethod::DepthPass,
        RenderMethod::TileRasterizer,
        RenderMethod::Raytrace,
        RenderMethod::Hybrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderMethod::Painter => "painter",
            RenderMethod::ZBuffer => "zbuffer",
            RenderMethod::Scanline => "scanline",
            RenderMethod::TileZBuffer => "tile-zbuffer",
            RenderMethod::DepthPass => "depth-pass",
            RenderMethod::TileRasterizer => "tile-rasterizer",
            RenderMethod::Raytrace => "raytrace",
            RenderMethod::Hybrid => "hybrid",
        }
    }

    /// Whether this strategy maintains the depth buffer.
    pub fn writes_depth(self) -> bool {
        self != RenderMethod::Painter
    }

    /// Draw a prepared frame into `target`, followed by the wireframe
    /// overlay. The target must already be cleared.
    pub fn render(self, frame: &FrameGeometry<'_>, target: &mut RenderTarget, params: &RenderParams) {
        match self {
            RenderMethod::Painter => {
                // Outlines are interleaved with fills in sort order
                painter::render(frame, target);
                return;
            }
            RenderMethod::ZBuffer => zbuffer::render(frame, target),
            RenderMethod::Scanline => scanline::render(frame, target),
            RenderMethod::TileZBuffer => tile_zbuffer::render(frame, target),
            RenderMethod::DepthPass => depth_pass::render(frame, target, &params.depth_of_field),
            RenderMethod::TileRasterizer => tile_rasterizer::render(frame, target),
            RenderMethod::Raytrace => raytrace::render(
                frame,
                target,
                &params.view,
                params.accelerate_ray_tracing,
                params.bvh_leaf_size,
            ),
            RenderMethod::Hybrid => hybrid::render(frame, target, &params.view, &params.ambient_occlusion),
        }
        wireframe::draw_overlay(frame, target);
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a render method name that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown render method '{0}'")]
pub struct UnknownRenderMethod(pub String);

impl FromStr for RenderMethod {
    type Err = UnknownRenderMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "hzb-lite" {
            return Ok(RenderMethod::TileZBuffer);
        }
        RenderMethod::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| UnknownRenderMethod(s.to_string()))
    }
}

/// Per-frame inputs the strategies need beyond the geometry.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    pub view: View,
    pub accelerate_ray_tracing: bool,
    pub bvh_leaf_size: usize,
    pub depth_of_field: DepthOfFieldSettings,
    pub ambient_occlusion: AmbientOcclusionSettings,
}
