//! Texture handle sampled by the painter's affine texture path.
//!
//! Loading images is the host's job; the renderer only needs decoded
//! pixels.

use crate::Rgba;

/// A decoded texture in row-major RGBA8.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data, row-major, top row first
    pub pixels: Vec<Rgba>,
}

impl Texture {
    /// Create a new texture from pixel data.
    ///
    /// Returns `None` when the pixel count does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            log::warn!(
                "Rejecting texture: {}x{} with {} pixels",
                width,
                height,
                pixels.len()
            );
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Rgba) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Two-color checkerboard with `cells` squares per side.
    pub fn checker(size: u32, cells: u32, a: Rgba, b: Rgba) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Nearest-texel lookup. UVs wrap; (0, 0) is the top-left texel.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Rgba {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        self.pixels[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Rgba::rgb(255, 128, 0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.sample_nearest(0.5, 0.5), Rgba::rgb(255, 128, 0));
        assert_eq!(tex.sample_nearest(7.25, -3.5), Rgba::rgb(255, 128, 0));
    }

    #[test]
    fn test_mismatched_pixels_rejected() {
        assert!(Texture::new(2, 2, vec![Rgba::BLACK; 3]).is_none());
        assert!(Texture::new(0, 0, vec![]).is_none());
        assert!(Texture::new(2, 1, vec![Rgba::BLACK; 2]).is_some());
    }

    #[test]
    fn test_checker_sampling() {
        let tex = Texture::checker(4, 2, Rgba::WHITE, Rgba::BLACK);
        assert_eq!(tex.sample_nearest(0.1, 0.1), Rgba::WHITE);
        assert_eq!(tex.sample_nearest(0.6, 0.1), Rgba::BLACK);
        assert_eq!(tex.sample_nearest(0.6, 0.6), Rgba::WHITE);
        // Wraps around
        assert_eq!(tex.sample_nearest(1.1, 0.1), Rgba::WHITE);
    }
}
