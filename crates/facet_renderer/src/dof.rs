//! Depth-of-field post pass.
//!
//! Each pixel is replaced by a box average whose radius grows with its
//! distance from the focal plane. Averages come from a summed-area table
//! of the unblurred image, so every pixel reads the original colors.

use facet_core::Rgba;

use crate::settings::DepthOfFieldSettings;
use crate::target::RenderTarget;

/// Blur radius in pixels for a surface at `depth`.
pub fn blur_radius(depth: f32, dof: &DepthOfFieldSettings) -> u32 {
    if !depth.is_finite() || depth <= 0.0 {
        return 0;
    }
    let coc = dof.aperture * (depth - dof.focal_distance).abs() / depth;
    coc.min(dof.max_blur_radius).max(0.0).round() as u32
}

/// Blur `target` in place according to its depth buffer. Background
/// pixels (infinite depth) and in-focus pixels are left untouched.
pub fn apply_depth_of_field(target: &mut RenderTarget, dof: &DepthOfFieldSettings) {
    let (width, height) = (target.width() as usize, target.height() as usize);
    if width == 0 || height == 0 {
        return;
    }

    let table = SummedArea::new(target.pixels(), width, height);
    let (depth, pixels) = target.depth_and_pixels_mut();

    let mut blurred = 0usize;
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let radius = blur_radius(depth[i], dof) as usize;
            if radius == 0 {
                continue;
            }
            let x0 = x.saturating_sub(radius);
            let y0 = y.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            let y1 = (y + radius).min(height - 1);
            pixels[i] = table.average(x0, y0, x1, y1);
            blurred += 1;
        }
    }

    log::trace!("Depth of field blurred {} pixels", blurred);
}

/// Per-channel prefix sums with a zero border row and column.
struct SummedArea {
    stride: usize,
    sums: Vec<[u64; 4]>,
}

impl SummedArea {
    fn new(pixels: &[Rgba], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![[0u64; 4]; stride * (height + 1)];
        for y in 0..height {
            let mut row = [0u64; 4];
            for x in 0..width {
                let p = pixels[y * width + x];
                for (acc, c) in row.iter_mut().zip([p.r, p.g, p.b, p.a]) {
                    *acc += c as u64;
                }
                let above = sums[y * stride + x + 1];
                let cell = &mut sums[(y + 1) * stride + x + 1];
                for c in 0..4 {
                    cell[c] = above[c] + row[c];
                }
            }
        }
        Self { stride, sums }
    }

    /// Mean color over the inclusive rectangle.
    fn average(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Rgba {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        let (a, b, c, d) = (at(x0, y0), at(x1 + 1, y0), at(x0, y1 + 1), at(x1 + 1, y1 + 1));
        let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        let channel = |k: usize| ((d[k] + a[k] - b[k] - c[k] + count / 2) / count) as u8;
        Rgba::new(channel(0), channel(1), channel(2), channel(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DepthOfFieldSettings {
        DepthOfFieldSettings {
            enabled: true,
            focal_distance: 10.0,
            aperture: 2.0,
            max_blur_radius: 3.0,
        }
    }

    #[test]
    fn test_blur_radius() {
        let dof = settings();
        assert_eq!(blur_radius(10.0, &dof), 0);
        assert_eq!(blur_radius(20.0, &dof), 1);
        assert_eq!(blur_radius(2.0, &dof), 3);
        assert_eq!(blur_radius(f32::INFINITY, &dof), 0);
    }

    #[test]
    fn test_in_focus_and_background_untouched() {
        let mut target = RenderTarget::new(8, 8);
        // Checkerboard at the focal depth, except column 7 which is far away
        for y in 0..8 {
            for x in 0..8 {
                let c = if (x + y) % 2 == 0 { Rgba::WHITE } else { Rgba::BLACK };
                if x < 7 {
                    target.write_fragment(x, y, 10.0, c);
                } else {
                    target.set_pixel(x, y, c);
                }
            }
        }
        let before = target.pixels().to_vec();
        apply_depth_of_field(&mut target, &settings());
        assert_eq!(target.pixels(), before.as_slice());
    }

    #[test]
    fn test_out_of_focus_pixels_average() {
        let mut target = RenderTarget::new(4, 1);
        let colors = [0u8, 100, 200, 40];
        for (x, &c) in colors.iter().enumerate() {
            target.write_fragment(x as u32, 0, 1.0, Rgba::rgb(c, c, c));
        }
        let dof = DepthOfFieldSettings {
            enabled: true,
            focal_distance: 2.0,
            aperture: 1.0,
            max_blur_radius: 1.0,
        };
        apply_depth_of_field(&mut target, &dof);

        // Radius 1 box averages of the original row
        assert_eq!(target.pixel(0, 0).r, 50);
        assert_eq!(target.pixel(1, 0).r, 100);
        assert_eq!(target.pixel(2, 0).r, 113);
        assert_eq!(target.pixel(3, 0).r, 120);
        assert_eq!(target.pixel(1, 0).a, 255);
    }
}
