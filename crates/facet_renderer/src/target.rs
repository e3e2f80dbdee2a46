//! Pixel and depth storage for one camera.

use facet_core::Rgba;

use crate::hzb::HzbPyramid;

/// Color buffer plus depth buffer.
///
/// Depth holds the closest camera depth written this frame, `+inf` where
/// nothing was drawn.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    depth: Vec<f32>,
    hzb: Option<HzbPyramid>,
}

impl RenderTarget {
    /// Create a target cleared to black with infinite depth.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; len],
            depth: vec![f32::INFINITY; len],
            hzb: None,
        }
    }

    /// Reallocate for new dimensions. No-op when unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        log::info!(
            "Reallocating render target {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        *self = Self::new(width, height);
    }

    /// Fill with `background` and reset depth to `+inf`.
    pub fn clear(&mut self, background: Rgba) {
        self.pixels.fill(background);
        self.depth.fill(f32::INFINITY);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Pixels as `width * height * 4` bytes, ready for upload or encoding.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Store `depth` if it is strictly closer than what is there.
    #[inline]
    pub fn test_and_set_depth(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let i = self.index(x, y);
        if depth < self.depth[i] {
            self.depth[i] = depth;
            true
        } else {
            false
        }
    }

    /// Depth test and color write in one step.
    #[inline]
    pub fn write_fragment(&mut self, x: u32, y: u32, depth: f32, color: Rgba) -> bool {
        let i = self.index(x, y);
        if depth < self.depth[i] {
            self.depth[i] = depth;
            self.pixels[i] = color;
            true
        } else {
            false
        }
    }

    /// Farthest stored depth inside an inclusive pixel rectangle.
    pub fn max_depth_in(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> f32 {
        let mut max = f32::NEG_INFINITY;
        for y in y0..=y1 {
            let row = self.index(x0, y);
            for &d in &self.depth[row..=row + (x1 - x0) as usize] {
                max = max.max(d);
            }
        }
        max
    }

    /// Take the HZB pyramid out for a frame, sized to this target and reset.
    pub(crate) fn take_hzb(&mut self) -> HzbPyramid {
        let mut hzb = self
            .hzb
            .take()
            .unwrap_or_else(|| HzbPyramid::new(self.width, self.height));
        hzb.reset(self.width, self.height);
        hzb
    }

    /// Hand the pyramid back so its allocation survives to the next frame.
    pub(crate) fn store_hzb(&mut self, hzb: HzbPyramid) {
        self.hzb = Some(hzb);
    }

    pub(crate) fn depth_and_pixels_mut(&mut self) -> (&[f32], &mut [Rgba]) {
        (&self.depth, &mut self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_target_is_cleared() {
        let target = RenderTarget::new(4, 3);
        assert_eq!(target.pixels().len(), 12);
        assert_eq!(target.as_bytes().len(), 48);
        assert!(target.depth().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_depth_keeps_closer() {
        let mut target = RenderTarget::new(2, 2);
        assert!(target.test_and_set_depth(1, 1, 5.0));
        assert!(!target.test_and_set_depth(1, 1, 7.0));
        assert!(!target.test_and_set_depth(1, 1, 5.0));
        assert!(target.test_and_set_depth(1, 1, 3.0));
        assert_eq!(target.depth_at(1, 1), 3.0);
    }

    #[test]
    fn test_write_fragment() {
        let mut target = RenderTarget::new(2, 2);
        let red = Rgba::rgb(255, 0, 0);
        assert!(target.write_fragment(0, 1, 2.0, red));
        assert!(!target.write_fragment(0, 1, 4.0, Rgba::WHITE));
        assert_eq!(target.pixel(0, 1), red);
        assert_eq!(&target.as_bytes()[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut target = RenderTarget::new(2, 2);
        target.write_fragment(0, 0, 1.0, Rgba::WHITE);
        target.clear(Rgba::rgb(10, 20, 30));
        assert_eq!(target.pixel(0, 0), Rgba::rgb(10, 20, 30));
        assert!(target.depth_at(0, 0).is_infinite());

        target.resize(8, 4);
        assert_eq!(target.width(), 8);
        assert_eq!(target.height(), 4);
        assert_eq!(target.depth().len(), 32);
    }

    #[test]
    fn test_max_depth_in_rect() {
        let mut target = RenderTarget::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                target.test_and_set_depth(x, y, (x + y) as f32);
            }
        }
        assert_eq!(target.max_depth_in(0, 0, 1, 1), 2.0);
        assert_eq!(target.max_depth_in(2, 1, 3, 3), 6.0);
    }
}
