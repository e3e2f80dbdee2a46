//! Hierarchical Z-buffer pyramid for coarse occlusion rejection.
//!
//! Level 0 is the render target's depth buffer itself; the pyramid stores
//! levels 1 and up. Each texel holds the farthest depth of its (up to)
//! 2x2 children, so a triangle whose nearest depth lies beyond that value
//! cannot win any pixel underneath it.

use crate::raster::PixelRect;

#[derive(Debug, Clone)]
struct HzbLevel {
    width: u32,
    height: u32,
    depth: Vec<f32>,
}

impl HzbLevel {
    #[inline]
    fn get(&self, x: u32, y: u32) -> f32 {
        self.depth[(y * self.width + x) as usize]
    }
}

/// Farthest-depth pyramid over a depth buffer.
#[derive(Debug, Clone)]
pub struct HzbPyramid {
    width: u32,
    height: u32,
    levels: Vec<HzbLevel>,
}

impl HzbPyramid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut levels = Vec::new();
        let (mut w, mut h) = (width.max(1), height.max(1));
        while w > 1 || h > 1 {
            w = w.div_ceil(2);
            h = h.div_ceil(2);
            levels.push(HzbLevel {
                width: w,
                height: h,
                depth: vec![f32::INFINITY; (w * h) as usize],
            });
        }
        Self {
            width,
            height,
            levels,
        }
    }

    /// Clear to `+inf`, reallocating when the base size changed.
    pub fn reset(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
            return;
        }
        for level in &mut self.levels {
            level.depth.fill(f32::INFINITY);
        }
    }

    /// Number of levels including the base depth buffer.
    pub fn level_count(&self) -> usize {
        self.levels.len() + 1
    }

    /// Texel value at `level`; level 0 reads the base buffer.
    pub fn farthest(&self, base: &[f32], level: usize, x: u32, y: u32) -> f32 {
        if level == 0 {
            base[(y * self.width + x) as usize]
        } else {
            self.levels[level - 1].get(x, y)
        }
    }

    fn level_size(&self, level: usize) -> (u32, u32) {
        if level == 0 {
            (self.width, self.height)
        } else {
            (self.levels[level - 1].width, self.levels[level - 1].height)
        }
    }

    /// Propagate a depth write at base pixel `(x, y)` up the pyramid.
    pub fn update(&mut self, base: &[f32], x: u32, y: u32) {
        let (mut x, mut y) = (x, y);
        for level in 1..self.level_count() {
            let (child_w, child_h) = self.level_size(level - 1);
            x >>= 1;
            y >>= 1;

            let mut farthest = f32::NEG_INFINITY;
            for cy in (y * 2)..(y * 2 + 2).min(child_h) {
                for cx in (x * 2)..(x * 2 + 2).min(child_w) {
                    farthest = farthest.max(self.farthest(base, level - 1, cx, cy));
                }
            }

            let texel = &mut self.levels[level - 1];
            let i = (y * texel.width + x) as usize;
            if texel.depth[i] == farthest {
                // Nothing above can change either
                break;
            }
            texel.depth[i] = farthest;
        }
    }

    /// Rebuild every level from the base buffer.
    pub fn rebuild(&mut self, base: &[f32]) {
        for level in 1..self.level_count() {
            let (child_w, child_h) = self.level_size(level - 1);
            let (w, h) = self.level_size(level);
            for y in 0..h {
                for x in 0..w {
                    let mut farthest = f32::NEG_INFINITY;
                    for cy in (y * 2)..(y * 2 + 2).min(child_h) {
                        for cx in (x * 2)..(x * 2 + 2).min(child_w) {
                            farthest = farthest.max(self.farthest(base, level - 1, cx, cy));
                        }
                    }
                    self.levels[level - 1].depth[(y * w + x) as usize] = farthest;
                }
            }
        }
    }

    /// Coarsest level at which `rect` spans at most 2x2 texels.
    pub fn level_for(&self, rect: &PixelRect) -> usize {
        let mut level = 0;
        while level + 1 < self.level_count() {
            let span_x = (rect.x1 >> level) - (rect.x0 >> level);
            let span_y = (rect.y1 >> level) - (rect.y0 >> level);
            if span_x <= 1 && span_y <= 1 {
                break;
            }
            level += 1;
        }
        level
    }

    /// True when everything in `rect` is already closer than `nearest_depth`.
    pub fn is_occluded(&self, base: &[f32], rect: &PixelRect, nearest_depth: f32) -> bool {
        let level = self.level_for(rect);
        let mut farthest = f32::NEG_INFINITY;
        for y in (rect.y0 >> level)..=(rect.y1 >> level) {
            for x in (rect.x0 >> level)..=(rect.x1 >> level) {
                farthest = farthest.max(self.farthest(base, level, x, y));
            }
        }
        nearest_depth > farthest
    }
}
