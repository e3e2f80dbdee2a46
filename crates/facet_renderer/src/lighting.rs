//! Flat directional lighting with an ambient floor.

use facet_core::Rgba;
use facet_math::Vec3;

/// Normal used when a face is too degenerate to produce one: the winding
/// normal of a face seen head-on.
pub const DEFAULT_NORMAL: Vec3 = Vec3::X;

/// A single directional light plus ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Direction the light travels (does not need to be normalized)
    pub direction: Vec3,
    pub color: Rgba,
    pub intensity: f32,
    /// Fraction of light that reaches every face regardless of orientation
    pub ambient: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -0.5, 1.0),
            color: Rgba::WHITE,
            intensity: 1.0,
            ambient: 0.3,
        }
    }
}

impl Lighting {
    /// Combined ambient + diffuse factor for a unit normal.
    pub fn light_factor(&self, normal: Vec3) -> f32 {
        let direction = self.direction.normalize_or_zero();
        let diffuse = (-normal.dot(direction)).max(0.0) * self.intensity;
        self.ambient + diffuse * (1.0 - self.ambient)
    }

    /// Per-channel multiplier applied to a base color: the light factor
    /// tinted by the light color.
    pub fn tint(&self, normal: Vec3) -> Vec3 {
        let factor = self.light_factor(normal);
        Vec3::new(
            self.color.r as f32,
            self.color.g as f32,
            self.color.b as f32,
        ) * (factor / 255.0)
    }

    /// Shade a flat base color for a face with the given unit normal.
    pub fn shade(&self, base: Rgba, normal: Vec3) -> Rgba {
        modulate(base, self.tint(normal))
    }
}

/// Multiply each color channel by the matching tint component. Alpha is kept.
#[inline]
pub fn modulate(base: Rgba, tint: Vec3) -> Rgba {
    let channel = |c: u8, t: f32| (c as f32 * t).round().clamp(0.0, 255.0) as u8;
    Rgba::new(
        channel(base.r, tint.x),
        channel(base.g, tint.y),
        channel(base.b, tint.z),
        base.a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(direction: Vec3, ambient: f32) -> Lighting {
        Lighting {
            direction,
            color: Rgba::WHITE,
            intensity: 1.0,
            ambient,
        }
    }

    #[test]
    fn test_facing_light_is_fully_lit() {
        // Light travels +X, face normal points back at it
        let lighting = light(Vec3::X, 0.2);
        assert!((lighting.light_factor(Vec3::NEG_X) - 1.0).abs() < 1e-6);
        assert_eq!(
            lighting.shade(Rgba::rgb(200, 100, 50), Vec3::NEG_X),
            Rgba::rgb(200, 100, 50)
        );
    }

    #[test]
    fn test_facing_away_gets_ambient_only() {
        let lighting = light(Vec3::X, 0.25);
        assert!((lighting.light_factor(Vec3::X) - 0.25).abs() < 1e-6);
        assert_eq!(
            lighting.shade(Rgba::rgb(200, 100, 40), Vec3::X),
            Rgba::rgb(50, 25, 10)
        );
    }

    #[test]
    fn test_default_light_reaches_head_on_faces() {
        let lighting = Lighting::default();
        assert!(lighting.light_factor(DEFAULT_NORMAL) > lighting.ambient + 0.3);
        assert!((lighting.light_factor(-DEFAULT_NORMAL) - lighting.ambient).abs() < 1e-6);
    }

    #[test]
    fn test_zero_direction_has_no_diffuse() {
        let lighting = light(Vec3::ZERO, 0.5);
        assert!((lighting.light_factor(Vec3::NEG_X) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_light_color_tints_and_clamps() {
        let lighting = Lighting {
            direction: Vec3::X,
            color: Rgba::rgb(255, 0, 128),
            intensity: 2.0,
            ambient: 0.0,
        };
        let shaded = lighting.shade(Rgba::new(200, 200, 200, 77), Vec3::NEG_X);
        assert_eq!(shaded.r, 255);
        assert_eq!(shaded.g, 0);
        assert_eq!(shaded.a, 77);
    }
}
