//! Backface culling in camera space.

use facet_math::Vec3;

/// Fixed viewing direction in camera space (the depth axis).
pub const VIEW_DIRECTION: Vec3 = Vec3::X;

/// Normals shorter than this are treated as degenerate.
const MIN_NORMAL_LENGTH: f32 = 1e-10;

/// Unit normal `(p1 - p0) x (p2 - p0)` of the first three points, or
/// `None` when they are degenerate.
pub fn face_normal(points: &[Vec3]) -> Option<Vec3> {
    let [p0, p1, p2, ..] = points else {
        return None;
    };
    let normal = (*p1 - *p0).cross(*p2 - *p0);
    let length = normal.length();
    if !length.is_finite() || length < MIN_NORMAL_LENGTH {
        return None;
    }
    Some(normal / length)
}

/// Whether a camera-space face is seen from behind: its winding normal
/// points against the viewing direction.
///
/// Run on the clipped polygon. Degenerate faces are always cullable.
pub fn should_cull_face(points: &[Vec3]) -> bool {
    match face_normal(points) {
        Some(normal) => normal.dot(VIEW_DIRECTION) < 0.0,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::View;
    use crate::settings::{CameraSettings, Rotation};
    use facet_core::OwnerPose;
    use facet_math::{Mat3, Vec2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Counter-clockwise as seen from the camera: normal along +X.
    fn front_face(depth: f32) -> [Vec3; 3] {
        [
            Vec3::new(depth, -1.0, -1.0),
            Vec3::new(depth, 1.0, -1.0),
            Vec3::new(depth, 1.0, 1.0),
        ]
    }

    fn reversed(face: [Vec3; 3]) -> [Vec3; 3] {
        [face[0], face[2], face[1]]
    }

    #[test]
    fn test_front_face_kept_back_face_culled() {
        let front = front_face(5.0);
        assert!((face_normal(&front).unwrap() - VIEW_DIRECTION).length() < 1e-6);
        assert!(!should_cull_face(&front));
        assert!(should_cull_face(&reversed(front)));
    }

    #[test]
    fn test_normal_against_view_direction_is_culled() {
        let facing_camera = [
            Vec3::new(5.0, -1.0, -1.0),
            Vec3::new(5.0, -1.0, 1.0),
            Vec3::new(5.0, 1.0, 1.0),
        ];
        assert!((face_normal(&facing_camera).unwrap() - Vec3::NEG_X).length() < 1e-6);
        assert!(should_cull_face(&facing_camera));
    }

    #[test]
    fn test_degenerate_faces_are_cullable() {
        let collinear = [Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0];
        assert!(should_cull_face(&collinear));
        assert!(should_cull_face(&[Vec3::X, Vec3::Y]));
        assert!(face_normal(&collinear).is_none());
    }

    #[test]
    fn test_culling_is_rotation_invariant() {
        let mut rng = StdRng::seed_from_u64(0x0C17);
        let front = front_face(5.0).map(|p| p + Vec3::new(0.0, 0.5, -0.25));
        let back = reversed(front);

        for _ in 0..64 {
            let settings = CameraSettings {
                rotation: Rotation::new(
                    rng.gen_range(-180.0..180.0),
                    rng.gen_range(-80.0..80.0),
                    rng.gen_range(-180.0..180.0),
                ),
                ..Default::default()
            };
            let owner = OwnerPose::new(
                Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)),
                rng.gen_range(-180.0..180.0),
                rng.gen_range(-2.0..2.0),
            );
            let view = View::new(&settings, &owner);
            let decide = |view: &View, face: [Vec3; 3]| should_cull_face(&face.map(|p| view.world_to_camera(p)));

            // Skip near edge-on poses where the sign is numerically fragile
            let normal = face_normal(&front.map(|p| view.world_to_camera(p))).unwrap();
            if normal.dot(VIEW_DIRECTION).abs() < 1e-2 {
                continue;
            }
            let expected = (decide(&view, front), decide(&view, back));
            assert_ne!(expected.0, expected.1);

            // Same rigid motion (turn about the vertical axis, then shift)
            // applied to both the geometry and the camera's owner
            let angle: f32 = rng.gen_range(-180.0..180.0);
            let shift = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            let turn = Mat3::from_rotation_z(angle.to_radians());
            let motion = |p: Vec3| turn * p + shift;

            let origin = motion(owner.origin());
            let moved_owner = OwnerPose::new(origin.truncate(), owner.rotation + angle, origin.z);
            let moved_view = View::new(&settings, &moved_owner);

            assert_eq!(decide(&moved_view, front.map(motion)), expected.0);
            assert_eq!(decide(&moved_view, back.map(motion)), expected.1);
        }
    }
}
