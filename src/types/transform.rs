//! Local bone rotations.

use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

/// Local rotation of one bone in a page's chain, in radians.
///
/// `y` swings the segment around the spine (the turn itself), `x` twists it
/// along its length (the fold).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoneAngle {
    pub y: f32,
    pub x: f32,
}

impl BoneAngle {
    pub const ZERO: BoneAngle = BoneAngle { y: 0.0, x: 0.0 };

    pub fn new(y: f32, x: f32) -> Self {
        Self { y, x }
    }

    /// Rotation as a quaternion, applied X then Y in the parent frame.
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_zero_is_identity() {
        let q = BoneAngle::ZERO.to_quat();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let q = BoneAngle::new(std::f32::consts::FRAC_PI_2, 0.0).to_quat();
        let v = q * Vec3::X;
        assert!(v.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }
}
