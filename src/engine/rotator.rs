// Euler rotation used for control rotations.
//
// World convention (same as the camera): Y is up, yaw = 0 faces along -Z,
// positive yaw turns towards -X (counter-clockwise seen from above).

use glam::{Quat, Vec3};

/// Pitch / yaw / roll in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Same yaw, zero pitch and roll.
    pub fn yaw_only(self) -> Self {
        Self::new(0.0, self.yaw, 0.0)
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_y(self.yaw)
            * Quat::from_rotation_x(self.pitch)
            * Quat::from_rotation_z(self.roll)
    }

    /// Forward unit axis of the rotation.
    pub fn unit_axis_x(self) -> Vec3 {
        self.to_quat() * Vec3::NEG_Z
    }

    /// Right unit axis of the rotation.
    pub fn unit_axis_y(self) -> Vec3 {
        self.to_quat() * Vec3::X
    }
}
