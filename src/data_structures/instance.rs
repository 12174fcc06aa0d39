//! Local transforms of scene nodes.
//!
//! Positions and scales are plain vectors; rotations are Euler angles in
//! degrees because that is what the remote scene API accepts. The Euler order
//! is the usual engine convention: roll about `z`, then pitch about `x`, then
//! yaw about `y`.

use cgmath::{Deg, Quaternion, Rotation, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rotations closer than this (in degrees) to zero are treated as identity.
const IDENTITY_EPSILON: f32 = 1e-4;

/// Center-anchored local transform: position, rotation (Euler degrees) and scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Create a transform with no translation, rotation or scaling.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// `true` when every Euler angle is a whole number of turns.
    pub fn is_identity_rotation(&self) -> bool {
        [self.rotation.x, self.rotation.y, self.rotation.z]
            .iter()
            .all(|angle| {
                let wrapped = angle.rem_euclid(360.0);
                wrapped < IDENTITY_EPSILON || 360.0 - wrapped < IDENTITY_EPSILON
            })
    }

    /// `true` when the scale is (1, 1, 1) and can be omitted from node creation.
    pub fn is_unit_scale(&self) -> bool {
        let delta: [f32; 3] = (self.scale - Vector3::new(1.0, 1.0, 1.0)).into();
        delta.iter().all(|d| d.abs() < IDENTITY_EPSILON)
    }

    /// The rotation as a quaternion (`z`, then `x`, then `y`).
    pub fn to_quaternion(&self) -> Quaternion<f32> {
        let yaw = Quaternion::from_angle_y(Deg(self.rotation.y));
        let pitch = Quaternion::from_angle_x(Deg(self.rotation.x));
        let roll = Quaternion::from_angle_z(Deg(self.rotation.z));
        yaw * pitch * roll
    }

    /// Rotate a local direction into the parent frame.
    pub fn rotate_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.to_quaternion().rotate_vector(v)
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
