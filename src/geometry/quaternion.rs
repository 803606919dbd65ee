//! Rotation quaternions used to orient geometry.

use super::Vec3;
use glam::{DMat3, DQuat};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::ops::Mul;

/// A rotation `(w, x, y, z)`.
///
/// Serialized as `[w, x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quaternion(DQuat);

impl Quaternion {
    /// Facing north: no rotation.
    pub const NORTH: Quaternion = Quaternion(DQuat::from_xyzw(0.0, 0.0, 0.0, 1.0));
    /// 90 degrees about +Y.
    pub const EAST: Quaternion =
        Quaternion(DQuat::from_xyzw(0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2));
    /// 180 degrees about +Y.
    pub const SOUTH: Quaternion = Quaternion(DQuat::from_xyzw(0.0, 1.0, 0.0, 0.0));
    /// 270 degrees about +Y.
    pub const WEST: Quaternion =
        Quaternion(DQuat::from_xyzw(0.0, FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2));
    /// -90 degrees about +X.
    pub const UP: Quaternion =
        Quaternion(DQuat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2));
    /// 90 degrees about +X.
    pub const DOWN: Quaternion =
        Quaternion(DQuat::from_xyzw(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2));

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self(DQuat::from_xyzw(x, y, z, w))
    }

    /// Rotation of `angle` radians around `axis`. The axis does not need to be normalized.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return Self::NORTH;
        }
        Self(DQuat::from_axis_angle(axis, angle))
    }

    pub fn w(&self) -> f64 {
        self.0.w
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn length(&self) -> f64 {
        self.0.length()
    }

    /// Unit-length copy. A zero quaternion normalizes to the identity.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::NORTH;
        }
        Self(DQuat::from_xyzw(
            self.0.x / length,
            self.0.y / length,
            self.0.z / length,
            self.0.w / length,
        ))
    }

    pub fn conjugate(&self) -> Self {
        Self(self.0.conjugate())
    }

    /// Hamilton product: the rotation `other` followed by `self`.
    pub fn multiply(&self, other: &Quaternion) -> Self {
        Self(self.0 * other.0)
    }

    /// Rotate a vector by this (unit) quaternion.
    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        self.0.mul_vec3(v)
    }

    /// Equivalent 3x3 rotation matrix.
    pub fn to_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.0)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.0.w, self.0.x, self.0.y, self.0.z]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::NORTH
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(&rhs)
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from([w, x, y, z]: [f64; 4]) -> Self {
        Self::new(w, x, y, z)
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(value: Quaternion) -> Self {
        value.to_array()
    }
}
