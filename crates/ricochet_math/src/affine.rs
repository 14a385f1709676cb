//! World matrices
//!
//! An [`Affine3`] is the 4x4 world matrix of a scene object with the
//! projective row dropped: a 3x3 linear part (rotation and scale) plus a
//! translation. Static colliders are defined by one of these.

use serde::{Deserialize, Serialize};

use crate::{Mat3, Vec3};

/// Affine transform: `p' = linear * p + translation`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine3 {
    /// Rotation and scale (columns are the scaled local axes)
    pub linear: Mat3,
    /// World-space translation
    pub translation: Vec3,
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine3 {
    pub const IDENTITY: Self = Self {
        linear: Mat3::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Pure translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            linear: Mat3::IDENTITY,
            translation,
        }
    }

    /// Compose scale, then rotation, then translation
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Mat3, translation: Vec3) -> Self {
        Self {
            linear: rotation.mul_mat3(&Mat3::from_scale(scale)),
            translation,
        }
    }

    /// Transform a point from local space to world space
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.linear.mul_vec3(p) + self.translation
    }

    /// Transform a direction (ignores translation)
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.linear.mul_vec3(v)
    }

    /// World scale encoded in the linear part
    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.linear.column_lengths()
    }

    /// Compose two transforms: result applies `other` first, then `self`
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            linear: self.linear.mul_mat3(&other.linear),
            translation: self.transform_point(other.translation),
        }
    }
}
