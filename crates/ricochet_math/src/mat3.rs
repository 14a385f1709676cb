//! 3x3 matrix for rotation/scale bases
//!
//! Column-major: `cols[i]` is the image of the i-th basis vector. For a world
//! matrix, the columns are the object's local X, Y and Z axes expressed in
//! world space (scaled by the object's scale).

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::Vec3;

/// 3x3 column-major matrix
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Build a matrix from its three columns
    #[inline]
    pub const fn from_cols(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { cols: [x, y, z] }
    }

    /// Non-uniform scale matrix
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(scale.x, 0.0, 0.0),
            Vec3::new(0.0, scale.y, 0.0),
            Vec3::new(0.0, 0.0, scale.z),
        )
    }

    /// Rotation about the X axis (radians, right-handed)
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(Vec3::X, Vec3::new(0.0, c, s), Vec3::new(0.0, -s, c))
    }

    /// Rotation about the Y axis (radians, right-handed)
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(Vec3::new(c, 0.0, -s), Vec3::Y, Vec3::new(s, 0.0, c))
    }

    /// Rotation about the Z axis (radians, right-handed)
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(Vec3::new(c, s, 0.0), Vec3::new(-s, c, 0.0), Vec3::Z)
    }

    /// Rotation from Euler angles applied in X, then Y, then Z intrinsic order
    ///
    /// The resulting matrix is `Rx * Ry * Rz`.
    pub fn from_euler(angles: Vec3) -> Self {
        Self::from_rotation_x(angles.x)
            .mul_mat3(&Self::from_rotation_y(angles.y))
            .mul_mat3(&Self::from_rotation_z(angles.z))
    }

    /// Get a column by index
    #[inline]
    pub fn col(&self, i: usize) -> Vec3 {
        self.cols[i]
    }

    /// Multiply a column vector: `self * v`
    #[inline]
    pub fn mul_vec3(&self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    /// Matrix product `self * other` (applies `other` first)
    pub fn mul_mat3(&self, other: &Self) -> Self {
        Self::from_cols(
            self.mul_vec3(other.cols[0]),
            self.mul_vec3(other.cols[1]),
            self.mul_vec3(other.cols[2]),
        )
    }

    /// Transposed matrix
    pub fn transpose(&self) -> Self {
        let [a, b, c] = self.cols;
        Self::from_cols(
            Vec3::new(a.x, b.x, c.x),
            Vec3::new(a.y, b.y, c.y),
            Vec3::new(a.z, b.z, c.z),
        )
    }

    /// Determinant (scalar triple product of the columns)
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }

    /// Inverse matrix, or `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let [a, b, c] = self.cols;
        // Rows of the inverse are the cross products of column pairs
        let r0 = b.cross(c) / det;
        let r1 = c.cross(a) / det;
        let r2 = a.cross(b) / det;
        Some(Self::from_cols(r0, r1, r2).transpose())
    }

    /// Length of each column, i.e. the scale encoded in the basis
    pub fn column_lengths(&self) -> Vec3 {
        Vec3::new(
            self.cols[0].length(),
            self.cols[1].length(),
            self.cols[2].length(),
        )
    }
}
