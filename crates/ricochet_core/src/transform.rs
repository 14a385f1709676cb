//! Object transform (position, rotation, scale)
//!
//! A Transform3 is the editable form of a scene object's placement. Static
//! colliders are built from the world matrix it produces.

use ricochet_math::{Affine3, Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Position, Euler rotation (radians, XYZ order) and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3 {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3 {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// World matrix: scale, then rotate, then translate
    pub fn to_affine(&self) -> Affine3 {
        Affine3::from_scale_rotation_translation(self.scale, Mat3::from_euler(self.rotation), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_affine() {
        assert_eq!(Transform3::identity().to_affine(), Affine3::IDENTITY);
    }

    #[test]
    fn test_to_affine_applies_scale_then_translation() {
        let t = Transform3::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
        let p = t.to_affine().transform_point(Vec3::ONE);
        assert!((p - Vec3::new(3.0, 4.0, 5.0)).length() < 0.0001);
    }

    #[test]
    fn test_ron_defaults() {
        let t: Transform3 = ron::from_str("(position: (x: 1.0, y: 0.0, z: 0.0))").unwrap();
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
