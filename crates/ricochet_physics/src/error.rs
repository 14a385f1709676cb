//! Construction-time validation errors
//!
//! The simulation step itself never fails; bad inputs are rejected when a
//! body or mesh is built.

use std::fmt;

/// Error building a rigid body or controller
#[derive(Debug, Clone, PartialEq)]
pub enum BodyError {
    /// Mass must be finite and strictly positive
    InvalidMass(f32),
    /// Capsule radius must be finite and strictly positive
    InvalidRadius(f32),
    /// Total height must be at least the capsule diameter
    InvalidHeight { height: f32, radius: f32 },
    /// Crouch height must lie in `[0, standing cylinder height]`
    InvalidCrouchHeight(f32),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::InvalidMass(m) => write!(f, "Invalid mass: {} (must be > 0)", m),
            BodyError::InvalidRadius(r) => write!(f, "Invalid capsule radius: {} (must be > 0)", r),
            BodyError::InvalidHeight { height, radius } => write!(
                f,
                "Invalid capsule height: {} is smaller than the diameter {}",
                height,
                2.0 * radius
            ),
            BodyError::InvalidCrouchHeight(h) => write!(f, "Invalid crouch height: {}", h),
        }
    }
}

impl std::error::Error for BodyError {}

/// Error building a triangle mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Flat position buffer length is not a multiple of 3
    PositionsNotTriples(usize),
    /// Index buffer (or unindexed vertex count) is not a multiple of 3
    IncompleteTriangle(usize),
    /// An index points past the end of the position buffer
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// The mesh has no vertices, so no bounding box can be built
    Empty,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::PositionsNotTriples(len) => {
                write!(f, "Position buffer length {} is not a multiple of 3", len)
            }
            MeshError::IncompleteTriangle(len) => {
                write!(f, "Triangle list length {} is not a multiple of 3", len)
            }
            MeshError::IndexOutOfRange { index, vertex_count } => write!(
                f,
                "Index {} out of range for {} vertices",
                index, vertex_count
            ),
            MeshError::Empty => write!(f, "Mesh has no vertices"),
        }
    }
}

impl std::error::Error for MeshError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_error_display() {
        let msg = format!("{}", BodyError::InvalidHeight { height: 0.5, radius: 0.5 });
        assert!(msg.contains("0.5"));
        assert!(msg.contains("diameter 1"));
        assert!(format!("{}", BodyError::InvalidMass(0.0)).contains("mass"));
    }

    #[test]
    fn test_mesh_error_display() {
        let msg = format!("{}", MeshError::IndexOutOfRange { index: 9, vertex_count: 4 });
        assert!(msg.contains("9"));
        assert!(msg.contains("4 vertices"));
    }
}
