//! 3D Mathematics Library
//!
//! This crate provides the vector and matrix types used by the Ricochet
//! physics core.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (Y is up)
//! - [`Vec2`] - planar vector used for horizontal velocities on the XZ plane
//! - [`Mat3`] - 3x3 column-major matrix (rotation/scale basis)
//! - [`Affine3`] - world matrix: a linear part plus a translation

mod vec2;
mod vec3;
pub mod affine;
pub mod mat3;

pub use affine::Affine3;
pub use mat3::Mat3;
pub use vec2::Vec2;
pub use vec3::Vec3;
