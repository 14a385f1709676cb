//! Capsule physics for Ricochet
//!
//! This crate provides the real-time collision core of the game client:
//! - Collision shapes (capsules, oriented boxes, triangles)
//! - Sampled segment-vs-box and segment-vs-triangle closest points
//! - Force-accumulating capsule rigid bodies with a fixed-substep world
//! - An input-driven kinematic controller (move, jump, crouch)
//! - Ray queries against static level geometry
//! - Cosmetic particle systems

pub mod body;
pub mod collision;
pub mod error;
pub mod kinematic;
pub mod particles;
pub mod raycast;
pub mod shapes;
pub mod static_body;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, RigidBody, DEFAULT_DAMPING, GRAVITY};
pub use collision::{closest_point_segment_obb, closest_point_segment_triangles, Contact, SegmentClosest};
pub use error::{BodyError, MeshError};
pub use kinematic::{KinematicController, MoveInput, MoveKeys};
pub use particles::{ParticleKey, ParticleSystem};
pub use raycast::{ray_vs_obb, ray_vs_triangle, Ray, RayHit, RayQuery};
pub use shapes::{Aabb, Capsule, Obb, Triangle};
pub use static_body::{StaticBody, StaticGeometry, StaticKey, StaticShape, TriMesh};
pub use world::{PhysicsConfig, PhysicsWorld};
