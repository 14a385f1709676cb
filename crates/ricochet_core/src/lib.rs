//! Game-side systems for Ricochet
//!
//! This crate builds on the physics core with everything a client needs
//! around it:
//!
//! - [`BulletSystem`] - Projectiles with precomputed raycast ricochets
//! - [`RemoteEntities`] - Other players, updated from snapshots and dead-reckoned
//! - [`ServerMessage`] / [`ClientMessage`] - JSON message contracts
//! - [`LevelTemplate`] - RON level files with box and mesh colliders
//! - [`ColliderLoader`] - Background mesh loading
//! - [`FrameTimer`] - One-shot countdowns advanced by the frame loop
//! - [`MuzzleSmoke`] - Cosmetic particle bursts
//! - [`Transform3`] - Editable position, rotation and scale

mod bullets;
mod collider_loader;
mod effects;
mod level;
mod net;
mod remote;
mod timer;
mod transform;

pub use bullets::{reflect, Bullet, BulletConfig, BulletKey, BulletSystem, PendingImpact, Shot};
pub use collider_loader::{ColliderLoader, LoadResult};
pub use effects::{MuzzleSmoke, MUZZLE_SMOKE_PARTICLES};
pub use level::{
    build_static_body, ColliderSource, ColliderTemplate, LevelError, LevelInstance, LevelTemplate, MeshData,
    PendingCollider,
};
pub use net::{
    ClientMessage, MessageError, MovementState, PeerId, PeerJoined, ServerMessage, ShootEvent, TransformSnapshot,
    WorldUpdate,
};
pub use remote::{RemoteEntities, RemoteEntity, SEPARATION_PASSES};
pub use timer::FrameTimer;
pub use transform::Transform3;

// Re-export commonly used types from the lower crates for convenience
pub use ricochet_math::{Affine3, Mat3, Vec2, Vec3};
pub use ricochet_physics::{
    BodyError, BodyKey, KinematicController, MoveInput, MoveKeys, PhysicsConfig, PhysicsWorld, Ray, RayHit, RayQuery,
    RigidBody, StaticBody, StaticKey,
};
