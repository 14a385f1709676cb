//! Physics world and fixed-substep simulation

use ricochet_math::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::body::{BodyKey, RigidBody, GRAVITY};
use crate::collision::{Contact, DEFAULT_SEGMENT_SAMPLES};
use crate::kinematic::{KinematicController, MoveInput};
use crate::particles::{ParticleKey, ParticleSystem};
use crate::raycast::{Ray, RayHit, RayQuery};
use crate::static_body::{StaticBody, StaticGeometry, StaticKey};

/// Default number of substeps per update
pub const DEFAULT_SUBSTEPS: u32 = 5;

/// Default minimum normal.y for a contact to count as ground
pub const DEFAULT_GROUND_NORMAL_THRESHOLD: f32 = 0.5;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravitational acceleration (positive, applied downward)
    pub gravity: f32,
    /// Substeps per update; each integrates `dt / substeps`
    pub substeps: u32,
    /// Intervals the capsule axis is split into for narrow-phase sampling
    pub segment_samples: u32,
    /// Contacts with a steeper normal than this do not ground a body
    pub ground_normal_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            substeps: DEFAULT_SUBSTEPS,
            segment_samples: DEFAULT_SEGMENT_SAMPLES,
            ground_normal_threshold: DEFAULT_GROUND_NORMAL_THRESHOLD,
        }
    }
}

/// The physics world: rigid bodies, static geometry and particle systems
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    statics: StaticGeometry,
    particle_systems: SlotMap<ParticleKey, ParticleSystem>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            statics: StaticGeometry::new(),
            particle_systems: SlotMap::with_key(),
            config,
        }
    }

    /// Add a rigid body and return its key
    pub fn add_rigid_body(&mut self, body: RigidBody) -> BodyKey {
        let key = self.bodies.insert(body);
        log::debug!("Registered rigid body {:?}", key);
        key
    }

    /// Remove a rigid body and return it
    pub fn remove_rigid_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Add a static body and return its key
    pub fn add_static_body(&mut self, body: StaticBody) -> StaticKey {
        let complex = body.is_complex();
        let key = self.statics.add(body);
        log::debug!(
            "Registered {} static body {:?}",
            if complex { "complex" } else { "simple" },
            key
        );
        key
    }

    pub fn remove_static_body(&mut self, key: StaticKey) -> Option<StaticBody> {
        self.statics.remove(key)
    }

    pub fn static_geometry(&self) -> &StaticGeometry {
        &self.statics
    }

    pub fn add_particle_system(&mut self, system: ParticleSystem) -> ParticleKey {
        self.particle_systems.insert(system)
    }

    pub fn get_particle_system(&self, key: ParticleKey) -> Option<&ParticleSystem> {
        self.particle_systems.get(key)
    }

    pub fn particle_system_count(&self) -> usize {
        self.particle_systems.len()
    }

    /// Apply controller input to a body, raycasting against this world's statics
    ///
    /// Returns `false` if the key is stale.
    pub fn drive_body(&mut self, key: BodyKey, controller: &mut KinematicController, input: &MoveInput) -> bool {
        let Some(body) = self.bodies.get_mut(key) else {
            return false;
        };
        controller.apply_input(body, input, &self.statics);
        true
    }

    /// Step the simulation forward by `dt` seconds
    ///
    /// Runs `substeps` iterations; in each, every body has its grounded flag
    /// cleared, is resolved against every static body in turn, then
    /// integrates `dt / substeps`. Particle systems advance once with the
    /// full `dt` and are dropped when dead. Non-positive or non-finite `dt`
    /// is ignored.
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let substeps = self.config.substeps.max(1);
        let h = dt / substeps as f32;

        for _ in 0..substeps {
            for body in self.bodies.values_mut() {
                body.on_ground = false;
                Self::resolve_body(body, &self.statics, &self.config);
                body.integrate(h, self.config.gravity);
            }
        }

        for system in self.particle_systems.values_mut() {
            system.update(dt);
        }
        self.particle_systems.retain(|key, system| {
            if system.is_dead() {
                log::trace!("Particle system {:?} faded out", key);
            }
            !system.is_dead()
        });
    }

    /// Run one collision pass for a single body without integrating
    ///
    /// Returns the number of contacts resolved, or 0 for a stale key.
    pub fn resolve_static_collisions_for(&mut self, key: BodyKey) -> usize {
        match self.bodies.get_mut(key) {
            Some(body) => Self::resolve_body(body, &self.statics, &self.config),
            None => 0,
        }
    }

    fn resolve_body(body: &mut RigidBody, statics: &StaticGeometry, config: &PhysicsConfig) -> usize {
        let mut resolved = 0;
        for (key, static_body) in statics.iter() {
            let Some(closest) =
                static_body.closest_to_segment(body.start(), body.end(), body.radius(), config.segment_samples)
            else {
                continue;
            };
            let Some(contact) = Contact::from_closest(&closest, body.radius()) else {
                continue;
            };

            body.apply_correction(contact.normal * contact.penetration);
            if contact.is_ground(config.ground_normal_threshold) && body.velocity.y < 0.0 {
                body.on_ground = true;
                body.velocity.y = 0.0;
            }
            log::trace!(
                "Contact with {:?}: normal {:?}, depth {:.4}",
                key,
                contact.normal,
                contact.penetration
            );
            resolved += 1;
        }
        resolved
    }

    /// Nearest static-body hit along a ray, or `None`
    pub fn ray_intersects_static_bodies(&self, ray: &Ray) -> Option<RayHit> {
        self.statics.cast_ray(ray)
    }

    /// Whether a world-space point lies inside any rigid body
    pub fn body_containing_point(&self, point: Vec3) -> Option<BodyKey> {
        self.bodies
            .iter()
            .find(|(_, body)| body.contains_point(point))
            .map(|(key, _)| key)
    }
}

impl RayQuery for PhysicsWorld {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        self.ray_intersects_static_bodies(ray)
    }
}
