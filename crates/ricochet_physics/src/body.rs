//! Capsule rigid body
//!
//! Translation-only dynamics driven by a force accumulator. The capsule axis
//! is vertical; its endpoints are derived from the position and the current
//! cylinder height and are kept in sync after every change.

use ricochet_math::Vec3;
use slotmap::new_key_type;

use crate::error::BodyError;
use crate::shapes::Capsule;

new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed, stale keys resolve to `None`
    /// even if the slot is reused.
    pub struct BodyKey;
}

/// Gravitational acceleration (m/s^2, applied downward)
pub const GRAVITY: f32 = 9.81;

/// Horizontal velocity damping applied per step while grounded
pub const DEFAULT_DAMPING: f32 = 0.02;

/// A capsule-shaped body integrated from accumulated forces
#[derive(Clone, Debug)]
pub struct RigidBody {
    position: Vec3,
    /// Velocity in units per second
    pub velocity: Vec3,
    acceleration: Vec3,
    applied_force: Vec3,
    mass: f32,
    radius: f32,
    height: f32,
    cylinder_height: f32,
    start: Vec3,
    end: Vec3,
    /// Set during collision resolution; cleared at the start of every substep
    pub on_ground: bool,
    /// Fraction of horizontal velocity removed per step while grounded
    pub damping: f32,
}

impl RigidBody {
    /// Create a body at the origin
    ///
    /// `height` is the total capsule height including both hemispheres.
    pub fn new(height: f32, radius: f32, mass: f32) -> Result<Self, BodyError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(BodyError::InvalidMass(mass));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(BodyError::InvalidRadius(radius));
        }
        if !height.is_finite() || height < 2.0 * radius {
            return Err(BodyError::InvalidHeight { height, radius });
        }

        let mut body = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            applied_force: Vec3::ZERO,
            mass,
            radius,
            height,
            cylinder_height: height - 2.0 * radius,
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            on_ground: false,
            damping: DEFAULT_DAMPING,
        };
        body.sync_endpoints();
        Ok(body)
    }

    /// Place the body at a position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the grounded damping coefficient
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Force accumulated since the last integration step
    #[inline]
    pub fn applied_force(&self) -> Vec3 {
        self.applied_force
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Total standing height, including both hemispheres
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Current length of the capsule axis
    #[inline]
    pub fn cylinder_height(&self) -> f32 {
        self.cylinder_height
    }

    /// Axis length when standing: `height - 2 * radius`
    #[inline]
    pub fn standing_cylinder_height(&self) -> f32 {
        self.height - 2.0 * self.radius
    }

    /// Bottom of the capsule axis
    #[inline]
    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// Top of the capsule axis
    #[inline]
    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Teleport the body
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.sync_endpoints();
    }

    /// Translate the body by a correction vector (collision push-out)
    pub fn apply_correction(&mut self, delta: Vec3) {
        self.position += delta;
        self.start += delta;
        self.end += delta;
    }

    pub(crate) fn set_cylinder_height(&mut self, cylinder_height: f32) {
        self.cylinder_height = cylinder_height;
        self.sync_endpoints();
    }

    fn sync_endpoints(&mut self) {
        let half = Vec3::Y * (self.cylinder_height * 0.5);
        self.start = self.position - half;
        self.end = self.position + half;
    }

    /// Accumulate a force; it takes effect at the next integration step
    pub fn apply_force(&mut self, force: Vec3) {
        self.applied_force += force;
    }

    /// Change velocity immediately by `force * dt / mass`
    pub fn apply_impulse(&mut self, force: Vec3, dt: f32) {
        self.velocity += force * (dt / self.mass);
    }

    /// Integrate one step under standard gravity
    pub fn update(&mut self, dt: f32) {
        self.integrate(dt, GRAVITY);
    }

    /// Integrate one step
    ///
    /// Adds the gravity force, converts the accumulated force to acceleration,
    /// advances velocity (damping the horizontal part while grounded), then
    /// position, and finally clears the accumulator.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.applied_force.y -= gravity * self.mass;
        self.acceleration = self.applied_force / self.mass;
        self.velocity += self.acceleration * dt;

        if self.on_ground {
            let keep = 1.0 - self.damping;
            self.velocity.x *= keep;
            self.velocity.z *= keep;
        }

        self.position += self.velocity * dt;
        self.sync_endpoints();
        self.applied_force = Vec3::ZERO;
    }

    /// The body's current collision capsule
    pub fn capsule(&self) -> Capsule {
        Capsule::new(self.start, self.end, self.radius)
    }

    /// Check whether a world-space point lies inside the capsule
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.capsule().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn player() -> RigidBody {
        RigidBody::new(2.0, 0.5, 90.0).unwrap()
    }

    #[test]
    fn test_new_validates_dimensions() {
        assert_eq!(RigidBody::new(2.0, 0.5, 0.0).unwrap_err(), BodyError::InvalidMass(0.0));
        assert_eq!(RigidBody::new(2.0, -1.0, 1.0).unwrap_err(), BodyError::InvalidRadius(-1.0));
        assert!(matches!(
            RigidBody::new(0.5, 0.5, 1.0),
            Err(BodyError::InvalidHeight { .. })
        ));
        // A sphere (height == diameter) is fine
        assert_eq!(RigidBody::new(1.0, 0.5, 1.0).unwrap().cylinder_height(), 0.0);
    }

    #[test]
    fn test_endpoints_follow_position() {
        let mut body = player().with_position(Vec3::new(1.0, 5.0, 2.0));
        assert_eq!(body.cylinder_height(), 1.0);
        assert_eq!(body.start(), Vec3::new(1.0, 4.5, 2.0));
        assert_eq!(body.end(), Vec3::new(1.0, 5.5, 2.0));

        body.apply_correction(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.start(), Vec3::new(1.0, 5.5, 2.0));

        body.set_cylinder_height(0.25);
        assert_eq!(body.end(), Vec3::new(1.0, 6.125, 2.0));
    }

    #[test]
    fn test_apply_force_is_deferred() {
        let mut body = player();
        body.apply_force(Vec3::new(90.0, 0.0, 0.0));
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.applied_force(), Vec3::new(90.0, 0.0, 0.0));
    }

    #[test]
    fn test_apply_impulse() {
        let mut body = player();
        body.apply_impulse(Vec3::new(0.0, 360.0, 0.0), 1.0);
        assert!((body.velocity.y - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_applies_gravity_and_clears_force() {
        let mut body = player().with_position(Vec3::new(0.0, 10.0, 0.0));
        body.apply_force(Vec3::new(180.0, 0.0, 0.0));
        body.update(0.1);

        assert!((body.acceleration().x - 2.0).abs() < EPSILON);
        assert!((body.acceleration().y + GRAVITY).abs() < EPSILON);
        assert!((body.velocity.y + 0.981).abs() < EPSILON);
        assert!((body.position().y - (10.0 - 0.0981)).abs() < EPSILON);
        assert!((body.end().y - (body.position().y + 0.5)).abs() < EPSILON);
        assert_eq!(body.applied_force(), Vec3::ZERO);
    }

    #[test]
    fn test_damping_only_when_grounded() {
        let mut airborne = player().with_velocity(Vec3::new(10.0, 0.0, 10.0));
        airborne.integrate(0.01, 0.0);
        assert_eq!(airborne.velocity.x, 10.0);

        let mut grounded = player().with_velocity(Vec3::new(10.0, 0.0, 10.0));
        grounded.on_ground = true;
        grounded.integrate(0.01, 0.0);
        assert!((grounded.velocity.x - 9.8).abs() < EPSILON);
        assert!((grounded.velocity.z - 9.8).abs() < EPSILON);
    }

    #[test]
    fn test_contains_point() {
        let body = player().with_position(Vec3::new(0.0, 1.0, 0.0));
        assert!(body.contains_point(Vec3::new(0.0, 1.9, 0.0)));
        assert!(body.contains_point(Vec3::new(0.45, 1.0, 0.0)));
        assert!(!body.contains_point(Vec3::new(0.0, 2.1, 0.0)));
    }
}
