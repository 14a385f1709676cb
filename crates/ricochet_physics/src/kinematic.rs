//! Input-driven capsule controller
//!
//! A [`KinematicController`] holds the player-specific tuning and state
//! (move force, jump force, crouch) and operates on a [`RigidBody`] it does
//! not own. Input is applied first; the physics world integrates afterwards.

use bitflags::bitflags;
use ricochet_math::Vec3;

use crate::body::RigidBody;
use crate::error::BodyError;
use crate::raycast::{Ray, RayQuery};

/// Default directional force (newtons)
pub const DEFAULT_MOVE_FORCE: f32 = 1000.0;

/// Default jump impulse per unit of mass
pub const DEFAULT_JUMP_FORCE_PER_MASS: f32 = 4.0;

/// Default crouched axis length as a fraction of the standing axis
pub const DEFAULT_CROUCH_FRACTION: f32 = 0.25;

/// Fraction of the move force available while airborne
pub const AIR_CONTROL: f32 = 0.1;

/// Horizontal offset of the headroom rays, as a fraction of the radius
const HEADROOM_RAY_SPREAD: f32 = 0.8;

bitflags! {
    /// Movement keys held this frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MoveKeys: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const JUMP = 1 << 4;
    }
}

/// One frame of controller input
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveInput {
    pub keys: MoveKeys,
    /// View direction; only its horizontal part is used
    pub forward: Vec3,
    /// Desired crouch state, `None` when the input source has no opinion
    pub crouch: Option<bool>,
}

/// Player controller state layered over a rigid body
#[derive(Clone, Debug)]
pub struct KinematicController {
    pub move_force: f32,
    pub jump_force: f32,
    crouch_height: f32,
    crouching: bool,
}

impl KinematicController {
    /// Controller with default tuning for the given body
    pub fn new(body: &RigidBody) -> Self {
        Self {
            move_force: DEFAULT_MOVE_FORCE,
            jump_force: DEFAULT_JUMP_FORCE_PER_MASS * body.mass(),
            crouch_height: DEFAULT_CROUCH_FRACTION * body.standing_cylinder_height(),
            crouching: false,
        }
    }

    pub fn with_move_force(mut self, move_force: f32) -> Self {
        self.move_force = move_force;
        self
    }

    /// Set the jump impulse as a multiple of the body's mass
    pub fn with_jump_force_per_mass(mut self, body: &RigidBody, per_mass: f32) -> Self {
        self.jump_force = per_mass * body.mass();
        self
    }

    /// Set the crouched axis length
    ///
    /// Must lie within `[0, standing cylinder height]`.
    pub fn with_crouch_height(mut self, body: &RigidBody, crouch_height: f32) -> Result<Self, BodyError> {
        if !(0.0..=body.standing_cylinder_height()).contains(&crouch_height) {
            return Err(BodyError::InvalidCrouchHeight(crouch_height));
        }
        self.crouch_height = crouch_height;
        Ok(self)
    }

    #[inline]
    pub fn crouch_height(&self) -> f32 {
        self.crouch_height
    }

    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    /// Apply one frame of input to the body
    ///
    /// Forward/back move along the view direction and left/right along its
    /// horizontal perpendicular. The summed direction is normalized and scaled
    /// by the move force, reduced while airborne. Jump and crouch are handled
    /// before the movement force is accumulated.
    pub fn apply_input<Q>(&mut self, body: &mut RigidBody, input: &MoveInput, statics: &Q)
    where
        Q: RayQuery + ?Sized,
    {
        let forward = Vec3::new(input.forward.x, 0.0, input.forward.z)
            .try_normalized()
            .unwrap_or(Vec3::ZERO);
        let side = Vec3::new(forward.z, 0.0, -forward.x);

        let mut direction = Vec3::ZERO;
        if input.keys.contains(MoveKeys::FORWARD) {
            direction += forward;
        }
        if input.keys.contains(MoveKeys::BACK) {
            direction -= forward;
        }
        if input.keys.contains(MoveKeys::LEFT) {
            direction += side;
        }
        if input.keys.contains(MoveKeys::RIGHT) {
            direction -= side;
        }

        if input.keys.contains(MoveKeys::JUMP) {
            self.jump(body);
        }
        self.crouch(body, input.crouch, statics);

        if let Some(direction) = direction.try_normalized() {
            let mut force = direction * self.move_force;
            if !body.on_ground {
                force *= AIR_CONTROL;
            }
            body.apply_force(force);
        }
    }

    /// Jump if grounded; returns whether the impulse was applied
    pub fn jump(&self, body: &mut RigidBody) -> bool {
        if !body.on_ground {
            return false;
        }
        body.apply_impulse(Vec3::Y * self.jump_force, 1.0);
        true
    }

    /// Switch between standing and crouching
    ///
    /// Ignored when `desired` is `None` or matches the current state, and when
    /// standing up is blocked overhead. On a transition the axis length changes
    /// and the body is shifted by half the delta so its feet stay put.
    /// Returns whether the state changed.
    pub fn crouch<Q>(&mut self, body: &mut RigidBody, desired: Option<bool>, statics: &Q) -> bool
    where
        Q: RayQuery + ?Sized,
    {
        let Some(desired) = desired else {
            return false;
        };
        if desired == self.crouching {
            return false;
        }
        if self.crouching && !self.can_stand_up(body, statics) {
            return false;
        }

        self.crouching = desired;
        let previous = body.cylinder_height();
        let next = if desired {
            self.crouch_height
        } else {
            body.standing_cylinder_height()
        };
        body.set_cylinder_height(next);

        let mut position = body.position();
        position.y += (next - previous) * 0.5;
        body.set_position(position);
        true
    }

    /// Whether the space above the capsule is clear enough to stand
    ///
    /// Casts five upward rays from the top of the axis: one centered and four
    /// offset horizontally along the cardinal directions.
    pub fn can_stand_up<Q>(&self, body: &RigidBody, statics: &Q) -> bool
    where
        Q: RayQuery + ?Sized,
    {
        let spread = body.radius() * HEADROOM_RAY_SPREAD;
        let far = body.radius() + body.height() * 0.5 - body.cylinder_height();
        let offsets = [
            Vec3::ZERO,
            Vec3::X * spread,
            -Vec3::X * spread,
            Vec3::Z * spread,
            -Vec3::Z * spread,
        ];

        !offsets.into_iter().any(|offset| {
            let ray = Ray {
                origin: body.end() + offset,
                direction: Vec3::Y,
                near: 0.0,
                far,
            };
            statics.ray_hits(&ray)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::RayHit;
    use crate::static_body::StaticKey;

    const EPSILON: f32 = 0.0001;

    /// Ray target that reports a hit for every ray, or none at all
    struct Ceiling(bool);

    impl RayQuery for Ceiling {
        fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
            self.0.then(|| RayHit {
                distance: ray.near,
                point: ray.origin,
                normal: -Vec3::Y,
                body: StaticKey::default(),
            })
        }
    }

    fn setup() -> (RigidBody, KinematicController) {
        let body = RigidBody::new(2.0, 0.5, 90.0).unwrap().with_position(Vec3::new(0.0, 1.0, 0.0));
        let controller = KinematicController::new(&body);
        (body, controller)
    }

    #[test]
    fn test_default_tuning() {
        let (_, controller) = setup();
        assert_eq!(controller.move_force, 1000.0);
        assert_eq!(controller.jump_force, 360.0);
        assert!((controller.crouch_height() - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_crouch_height_validation() {
        let (body, controller) = setup();
        assert!(controller.clone().with_crouch_height(&body, 0.5).is_ok());
        assert_eq!(
            controller.with_crouch_height(&body, 1.5).unwrap_err(),
            BodyError::InvalidCrouchHeight(1.5)
        );
    }

    #[test]
    fn test_forward_input_on_ground() {
        let (mut body, mut controller) = setup();
        body.on_ground = true;
        let input = MoveInput {
            keys: MoveKeys::FORWARD,
            forward: Vec3::new(-1.0, 0.0, 0.0),
            crouch: None,
        };
        controller.apply_input(&mut body, &input, &Ceiling(false));
        assert!((body.applied_force() - Vec3::new(-1000.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_diagonal_input_is_normalized_and_reduced_in_air() {
        let (mut body, mut controller) = setup();
        let input = MoveInput {
            keys: MoveKeys::FORWARD | MoveKeys::LEFT,
            forward: Vec3::new(0.0, 0.5, -2.0),
            crouch: None,
        };
        controller.apply_input(&mut body, &input, &Ceiling(false));
        // forward = -Z, side = (-1, 0, 0)
        let expected = Vec3::new(-1.0, 0.0, -1.0).normalized() * 100.0;
        assert!((body.applied_force() - expected).length() < EPSILON);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let (mut body, mut controller) = setup();
        body.on_ground = true;
        let input = MoveInput {
            keys: MoveKeys::LEFT | MoveKeys::RIGHT,
            forward: Vec3::X,
            crouch: None,
        };
        controller.apply_input(&mut body, &input, &Ceiling(false));
        assert_eq!(body.applied_force(), Vec3::ZERO);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let (mut body, controller) = setup();
        assert!(!controller.jump(&mut body));
        assert_eq!(body.velocity, Vec3::ZERO);

        body.on_ground = true;
        assert!(controller.jump(&mut body));
        assert!((body.velocity.y - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_crouch_and_stand() {
        let (mut body, mut controller) = setup();
        assert!(controller.crouch(&mut body, Some(true), &Ceiling(false)));
        assert!(controller.is_crouching());
        assert!((body.cylinder_height() - 0.25).abs() < EPSILON);
        // Feet stay at y = 0
        assert!((body.start().y - body.radius()).abs() < EPSILON);

        // Repeating the same state is a no-op
        assert!(!controller.crouch(&mut body, Some(true), &Ceiling(false)));
        assert!(!controller.crouch(&mut body, None, &Ceiling(false)));

        assert!(controller.crouch(&mut body, Some(false), &Ceiling(false)));
        assert!((body.position().y - 1.0).abs() < EPSILON);
        assert!((body.cylinder_height() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_stand_up_blocked() {
        let (mut body, mut controller) = setup();
        controller.crouch(&mut body, Some(true), &Ceiling(false));
        let before = body.cylinder_height();

        assert!(!controller.crouch(&mut body, Some(false), &Ceiling(true)));
        assert!(controller.is_crouching());
        assert_eq!(body.cylinder_height(), before);
    }
}
