//! Integration tests for the physics pipeline
//!
//! These tests drive the world and the bullet system the way the frame loop
//! does and check the observable outcomes:
//! 1. Bodies settle on box and mesh floors, indexed or not
//! 2. Controllers are pushed out of walls and respect headroom
//! 3. Bullets predict impacts and ricochet a bounded number of times

use std::sync::Arc;

use ricochet_core::{BulletConfig, BulletSystem, PeerId, Shot};
use ricochet_math::{Affine3, Vec2, Vec3};
use ricochet_physics::{
    closest_point_segment_obb, KinematicController, MoveInput, MoveKeys, Obb, PhysicsWorld, RigidBody, StaticBody,
    TriMesh,
};

const DT: f32 = 1.0 / 60.0;

fn player_at(position: Vec3) -> RigidBody {
    RigidBody::new(2.0, 0.5, 90.0)
        .expect("valid player dimensions")
        .with_position(position)
}

/// Box floor whose top face is at y = 0
fn box_floor() -> StaticBody {
    StaticBody::cuboid(Vec3::new(0.0, -1.0, 0.0), Vec3::new(40.0, 2.0, 40.0))
}

fn run(world: &mut PhysicsWorld, frames: usize) {
    for _ in 0..frames {
        world.update(DT);
    }
}

// ==================== Resting contact ====================

/// A body dropped onto a box floor settles at half its height
#[test]
fn test_body_settles_on_box_floor() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 10.0, 0.0)));

    run(&mut world, 300);

    let body = world.get_body(key).unwrap();
    assert!(body.on_ground, "Body should be grounded after settling");
    assert!(
        (body.position().y - 1.0).abs() < 0.001,
        "Expected rest height 1.0, got {}",
        body.position().y
    );
    // Integration runs last in a substep, so only one substep of gravity remains
    let h = DT / world.config.substeps as f32;
    assert!(body.velocity.y.abs() <= world.config.gravity * h + 1e-6);

    // A collision pass without integration leaves vertical velocity at zero
    world.resolve_static_collisions_for(key);
    let body = world.get_body(key).unwrap();
    assert!(body.on_ground);
    assert_eq!(body.velocity.y, 0.0);
}

/// The same drop onto a triangle mesh floor rests at the same height
#[test]
fn test_body_settles_on_mesh_floor() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(StaticBody::complex(
        Arc::new(TriMesh::plane(40.0, 40.0)),
        Affine3::IDENTITY,
    ));
    let key = world.add_rigid_body(player_at(Vec3::new(2.0, 6.0, -3.0)));

    run(&mut world, 300);

    let body = world.get_body(key).unwrap();
    assert!(body.on_ground);
    assert!((body.position().y - 1.0).abs() < 0.001);
    assert!((body.position().x - 2.0).abs() < 0.001, "Flat floor must not push sideways");
}

/// Non-indexed triangles (consecutive vertex triples) collide like indexed ones
#[test]
fn test_body_settles_on_unindexed_mesh() {
    #[rustfmt::skip]
    let positions = vec![
        -20.0, 0.0, -20.0,  -20.0, 0.0, 20.0,  20.0, 0.0, 20.0,
        -20.0, 0.0, -20.0,   20.0, 0.0, 20.0,  20.0, 0.0, -20.0,
    ];
    let mesh = TriMesh::new(positions, None).expect("two whole triangles");
    assert_eq!(mesh.triangle_count(), 2);

    let mut world = PhysicsWorld::new();
    world.add_static_body(StaticBody::complex(Arc::new(mesh), Affine3::IDENTITY));
    let key = world.add_rigid_body(player_at(Vec3::new(3.0, 5.0, -2.0)));

    run(&mut world, 300);

    let body = world.get_body(key).unwrap();
    assert!(body.on_ground);
    assert!((body.position().y - 1.0).abs() < 0.001, "Expected rest height 1.0, got {}", body.position().y);
}

/// A body sitting still on the floor stays put frame after frame
#[test]
fn test_resting_body_is_stable() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 1.0, 0.0)));

    let mut heights = Vec::new();
    for _ in 0..120 {
        world.update(DT);
        heights.push(world.get_body(key).unwrap().position().y);
    }
    let min = heights.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    assert!(max - min < 0.001, "Rest height drifted by {}", max - min);
}

// ==================== Walls ====================

/// A controller walked into a wall ends up at least a radius away from it
#[test]
fn test_controller_pushed_out_of_wall() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    let wall = Obb::axis_aligned(Vec3::new(3.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 10.0));
    world.add_static_body(StaticBody::from_obb(wall));
    let key = world.add_rigid_body(player_at(Vec3::new(2.0, 1.0, 0.0)));
    let mut controller = KinematicController::new(world.get_body(key).unwrap());

    let input = MoveInput {
        keys: MoveKeys::FORWARD,
        forward: Vec3::X,
        crouch: None,
    };
    for _ in 0..240 {
        world.drive_body(key, &mut controller, &input);
        world.update(DT);
    }
    world.resolve_static_collisions_for(key);

    let body = world.get_body(key).unwrap();
    let closest = closest_point_segment_obb(body.start(), body.end(), &wall, world.config.segment_samples);
    assert!(
        closest.distance() >= body.radius() - 1e-3,
        "Capsule is {} from the wall, radius {}",
        closest.distance(),
        body.radius()
    );
    assert!(body.position().x > 2.45, "Body should have reached the wall");
    // Floor and wall are separate colliders, so the floor contact still grounds
    assert!(body.on_ground, "Body pressed into a wall must stay grounded");
}

// ==================== Controller ====================

/// Jumping in mid-air changes nothing
#[test]
fn test_jump_while_airborne_is_ignored() {
    let mut world = PhysicsWorld::new();
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 20.0, 0.0)));
    let mut controller = KinematicController::new(world.get_body(key).unwrap());
    world.update(DT);
    let before = world.get_body(key).unwrap().velocity;

    let input = MoveInput {
        keys: MoveKeys::JUMP,
        forward: Vec3::X,
        crouch: None,
    };
    world.drive_body(key, &mut controller, &input);

    let body = world.get_body(key).unwrap();
    assert_eq!(body.velocity, before);
    assert_eq!(body.applied_force(), Vec3::ZERO);
}

/// Jumping from the ground leaves the floor and comes back down
#[test]
fn test_jump_from_ground() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 1.0, 0.0)));
    let mut controller = KinematicController::new(world.get_body(key).unwrap());
    run(&mut world, 10);

    let jump = MoveInput {
        keys: MoveKeys::JUMP,
        forward: Vec3::X,
        crouch: None,
    };
    // A resting body carries one substep of gravity, so compare the change
    let before = world.get_body(key).unwrap().velocity.y;
    world.drive_body(key, &mut controller, &jump);
    let after = world.get_body(key).unwrap().velocity.y;
    assert!((after - before - 4.0).abs() < 1e-4, "jump added {}", after - before);

    run(&mut world, 15);
    assert!(world.get_body(key).unwrap().position().y > 1.5);

    run(&mut world, 120);
    let body = world.get_body(key).unwrap();
    assert!(body.on_ground);
    assert!((body.position().y - 1.0).abs() < 0.001);
}

/// Standing up under a low ceiling is refused
#[test]
fn test_crouch_blocked_by_low_ceiling() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 1.0, 0.0)));
    let mut controller = KinematicController::new(world.get_body(key).unwrap());

    let crouch = MoveInput {
        keys: MoveKeys::empty(),
        forward: Vec3::X,
        crouch: Some(true),
    };
    world.drive_body(key, &mut controller, &crouch);
    assert!(controller.is_crouching());

    // Slab whose underside is at y = 1.6, above the crouched capsule but
    // below where a standing head would be
    world.add_static_body(StaticBody::cuboid(Vec3::new(0.0, 2.1, 0.0), Vec3::new(10.0, 1.0, 10.0)));
    run(&mut world, 30);
    let crouched_height = world.get_body(key).unwrap().cylinder_height();

    let stand = MoveInput {
        crouch: Some(false),
        ..crouch
    };
    world.drive_body(key, &mut controller, &stand);

    let body = world.get_body(key).unwrap();
    assert!(controller.is_crouching());
    assert_eq!(body.cylinder_height(), crouched_height);
}

/// With enough headroom the same request succeeds
#[test]
fn test_stand_up_with_headroom() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(box_floor());
    world.add_static_body(StaticBody::cuboid(Vec3::new(0.0, 3.0, 0.0), Vec3::new(10.0, 1.0, 10.0)));
    let key = world.add_rigid_body(player_at(Vec3::new(0.0, 1.0, 0.0)));
    let mut controller = KinematicController::new(world.get_body(key).unwrap());

    let mut input = MoveInput {
        keys: MoveKeys::empty(),
        forward: Vec3::X,
        crouch: Some(true),
    };
    world.drive_body(key, &mut controller, &input);
    run(&mut world, 30);
    input.crouch = Some(false);
    world.drive_body(key, &mut controller, &input);

    assert!(!controller.is_crouching());
    assert_eq!(world.get_body(key).unwrap().cylinder_height(), 1.0);
}

// ==================== Bullets ====================

fn shot_from_origin(direction: Vec2) -> Shot {
    Shot {
        origin: Vec3::new(0.0, 1.0, 0.0),
        direction,
        timestamp: 0.0,
        owner: PeerId::from("shooter"),
    }
}

/// A wall 10 units away at speed 20 is hit after half a second
#[test]
fn test_bullet_time_to_impact() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(StaticBody::from_obb(Obb::axis_aligned(
        Vec3::new(10.5, 1.0, 0.0),
        Vec3::new(0.5, 2.0, 5.0),
    )));
    let mut bullets = BulletSystem::new(BulletConfig {
        speed: 20.0,
        ..BulletConfig::default()
    });

    let key = bullets
        .spawn(&shot_from_origin(Vec2::new(1.0, 0.0)), 0.0, &world)
        .expect("shot has a direction");
    let impact = bullets.get(key).unwrap().impact.expect("wall should be hit");
    assert!((impact.time_to_impact - 0.5).abs() < 1e-4);
}

/// Between two parallel walls a bullet bounces exactly twice, then dies
#[test]
fn test_ricochet_chain_between_walls() {
    let mut world = PhysicsWorld::new();
    world.add_static_body(StaticBody::cuboid(Vec3::new(10.5, 1.0, 0.0), Vec3::new(1.0, 4.0, 20.0)));
    world.add_static_body(StaticBody::cuboid(Vec3::new(-10.5, 1.0, 0.0), Vec3::new(1.0, 4.0, 20.0)));
    let mut bullets = BulletSystem::new(BulletConfig {
        speed: 40.0,
        max_bounces: 2,
        lifetime_frames: 1000,
        max_range: 100.0,
    });
    let key = bullets.spawn(&shot_from_origin(Vec2::new(1.0, 0.0)), 0.0, &world).unwrap();

    let mut direction_changes = 0;
    let mut last_x = 1.0;
    let mut removed_at = None;
    for frame in 0..200 {
        bullets.update(DT, &world);
        match bullets.get(key) {
            Some(bullet) => {
                if bullet.velocity.x.signum() != last_x {
                    direction_changes += 1;
                    last_x = bullet.velocity.x.signum();
                }
                assert!(bullet.position.x.abs() <= 10.0 + 40.0 * DT);
            }
            None => {
                removed_at = Some(frame);
                break;
            }
        }
    }

    assert_eq!(direction_changes, 2);
    // Impacts at 0.25 s, 0.75 s and 1.25 s
    let frame = removed_at.expect("bullet should be removed on the third impact");
    assert!((70..=80).contains(&frame), "removed at frame {}", frame);
}

/// After its last bounce a bullet whose next ray finds nothing keeps flying
/// until its lifetime runs out
#[test]
fn test_ricochet_out_of_a_corner() {
    let mut world = PhysicsWorld::new();
    // Wall facing -X at x = 10 and wall facing +Z at z = -10
    world.add_static_body(StaticBody::cuboid(Vec3::new(10.5, 1.0, 0.0), Vec3::new(1.0, 4.0, 40.0)));
    world.add_static_body(StaticBody::cuboid(Vec3::new(0.0, 1.0, -10.5), Vec3::new(40.0, 4.0, 1.0)));
    let mut bullets = BulletSystem::new(BulletConfig {
        speed: 40.0,
        max_bounces: 2,
        lifetime_frames: 60,
        max_range: 100.0,
    });
    let shot = Shot {
        origin: Vec3::new(4.0, 1.0, 0.0),
        ..shot_from_origin(Vec2::new(1.0, -1.0))
    };
    let key = bullets.spawn(&shot, 0.0, &world).unwrap();
    let first = bullets.get(key).unwrap().impact.expect("first wall is in the path");
    assert!((first.point - Vec3::new(10.0, 1.0, -6.0)).length() < 1e-3);

    // Impacts at about 0.21 s on the first wall and 0.35 s on the second
    for _ in 0..40 {
        bullets.update(DT, &world);
    }
    let bullet = bullets.get(key).expect("bullet still within its lifetime");
    assert_eq!(bullet.bounces, 2);
    assert!(bullet.impact.is_none(), "third ray heads into open space");
    assert!(bullet.velocity.x < 0.0 && bullet.velocity.y > 0.0);

    for _ in 40..59 {
        bullets.update(DT, &world);
    }
    assert_eq!(bullets.len(), 1);
    bullets.update(DT, &world);
    assert!(bullets.is_empty());
}

/// A bullet that never hits anything runs out of lifetime
#[test]
fn test_bullet_lifetime() {
    let world = PhysicsWorld::new();
    let mut bullets = BulletSystem::default();
    bullets.spawn(&shot_from_origin(Vec2::new(0.0, 1.0)), 0.0, &world);

    for _ in 0..199 {
        bullets.update(DT, &world);
    }
    assert_eq!(bullets.len(), 1);
    bullets.update(DT, &world);
    assert!(bullets.is_empty());
}
