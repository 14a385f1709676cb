//! Projectiles with precomputed ricochets
//!
//! Bullets travel on the horizontal plane at a constant speed. When one is
//! spawned (and after every bounce) a single ray is cast along its path; the
//! hit distance gives a countdown to impact and the surface normal gives the
//! reflected direction. No per-frame collision tests are needed.

use ricochet_math::{Vec2, Vec3};
use ricochet_physics::{Ray, RayQuery};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::net::PeerId;

new_key_type! {
    /// Key to a live bullet
    pub struct BulletKey;
}

/// Offset along a reflected ray so it does not re-hit the surface it left
const BOUNCE_SKIN: f32 = 1e-3;

/// Tuning for the bullet system
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletConfig {
    /// Travel speed (units per second)
    pub speed: f32,
    /// Reflections allowed before the next impact destroys the bullet
    pub max_bounces: u32,
    /// Updates a bullet survives regardless of impacts
    pub lifetime_frames: u32,
    /// Reach of the trajectory raycast
    pub max_range: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            max_bounces: 2,
            lifetime_frames: 200,
            max_range: 100.0,
        }
    }
}

/// A request to spawn a bullet
#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    pub origin: Vec3,
    /// Horizontal direction (x, z); normalized on spawn
    pub direction: Vec2,
    /// When the shot was fired, in seconds on the same clock as `now`
    pub timestamp: f64,
    pub owner: PeerId,
}

/// The next predicted surface hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingImpact {
    /// Seconds until the bullet reaches `point`
    pub time_to_impact: f32,
    pub point: Vec3,
    /// Surface normal, facing against the incoming direction
    pub normal: Vec3,
    /// Outgoing direction, or `None` when the bounce budget is spent
    pub reflection: Option<Vec3>,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub position: Vec3,
    /// Unit horizontal direction (x, z)
    pub velocity: Vec2,
    pub spawn_time: f64,
    pub frames_left: u32,
    pub owner: PeerId,
    pub impact: Option<PendingImpact>,
    pub bounces: u32,
}

impl Bullet {
    /// 3D unit direction of travel
    pub fn direction(&self) -> Vec3 {
        Vec3::from_planar(self.velocity, 0.0)
    }
}

/// Reflect `incoming` about `normal`, flipping the normal to oppose it
pub fn reflect(incoming: Vec3, normal: Vec3) -> Vec3 {
    let n = if incoming.dot(normal) > 0.0 { -normal } else { normal };
    incoming.reflect(n)
}

/// Owns every live bullet
#[derive(Debug, Default)]
pub struct BulletSystem {
    bullets: SlotMap<BulletKey, Bullet>,
    pub config: BulletConfig,
}

impl BulletSystem {
    pub fn new(config: BulletConfig) -> Self {
        Self {
            bullets: SlotMap::with_key(),
            config,
        }
    }

    /// Spawn a bullet for `shot`, compensating for transmission delay
    ///
    /// The bullet starts where it would be by `now`. Its trajectory is still
    /// cast from the shot origin, so the time to impact shrinks by the same
    /// delay. Returns `None` for a shot with no horizontal direction.
    pub fn spawn<Q>(&mut self, shot: &Shot, now: f64, world: &Q) -> Option<BulletKey>
    where
        Q: RayQuery + ?Sized,
    {
        let Some(velocity) = shot.direction.try_normalized() else {
            log::warn!("Ignoring shot from {} with no direction", shot.owner);
            return None;
        };
        let elapsed = (now - shot.timestamp).max(0.0) as f32;

        let mut bullet = Bullet {
            position: shot.origin + Vec3::from_planar(velocity, 0.0) * (self.config.speed * elapsed),
            velocity,
            spawn_time: shot.timestamp,
            frames_left: self.config.lifetime_frames,
            owner: shot.owner.clone(),
            impact: None,
            bounces: 0,
        };
        bullet.impact = Self::trajectory(&self.config, shot.origin, velocity, 0.0, 0, world)
            .map(|mut impact| {
                impact.time_to_impact -= elapsed;
                impact
            });

        let key = self.bullets.insert(bullet);
        log::trace!("Spawned bullet {:?} for {}", key, shot.owner);
        Some(key)
    }

    /// Cast the trajectory ray and predict the next impact
    fn trajectory<Q>(
        config: &BulletConfig,
        origin: Vec3,
        velocity: Vec2,
        near: f32,
        bounces: u32,
        world: &Q,
    ) -> Option<PendingImpact>
    where
        Q: RayQuery + ?Sized,
    {
        let ray = Ray::new(origin, Vec3::from_planar(velocity, 0.0), near, config.max_range)?;
        let hit = world.cast_ray(&ray)?;
        let reflection = (bounces < config.max_bounces).then(|| reflect(ray.direction, hit.normal));
        Some(PendingImpact {
            time_to_impact: hit.distance / config.speed,
            point: hit.point,
            normal: hit.normal,
            reflection,
        })
    }

    /// Advance every bullet by `dt` seconds
    ///
    /// Moves each bullet, burns one frame of lifetime and counts down its
    /// pending impact. On impact a bullet with bounces left takes the
    /// reflected direction from the impact point; otherwise it is removed.
    pub fn update<Q>(&mut self, dt: f32, world: &Q)
    where
        Q: RayQuery + ?Sized,
    {
        let config = &self.config;
        self.bullets.retain(|key, bullet| {
            bullet.position += bullet.direction() * (config.speed * dt);

            bullet.frames_left = bullet.frames_left.saturating_sub(1);
            if bullet.frames_left == 0 {
                log::trace!("Bullet {:?} expired", key);
                return false;
            }

            let Some(impact) = bullet.impact.as_mut() else {
                return true;
            };
            impact.time_to_impact -= dt;
            if impact.time_to_impact > 0.0 {
                return true;
            }

            let point = impact.point;
            let Some(velocity) = impact.reflection.and_then(|r| r.planar().try_normalized()) else {
                log::trace!("Bullet {:?} stopped at {:?}", key, point);
                return false;
            };

            bullet.velocity = velocity;
            bullet.position = point;
            bullet.bounces += 1;
            bullet.impact = Self::trajectory(config, point, velocity, BOUNCE_SKIN, bullet.bounces, world);
            log::trace!("Bullet {:?} ricocheted at {:?} (bounce {})", key, point, bullet.bounces);
            true
        });
    }

    pub fn get(&self, key: BulletKey) -> Option<&Bullet> {
        self.bullets.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BulletKey, &Bullet)> {
        self.bullets.iter()
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    pub fn clear(&mut self) {
        self.bullets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricochet_physics::{StaticBody, StaticGeometry};

    const EPSILON: f32 = 0.0001;

    fn shot(origin: Vec3, direction: Vec2) -> Shot {
        Shot {
            origin,
            direction,
            timestamp: 0.0,
            owner: PeerId::from("p1"),
        }
    }

    fn wall_at_x(x: f32) -> StaticGeometry {
        let mut geometry = StaticGeometry::new();
        geometry.add(StaticBody::cuboid(Vec3::new(x + 0.5 * x.signum(), 1.0, 0.0), Vec3::new(1.0, 4.0, 10.0)));
        geometry
    }

    #[test]
    fn test_reflect_flips_normal_to_oppose() {
        let i = Vec3::new(1.0, 0.0, 1.0).normalized();
        let r1 = reflect(i, Vec3::new(-1.0, 0.0, 0.0));
        let r2 = reflect(i, Vec3::X);
        let expected = Vec3::new(-1.0, 0.0, 1.0).normalized();
        assert!((r1 - expected).length() < EPSILON);
        assert!((r2 - expected).length() < EPSILON);
    }

    #[test]
    fn test_spawn_predicts_impact() {
        let world = wall_at_x(10.0);
        let mut bullets = BulletSystem::new(BulletConfig {
            speed: 20.0,
            ..BulletConfig::default()
        });
        let key = bullets
            .spawn(&shot(Vec3::new(0.0, 1.0, 0.0), Vec2::new(3.0, 0.0)), 0.0, &world)
            .unwrap();
        let bullet = bullets.get(key).unwrap();
        assert_eq!(bullet.velocity, Vec2::new(1.0, 0.0));
        let impact = bullet.impact.unwrap();
        assert!((impact.time_to_impact - 0.5).abs() < EPSILON);
        assert!((impact.point - Vec3::new(10.0, 1.0, 0.0)).length() < EPSILON);
        assert!((impact.reflection.unwrap() + Vec3::X).length() < EPSILON);
    }

    #[test]
    fn test_spawn_miss_has_no_impact() {
        let world = StaticGeometry::new();
        let mut bullets = BulletSystem::default();
        let key = bullets.spawn(&shot(Vec3::ZERO, Vec2::new(0.0, 1.0)), 0.0, &world).unwrap();
        assert!(bullets.get(key).unwrap().impact.is_none());
    }

    #[test]
    fn test_spawn_rejects_zero_direction() {
        let mut bullets = BulletSystem::default();
        assert!(bullets.spawn(&shot(Vec3::ZERO, Vec2::ZERO), 0.0, &StaticGeometry::new()).is_none());
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_spawn_compensates_for_latency() {
        let world = wall_at_x(10.0);
        let mut bullets = BulletSystem::default();
        let mut late = shot(Vec3::ZERO, Vec2::new(1.0, 0.0));
        late.timestamp = 100.0;
        let key = bullets.spawn(&late, 100.25, &world).unwrap();
        let bullet = bullets.get(key).unwrap();
        assert!((bullet.position.x - 2.5).abs() < EPSILON);
        assert!((bullet.impact.unwrap().time_to_impact - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_update_moves_and_expires() {
        let world = StaticGeometry::new();
        let mut bullets = BulletSystem::new(BulletConfig {
            lifetime_frames: 3,
            ..BulletConfig::default()
        });
        let key = bullets.spawn(&shot(Vec3::ZERO, Vec2::new(0.0, -1.0)), 0.0, &world).unwrap();

        bullets.update(0.1, &world);
        assert!((bullets.get(key).unwrap().position.z + 1.0).abs() < EPSILON);
        bullets.update(0.1, &world);
        assert_eq!(bullets.len(), 1);
        bullets.update(0.1, &world);
        assert!(bullets.get(key).is_none());
    }

    #[test]
    fn test_impact_without_budget_removes() {
        let world = wall_at_x(1.0);
        let mut bullets = BulletSystem::new(BulletConfig {
            max_bounces: 0,
            ..BulletConfig::default()
        });
        let key = bullets.spawn(&shot(Vec3::ZERO, Vec2::new(1.0, 0.0)), 0.0, &world).unwrap();
        assert!(bullets.get(key).unwrap().impact.unwrap().reflection.is_none());

        // 0.1 s to impact at speed 10
        bullets.update(0.05, &world);
        assert_eq!(bullets.len(), 1);
        bullets.update(0.06, &world);
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_bounce_reverses_direction() {
        let world = wall_at_x(1.0);
        let mut bullets = BulletSystem::default();
        let key = bullets.spawn(&shot(Vec3::ZERO, Vec2::new(1.0, 0.0)), 0.0, &world).unwrap();

        bullets.update(0.11, &world);
        let bullet = bullets.get(key).unwrap();
        assert_eq!(bullet.bounces, 1);
        assert!((bullet.velocity.x + 1.0).abs() < EPSILON);
        assert!((bullet.position.x - 1.0).abs() < EPSILON);
        // Nothing behind the shooter
        assert!(bullet.impact.is_none());
    }
}
