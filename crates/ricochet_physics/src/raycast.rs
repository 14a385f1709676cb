//! Ray queries against static geometry
//!
//! Both the player's headroom check and the bullet system go through the
//! [`RayQuery`] trait, so they can run against a full [`PhysicsWorld`] or
//! just its static geometry.
//!
//! [`PhysicsWorld`]: crate::world::PhysicsWorld

use ricochet_math::Vec3;

use crate::shapes::{Obb, Triangle};
use crate::static_body::StaticKey;

/// Determinant threshold for parallel ray/triangle rejection
const PARALLEL_EPSILON: f32 = 1e-7;

/// A ray with a distance window `[near, far]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Ray {
    /// Create a ray; `None` if the direction has no length
    pub fn new(origin: Vec3, direction: Vec3, near: f32, far: f32) -> Option<Self> {
        let direction = direction.try_normalized()?;
        Some(Self {
            origin,
            direction,
            near,
            far,
        })
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    #[inline]
    fn accepts(&self, t: f32) -> bool {
        t >= self.near && t <= self.far
    }
}

/// The nearest intersection of a ray with static geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Unit surface normal at the hit point
    pub normal: Vec3,
    /// Static body that was hit
    pub body: StaticKey,
}

/// Something that can be raycast against
pub trait RayQuery {
    /// Nearest hit within the ray's window, or `None`
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit>;

    /// Whether anything is hit at all
    fn ray_hits(&self, ray: &Ray) -> bool {
        self.cast_ray(ray).is_some()
    }
}

/// Ray vs oriented box (slab test in the box's local frame)
///
/// Returns the hit distance and outward face normal. A ray that starts inside
/// the box reports the exit face.
pub fn ray_vs_obb(ray: &Ray, obb: &Obb) -> Option<(f32, Vec3)> {
    let axes = obb.axes();
    let offset = obb.center - ray.origin;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;
    let mut exit_normal = Vec3::ZERO;

    for (i, axis) in axes.into_iter().enumerate() {
        let e = axis.dot(offset);
        let f = axis.dot(ray.direction);
        let half = obb.half_size[i];

        if f.abs() > f32::EPSILON {
            // The ray enters through the face whose normal opposes it
            let (t_near, n_near, t_far, n_far) = if f > 0.0 {
                ((e - half) / f, -axis, (e + half) / f, axis)
            } else {
                ((e + half) / f, axis, (e - half) / f, -axis)
            };
            if t_near > t_min {
                t_min = t_near;
                enter_normal = n_near;
            }
            if t_far < t_max {
                t_max = t_far;
                exit_normal = n_far;
            }
            if t_min > t_max {
                return None;
            }
        } else if e.abs() > half {
            // Parallel to this slab and outside it
            return None;
        }
    }

    if ray.accepts(t_min) {
        Some((t_min, enter_normal))
    } else if ray.accepts(t_max) {
        Some((t_max, exit_normal))
    } else {
        None
    }
}

/// Ray vs triangle (Moller-Trumbore, double-sided)
///
/// Returns the hit distance and the geometric normal facing against the ray.
pub fn ray_vs_triangle(ray: &Ray, tri: &Triangle) -> Option<(f32, Vec3)> {
    let edge1 = tri.b - tri.a;
    let edge2 = tri.c - tri.a;
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri.a;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if !ray.accepts(t) {
        return None;
    }

    let mut normal = tri.normal()?;
    if normal.dot(ray.direction) > 0.0 {
        normal = -normal;
    }
    Some((t, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricochet_math::Mat3;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_ray_rejects_zero_direction() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_ray_vs_obb_front_face() {
        let obb = Obb::axis_aligned(Vec3::new(10.5, 1.0, 0.0), Vec3::new(0.5, 2.0, 5.0));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 0.0, 100.0).unwrap();
        let (t, n) = ray_vs_obb(&ray, &obb).unwrap();
        assert!((t - 10.0).abs() < EPSILON);
        assert!((n - Vec3::new(-1.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_ray_vs_obb_from_negative_side() {
        let obb = Obb::axis_aligned(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::X, 0.0, 100.0).unwrap();
        let (t, n) = ray_vs_obb(&ray, &obb).unwrap();
        assert!((t - 4.0).abs() < EPSILON);
        assert!((n - Vec3::X).length() < EPSILON);
    }

    #[test]
    fn test_ray_vs_obb_from_inside_reports_exit() {
        let obb = Obb::axis_aligned(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0, 100.0).unwrap();
        let (t, n) = ray_vs_obb(&ray, &obb).unwrap();
        assert!((t - 1.0).abs() < EPSILON);
        assert!((n - Vec3::Y).length() < EPSILON);
    }

    #[test]
    fn test_ray_vs_obb_miss_and_range() {
        let obb = Obb::axis_aligned(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE);
        let miss = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::Z, 0.0, 100.0).unwrap();
        assert!(ray_vs_obb(&miss, &obb).is_none());
        let short = Ray::new(Vec3::ZERO, Vec3::Z, 0.0, 5.0).unwrap();
        assert!(ray_vs_obb(&short, &obb).is_none());
    }

    #[test]
    fn test_ray_vs_rotated_obb() {
        let obb = Obb::new(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::ONE,
            Mat3::from_rotation_y(std::f32::consts::FRAC_PI_4),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0, 100.0).unwrap();
        let (t, _) = ray_vs_obb(&ray, &obb).unwrap();
        // Corner of the diamond points at the origin
        assert!((t - (5.0 - std::f32::consts::SQRT_2)).abs() < 0.001);
    }

    #[test]
    fn test_ray_vs_triangle_both_sides() {
        let tri = Triangle::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let down = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 0.0, 10.0).unwrap();
        let (t, n) = ray_vs_triangle(&down, &tri).unwrap();
        assert!((t - 2.0).abs() < EPSILON);
        assert!((n - Vec3::Y).length() < EPSILON);

        let up = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, 0.0, 10.0).unwrap();
        let (t, n) = ray_vs_triangle(&up, &tri).unwrap();
        assert!((t - 3.0).abs() < EPSILON);
        assert!((n + Vec3::Y).length() < EPSILON);
    }

    #[test]
    fn test_ray_vs_triangle_parallel_and_outside() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Z);
        let parallel = Ray::new(Vec3::new(-1.0, 0.0, 0.1), Vec3::X, 0.0, 10.0).unwrap();
        assert!(ray_vs_triangle(&parallel, &tri).is_none());
        let outside = Ray::new(Vec3::new(2.0, 1.0, 2.0), -Vec3::Y, 0.0, 10.0).unwrap();
        assert!(ray_vs_triangle(&outside, &tri).is_none());
    }
}
