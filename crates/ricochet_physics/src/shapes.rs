//! Collision shapes
//!
//! These are lightweight primitives used for narrow-phase tests and ray
//! queries. They hold world-space data; nothing here owns a transform.

use ricochet_math::{Affine3, Mat3, Vec3};

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.min = bounds.min.min_components(p);
            bounds.max = bounds.max.max_components(p);
        }
        Some(bounds)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if two AABBs overlap (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// An oriented bounding box
///
/// `rotation` is the 3x3 linear part of the collider's world matrix, so its
/// columns may carry scale; [`Obb::axes`] returns them normalized.
/// `half_size` is already expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_size: Vec3,
    pub rotation: Mat3,
}

impl Obb {
    pub fn new(center: Vec3, half_size: Vec3, rotation: Mat3) -> Self {
        Self {
            center,
            half_size,
            rotation,
        }
    }

    /// Axis-aligned box (identity rotation)
    pub fn axis_aligned(center: Vec3, half_size: Vec3) -> Self {
        Self::new(center, half_size, Mat3::IDENTITY)
    }

    /// Derive a world-space OBB from a local-space bounding box and a world matrix
    ///
    /// The box center is transformed into world space, the half extents are
    /// scaled by the world scale, and the rotation basis is the linear part of
    /// the matrix.
    pub fn from_local_bounds(bounds: &Aabb, world: &Affine3) -> Self {
        Self {
            center: world.transform_point(bounds.center()),
            half_size: bounds.half_extents().component_mul(world.scale()),
            rotation: world.linear,
        }
    }

    /// Unit local axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation.col(0).normalized(),
            self.rotation.col(1).normalized(),
            self.rotation.col(2).normalized(),
        ]
    }

    /// Closest point inside or on the box to `point`
    ///
    /// Projects the offset from the center onto each local axis and clamps
    /// the projection to the half extent on that axis.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        let mut result = self.center;
        for (i, axis) in self.axes().into_iter().enumerate() {
            let distance = d.dot(axis);
            let clamped = distance.clamp(-self.half_size[i], self.half_size[i]);
            result += axis * clamped;
        }
        result
    }

    /// Check if a point is inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        let d = point - self.center;
        self.axes()
            .into_iter()
            .enumerate()
            .all(|(i, axis)| d.dot(axis).abs() <= self.half_size[i])
    }
}

/// A world-space triangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

/// Twice-area threshold below which a triangle is treated as degenerate
const DEGENERATE_AREA_SQ: f32 = 1e-12;

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Transform all three vertices by a world matrix
    pub fn transformed(&self, world: &Affine3) -> Self {
        Self::new(
            world.transform_point(self.a),
            world.transform_point(self.b),
            world.transform_point(self.c),
        )
    }

    /// Whether the triangle has (almost) zero area
    pub fn is_degenerate(&self) -> bool {
        (self.b - self.a).cross(self.c - self.a).length_squared() <= DEGENERATE_AREA_SQ
    }

    /// Unit face normal following the winding `a -> b -> c`
    ///
    /// `None` for a zero-area triangle.
    pub fn normal(&self) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }
        (self.b - self.a).cross(self.c - self.a).try_normalized()
    }

    /// Exact closest point on the triangle to `p`
    ///
    /// Classifies `p` against the Voronoi regions of the vertices and edges
    /// and falls back to the barycentric projection onto the face.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

/// A capsule: a segment swept by a sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    /// Bottom of the axis segment
    pub start: Vec3,
    /// Top of the axis segment
    pub end: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Point on the axis at parameter `t` in `[0, 1]`
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + (self.end - self.start) * t
    }

    /// Closest point on the axis segment to `point`
    pub fn closest_point_on_axis(&self, point: Vec3) -> Vec3 {
        let line = self.end - self.start;
        let len_sq = line.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(line) / len_sq).clamp(0.0, 1.0);
        self.point_at(t)
    }

    /// Check if a point is inside or on the capsule
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.closest_point_on_axis(point)) <= self.radius * self.radius
    }
}
