//! Narrow-phase collision between a capsule axis and static geometry
//!
//! The capsule axis is sampled at a fixed number of evenly spaced points and
//! each sample is matched against the exact closest point on the surface.
//! This is an approximation: the true minimum may fall between samples.
//! Ties keep the first (lowest `t`) sample.

use ricochet_math::Vec3;

use crate::shapes::{Obb, Triangle};

/// Default number of intervals the capsule axis is split into (11 samples)
pub const DEFAULT_SEGMENT_SAMPLES: u32 = 10;

/// Result of a sampled segment search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentClosest {
    /// Sample on the capsule axis
    pub point_on_segment: Vec3,
    /// Closest point on the surface to that sample
    pub point_on_surface: Vec3,
    /// Squared distance between the two
    pub distance_squared: f32,
}

impl SegmentClosest {
    pub fn distance(&self) -> f32 {
        self.distance_squared.sqrt()
    }
}

/// Run the sampled search for a single surface described by `closest`
fn sample_segment<F>(p1: Vec3, p2: Vec3, steps: u32, closest: F) -> SegmentClosest
where
    F: Fn(Vec3) -> Vec3,
{
    let steps = steps.max(1);
    let sample = |t: f32| {
        let on_segment = p1 + (p2 - p1) * t;
        let on_surface = closest(on_segment);
        SegmentClosest {
            point_on_segment: on_segment,
            point_on_surface: on_surface,
            distance_squared: on_segment.distance_squared(on_surface),
        }
    };

    let mut best = sample(0.0);
    for i in 1..=steps {
        let candidate = sample(i as f32 / steps as f32);
        // Strict comparison: the first minimal sample wins
        if candidate.distance_squared < best.distance_squared {
            best = candidate;
        }
    }
    best
}

/// Approximate closest points between segment `p1..p2` and an oriented box
pub fn closest_point_segment_obb(p1: Vec3, p2: Vec3, obb: &Obb, steps: u32) -> SegmentClosest {
    sample_segment(p1, p2, steps, |p| obb.closest_point(p))
}

/// Approximate closest points between segment `p1..p2` and a set of triangles
///
/// Every triangle gets the same sampled search; the global minimum across all
/// of them is returned. Degenerate triangles are skipped, and `None` means no
/// usable triangle was found.
pub fn closest_point_segment_triangles<I>(
    p1: Vec3,
    p2: Vec3,
    triangles: I,
    steps: u32,
) -> Option<SegmentClosest>
where
    I: IntoIterator<Item = Triangle>,
{
    let mut best: Option<SegmentClosest> = None;
    for tri in triangles {
        if tri.is_degenerate() {
            continue;
        }
        let candidate = sample_segment(p1, p2, steps, |p| tri.closest_point(p));
        if best.map_or(true, |b| candidate.distance_squared < b.distance_squared) {
            best = Some(candidate);
        }
    }
    best
}

/// Contact between a capsule and a static surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Closest point on the static surface
    pub point: Vec3,
    /// Unit normal pointing from the surface toward the capsule axis
    pub normal: Vec3,
    /// How far the capsule must move along `normal` to just touch (>= 0)
    pub penetration: f32,
}

impl Contact {
    /// Build a contact from a sampled search result
    ///
    /// Returns `None` when the capsule is farther than `radius` from the
    /// surface, or when the two points coincide so no normal can be derived.
    pub fn from_closest(closest: &SegmentClosest, radius: f32) -> Option<Self> {
        if closest.distance_squared > radius * radius {
            return None;
        }
        let normal = (closest.point_on_segment - closest.point_on_surface).try_normalized()?;
        Some(Self {
            point: closest.point_on_surface,
            normal,
            penetration: radius - closest.distance(),
        })
    }

    /// Whether this contact counts as standing on the surface
    #[inline]
    pub fn is_ground(&self, threshold: f32) -> bool {
        self.normal.y > threshold
    }
}
