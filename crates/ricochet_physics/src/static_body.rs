//! Immovable level geometry
//!
//! A static body is either a simple collider, reduced to an oriented box once
//! at registration, or a complex collider that keeps its triangle mesh and
//! world transform for per-triangle tests. Neither changes after creation.

use std::sync::Arc;

use ricochet_math::{Affine3, Vec3};
use slotmap::{new_key_type, SlotMap};

use crate::collision::{closest_point_segment_obb, closest_point_segment_triangles, SegmentClosest};
use crate::error::MeshError;
use crate::raycast::{ray_vs_obb, ray_vs_triangle, Ray, RayHit, RayQuery};
use crate::shapes::{Aabb, Obb, Triangle};

new_key_type! {
    /// Key to a static body in the physics world
    pub struct StaticKey;
}

/// Triangle soup in local space
///
/// Positions are stored as `Vec3`; triangles are either consecutive vertex
/// triples or index triples.
#[derive(Clone, Debug, PartialEq)]
pub struct TriMesh {
    positions: Vec<Vec3>,
    indices: Option<Vec<u32>>,
}

impl TriMesh {
    /// Build a mesh from a flat `[x, y, z, x, y, z, ...]` buffer
    pub fn new(positions: Vec<f32>, indices: Option<Vec<u32>>) -> Result<Self, MeshError> {
        let len = positions.len();
        if len % 3 != 0 {
            return Err(MeshError::PositionsNotTriples(len));
        }
        let positions: &[Vec3] =
            bytemuck::try_cast_slice(&positions).map_err(|_| MeshError::PositionsNotTriples(len))?;
        Self::from_points(positions.to_vec(), indices)
    }

    /// Build a mesh from vertex positions
    pub fn from_points(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }
        match &indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(MeshError::IncompleteTriangle(indices.len()));
                }
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                    return Err(MeshError::IndexOutOfRange {
                        index,
                        vertex_count: positions.len(),
                    });
                }
            }
            None => {
                if positions.len() % 3 != 0 {
                    return Err(MeshError::IncompleteTriangle(positions.len()));
                }
            }
        }
        Ok(Self { positions, indices })
    }

    /// Unit-sized indexed box centered on the origin, scaled to `size`
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 6, 2, 3, 7, 6, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Flat horizontal quad at y = 0, facing up
    pub fn plane(width: f32, depth: f32) -> Self {
        let (w, d) = (width * 0.5, depth * 0.5);
        let positions = vec![
            Vec3::new(-w, 0.0, -d),
            Vec3::new(w, 0.0, -d),
            Vec3::new(w, 0.0, d),
            Vec3::new(-w, 0.0, d),
        ];
        Self {
            positions,
            indices: Some(vec![0, 2, 1, 0, 3, 2]),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Local-space triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let p = &self.positions;
        let count = self.triangle_count();
        (0..count).map(move |i| match &self.indices {
            Some(idx) => Triangle::new(
                p[idx[i * 3] as usize],
                p[idx[i * 3 + 1] as usize],
                p[idx[i * 3 + 2] as usize],
            ),
            None => Triangle::new(p[i * 3], p[i * 3 + 1], p[i * 3 + 2]),
        })
    }

    /// Local-space bounding box
    pub fn local_bounds(&self) -> Aabb {
        // from_points only fails for an empty set, which construction rejects
        Aabb::from_points(self.positions.iter().copied()).unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO))
    }
}

/// The active collision representation of a static body
#[derive(Clone, Debug)]
pub enum StaticShape {
    /// Simple collider reduced to an oriented box
    Obb(Obb),
    /// Complex collider tested per triangle
    Mesh { mesh: Arc<TriMesh>, transform: Affine3 },
}

/// An immovable collider
#[derive(Clone, Debug)]
pub struct StaticBody {
    shape: StaticShape,
    /// World-space bounds, used to skip far-away bodies
    bounds: Aabb,
}

impl StaticBody {
    /// Simple collider: the OBB of `mesh`'s local bounds under `transform`
    pub fn simple(mesh: &TriMesh, transform: &Affine3) -> Self {
        Self::from_obb(Obb::from_local_bounds(&mesh.local_bounds(), transform))
    }

    /// Simple collider from an explicit box
    pub fn from_obb(obb: Obb) -> Self {
        let [ax, ay, az] = obb.axes();
        let h = obb.half_size;
        let extent = (ax * h.x).abs() + (ay * h.y).abs() + (az * h.z).abs();
        Self {
            shape: StaticShape::Obb(obb),
            bounds: Aabb::from_center_half_extents(obb.center, extent),
        }
    }

    /// Axis-aligned box collider
    pub fn cuboid(center: Vec3, size: Vec3) -> Self {
        Self::from_obb(Obb::axis_aligned(center, size * 0.5))
    }

    /// Complex collider: every triangle of `mesh` under `transform`
    pub fn complex(mesh: Arc<TriMesh>, transform: Affine3) -> Self {
        let world_points = mesh.positions().iter().map(|&p| transform.transform_point(p));
        let bounds = Aabb::from_points(world_points).unwrap_or(Aabb::new(
            transform.translation,
            transform.translation,
        ));
        Self {
            shape: StaticShape::Mesh { mesh, transform },
            bounds,
        }
    }

    pub fn shape(&self) -> &StaticShape {
        &self.shape
    }

    /// World-space bounding box
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn obb(&self) -> Option<&Obb> {
        match &self.shape {
            StaticShape::Obb(obb) => Some(obb),
            StaticShape::Mesh { .. } => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.shape, StaticShape::Mesh { .. })
    }

    /// World-space triangles of a complex collider (empty for a box)
    pub fn world_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let mesh = match &self.shape {
            StaticShape::Mesh { mesh, transform } => Some((mesh, transform)),
            StaticShape::Obb(_) => None,
        };
        mesh.into_iter()
            .flat_map(|(mesh, transform)| mesh.triangles().map(move |t| t.transformed(transform)))
    }

    /// Sampled closest points between a capsule axis and this body
    ///
    /// `None` when the body is out of reach (farther than `radius` from the
    /// segment's bounds) or has no usable triangles.
    pub fn closest_to_segment(&self, p1: Vec3, p2: Vec3, radius: f32, steps: u32) -> Option<SegmentClosest> {
        let reach = Aabb::new(p1.min_components(p2), p1.max_components(p2)).expanded(radius);
        if !reach.intersects(&self.bounds) {
            return None;
        }
        match &self.shape {
            StaticShape::Obb(obb) => Some(closest_point_segment_obb(p1, p2, obb, steps)),
            StaticShape::Mesh { .. } => closest_point_segment_triangles(p1, p2, self.world_triangles(), steps),
        }
    }

    /// Nearest ray intersection with this body: distance and surface normal
    pub fn cast_ray(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        match &self.shape {
            StaticShape::Obb(obb) => ray_vs_obb(ray, obb),
            StaticShape::Mesh { .. } => self
                .world_triangles()
                .filter_map(|tri| ray_vs_triangle(ray, &tri))
                .min_by(|a, b| a.0.total_cmp(&b.0)),
        }
    }
}

/// The set of static bodies in a world
#[derive(Clone, Debug, Default)]
pub struct StaticGeometry {
    bodies: SlotMap<StaticKey, StaticBody>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, body: StaticBody) -> StaticKey {
        self.bodies.insert(body)
    }

    pub fn remove(&mut self, key: StaticKey) -> Option<StaticBody> {
        self.bodies.remove(key)
    }

    pub fn get(&self, key: StaticKey) -> Option<&StaticBody> {
        self.bodies.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StaticKey, &StaticBody)> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl RayQuery for StaticGeometry {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        self.bodies
            .iter()
            .filter_map(|(key, body)| {
                body.cast_ray(ray).map(|(distance, normal)| RayHit {
                    distance,
                    point: ray.at(distance),
                    normal,
                    body: key,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
