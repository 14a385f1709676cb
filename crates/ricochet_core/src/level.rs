//! Level files
//!
//! A level is a RON document listing static colliders. Each collider has a
//! transform and one of three geometry sources: a box, inline triangle data,
//! or a mesh file that is loaded in the background.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ricochet_math::{Affine3, Vec3};
use ricochet_physics::{MeshError, PhysicsWorld, StaticBody, StaticKey, TriMesh};
use serde::{Deserialize, Serialize};

use crate::transform::Transform3;

/// Raw triangle data as stored in level and mesh files
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Flat `[x, y, z, ...]` vertex positions
    pub positions: Vec<f32>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn to_mesh(&self) -> Result<TriMesh, MeshError> {
        TriMesh::new(self.positions.clone(), self.indices.clone())
    }

    /// Load a mesh file (RON-encoded `MeshData`)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }
}

/// Where a collider's geometry comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColliderSource {
    /// Unit-centred box of the given size
    Box { size: Vec3 },
    /// Inline triangle data
    Mesh(MeshData),
    /// Mesh file, resolved relative to the level file
    File(String),
}

/// A static collider entry in a level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderTemplate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transform: Transform3,
    pub source: ColliderSource,
    /// Per-triangle collision instead of a bounding box
    #[serde(default)]
    pub complex: bool,
}

impl ColliderTemplate {
    /// Box collider at `position`
    pub fn cuboid(position: Vec3, size: Vec3) -> Self {
        Self {
            name: None,
            transform: Transform3::from_position(position),
            source: ColliderSource::Box { size },
            complex: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Build a static body from loaded geometry
pub fn build_static_body(mesh: TriMesh, transform: &Affine3, complex: bool) -> StaticBody {
    if complex {
        StaticBody::complex(Arc::new(mesh), *transform)
    } else {
        StaticBody::simple(&mesh, transform)
    }
}

/// A mesh file still to be loaded
#[derive(Clone, Debug, PartialEq)]
pub struct PendingCollider {
    pub name: String,
    pub path: PathBuf,
    pub transform: Affine3,
    pub complex: bool,
}

/// What instantiating a level produced
#[derive(Clone, Debug, Default)]
pub struct LevelInstance {
    /// Colliders registered immediately
    pub statics: Vec<StaticKey>,
    /// Colliders waiting on a mesh file
    pub pending: Vec<PendingCollider>,
    pub spawn: Option<Vec3>,
}

/// A serializable level
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTemplate {
    pub name: String,
    #[serde(default)]
    pub colliders: Vec<ColliderTemplate>,
    #[serde(default)]
    pub spawn: Option<Vec3>,
}

impl LevelTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_collider(mut self, collider: ColliderTemplate) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_spawn(mut self, spawn: Vec3) -> Self {
        self.spawn = Some(spawn);
        self
    }

    /// Load a level from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Save a level to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LevelError> {
        let pretty = ron::ser::PrettyConfig::new().struct_names(true);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Register this level's colliders with a world
    ///
    /// Boxes and inline meshes are registered now; file-backed meshes are
    /// returned as pending, with paths resolved against `base_dir`. Invalid
    /// inline geometry aborts before anything is registered.
    pub fn instantiate(&self, world: &mut PhysicsWorld, base_dir: &Path) -> Result<LevelInstance, LevelError> {
        let mut ready = Vec::new();
        let mut pending = Vec::new();

        for collider in &self.colliders {
            let transform = collider.transform.to_affine();
            match &collider.source {
                ColliderSource::Box { size } => {
                    ready.push(build_static_body(TriMesh::cuboid(*size), &transform, collider.complex));
                }
                ColliderSource::Mesh(data) => {
                    let mesh = data.to_mesh().map_err(|source| LevelError::Geometry {
                        collider: collider.display_name().to_string(),
                        source,
                    })?;
                    ready.push(build_static_body(mesh, &transform, collider.complex));
                }
                ColliderSource::File(path) => pending.push(PendingCollider {
                    name: collider.display_name().to_string(),
                    path: base_dir.join(path),
                    transform,
                    complex: collider.complex,
                }),
            }
        }

        let statics = ready.into_iter().map(|body| world.add_static_body(body)).collect::<Vec<_>>();
        log::debug!(
            "Instantiated level '{}': {} colliders ready, {} loading",
            self.name,
            statics.len(),
            pending.len()
        );
        Ok(LevelInstance {
            statics,
            pending,
            spawn: self.spawn,
        })
    }
}

/// Error loading, saving or instantiating a level
#[derive(Debug)]
pub enum LevelError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// A collider's triangle data is malformed
    Geometry { collider: String, source: MeshError },
}

impl From<io::Error> for LevelError {
    fn from(e: io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::Parse(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::Serialize(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "IO error: {}", e),
            LevelError::Parse(e) => write!(f, "Parse error: {}", e),
            LevelError::Serialize(e) => write!(f, "Serialize error: {}", e),
            LevelError::Geometry { collider, source } => {
                write!(f, "Invalid geometry in collider '{}': {}", collider, source)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            LevelError::Parse(e) => Some(e),
            LevelError::Serialize(e) => Some(e),
            LevelError::Geometry { source, .. } => Some(source),
        }
    }
}
