//! Remote players
//!
//! Snapshots from the relay overwrite a remote player's state outright (the
//! last update wins). Between snapshots the horizontal position is
//! extrapolated from the last known planar velocity.

use std::collections::HashMap;

use ricochet_math::{Vec2, Vec3};
use ricochet_physics::RigidBody;

use crate::net::{MovementState, PeerId, TransformSnapshot, WorldUpdate};

/// Push passes per frame when the local player overlaps a remote one
pub const SEPARATION_PASSES: usize = 5;

/// Last known state of another player
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteEntity {
    pub position: Vec3,
    /// Horizontal velocity (x, z)
    pub velocity: Vec2,
    pub movement: MovementState,
    pub aiming: bool,
    pub yaw: f32,
}

impl RemoteEntity {
    /// Overwrite with a received snapshot
    pub fn apply_snapshot(&mut self, snapshot: &TransformSnapshot) {
        self.position = snapshot.position;
        self.velocity = snapshot.velocity;
        self.movement = snapshot.movement;
        self.aiming = snapshot.aiming;
        self.yaw = snapshot.yaw;
    }

    /// Animation clip matching the movement and aim state, e.g. `walk_rifle_ads`
    pub fn animation_key(&self) -> String {
        let suffix = if self.aiming { "_ads" } else { "" };
        format!("{}_rifle{}", self.movement.as_str(), suffix)
    }
}

/// All remote players known to this client
#[derive(Clone, Debug, Default)]
pub struct RemoteEntities {
    entities: HashMap<PeerId, RemoteEntity>,
    /// This client's own id; snapshots for it are ignored
    local: Option<PeerId>,
}

impl RemoteEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore any traffic addressed as coming from `id`
    pub fn with_local_id(mut self, id: PeerId) -> Self {
        self.local = Some(id);
        self
    }

    fn is_local(&self, id: &PeerId) -> bool {
        self.local.as_ref() == Some(id)
    }

    /// Track a peer; returns `false` if it is already known or is us
    pub fn add(&mut self, id: PeerId) -> bool {
        if self.is_local(&id) || self.entities.contains_key(&id) {
            return false;
        }
        log::debug!("Remote player {} joined", id);
        self.entities.insert(id, RemoteEntity::default());
        true
    }

    /// Forget a peer; returns whether it was known
    pub fn remove(&mut self, id: &PeerId) -> bool {
        let removed = self.entities.remove(id).is_some();
        if removed {
            log::debug!("Remote player {} left", id);
        }
        removed
    }

    /// Apply one snapshot, adding the peer if it is new
    pub fn apply_snapshot(&mut self, id: &PeerId, snapshot: &TransformSnapshot) {
        if self.is_local(id) {
            return;
        }
        self.entities.entry(id.clone()).or_default().apply_snapshot(snapshot);
    }

    /// Apply every snapshot in a world update
    pub fn apply_world_update(&mut self, update: &WorldUpdate) {
        for (id, snapshot) in update {
            self.apply_snapshot(id, snapshot);
        }
    }

    /// Dead-reckon every remote player forward by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for entity in self.entities.values_mut() {
            entity.position.x += entity.velocity.x * dt;
            entity.position.z += entity.velocity.y * dt;
        }
    }

    /// Push a local body away from any remote player it overlaps
    ///
    /// A remote player overlaps when its position is closer than two body
    /// radii. Each of the `SEPARATION_PASSES` passes moves the body `dt` units
    /// horizontally away from every overlapping player, so separation is
    /// gradual rather than a hard snap. Players stacked exactly above or
    /// below have no horizontal direction and are skipped. Returns the number
    /// of pushes applied.
    pub fn separate(&self, body: &mut RigidBody, dt: f32) -> usize {
        let reach = 2.0 * body.radius();
        let mut pushes = 0;
        for _ in 0..SEPARATION_PASSES {
            for entity in self.entities.values() {
                let offset = body.position() - entity.position;
                if offset.length() >= reach {
                    continue;
                }
                let Some(away) = offset.planar().try_normalized() else {
                    continue;
                };
                body.apply_correction(Vec3::from_planar(away, 0.0) * dt);
                pushes += 1;
            }
        }
        pushes
    }

    pub fn get(&self, id: &PeerId) -> Option<&RemoteEntity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeerId, &RemoteEntity)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
