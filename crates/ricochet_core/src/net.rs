//! Network message contracts
//!
//! Messages are JSON documents relayed between clients. Each carries an
//! event name and a payload:
//!
//! ```text
//! {"event": "update", "data": {"<peer>": [[x, y, z], [vx, vz], ["walk", false], yaw]}}
//! {"event": "shoot", "data": {"playerId": "<peer>", "position": [..], "direction": [..], "time": 1700000000000}}
//! ```
//!
//! Transform snapshots travel as compact arrays. The relay may strip the
//! animation state and yaw, so a two-element snapshot is accepted too.

use std::collections::HashMap;
use std::fmt;

use ricochet_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::bullets::Shot;

/// Identifier of a connected client
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Locomotion state used to pick a remote player's animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementState {
    #[default]
    Idle,
    Walk,
    Run,
}

impl MovementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementState::Idle => "idle",
            MovementState::Walk => "walk",
            MovementState::Run => "run",
        }
    }
}

/// One peer's transform as sent over the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotRepr", into = "SnapshotRepr")]
pub struct TransformSnapshot {
    pub position: Vec3,
    /// Horizontal velocity (x, z)
    pub velocity: Vec2,
    pub movement: MovementState,
    pub aiming: bool,
    /// Rotation around the vertical axis (radians)
    pub yaw: f32,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum SnapshotRepr {
    Full([f32; 3], [f32; 2], (MovementState, bool), f32),
    Partial([f32; 3], [f32; 2]),
}

impl From<SnapshotRepr> for TransformSnapshot {
    fn from(repr: SnapshotRepr) -> Self {
        match repr {
            SnapshotRepr::Full(position, velocity, (movement, aiming), yaw) => Self {
                position: Vec3::from_array(position),
                velocity: Vec2::from_array(velocity),
                movement,
                aiming,
                yaw,
            },
            SnapshotRepr::Partial(position, velocity) => Self {
                position: Vec3::from_array(position),
                velocity: Vec2::from_array(velocity),
                ..Self::default()
            },
        }
    }
}

impl From<TransformSnapshot> for SnapshotRepr {
    fn from(s: TransformSnapshot) -> Self {
        SnapshotRepr::Full(
            s.position.to_array(),
            s.velocity.to_array(),
            (s.movement, s.aiming),
            s.yaw,
        )
    }
}

/// Snapshots of every other peer, keyed by peer id
pub type WorldUpdate = HashMap<PeerId, TransformSnapshot>;

/// A peer fired a shot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootEvent {
    pub player_id: PeerId,
    pub position: [f32; 3],
    /// Horizontal direction (x, z)
    pub direction: [f32; 2],
    /// Wall-clock time of the shot in milliseconds since the Unix epoch
    pub time: f64,
}

impl ShootEvent {
    /// Bullet spawn request for this shot (timestamp converted to seconds)
    pub fn to_shot(&self) -> Shot {
        Shot {
            origin: Vec3::from_array(self.position),
            direction: Vec2::from_array(self.direction),
            timestamp: self.time / 1000.0,
            owner: self.player_id.clone(),
        }
    }
}

/// Payload announcing a peer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerJoined {
    pub id: PeerId,
}

/// Messages the relay sends to a client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    Update(WorldUpdate),
    AddEnemy(PeerJoined),
    RemovePlayer(PeerId),
    Shoot(ShootEvent),
}

/// Messages a client sends to the relay
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    TransformUpdate(TransformSnapshot),
    Shoot(ShootEvent),
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Error decoding or encoding a network message
#[derive(Debug)]
pub enum MessageError {
    Json(serde_json::Error),
}

impl From<serde_json::Error> for MessageError {
    fn from(e: serde_json::Error) -> Self {
        MessageError::Json(e)
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::Json(e) => write!(f, "Malformed message: {}", e),
        }
    }
}

impl std::error::Error for MessageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MessageError::Json(e) => Some(e),
        }
    }
}
