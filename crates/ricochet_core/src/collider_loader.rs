//! Background collider loading
//!
//! The [`ColliderLoader`] owns a worker thread that reads mesh files and
//! builds static bodies from them. Results come back over a channel; the
//! frame loop polls between ticks and registers whatever has finished. A
//! collider that is still loading simply does not collide yet.

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

use ricochet_physics::StaticBody;

use crate::level::{build_static_body, LevelError, MeshData, PendingCollider};

/// Result of a background collider load
pub struct LoadResult {
    /// Name of the collider in the level file
    pub name: String,
    /// The built body or the reason it could not be built
    pub result: Result<StaticBody, LevelError>,
}

fn load_collider(request: &PendingCollider) -> Result<StaticBody, LevelError> {
    let data = MeshData::load(&request.path)?;
    let mesh = data.to_mesh().map_err(|source| LevelError::Geometry {
        collider: request.name.clone(),
        source,
    })?;
    Ok(build_static_body(mesh, &request.transform, request.complex))
}

/// Background mesh loader using a dedicated worker thread
pub struct ColliderLoader {
    sender: Sender<PendingCollider>,
    receiver: Receiver<LoadResult>,
    in_flight: usize,
}

impl ColliderLoader {
    /// Create a loader; the worker runs until the loader is dropped
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel::<PendingCollider>();
        let (result_tx, result_rx) = channel::<LoadResult>();

        thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let result = LoadResult {
                    name: request.name.clone(),
                    result: load_collider(&request),
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            sender: request_tx,
            receiver: result_rx,
            in_flight: 0,
        }
    }

    /// Queue a collider for loading
    pub fn load_async(&mut self, request: PendingCollider) {
        log::debug!("Loading collider '{}' from {}", request.name, request.path.display());
        if self.sender.send(request).is_ok() {
            self.in_flight += 1;
        } else {
            log::warn!("Collider loader worker has exited");
        }
    }

    /// Take one finished load, if any (non-blocking)
    pub fn poll(&mut self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(result)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every finished load (non-blocking)
    pub fn poll_all(&mut self) -> Vec<LoadResult> {
        std::iter::from_fn(|| self.poll()).collect()
    }

    /// Requests submitted but not yet polled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Default for ColliderLoader {
    fn default() -> Self {
        Self::new()
    }
}
