//! Game simulation system
//!
//! Owns the physics world and everything that hangs off it, and runs one
//! frame in a fixed order:
//! 1. Register colliders that finished loading
//! 2. Advance shot timers
//! 3. Apply player input (and fire)
//! 4. Step physics, then push the player out of remote players
//! 5. Advance bullets
//! 6. Dead-reckon remote players

use std::path::Path;

use ricochet_core::{
    BodyKey, BodyError, BulletSystem, ClientMessage, ColliderLoader, FrameTimer, KinematicController, LevelError,
    LevelTemplate, MovementState, MuzzleSmoke, PeerId, PhysicsWorld, RemoteEntities, RigidBody, ServerMessage,
    ShootEvent, Shot, TransformSnapshot, Vec3,
};
use ricochet_input::PlayerInput;

use crate::config::AppConfig;

/// Distance in front of the eye where shots and smoke start
const MUZZLE_OFFSET: f32 = 0.6;

/// Runs the client-side simulation for one local player
pub struct SimulationSystem {
    world: PhysicsWorld,
    player: BodyKey,
    controller: KinematicController,
    input: PlayerInput,
    bullets: BulletSystem,
    remotes: RemoteEntities,
    loader: ColliderLoader,
    smoke: MuzzleSmoke,
    shooting: FrameTimer,
    muzzle_flash: FrameTimer,
    local_id: PeerId,
    /// Seconds on the shared clock used for shot timestamps
    time: f64,
    outgoing: Vec<ClientMessage>,
}

impl SimulationSystem {
    /// Build a simulation with the local player at the configured spawn
    ///
    /// `start_time` is the current time in seconds on the clock shared with
    /// other peers (Unix time in practice).
    pub fn new(config: &AppConfig, local_id: PeerId, start_time: f64) -> Result<Self, BodyError> {
        let player = &config.player;
        let body = RigidBody::new(player.height, player.radius, player.mass)?
            .with_position(player.spawn_position())
            .with_damping(player.damping);
        let controller = KinematicController::new(&body)
            .with_move_force(player.move_force)
            .with_jump_force_per_mass(&body, player.jump_force_per_mass)
            .with_crouch_height(&body, player.crouch_fraction * body.standing_cylinder_height())?;

        let mut world = PhysicsWorld::with_config(config.physics.to_physics_config());
        let player_key = world.add_rigid_body(body);

        Ok(Self {
            world,
            player: player_key,
            controller,
            input: PlayerInput::new().with_mouse_sensitivity(player.mouse_sensitivity),
            bullets: BulletSystem::new(config.bullets.to_bullet_config()),
            remotes: RemoteEntities::new().with_local_id(local_id.clone()),
            loader: ColliderLoader::new(),
            smoke: MuzzleSmoke::default(),
            shooting: FrameTimer::new(config.timers.shot_cooldown),
            muzzle_flash: FrameTimer::new(config.timers.muzzle_flash),
            local_id,
            time: start_time,
            outgoing: Vec::new(),
        })
    }

    /// Register a level's colliders and move the player to its spawn
    ///
    /// File-backed meshes are handed to the background loader and start
    /// colliding once a later frame picks them up.
    pub fn load_level(&mut self, level: &LevelTemplate, base_dir: &Path) -> Result<(), LevelError> {
        let instance = level.instantiate(&mut self.world, base_dir)?;
        for pending in instance.pending {
            self.loader.load_async(pending);
        }
        if let Some(spawn) = instance.spawn {
            if let Some(body) = self.world.get_body_mut(self.player) {
                body.set_position(spawn);
                body.velocity = Vec3::ZERO;
            }
        }
        log::info!(
            "Loaded level '{}': {} colliders, {} loading",
            level.name,
            instance.statics.len(),
            self.loader.in_flight()
        );
        Ok(())
    }

    /// Run one frame of `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        for loaded in self.loader.poll_all() {
            match loaded.result {
                Ok(body) => {
                    self.world.add_static_body(body);
                }
                Err(e) => log::warn!("Collider '{}' failed to load: {}", loaded.name, e),
            }
        }

        self.shooting.tick(dt);
        self.muzzle_flash.tick(dt);

        let input = self.input.move_input();
        self.world.drive_body(self.player, &mut self.controller, &input);
        if self.input.consume_fire() && !self.shooting.is_active() {
            self.shoot();
        }

        self.world.update(dt);
        if let Some(body) = self.world.get_body_mut(self.player) {
            self.remotes.separate(body, dt);
        }
        self.bullets.update(dt, &self.world);
        self.remotes.update(dt);

        self.time += dt as f64;
        if let Some(snapshot) = self.local_snapshot() {
            self.outgoing.push(ClientMessage::TransformUpdate(snapshot));
        }
    }

    /// Fire from the player's eye along the view direction
    ///
    /// Spawns a local bullet and a smoke burst, raises the shooting and
    /// muzzle-flash flags, and queues the shot for the relay. Returns
    /// whether a bullet was spawned.
    pub fn shoot(&mut self) -> bool {
        let Some(body) = self.world.get_body(self.player) else {
            return false;
        };
        let forward = self.input.forward_vector();
        let muzzle = body.end() + forward * MUZZLE_OFFSET;

        let shot = Shot {
            origin: muzzle,
            direction: forward.planar(),
            timestamp: self.time,
            owner: self.local_id.clone(),
        };
        if self.bullets.spawn(&shot, self.time, &self.world).is_none() {
            return false;
        }

        let burst = self.smoke.burst(muzzle, forward);
        self.world.add_particle_system(burst);
        self.shooting.start();
        self.muzzle_flash.start();

        self.outgoing.push(ClientMessage::Shoot(ShootEvent {
            player_id: self.local_id.clone(),
            position: muzzle.to_array(),
            direction: shot.direction.to_array(),
            time: self.time * 1000.0,
        }));
        true
    }

    /// Apply a message from the relay
    pub fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Update(update) => self.remotes.apply_world_update(&update),
            ServerMessage::AddEnemy(joined) => {
                self.remotes.add(joined.id);
            }
            ServerMessage::RemovePlayer(id) => {
                self.remotes.remove(&id);
            }
            ServerMessage::Shoot(event) => {
                if event.player_id == self.local_id {
                    return;
                }
                self.bullets.spawn(&event.to_shot(), self.time, &self.world);
            }
        }
    }

    /// Decode and apply a raw relay message; malformed text is logged and dropped
    pub fn handle_text(&mut self, text: &str) {
        match ServerMessage::decode(text) {
            Ok(message) => self.handle_message(message),
            Err(e) => log::warn!("Dropping relay message: {}", e),
        }
    }

    /// Take the messages queued for the relay since the last call
    pub fn drain_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    fn local_snapshot(&self) -> Option<TransformSnapshot> {
        let body = self.world.get_body(self.player)?;
        Some(TransformSnapshot {
            position: body.position(),
            velocity: body.velocity.planar(),
            movement: self.movement_state(),
            aiming: self.input.is_aiming(),
            yaw: self.input.yaw(),
        })
    }

    /// Animation state reported to peers: forward runs, any other direction walks
    pub fn movement_state(&self) -> MovementState {
        if self.input.is_forward_held() {
            MovementState::Run
        } else if self.input.is_moving() {
            MovementState::Walk
        } else {
            MovementState::Idle
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn player(&self) -> Option<&RigidBody> {
        self.world.get_body(self.player)
    }

    pub fn controller(&self) -> &KinematicController {
        &self.controller
    }

    pub fn input_mut(&mut self) -> &mut PlayerInput {
        &mut self.input
    }

    pub fn bullets(&self) -> &BulletSystem {
        &self.bullets
    }

    pub fn remotes(&self) -> &RemoteEntities {
        &self.remotes
    }

    /// Whether the post-shot cooldown is running
    pub fn is_shooting(&self) -> bool {
        self.shooting.is_active()
    }

    pub fn is_muzzle_flash_visible(&self) -> bool {
        self.muzzle_flash.is_active()
    }

    /// Collider files still loading
    pub fn colliders_loading(&self) -> usize {
        self.loader.in_flight()
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}
