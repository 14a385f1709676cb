//! Cosmetic particle bursts
//!
//! A [`ParticleSystem`] is a fixed-size batch of point particles that share
//! one opacity. Forces accumulate per particle and are consumed by the next
//! update; the whole batch fades out and is flagged dead once invisible.

use ricochet_math::Vec3;
use slotmap::new_key_type;

new_key_type! {
    /// Key to a particle system in the physics world
    pub struct ParticleKey;
}

/// Default opacity fade rate (per second)
pub const DEFAULT_FADE_RATE: f32 = 10.0;

/// Opacity below which a system counts as dead
pub const DEAD_OPACITY: f32 = 0.01;

/// Initial opacity of a new system
pub const INITIAL_OPACITY: f32 = 0.8;

/// Point particles with shared opacity
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    accelerations: Vec<Vec3>,
    colors: Vec<[f32; 3]>,
    opacity: f32,
    /// Fraction of the remaining opacity removed per second
    pub fade_rate: f32,
    dead: bool,
}

impl ParticleSystem {
    /// `count` particles at the origin, magenta, at rest
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            velocities: vec![Vec3::ZERO; count],
            accelerations: vec![Vec3::ZERO; count],
            colors: vec![[1.0, 0.0, 1.0]; count],
            opacity: INITIAL_OPACITY,
            fade_rate: DEFAULT_FADE_RATE,
            dead: false,
        }
    }

    pub fn with_fade_rate(mut self, fade_rate: f32) -> Self {
        self.fade_rate = fade_rate;
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Place particle `i` and set its color; out-of-range indices are ignored
    pub fn set_particle(&mut self, i: usize, position: Vec3, color: [f32; 3]) {
        if let (Some(p), Some(c)) = (self.positions.get_mut(i), self.colors.get_mut(i)) {
            *p = position;
            *c = color;
        }
    }

    pub fn set_velocity(&mut self, i: usize, velocity: Vec3) {
        if let Some(v) = self.velocities.get_mut(i) {
            *v = velocity;
        }
    }

    /// Accumulate acceleration on particle `i` for the next update
    pub fn apply_force(&mut self, i: usize, force: Vec3) {
        if let Some(a) = self.accelerations.get_mut(i) {
            *a += force;
        }
    }

    /// Accumulate the same acceleration on every particle
    pub fn apply_global_force(&mut self, force: Vec3) {
        for a in &mut self.accelerations {
            *a += force;
        }
    }

    /// Integrate all particles and fade the batch
    pub fn update(&mut self, dt: f32) {
        for ((p, v), a) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.accelerations.iter_mut())
        {
            *v += *a * dt;
            *p += *v * dt;
            *a = Vec3::ZERO;
        }

        let factor = (self.fade_rate * dt).clamp(0.0, 1.0);
        self.opacity += (0.0 - self.opacity) * factor;
        if self.opacity <= DEAD_OPACITY {
            self.dead = true;
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the batch has faded out and can be dropped
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}
