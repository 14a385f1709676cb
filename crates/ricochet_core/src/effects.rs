//! Cosmetic shot effects

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ricochet_math::Vec3;
use ricochet_physics::ParticleSystem;

/// Particles per muzzle-smoke burst
pub const MUZZLE_SMOKE_PARTICLES: usize = 100;

/// Length of the smoke plume along the barrel
const PLUME_LENGTH: f32 = 1.5;

/// Plume radius at the muzzle
const PLUME_RADIUS: f32 = 0.1;

const JITTER: f32 = 0.05;

/// Builds smoke bursts at a gun's muzzle
///
/// Seeded so bursts are reproducible.
#[derive(Clone, Debug)]
pub struct MuzzleSmoke {
    rng: ChaCha8Rng,
}

impl MuzzleSmoke {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A cone of particles starting at `muzzle` and trailing along `direction`
    ///
    /// Particles near the muzzle are hot orange, the rest fade to grey. Each
    /// particle gets an outward push away from the plume axis.
    pub fn burst(&mut self, muzzle: Vec3, direction: Vec3) -> ParticleSystem {
        let forward = direction.try_normalized().unwrap_or(Vec3::X);
        let right = Vec3::new(forward.z, 0.0, -forward.x)
            .try_normalized()
            .unwrap_or(Vec3::Z);
        let up = forward.cross(right).normalized();

        let mut system = ParticleSystem::new(MUZZLE_SMOKE_PARTICLES);
        for i in 0..MUZZLE_SMOKE_PARTICLES {
            let t: f32 = self.rng.gen::<f32>().powi(3);
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = (1.0 - t) * PLUME_RADIUS;
            let radial = right * (angle.cos() * radius) + up * (angle.sin() * radius);

            let jitter = Vec3::new(
                self.rng.gen_range(-0.5..0.5),
                self.rng.gen_range(-0.5..0.5),
                self.rng.gen_range(-0.5..0.5),
            ) * JITTER;
            let position = muzzle + forward * (t * PLUME_LENGTH) + radial + jitter;

            let color = if t < 0.2 {
                [1.0 - t * 5.0, 0.2 - t * 2.0, 0.0]
            } else {
                [1.0 - t; 3]
            };
            system.set_particle(i, position, color);
            system.apply_force(i, radial);
        }
        system
    }
}

impl Default for MuzzleSmoke {
    fn default() -> Self {
        Self::new(0)
    }
}
