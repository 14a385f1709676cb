//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`RICOCHET_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use ricochet_core::{BulletConfig, PhysicsConfig, Vec3};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation constants
    #[serde(default)]
    pub physics: PhysicsSection,
    /// Local player body and controller tuning
    #[serde(default)]
    pub player: PlayerSection,
    /// Projectile tuning
    #[serde(default)]
    pub bullets: BulletSection,
    /// Level to load at startup
    #[serde(default)]
    pub level: LevelSection,
    /// Shot-related countdowns
    #[serde(default)]
    pub timers: TimerSection,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugSection,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`RICOCHET_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // RICOCHET_BULLETS__SPEED=25 -> bullets.speed = 25.0
        figment = figment.merge(Env::prefixed("RICOCHET_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSection {
    /// Gravitational acceleration (positive = downward)
    pub gravity: f32,
    /// Fixed substeps per frame
    pub substeps: u32,
    /// Samples along the capsule axis for narrow-phase queries
    pub segment_samples: u32,
    /// Minimum contact normal Y that counts as ground
    pub ground_normal_threshold: f32,
}

impl Default for PhysicsSection {
    fn default() -> Self {
        let defaults = PhysicsConfig::default();
        Self {
            gravity: defaults.gravity,
            substeps: defaults.substeps,
            segment_samples: defaults.segment_samples,
            ground_normal_threshold: defaults.ground_normal_threshold,
        }
    }
}

impl PhysicsSection {
    /// Convert to the physics crate's configuration
    pub fn to_physics_config(&self) -> PhysicsConfig {
        PhysicsConfig {
            gravity: self.gravity,
            substeps: self.substeps,
            segment_samples: self.segment_samples,
            ground_normal_threshold: self.ground_normal_threshold,
        }
    }
}

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// Total capsule height
    pub height: f32,
    pub radius: f32,
    pub mass: f32,
    /// Horizontal velocity lost per substep while grounded
    pub damping: f32,
    pub move_force: f32,
    /// Jump impulse per unit of mass
    pub jump_force_per_mass: f32,
    /// Crouched axis length as a fraction of the standing one
    pub crouch_fraction: f32,
    /// Used when the level has no spawn point [x, y, z]
    pub spawn: [f32; 3],
    /// Mouse sensitivity (radians per pixel)
    pub mouse_sensitivity: f32,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            height: 2.0,
            radius: 0.5,
            mass: 90.0,
            damping: 0.02,
            move_force: 1000.0,
            jump_force_per_mass: 4.0,
            crouch_fraction: 0.25,
            spawn: [0.0, 1.0, 0.0],
            mouse_sensitivity: 0.002,
        }
    }
}

impl PlayerSection {
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from_array(self.spawn)
    }
}

/// Bullet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletSection {
    /// Horizontal speed in units per second
    pub speed: f32,
    pub max_bounces: u32,
    /// Frames before an unobstructed bullet is dropped
    pub lifetime_frames: u32,
    /// Trajectory raycast length
    pub max_range: f32,
}

impl Default for BulletSection {
    fn default() -> Self {
        let defaults = BulletConfig::default();
        Self {
            speed: defaults.speed,
            max_bounces: defaults.max_bounces,
            lifetime_frames: defaults.lifetime_frames,
            max_range: defaults.max_range,
        }
    }
}

impl BulletSection {
    /// Convert to the bullet system's configuration
    pub fn to_bullet_config(&self) -> BulletConfig {
        BulletConfig {
            speed: self.speed,
            max_bounces: self.max_bounces,
            lifetime_frames: self.lifetime_frames,
            max_range: self.max_range,
        }
    }
}

/// Level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSection {
    /// Path to the RON level file
    pub path: String,
}

impl Default for LevelSection {
    fn default() -> Self {
        Self {
            path: "levels/arena.ron".to_string(),
        }
    }
}

/// Timer configuration, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSection {
    /// How long the shooting flag stays raised after a shot
    pub shot_cooldown: f32,
    pub muzzle_flash: f32,
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            shot_cooldown: 0.3,
            muzzle_flash: 0.1,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSection {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
