// Sandbox configuration: defaults, TOML loading and validation

use super::softbody::SoftBodyConfig;
use crate::engine::game_loop::DEFAULT_UPDATE_RATE;
use crate::engine::physics::{
    ensure_mass, ensure_positive, EvictionPolicy, PhysicsError, WorldSettings, DEFAULT_GRAVITY,
    DEFAULT_MAX_TRACKED_BALLS,
};
use glam::Vec2;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] PhysicsError),
}

/// Size of the simulated area; boundaries are placed along its edges
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub substeps: u32,
    pub max_tracked_balls: usize,
    pub eviction: EvictionPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            // Keeps the default lattice (k = 1000, m = 0.1) stable at 144 Hz
            substeps: 4,
            max_tracked_balls: DEFAULT_MAX_TRACKED_BALLS,
            eviction: EvictionPolicy::default(),
        }
    }
}

impl PhysicsConfig {
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            gravity: self.gravity,
            substeps: self.substeps,
            max_tracked_balls: self.max_tracked_balls,
            eviction: self.eviction,
        }
    }
}

/// Balls dropped by `spawn` commands
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    pub radius: f32,
    pub mass: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            radius: 35.0,
            mass: 3.0,
        }
    }
}

/// Complete sandbox configuration
///
/// Every field has a default, so a config file only needs the values it
/// overrides:
///
/// ```toml
/// fps = 120
///
/// [physics]
/// gravity = [0.0, 500.0]
/// eviction = "track-only"
///
/// [soft_body]
/// width = 8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub window: WindowConfig,
    /// Fixed updates per second; each update steps the world by `1 / fps`
    pub fps: u32,
    pub physics: PhysicsConfig,
    pub soft_body: SoftBodyConfig,
    pub spawn: SpawnConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            fps: DEFAULT_UPDATE_RATE,
            physics: PhysicsConfig::default(),
            soft_body: SoftBodyConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        ensure_positive("window width", self.window.width)?;
        ensure_positive("window height", self.window.height)?;
        ensure_positive("spawn radius", self.spawn.radius)?;
        ensure_mass("spawn mass", self.spawn.mass)?;
        if self.fps == 0 {
            return Err(PhysicsError::InvalidConfiguration(
                "fps must be at least 1".to_string(),
            ));
        }
        self.physics.world_settings().validate()?;
        self.soft_body.validate()
    }

    /// Length of one simulation step in seconds
    pub fn time_step(&self) -> f32 {
        1.0 / self.fps as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.window.width, 800.0);
        assert_eq!(config.window.height, 800.0);
        assert_eq!(config.fps, 144);
        assert_abs_diff_eq!(config.time_step(), 1.0 / 144.0);
        assert_eq!(config.physics.gravity, Vec2::new(0.0, 981.0));
        assert_eq!(config.physics.max_tracked_balls, 10);
        assert_eq!(config.physics.eviction, EvictionPolicy::RemoveFromWorld);
        assert_eq!(config.soft_body.anchor, Vec2::new(100.0, 100.0));
        assert_eq!((config.soft_body.width, config.soft_body.height), (5, 5));
        assert_eq!(config.soft_body.rest_length, 25.0);
        assert_eq!(config.soft_body.stiffness, 1000.0);
        assert_eq!(config.soft_body.damping, 1.0);
        assert_eq!(config.spawn.radius, 35.0);
        assert_eq!(config.spawn.mass, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = SimulationConfig::from_toml_str(
            r#"
            fps = 60

            [physics]
            gravity = [0.0, 500.0]
            eviction = "track-only"

            [soft_body]
            width = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.fps, 60);
        assert_eq!(config.physics.gravity, Vec2::new(0.0, 500.0));
        assert_eq!(config.physics.eviction, EvictionPolicy::TrackOnly);
        assert_eq!(config.physics.substeps, 4);
        assert_eq!(config.soft_body.width, 8);
        assert_eq!(config.soft_body.height, 5);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SimulationConfig::from_toml_str("fps = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[physics]\neviction = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("unknown_key = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for toml in [
            "fps = 0",
            "[window]\nwidth = -1.0",
            "[soft_body]\nwidth = 0",
            "[soft_body]\nstiffness = -5.0",
            "[physics]\nsubsteps = 0",
            "[spawn]\nradius = 0.0",
            "[spawn]\nmass = 1e-40",
            "[soft_body]\nball_mass = 1e-40",
        ] {
            assert!(
                matches!(
                    SimulationConfig::from_toml_str(toml),
                    Err(ConfigError::Invalid(PhysicsError::InvalidConfiguration(_)))
                ),
                "accepted {toml:?}"
            );
        }
    }

    #[test]
    fn test_sample_file_matches_defaults() {
        let config = SimulationConfig::from_toml_str(include_str!("../../sandbox.toml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::load("/definitely/not/here/sandbox.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
