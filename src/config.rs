//! World and game configuration.
//!
//! `WorldConfig` uses the same camelCase JSON shape the village config
//! endpoint served, so an old payload saved to disk loads unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DemoError, Result};

/// Settings for one generated village world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldConfig {
    /// Master seed for every generation system.
    pub seed: u64,
    /// Edge length of the square world in world units.
    pub world_size: f32,
    /// Maximum number of houses to place.
    pub house_count: usize,
    /// Maximum number of trees to place.
    pub tree_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 123,
            world_size: 600.0,
            house_count: 400,
            tree_count: 1500,
        }
    }
}

impl WorldConfig {
    /// Load and validate a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(DemoError::ConfigRead)?;
        Self::from_json(&text)
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(text).map_err(DemoError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded world config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "Config unavailable, using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.world_size.is_finite() || self.world_size <= 0.0 {
            return Err(DemoError::InvalidConfig(format!(
                "worldSize must be a positive number, got {}",
                self.world_size
            )));
        }
        Ok(())
    }

    pub fn half_size(&self) -> f32 {
        self.world_size / 2.0
    }
}

/// Constants for the neon race game.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceTuning {
    /// Speed set on start (units per second).
    pub start_speed: f32,
    /// Speed gained per second of play.
    pub acceleration: f32,
    /// Half-width of the lane the ship and obstacles live in.
    pub lateral_range: f32,
    /// Fraction of the remaining distance to the target covered each frame.
    pub steering_lerp: f32,
    /// Roll per unit of lateral offset from the target.
    pub tilt_factor: f32,
    /// Z at which obstacles appear.
    pub spawn_z: f32,
    /// Obstacles past this Z are removed.
    pub despawn_z: f32,
    /// Obstacles with `collision_z_min < z < collision_z_max` can hit the ship.
    pub collision_z_min: f32,
    pub collision_z_max: f32,
    /// Maximum |dx| between ship and obstacle that counts as a hit.
    pub collision_half_width: f32,
    /// Per-frame spawn chance at zero speed.
    pub spawn_base_chance: f32,
    /// Extra per-frame spawn chance per unit of speed.
    pub spawn_speed_chance: f32,
    /// Obstacle height range.
    pub obstacle_height_min: f32,
    pub obstacle_height_max: f32,
    /// Simulation step per frame in seconds.
    pub frame_delta: f32,
    /// Multiplier applied to speed for the HUD readout.
    pub speed_display_factor: f32,
    /// Floor offset wraps back to zero past this value.
    pub floor_wrap: f32,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            start_speed: 40.0,
            acceleration: 1.5,
            lateral_range: 10.0,
            steering_lerp: 0.15,
            tilt_factor: 0.08,
            spawn_z: -100.0,
            despawn_z: 10.0,
            collision_z_min: 0.0,
            collision_z_max: 2.0,
            collision_half_width: 1.0,
            spawn_base_chance: 0.05,
            spawn_speed_chance: 0.0005,
            obstacle_height_min: 1.0,
            obstacle_height_max: 4.0,
            frame_delta: 0.016,
            speed_display_factor: 3.0,
            floor_wrap: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_server_payload() {
        let json = r#"{"seed": 4242, "worldSize": 600, "houseCount": 400, "treeCount": 1500}"#;
        let config = WorldConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 4242);
        assert_eq!(config.world_size, 600.0);
        assert_eq!(config.house_count, 400);
        assert_eq!(config.tree_count, 1500);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = WorldConfig::from_json(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.world_size, 600.0);
        assert_eq!(config.tree_count, 1500);
    }

    #[test]
    fn test_rejects_nonpositive_world_size() {
        let err = WorldConfig::from_json(r#"{"worldSize": 0}"#).unwrap_err();
        assert!(matches!(err, DemoError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = WorldConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DemoError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = Path::new("/definitely/not/here/world.json");
        assert_eq!(WorldConfig::load_or_default(Some(path)), WorldConfig::default());
        assert_eq!(WorldConfig::load_or_default(None), WorldConfig::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&WorldConfig::default()).unwrap();
        assert!(json.contains("\"worldSize\""));
        assert!(json.contains("\"houseCount\""));
        assert!(json.contains("\"treeCount\""));
    }
}
