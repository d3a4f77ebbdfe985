//! Game balance and tuning
//!
//! Every gameplay number lives here so balance can be adjusted from a JSON
//! file without recompiling. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Player movement and weapon tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: i32,
    /// Seconds of invincibility after taking a hit
    pub invincible_duration: f64,
    /// Horizontal acceleration per tick while a direction is held
    pub run_accel: i32,
    pub max_speed_x: i32,
    pub max_speed_y: i32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_velocity: i32,
    /// Upward speed is cut to this once the jump button is released
    pub jump_cutoff: i32,

    pub bullet_speed: i32,
    pub bullet_damage: i32,
    pub bullet_duration: f64,
    pub bullet_succession: f64,

    pub sword_width: i32,
    pub sword_height: i32,
    pub sword_damage: i32,
    /// How long one swing stays active (seconds)
    pub sword_time: f64,
    /// Minimum gap between two swings (seconds)
    pub sword_succession: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 3,
            invincible_duration: 2.0,
            run_accel: 10,
            max_speed_x: 15,
            max_speed_y: 25,
            jump_velocity: -27,
            jump_cutoff: -10,

            bullet_speed: 30,
            bullet_damage: 1,
            bullet_duration: BULLET_DURATION,
            bullet_succession: BULLET_SUCCESSION,

            sword_width: 30,
            sword_height: 10,
            sword_damage: 2,
            sword_time: 0.3,
            sword_succession: 0.7,
        }
    }
}

/// Patrolling enemy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub max_hp: i32,
    /// Contact damage dealt to the player
    pub damage: i32,
    pub invincible_duration: f64,
    pub max_speed_y: i32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_hp: 3,
            damage: 1,
            invincible_duration: 1.0,
            max_speed_y: 25,
        }
    }
}

/// Boss ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub max_hp: i32,
    pub damage: i32,
    pub invincible_duration: f64,
    /// Size in tiles
    pub width_tiles: i32,
    pub height_tiles: i32,
    pub deploy_interval: f64,
    pub deploy_max: u32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            max_hp: 10,
            damage: 1,
            invincible_duration: 2.0,
            width_tiles: 5,
            height_tiles: 3,
            deploy_interval: DEPLOY_INTERVAL,
            deploy_max: DEPLOY_MAX,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: i32,
    pub water_resistance: f64,
    pub air_resistance: f64,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub ship: ShipTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            water_resistance: WATER_RESISTANCE,
            air_resistance: AIR_RESISTANCE,
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            ship: ShipTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON text. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let tuning = Tuning::default();
        assert_eq!(tuning.gravity, 3);
        assert_eq!(tuning.player.bullet_succession, 0.6);
        assert_eq!(tuning.player.bullet_duration, 0.7);
        assert_eq!(tuning.ship.deploy_interval, 8.0);
        assert_eq!(tuning.ship.deploy_max, 20);
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let tuning = Tuning::from_json(r#"{ "gravity": 4, "player": { "max_hp": 5 } }"#).unwrap();
        assert_eq!(tuning.gravity, 4);
        assert_eq!(tuning.player.max_hp, 5);
        assert_eq!(tuning.player.sword_damage, 2);
        assert_eq!(tuning.enemy.max_hp, 3);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Tuning::from_json("{ gravity"), Err(Error::Json(_))));
    }
}
