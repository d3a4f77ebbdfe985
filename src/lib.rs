//! Hillside - A side-scrolling tile platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, tile collisions, combat, stage loop)
//! - `stage_table`: Parser for the textual stage table
//! - `progress`: Lives/coins/gems and cleared stages carried between attempts
//! - `tuning`: Data-driven game balance
//! - `error`: Crate error type

pub mod error;
pub mod progress;
pub mod sim;
pub mod stage_table;
pub mod tuning;

pub use error::{Error, Result};
pub use progress::Progress;
pub use stage_table::StageTable;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Edge length of one grid tile in pixels. Every actor except the ship is one tile.
    pub const TILE_SIZE: i32 = 50;

    /// Fixed simulation timestep used by the headless runner (10 Hz)
    pub const SIM_DT: f64 = 0.1;

    /// Downward acceleration, pixels/tick²
    pub const GRAVITY: i32 = 3;
    /// Velocity scale applied every tick while swimming
    pub const WATER_RESISTANCE: f64 = 0.5;
    /// Horizontal velocity scale applied every tick while dry
    pub const AIR_RESISTANCE: f64 = 0.9;

    /// Minimum wall-clock gap between two shots (seconds)
    pub const BULLET_SUCCESSION: f64 = 0.6;
    /// Bullet lifetime measured from the moment it was fired (seconds)
    pub const BULLET_DURATION: f64 = 0.7;

    /// Seconds between two ship deployments
    pub const DEPLOY_INTERVAL: f64 = 8.0;
    /// Enemies one ship may deploy per room
    pub const DEPLOY_MAX: u32 = 20;

    /// Lives are capped one below this
    pub const LIFE_MAX: u32 = 100;
    /// Coins that trade for an extra life
    pub const COIN_MAX: u32 = 100;
    /// Gems that trade for an extra life
    pub const GEM_MAX: u32 = 10;
    /// Lives granted on a fresh save or after losing every life
    pub const STARTING_LIVES: u32 = 5;
}

/// Tile index containing pixel coordinate `px` (floor division)
#[inline]
pub fn tile_of(px: i32) -> i32 {
    px.div_euclid(consts::TILE_SIZE)
}

/// Pixel coordinate of the top/left edge of tile `tile`
#[inline]
pub fn tile_origin(tile: i32) -> i32 {
    tile * consts::TILE_SIZE
}
