//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer positions and per-tick velocities
//! - Cooldowns measured against the wall-clock time passed into `tick`
//! - Stable iteration order (by actor index)
//! - No rendering, audio or file system dependencies

pub mod actor;
pub mod collision;
pub mod combat;
pub mod map;
pub mod state;
pub mod tick;
pub mod tile;

pub use actor::{Actor, ActorKind, Bullet, Enemy, Player, Ship, WallSide};
pub use collision::{Rect, resolve_walls};
pub use map::{Stage, StageParams, StageRoom, TileMap};
pub use state::{GameEvent, GameState, Pickup, PickupKind, StagePhase};
pub use tick::{TickInput, tick};
pub use tile::TileCode;
