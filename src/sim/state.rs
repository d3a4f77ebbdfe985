//! Stage session state
//!
//! One `GameState` is one attempt at a stage: the tile map, every actor,
//! the pickups lying around, the stage clock and the progress counters
//! carried in from outside. It is plain data owned by whoever drives `tick`.

use glam::IVec2;

use super::actor::{Enemy, Player, Ship};
use super::map::{Stage, TileMap};
use crate::consts::TILE_SIZE;
use crate::error::Result;
use crate::progress::Progress;
use crate::tuning::Tuning;

/// Where a stage attempt is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    /// Handed back to the surrounding menu flow
    Idle,
    Running,
    /// Player died or ran out of time
    GameOver,
    /// Boss ship destroyed
    GameClear,
}

impl StagePhase {
    /// Terminal phases absorb every tick until acknowledged
    pub fn is_terminal(self) -> bool {
        matches!(self, StagePhase::GameOver | StagePhase::GameClear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Coin,
    Gem,
}

/// A coin or gem lying in the room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Top-left of the tile-sized pickup
    pub position: IVec2,
    pub collected: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, position: IVec2) -> Self {
        Self {
            kind,
            position,
            collected: false,
        }
    }

    /// The point that must lie inside the player's box to collect it
    pub fn centre(&self) -> IVec2 {
        self.position + IVec2::splat(TILE_SIZE / 2)
    }
}

/// Something render or audio code may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    BulletFired,
    SwordSwung,
    PlayerHurt { hp: i32 },
    EnemyKilled { index: usize },
    EnemyDeployed,
    ShipHit { hp: i32 },
    CoinCollected,
    GemCollected,
    ExtraLife,
    RoomAdvanced { room: usize },
    StageClear,
    GameOver,
}

/// Complete state of one stage attempt
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: StagePhase,
    pub map: TileMap,
    pub tuning: Tuning,
    pub player: Player,
    /// Every enemy of the room, dead ones included; indices are stable
    pub enemies: Vec<Enemy>,
    /// The boss, if the current room has a spawn point for it
    pub ship: Option<Ship>,
    pub coins: Vec<Pickup>,
    /// Gems dropped by killed enemies
    pub gems: Vec<Pickup>,
    /// Lives, coins and gems carried in from the world map
    pub progress: Progress,
    /// Whole seconds left on the stage clock
    pub time_remaining: i32,
    /// Wall-clock time of the first tick
    pub(crate) start_time: Option<f64>,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    /// Validated at entry so deployment mid-tick cannot fail
    pub(crate) enemy_template: Enemy,
    ship_template: Ship,
}

impl GameState {
    /// Start an attempt at `stage`. Every actor is built here, so bad
    /// tuning sizes surface as `Error::InvalidActor` now rather than mid-run.
    pub fn enter(stage: Stage, progress: Progress, tuning: Tuning) -> Result<Self> {
        let player = Player::new(&tuning)?;
        let enemy_template = Enemy::new(&tuning)?;
        let ship_template = Ship::new(&tuning)?;
        let map = TileMap::new(stage);
        let time_remaining = map.params().time_limit;

        let mut state = Self {
            phase: StagePhase::Running,
            map,
            tuning,
            player,
            enemies: Vec::new(),
            ship: None,
            coins: Vec::new(),
            gems: Vec::new(),
            progress,
            time_remaining,
            start_time: None,
            events: Vec::new(),
            enemy_template,
            ship_template,
        };
        state.populate_room();

        log::info!(
            "Entering stage {} ({} rooms, {}s limit, {} lives)",
            state.map.name(),
            state.map.stage().rooms().len(),
            time_remaining,
            state.progress.lives
        );
        Ok(state)
    }

    /// Walk through a door into the next room. Player HP carries over.
    pub fn enter_next_room(&mut self) -> Result<()> {
        self.map.advance_room()?;
        self.populate_room();
        self.events.push(GameEvent::RoomAdvanced {
            room: self.map.room_index(),
        });
        Ok(())
    }

    /// Rebuild actors and pickups from the current room's spawn tiles
    fn populate_room(&mut self) {
        let params = *self.map.params();

        self.player
            .enter_room(self.map.starting_point(), params.friction);

        // The deploy clock runs for the whole stage attempt
        if let Some(old) = &self.ship {
            self.ship_template.last_deploy_at = old.last_deploy_at;
        }
        self.ship = self.map.ship_spawn().map(|position| {
            let mut ship = self.ship_template.clone();
            ship.spawn(position, params.ship_speed);
            ship
        });

        self.enemies = self
            .map
            .enemy_spawns()
            .into_iter()
            .map(|position| self.enemy_template.spawned_at(position, params.enemy_speed))
            .collect();

        self.coins = self
            .map
            .coin_positions()
            .into_iter()
            .map(|position| Pickup::new(PickupKind::Coin, position))
            .collect();

        self.gems.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Hand control back to the menu flow and report the progress to persist.
    ///
    /// From a terminal phase this applies the exit rules (a clear marks the
    /// stage, running out of lives resets everything). Quitting a running
    /// attempt keeps whatever was collected without clearing the stage.
    pub fn acknowledge(&mut self) -> Progress {
        if self.phase != StagePhase::Idle {
            let cleared = self.phase == StagePhase::GameClear;
            self.progress.apply_exit(self.map.name(), cleared);
            log::info!(
                "Leaving stage {} ({:?}), {} lives left",
                self.map.name(),
                self.phase,
                self.progress.lives
            );
            self.phase = StagePhase::Idle;
        }
        self.progress.clone()
    }
}
