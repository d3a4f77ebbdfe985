//! Fixed timestep simulation tick
//!
//! One call advances a running stage by one step. Velocities are per tick,
//! while every cooldown compares against the wall-clock `now` passed in.

use serde::{Deserialize, Serialize};

use super::collision::{player_vs_enemies, resolve_player_vs_ship, resolve_walls, separate_enemies};
use super::combat::{deploy_enemies, sheathe_sword, swing_sword, sword_hits, try_fire, update_bullets};
use super::state::{GameEvent, GameState, PickupKind, StagePhase};
use super::tile::TileCode;
use crate::tile_of;

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump, or enter a door
    pub up: bool,
    pub fire: bool,
    /// Swing the sword
    pub attack: bool,
}

/// Advance the stage by one tick at wall-clock time `now` (seconds)
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) {
    state.events.clear();
    if state.phase != StagePhase::Running {
        return;
    }

    update_clock(state, now);
    try_enter_door(state, input);

    // Weapons
    if input.fire && try_fire(&mut state.player, now) {
        state.events.push(GameEvent::BulletFired);
    }
    if input.attack && swing_sword(&mut state.player, now) {
        state.events.push(GameEvent::SwordSwung);
    }
    sheathe_sword(&mut state.player, now);

    // Integrate
    state.player.steer(input, &state.tuning);
    state.player.body.integrate(now);
    for enemy in state.enemies.iter_mut().filter(|e| e.body.alive) {
        enemy.steer(&state.tuning);
        enemy.body.integrate(now);
    }
    if let Some(ship) = state.ship.as_mut().filter(|s| s.body.alive) {
        ship.body.integrate(now);
    }
    deploy_enemies(state, now);

    // Terrain
    resolve_walls(&mut state.player.body, &state.map);
    for enemy in state.enemies.iter_mut().filter(|e| e.body.alive) {
        resolve_walls(&mut enemy.body, &state.map);
    }
    if let Some(ship) = state.ship.as_mut().filter(|s| s.body.alive) {
        resolve_walls(&mut ship.body, &state.map);
    }

    // Actor against actor
    separate_enemies(&mut state.enemies);
    let mut hurt = player_vs_enemies(&mut state.player.body, &state.enemies, now);
    if let Some(ship) = state.ship.as_ref().filter(|s| s.body.alive) {
        hurt |= resolve_player_vs_ship(&mut state.player.body, &ship.body, now);
    }
    if hurt {
        state.events.push(GameEvent::PlayerHurt {
            hp: state.player.body.hp,
        });
    }
    // Pushes out of the ship may have moved the player into terrain
    resolve_walls(&mut state.player.body, &state.map);

    update_bullets(state, now);
    sword_hits(state, now);

    collect_pickups(state);
    check_terminal(state);
}

/// Start the clock on the first tick and kill the player when it runs out
fn update_clock(state: &mut GameState, now: f64) {
    let start = *state.start_time.get_or_insert(now);
    let limit = f64::from(state.map.params().time_limit);
    // Truncates toward zero
    state.time_remaining = (limit - (now - start)) as i32;

    if state.time_remaining <= 0 && state.player.body.alive {
        state.player.body.alive = false;
        log::info!("Stage {}: time up", state.map.name());
    }
}

/// Holding up on a closed door moves to the next room
fn try_enter_door(state: &mut GameState, input: &TickInput) {
    if !input.up || !state.player.body.alive {
        return;
    }

    let pos = state.player.body.position;
    let (tx, ty) = (tile_of(pos.x), tile_of(pos.y));
    let at_door = [tx, tx + 1]
        .into_iter()
        .any(|x| state.map.tile_at(x, ty) == TileCode::DoorClosed);

    if at_door {
        if let Err(err) = state.enter_next_room() {
            log::warn!("Door ignored: {}", err);
        }
    }
}

fn ship_destroyed(state: &GameState) -> bool {
    state.ship.as_ref().is_some_and(|s| !s.body.alive)
}

/// Collect every pickup whose centre lies in the player's box, then compact
fn collect_pickups(state: &mut GameState) {
    let player = state.player.body.rect();
    let GameState {
        coins,
        gems,
        progress,
        events,
        ..
    } = state;

    for pickup in coins.iter_mut().chain(gems.iter_mut()) {
        let centre = pickup.centre();
        if pickup.collected || !player.contains_point(centre.x, centre.y) {
            continue;
        }
        pickup.collected = true;

        let extra_life = match pickup.kind {
            PickupKind::Coin => {
                events.push(GameEvent::CoinCollected);
                progress.add_coin()
            }
            PickupKind::Gem => {
                events.push(GameEvent::GemCollected);
                progress.add_gem()
            }
        };
        if extra_life {
            events.push(GameEvent::ExtraLife);
            log::debug!("Extra life, now {}", progress.lives);
        }
    }

    coins.retain(|p| !p.collected);
    gems.retain(|p| !p.collected);
}

/// A destroyed ship clears the stage; a dead player costs a life. Both can
/// happen on the same tick, and then the clear decides the phase.
fn check_terminal(state: &mut GameState) {
    if ship_destroyed(state) {
        state.phase = StagePhase::GameClear;
        state.events.push(GameEvent::StageClear);
        log::info!("Stage {} cleared", state.map.name());
    }
    if !state.player.body.alive {
        if state.phase != StagePhase::GameClear {
            state.phase = StagePhase::GameOver;
        }
        state.progress.lose_life();
        state.events.push(GameEvent::GameOver);
        log::info!(
            "Game over on stage {}, {} lives left",
            state.map.name(),
            state.progress.lives
        );
    }
}
