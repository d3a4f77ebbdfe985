//! Weapons, damage and boss deployment
//!
//! Everything here is gated on wall-clock seconds (`now`), never on ticks:
//! shot spacing, bullet lifetime, sword swings and the ship's deploy timer.

use glam::IVec2;

use super::actor::{Bullet, Enemy, Player, Ship};
use super::map::TileMap;
use super::state::{GameEvent, GameState, Pickup, PickupKind};
use super::tile::TileCode;
use crate::consts::TILE_SIZE;
use crate::tile_of;

/// Fire a bullet from the facing edge unless the newest one is too recent.
/// Returns true if a bullet was fired.
pub fn try_fire(player: &mut Player, now: f64) -> bool {
    let gear = &player.gear;
    if player
        .bullets
        .last()
        .is_some_and(|last| now - last.fired_at < gear.bullet_succession)
    {
        return false;
    }

    let body = &player.body;
    let (x, speed) = if player.facing_right {
        (body.position.x + body.width, gear.bullet_speed)
    } else {
        (body.position.x, -gear.bullet_speed)
    };
    let bullet = Bullet {
        position: IVec2::new(x, body.position.y + body.height / 2),
        speed,
        damage: gear.bullet_damage,
        fired_at: now,
        alive: true,
    };
    player.bullets.push(bullet);
    true
}

/// Raise the sword. The swing clock restarts only once the previous swing
/// is `sword_succession` old. Returns true if a new swing started.
pub fn swing_sword(player: &mut Player, now: f64) -> bool {
    player.sword_active = true;
    let succession = player.gear.sword_succession;
    let rearm = player
        .sword_started_at
        .is_none_or(|start| now - start >= succession);
    if rearm {
        player.sword_started_at = Some(now);
    }
    rearm
}

/// Lower the sword once the current swing has lasted `sword_time`
pub fn sheathe_sword(player: &mut Player, now: f64) {
    let sword_time = player.gear.sword_time;
    if player
        .sword_started_at
        .is_some_and(|start| now - start >= sword_time)
    {
        player.sword_active = false;
    }
}

/// Ground, or the solid half of a hill tile
pub fn bullet_hits_terrain(map: &TileMap, point: IVec2) -> bool {
    let local_x = point.x.rem_euclid(TILE_SIZE);
    let local_y = point.y.rem_euclid(TILE_SIZE);
    match map.tile_at(tile_of(point.x), tile_of(point.y)) {
        TileCode::Ground => true,
        TileCode::HillRight => TILE_SIZE - local_x < local_y,
        TileCode::HillLeft => local_x < local_y,
        _ => false,
    }
}

/// Age, move and collide every bullet, then drop the spent ones.
///
/// A bullet that destroys the ship ends the pass; bullets after it are left
/// untouched since the stage is over.
pub fn update_bullets(state: &mut GameState, now: f64) {
    let GameState {
        player,
        map,
        enemies,
        ship,
        gems,
        events,
        ..
    } = state;
    let duration = player.gear.bullet_duration;

    for bullet in player.bullets.iter_mut() {
        if now - bullet.fired_at > duration {
            bullet.alive = false;
            continue;
        }
        bullet.position.x += bullet.speed;

        if bullet_hits_terrain(map, bullet.position) {
            bullet.alive = false;
            continue;
        }

        let (x, y) = (bullet.position.x, bullet.position.y);
        if let Some((index, enemy)) = enemies
            .iter_mut()
            .enumerate()
            .find(|(_, e)| e.body.alive && e.body.rect().contains_point(x, y))
        {
            bullet.alive = false;
            strike_enemy(enemy, index, bullet.damage, now, gems, events);
            continue;
        }

        if let Some(ship) = ship
            .as_mut()
            .filter(|s| s.body.alive && s.body.rect().contains_point(x, y))
        {
            bullet.alive = false;
            strike_ship(ship, bullet.damage, now, events);
            if !ship.body.alive {
                break;
            }
        }
    }

    player.bullets.retain(|b| b.alive);
}

/// While the sword is out, hit every overlapping enemy and the ship
pub fn sword_hits(state: &mut GameState, now: f64) {
    if !state.player.sword_active {
        return;
    }
    let blade = state.player.sword_rect();
    let damage = state.player.gear.sword_damage;

    let GameState {
        enemies,
        ship,
        gems,
        events,
        ..
    } = state;

    for (index, enemy) in enemies.iter_mut().enumerate() {
        if enemy.body.alive && enemy.body.rect().overlaps(&blade) {
            strike_enemy(enemy, index, damage, now, gems, events);
        }
    }

    if let Some(ship) = ship
        .as_mut()
        .filter(|s| s.body.alive && s.body.rect().overlaps(&blade))
    {
        strike_ship(ship, damage, now, events);
    }
}

/// Damage an enemy; a kill drops a gem where it stood
fn strike_enemy(
    enemy: &mut Enemy,
    index: usize,
    damage: i32,
    now: f64,
    gems: &mut Vec<Pickup>,
    events: &mut Vec<GameEvent>,
) {
    if enemy.body.attacked(now, damage) && !enemy.body.alive {
        gems.push(Pickup::new(PickupKind::Gem, enemy.body.position));
        events.push(GameEvent::EnemyKilled { index });
        log::debug!("Enemy {} killed at {}", index, enemy.body.position);
    }
}

fn strike_ship(ship: &mut Ship, damage: i32, now: f64, events: &mut Vec<GameEvent>) {
    if ship.body.attacked(now, damage) {
        events.push(GameEvent::ShipHit { hp: ship.body.hp });
        log::debug!("Ship hit, {} hp left", ship.body.hp);
    }
}

/// Drop a fresh enemy from beneath the ship's centre when the timer allows
pub fn deploy_enemies(state: &mut GameState, now: f64) {
    let Some(ship) = state.ship.as_mut().filter(|s| s.body.alive) else {
        return;
    };
    if now - ship.last_deploy_at <= ship.deploy_interval || ship.deployed_count >= ship.deploy_limit {
        return;
    }

    let body = &ship.body;
    let position = IVec2::new(
        body.position.x + body.width / 2 - TILE_SIZE / 2,
        body.position.y + body.height,
    );
    let enemy = state
        .enemy_template
        .spawned_at(position, state.map.params().enemy_speed);
    state.enemies.push(enemy);

    ship.deployed_count += 1;
    ship.last_deploy_at = now;
    state.events.push(GameEvent::EnemyDeployed);
    log::debug!(
        "Ship deployed enemy {}/{} at {}",
        ship.deployed_count,
        ship.deploy_limit,
        position
    );
}
