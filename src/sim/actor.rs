//! Kinematic bodies: the player, patrolling enemies and the boss ship
//!
//! Every actor shares one `Actor` body. Behaviour that differs per kind
//! (reacting to walls, wall resolution itself) is chosen by `ActorKind`
//! instead of by overriding methods.

use glam::IVec2;

use super::collision::Rect;
use super::tick::TickInput;
use crate::consts::TILE_SIZE;
use crate::error::{Error, Result};
use crate::tuning::{PlayerTuning, Tuning};

/// Which kind of actor a body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy,
    Ship,
}

/// Side of the actor that struck a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

type WallHitFn = fn(&mut Actor, WallSide);

impl ActorKind {
    /// Reaction to a wall snap for this kind of actor
    pub fn wall_hit_strategy(self) -> WallHitFn {
        match self {
            ActorKind::Enemy => bounce_off_wall,
            // Player velocity is rebuilt from input every tick and the ship
            // does its own wall handling
            ActorKind::Player | ActorKind::Ship => ignore_wall,
        }
    }
}

fn ignore_wall(_actor: &mut Actor, _side: WallSide) {}

/// Patrol bounce: turn around when walking into the struck side
fn bounce_off_wall(actor: &mut Actor, side: WallSide) {
    let vx = actor.velocity.x;
    if (side == WallSide::Right && vx > 0) || (side == WallSide::Left && vx < 0) {
        actor.velocity.x = -vx;
    }
}

/// Scale an integer velocity component, truncating toward zero
#[inline]
pub(crate) fn scale(v: i32, factor: f64) -> i32 {
    (v as f64 * factor) as i32
}

/// Shared positioned, velocity-driven, health-bearing body
#[derive(Debug, Clone)]
pub struct Actor {
    pub kind: ActorKind,
    /// Top-left corner in pixels
    pub position: IVec2,
    /// Pixels per tick
    pub velocity: IVec2,
    pub width: i32,
    pub height: i32,
    pub hp: i32,
    pub max_hp: i32,
    /// Damage dealt on contact
    pub damage: i32,
    pub alive: bool,
    pub jumping: bool,
    pub swimming: bool,
    pub invincible: bool,
    /// Wall-clock time of the last hit that landed
    attacked_time: f64,
    invincible_duration: f64,
}

impl Actor {
    pub fn new(
        kind: ActorKind,
        width: i32,
        height: i32,
        max_hp: i32,
        damage: i32,
        invincible_duration: f64,
    ) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidActor { width, height });
        }

        Ok(Self {
            kind,
            position: IVec2::ZERO,
            velocity: IVec2::ZERO,
            width,
            height,
            hp: max_hp,
            max_hp,
            damage,
            alive: true,
            jumping: false,
            swimming: false,
            invincible: false,
            attacked_time: f64::NEG_INFINITY,
            invincible_duration,
        })
    }

    /// Put the actor at rest at `position` without touching its health
    pub fn place(&mut self, position: IVec2) {
        self.position = position;
        self.velocity = IVec2::ZERO;
        self.alive = true;
        self.jumping = false;
        self.swimming = false;
        self.invincible = false;
    }

    /// Place the actor and restore full health
    pub fn spawn(&mut self, position: IVec2) {
        self.place(position);
        self.hp = self.max_hp;
    }

    /// Apply one tick of velocity and expire invincibility
    pub fn integrate(&mut self, now: f64) {
        self.position += self.velocity;

        if now - self.attacked_time >= self.invincible_duration {
            self.invincible = false;
        }
    }

    /// Take a hit unless invincible. Returns true if the damage landed.
    pub fn attacked(&mut self, now: f64, damage: i32) -> bool {
        if self.invincible || !self.alive {
            return false;
        }

        self.invincible = true;
        self.attacked_time = now;

        self.hp = (self.hp - damage).max(0);
        if self.hp == 0 {
            self.alive = false;
        }
        true
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// Run this actor's wall-hit reaction
    pub fn hit_wall(&mut self, side: WallSide) {
        (self.kind.wall_hit_strategy())(self, side);
    }
}

/// A player bullet
#[derive(Debug, Clone)]
pub struct Bullet {
    pub position: IVec2,
    /// Signed horizontal speed, pixels per tick
    pub speed: i32,
    pub damage: i32,
    pub fired_at: f64,
    pub alive: bool,
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Actor,
    pub facing_right: bool,
    /// Bullets in flight, oldest first
    pub bullets: Vec<Bullet>,
    pub sword_active: bool,
    pub(crate) sword_started_at: Option<f64>,
    /// Movement and weapon numbers
    pub gear: PlayerTuning,
    friction: f64,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Result<Self> {
        let gear = tuning.player.clone();
        let body = Actor::new(
            ActorKind::Player,
            TILE_SIZE,
            TILE_SIZE,
            gear.max_hp,
            0,
            gear.invincible_duration,
        )?;

        Ok(Self {
            body,
            facing_right: true,
            bullets: Vec::new(),
            sword_active: false,
            sword_started_at: None,
            gear,
            friction: 1.0,
        })
    }

    /// Reset position and weapons for a new room. Health is kept.
    pub fn enter_room(&mut self, start: IVec2, friction: f64) {
        self.body.place(start);
        self.friction = friction;
        self.facing_right = true;
        self.sword_active = false;
        self.bullets.clear();
    }

    /// Rect of the active sword, flush against the leading edge at mid-height
    pub fn sword_rect(&self) -> Rect {
        let body = &self.body;
        let x = if self.facing_right {
            body.position.x + body.width
        } else {
            body.position.x - self.gear.sword_width
        };
        let y = body.position.y + body.height / 2 - self.gear.sword_height / 2;
        Rect::new(x, y, self.gear.sword_width, self.gear.sword_height)
    }

    /// Turn held directions and jump into a velocity for this tick
    pub fn steer(&mut self, input: &TickInput, tuning: &Tuning) {
        let gear = &self.gear;
        let mut vx = self.body.velocity.x;
        let mut vy = self.body.velocity.y;

        if input.left && input.right {
            vx = 0;
        } else if input.right {
            vx += gear.run_accel;
            self.facing_right = true;
        } else if input.left {
            vx -= gear.run_accel;
            self.facing_right = false;
        }

        if !self.body.jumping && !self.body.swimming {
            vx = scale(vx, self.friction);
        }
        vx = vx.clamp(-gear.max_speed_x, gear.max_speed_x);

        if input.up && !self.body.jumping {
            self.body.jumping = true;
            vy = gear.jump_velocity;
        }
        // Releasing jump early cuts the rise short
        if !input.up && vy < gear.jump_cutoff {
            vy = gear.jump_cutoff;
        }

        vy = (vy + tuning.gravity).clamp(-gear.max_speed_y, gear.max_speed_y);

        if self.body.swimming {
            vx = scale(vx, tuning.water_resistance);
            vy = scale(vy, tuning.water_resistance);
        } else {
            vx = scale(vx, tuning.air_resistance);
        }

        self.body.velocity = IVec2::new(vx, vy);
    }
}

/// A ground enemy walking back and forth
#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Actor,
    /// Initial horizontal velocity; the sign is the starting direction
    pub patrol_speed: i32,
    max_speed_y: i32,
}

impl Enemy {
    pub fn new(tuning: &Tuning) -> Result<Self> {
        let t = &tuning.enemy;
        Ok(Self {
            body: Actor::new(
                ActorKind::Enemy,
                TILE_SIZE,
                TILE_SIZE,
                t.max_hp,
                t.damage,
                t.invincible_duration,
            )?,
            patrol_speed: 0,
            max_speed_y: t.max_speed_y,
        })
    }

    /// A fresh copy of this enemy standing at `position`, walking left at `speed`
    pub fn spawned_at(&self, position: IVec2, speed: i32) -> Self {
        let mut enemy = self.clone();
        enemy.body.spawn(position);
        enemy.patrol_speed = -speed;
        enemy.body.velocity.x = enemy.patrol_speed;
        enemy
    }

    /// Gravity and water drag
    pub fn steer(&mut self, tuning: &Tuning) {
        let mut vx = self.body.velocity.x;
        let vy = (self.body.velocity.y + tuning.gravity).clamp(-self.max_speed_y, self.max_speed_y);

        let vy = if self.body.swimming {
            let direction = if vx > 0 { 1 } else { -1 };
            vx = scale(self.patrol_speed.abs(), tuning.water_resistance) * direction;
            scale(vy, tuning.water_resistance)
        } else {
            vy
        };

        self.body.velocity = IVec2::new(vx, vy);
    }
}

/// The boss ship: flies back and forth and drops enemies
#[derive(Debug, Clone)]
pub struct Ship {
    pub body: Actor,
    pub deployed_count: u32,
    pub deploy_limit: u32,
    pub deploy_interval: f64,
    pub(crate) last_deploy_at: f64,
}

impl Ship {
    pub fn new(tuning: &Tuning) -> Result<Self> {
        let t = &tuning.ship;
        Ok(Self {
            body: Actor::new(
                ActorKind::Ship,
                t.width_tiles * TILE_SIZE,
                t.height_tiles * TILE_SIZE,
                t.max_hp,
                t.damage,
                t.invincible_duration,
            )?,
            deployed_count: 0,
            deploy_limit: t.deploy_max,
            deploy_interval: t.deploy_interval,
            last_deploy_at: -t.deploy_interval,
        })
    }

    /// Full-health ship at `position`, flying left at `speed`. The deploy
    /// count starts over but the deploy clock keeps running.
    pub fn spawn(&mut self, position: IVec2, speed: i32) {
        self.body.spawn(position);
        self.body.velocity.x = -speed;
        self.deployed_count = 0;
    }

    /// Earliest wall-clock time the next deployment may happen
    pub fn deploy_cooldown_until(&self) -> f64 {
        self.last_deploy_at + self.deploy_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_body() -> Actor {
        Actor::new(ActorKind::Enemy, 50, 50, 3, 1, 1.0).unwrap()
    }

    #[test]
    fn test_invalid_size_rejected() {
        assert!(matches!(
            Actor::new(ActorKind::Enemy, 0, 50, 3, 1, 1.0),
            Err(Error::InvalidActor { width: 0, height: 50 })
        ));
        assert!(Actor::new(ActorKind::Ship, 50, -1, 3, 1, 1.0).is_err());

        let mut tuning = Tuning::default();
        tuning.ship.width_tiles = 0;
        assert!(Ship::new(&tuning).is_err());
    }

    #[test]
    fn test_invincibility_debounce() {
        let mut actor = enemy_body();
        assert!(actor.attacked(0.0, 1));
        assert_eq!(actor.hp, 2);

        // Within the window: ignored
        actor.integrate(0.5);
        assert!(!actor.attacked(0.5, 1));
        assert_eq!(actor.hp, 2);

        // Exactly at the boundary the window has closed
        actor.integrate(1.0);
        assert!(!actor.invincible);
        assert!(actor.attacked(1.0, 1));
        assert_eq!(actor.hp, 1);
    }

    #[test]
    fn test_second_hit_inside_window_ignored() {
        let mut actor = enemy_body();
        actor.attacked(3.0, 2);
        actor.integrate(3.1);
        actor.attacked(3.1, 2);
        assert_eq!(actor.hp, 1);
        assert!(actor.alive);
    }

    #[test]
    fn test_death_is_final_and_hp_floors_at_zero() {
        let mut actor = enemy_body();
        actor.attacked(0.0, 5);
        assert_eq!(actor.hp, 0);
        assert!(!actor.alive);
        actor.integrate(10.0);
        assert!(!actor.attacked(10.0, 1));
        assert_eq!(actor.hp, 0);
        assert!(!actor.alive);
    }

    #[test]
    fn test_wall_strategy_by_kind() {
        let mut enemy = enemy_body();
        enemy.velocity.x = 5;
        enemy.hit_wall(WallSide::Right);
        assert_eq!(enemy.velocity.x, -5);
        // Already moving away from the struck side
        enemy.hit_wall(WallSide::Right);
        assert_eq!(enemy.velocity.x, -5);
        enemy.hit_wall(WallSide::Left);
        assert_eq!(enemy.velocity.x, 5);

        let mut player = Actor::new(ActorKind::Player, 50, 50, 3, 0, 2.0).unwrap();
        player.velocity.x = 5;
        player.hit_wall(WallSide::Right);
        assert_eq!(player.velocity.x, 5);
    }

    #[test]
    fn test_player_steer_runs_and_jumps() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning).unwrap();
        player.enter_room(IVec2::new(100, 100), 1.0);

        let input = TickInput {
            right: true,
            up: true,
            ..Default::default()
        };
        player.steer(&input, &tuning);
        // vx: 0 + 10, friction 1.0, air 0.9 -> 9
        assert_eq!(player.body.velocity.x, 9);
        // vy: -27 + 3
        assert_eq!(player.body.velocity.y, -24);
        assert!(player.body.jumping);
        assert!(player.facing_right);

        // Releasing jump cuts the rise
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        player.steer(&input, &tuning);
        assert_eq!(player.body.velocity.y, -7);
        assert!(!player.facing_right);
    }

    #[test]
    fn test_player_speed_clamped() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning).unwrap();
        player.enter_room(IVec2::ZERO, 1.0);
        player.body.jumping = true;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            player.steer(&input, &tuning);
        }
        // clamp to 15 then air resistance
        assert_eq!(player.body.velocity.x, 13);
        assert!(player.body.velocity.y <= 25);
    }

    #[test]
    fn test_enemy_swims_at_half_patrol_speed() {
        let tuning = Tuning::default();
        let template = Enemy::new(&tuning).unwrap();
        let mut enemy = template.spawned_at(IVec2::new(100, 0), 6);
        assert_eq!(enemy.body.velocity.x, -6);
        enemy.body.swimming = true;
        enemy.steer(&tuning);
        assert_eq!(enemy.body.velocity.x, -3);
        assert_eq!(enemy.body.velocity.y, 1);
    }

    #[test]
    fn test_ship_spawn_resets_deploy_count() {
        let tuning = Tuning::default();
        let mut ship = Ship::new(&tuning).unwrap();
        assert!(ship.deploy_cooldown_until() <= 0.0);

        ship.deployed_count = 4;
        ship.last_deploy_at = 3.0;
        ship.spawn(IVec2::new(500, 0), 4);
        assert_eq!(ship.body.velocity.x, -4);
        assert_eq!(ship.deployed_count, 0);
        assert_eq!(ship.body.width, 250);
        assert_eq!(ship.body.height, 150);
        // The deploy clock is not reset
        assert_eq!(ship.deploy_cooldown_until(), 3.0 + tuning.ship.deploy_interval);
    }
}
