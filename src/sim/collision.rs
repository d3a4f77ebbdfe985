//! Collision detection and response on the tile grid
//!
//! The tricky part of Hillside: an actor's attempted position is reconciled
//! against the four tiles around its top-left cell. Faces are checked first,
//! then hill slopes, then the ambiguous corner cases where only one tile of
//! a pair is solid and the smaller penetration decides which axis to fix.

use super::actor::{Actor, ActorKind, Enemy, WallSide};
use super::map::TileMap;
use super::tile::TileCode;
use crate::consts::TILE_SIZE;
use crate::{tile_of, tile_origin};

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Overlap test; touching edges count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Point test; edges count
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.x <= x && x <= self.right() && self.y <= y && y <= self.bottom()
    }
}

/// The actor's top-left cell and the four tiles it can touch
#[derive(Debug, Clone, Copy)]
struct Surroundings {
    tx: i32,
    ty: i32,
    upper_left: TileCode,
    upper_right: TileCode,
    lower_left: TileCode,
    lower_right: TileCode,
}

impl Surroundings {
    /// Read the four neighbours, treating the map edges as solid
    fn of(actor: &Actor, map: &TileMap) -> Self {
        let pos = actor.position;
        let tx = if pos.x < 0 { -1 } else { tile_of(pos.x) };
        let ty = if pos.y < 0 { -1 } else { tile_of(pos.y) };

        let (mut upper_left, lower_left) = if tx == -1 {
            (TileCode::Ground, TileCode::Ground)
        } else {
            (map.tile_at(tx, ty), map.tile_at(tx, ty + 1))
        };

        let (mut upper_right, lower_right) = if pos.x + actor.width >= map.width_px() {
            (TileCode::Ground, TileCode::Ground)
        } else {
            (map.tile_at(tx + 1, ty), map.tile_at(tx + 1, ty + 1))
        };

        if ty == -1 {
            upper_left = TileCode::Ground;
            upper_right = TileCode::Ground;
        }

        Self {
            tx,
            ty,
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }
}

/// Resolve one actor against the tile map, dispatching on its kind
pub fn resolve_walls(actor: &mut Actor, map: &TileMap) {
    match actor.kind {
        ActorKind::Player => resolve_tiles(actor, map),
        ActorKind::Enemy => {
            resolve_enemy_footing(actor, map);
            resolve_tiles(actor, map);
        }
        ActorKind::Ship => resolve_ship_walls(actor, map),
    }
}

/// Shared wall, slope, corner and water resolution for one-tile-wide actors
pub fn resolve_tiles(actor: &mut Actor, map: &TileMap) {
    let ty = if actor.position.y < 0 { -1 } else { tile_of(actor.position.y) };
    if map.is_out_of_map(ty + 1) {
        // Fell off the bottom of the world
        actor.alive = false;
        return;
    }

    let c = Surroundings::of(actor, map);
    let (tx, ty) = (c.tx, c.ty);
    let (ul, ur, ll, lr) = (c.upper_left, c.upper_right, c.lower_left, c.lower_right);

    actor.jumping = true;
    actor.swimming = false;

    // Faces
    if ll.is_ground() && lr.is_ground() {
        actor.position.y = tile_origin(ty);
        actor.jumping = false;
    }
    if ul.is_ground() && ur.is_ground() {
        actor.position.y = tile_origin(ty + 1);
    }
    if ur.is_ground() && lr.is_ground() {
        actor.position.x = tile_origin(tx);
        actor.hit_wall(WallSide::Right);
    }
    if ul.is_ground() && ll.is_ground() {
        actor.position.x = tile_origin(tx + 1);
        actor.hit_wall(WallSide::Left);
    }

    snap_to_rising_hill(actor, &c);
    snap_to_falling_hill(actor, &c);

    resolve_corners(actor, &c);

    // Water under or beside the actor
    let cx = tile_of(actor.position.x);
    let cy = tile_of(actor.position.y);
    if map.is_water_at(cx, cy)
        || map.is_water_at(cx + 1, cy)
        || (actor.jumping && (map.is_water_at(cx, cy + 1) || map.is_water_at(cx + 1, cy + 1)))
    {
        actor.swimming = true;
        actor.jumping = false;
    }
}

/// Ride a `HillRight` slope (ascending to the right)
fn snap_to_rising_hill(actor: &mut Actor, c: &Surroundings) {
    let x = actor.position.x;
    let (tx, ty) = (c.tx, c.ty);

    if c.upper_right == TileCode::HillRight {
        actor.position.y = tile_origin(ty) + tile_origin(tx) - x;
        actor.jumping = false;
    } else if c.lower_left == TileCode::HillRight {
        actor.position.y = tile_origin(ty);
        actor.jumping = false;
    } else if c.lower_right == TileCode::HillRight {
        let slope_y = tile_origin(tx + 1) - x + tile_origin(ty);
        // Only ever pull up onto the slope
        if actor.position.y >= slope_y {
            actor.position.y = slope_y;
            actor.jumping = false;
        }
    }
}

/// Ride a `HillLeft` slope (descending to the right)
fn snap_to_falling_hill(actor: &mut Actor, c: &Surroundings) {
    let x = actor.position.x;
    let (tx, ty) = (c.tx, c.ty);

    if c.upper_left == TileCode::HillLeft {
        actor.position.y = tile_origin(ty) - tile_origin(tx + 1) + x;
        actor.jumping = false;
    } else if c.lower_right == TileCode::HillLeft {
        actor.position.y = tile_origin(ty);
        actor.jumping = false;
    } else if c.lower_left == TileCode::HillLeft {
        let slope_y = tile_origin(ty) - tile_origin(tx) + x;
        if actor.position.y >= slope_y {
            actor.position.y = slope_y;
            actor.jumping = false;
        }
    }
}

/// Corner gaps where no face check fired. Ties correct the vertical axis.
fn resolve_corners(actor: &mut Actor, c: &Surroundings) {
    let (tx, ty) = (c.tx, c.ty);
    let (ul, ur, ll, lr) = (c.upper_left, c.upper_right, c.lower_left, c.lower_right);
    let left_edge = tile_origin(tx);
    let right_edge = tile_origin(tx + 1);
    let top_edge = tile_origin(ty);
    let bottom_edge = tile_origin(ty + 1);

    // Bottom-right corner
    if !ll.is_ground()
        && lr.is_ground()
        && !ur.is_ground()
        && ll != TileCode::HillRight
        && ur != TileCode::HillRight
    {
        let pos = actor.position;
        if pos.x - left_edge < pos.y - top_edge {
            actor.position.x = left_edge;
            actor.hit_wall(WallSide::Right);
        } else {
            actor.position.y = top_edge;
            actor.jumping = false;
        }
    }

    // Top-right corner
    if !ul.is_ground() && ur.is_ground() && !lr.is_ground() {
        let pos = actor.position;
        if pos.x - left_edge < bottom_edge - pos.y {
            actor.position.x = left_edge;
            actor.hit_wall(WallSide::Right);
        } else {
            actor.position.y = bottom_edge;
        }
    }

    // Bottom-left corner
    if ll.is_ground()
        && !lr.is_ground()
        && !ul.is_ground()
        && lr != TileCode::HillLeft
        && ul != TileCode::HillLeft
    {
        let pos = actor.position;
        if right_edge - pos.x < pos.y - top_edge {
            actor.position.x = right_edge;
            actor.hit_wall(WallSide::Left);
        } else {
            actor.position.y = top_edge;
            actor.jumping = false;
        }
    }

    // Top-left corner
    if ul.is_ground() && !ur.is_ground() && !ll.is_ground() {
        let pos = actor.position;
        if right_edge - pos.x < bottom_edge - pos.y {
            actor.position.x = right_edge;
            actor.hit_wall(WallSide::Left);
        } else {
            actor.position.y = bottom_edge;
        }
    }
}

/// Enemy-only pass run before the shared resolution: turn around at ledges
/// and take slopes in the order the enemy is walking.
fn resolve_enemy_footing(actor: &mut Actor, map: &TileMap) {
    let c = Surroundings::of(actor, map);
    let (ll, lr) = (c.lower_left, c.lower_right);
    let vx = actor.velocity.x;

    let ledge_on_left = !ll.is_ground() && ll != TileCode::HillRight && lr.is_ground() && vx < 0;
    let ledge_on_right = !lr.is_ground() && lr != TileCode::HillLeft && ll.is_ground() && vx > 0;
    if ledge_on_left || ledge_on_right {
        actor.velocity.x = -vx;
    }

    if actor.velocity.x < 0 {
        snap_to_rising_hill(actor, &c);
        snap_to_falling_hill(actor, &c);
    } else {
        snap_to_falling_hill(actor, &c);
        snap_to_rising_hill(actor, &c);
    }
}

/// The ship reverses when either of its side edges touches ground on any row it spans
pub fn resolve_ship_walls(actor: &mut Actor, map: &TileMap) {
    let pos = actor.position;
    let left_col = tile_of(pos.x);
    let right_col = tile_of(pos.x + actor.width);

    for row in tile_of(pos.y)..=tile_of(pos.y + actor.height) {
        if map.tile_at(left_col, row).is_ground() || map.tile_at(right_col, row).is_ground() {
            actor.velocity.x = -actor.velocity.x;
            break;
        }
    }
}

/// Push overlapping enemies apart, pair by pair in ascending index order.
///
/// Later pairs see positions already corrected by earlier ones, so three or
/// more mutually overlapping enemies resolve differently depending on order.
pub fn separate_enemies(enemies: &mut [Enemy]) {
    for i in 0..enemies.len() {
        for j in (i + 1)..enemies.len() {
            let (head, tail) = enemies.split_at_mut(j);
            let a = &mut head[i].body;
            let b = &mut tail[0].body;
            if !a.alive || !b.alive {
                continue;
            }
            if a.rect().overlaps(&b.rect()) {
                separate_pair(a, b);
            }
        }
    }
}

/// Turn both enemies around so they head apart, and sit the right one flush
/// against the left one. On ties the lower index stays on the left.
fn separate_pair(a: &mut Actor, b: &mut Actor) {
    let (left, right) = if a.position.x <= b.position.x { (a, b) } else { (b, a) };

    right.position.x = left.position.x + left.width;
    left.velocity.x = -left.velocity.x.abs();
    right.velocity.x = right.velocity.x.abs();
}

/// Contact damage from every alive enemy touching the player. No positional
/// correction. Returns true if any damage landed.
pub fn player_vs_enemies(player: &mut Actor, enemies: &[Enemy], now: f64) -> bool {
    if !player.alive {
        return false;
    }

    let mut hurt = false;
    for enemy in enemies.iter().filter(|e| e.body.alive) {
        if player.rect().overlaps(&enemy.body.rect()) {
            hurt |= player.attacked(now, enemy.body.damage);
        }
    }
    hurt
}

/// Keep the player out of the ship's box. Every contact that moves the player
/// also deals ship damage. Returns true if that damage landed.
pub fn resolve_player_vs_ship(player: &mut Actor, ship: &Actor, now: f64) -> bool {
    if !player.alive {
        return false;
    }

    let s = ship.rect();
    let mut hurt = false;
    let mut contact = |player: &mut Actor| {
        hurt |= player.attacked(now, ship.damage);
    };

    // Top and bottom faces while horizontally inside the ship
    let p = player.rect();
    if s.x <= p.x && p.right() <= s.right() {
        if p.y < s.y && s.y < p.bottom() {
            contact(player);
            player.position.y = s.y - p.h;
            player.jumping = false;
        } else if p.y < s.bottom() && s.bottom() < p.bottom() {
            contact(player);
            player.position.y = s.bottom();
        }
    }

    // Side faces while vertically inside the ship
    let p = player.rect();
    if s.y <= p.y && p.bottom() <= s.bottom() {
        if p.x < s.x && s.x < p.right() {
            contact(player);
            player.position.x = s.x - p.w;
        } else if p.x < s.right() && s.right() < p.right() {
            contact(player);
            player.position.x = s.right();
        }
    }

    // Player straddles the ship's left edge
    let p = player.rect();
    if p.x < s.x && s.x < p.right() {
        let dx = p.right() - s.x;
        if p.y < s.y && s.y < p.bottom() {
            contact(player);
            if dx < p.bottom() - s.y {
                player.position.x = s.x - p.w;
            } else {
                player.position.y = s.y - p.h;
                player.jumping = false;
            }
        } else if p.y < s.bottom() && s.bottom() < p.bottom() {
            contact(player);
            if dx < s.bottom() - p.y {
                player.position.x = s.x - p.w;
            } else {
                player.position.y = s.bottom();
            }
        }
    }

    // Player straddles the ship's right edge
    let p = player.rect();
    if p.x < s.right() && s.right() < p.right() {
        let dx = s.right() - p.x;
        if p.y < s.y && s.y < p.bottom() {
            contact(player);
            if dx < p.bottom() - s.y {
                player.position.x = s.right();
            } else {
                player.position.y = s.y - p.h;
                player.jumping = false;
            }
        } else if p.y < s.bottom() && s.bottom() < p.bottom() {
            contact(player);
            if dx < s.bottom() - p.y {
                player.position.x = s.right();
            } else {
                player.position.y = s.bottom();
            }
        }
    }

    hurt
}
