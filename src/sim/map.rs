//! Stage rooms and tile lookups
//!
//! A stage is an ordered list of rooms entered one after another through
//! closed doors. `TileMap` tracks which room is current and answers every
//! tile query the simulation makes. Queries outside the grid see solid
//! ground, which is what keeps actors inside the map.

use glam::IVec2;

use super::tile::TileCode;
use crate::consts::TILE_SIZE;
use crate::error::{Error, Result};
use crate::tile_origin;

/// One rectangular tile grid.
///
/// Rooms only come out of [`StageRoom::new`], so a grid is never empty or
/// ragged. There is no serde path that could skip those checks:
///
/// ```compile_fail
/// let room: hillside::sim::StageRoom = serde_json::from_str("[[1, 1]]").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StageRoom {
    columns: usize,
    rows: usize,
    /// Row-major cells
    tiles: Vec<TileCode>,
}

impl StageRoom {
    /// Build a room from rows of tiles. Every row must have the same, non-zero length.
    pub fn new(stage: &str, rows: Vec<Vec<TileCode>>) -> Result<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            return Err(Error::malformed(stage, "room has zero columns"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(Error::malformed(
                stage,
                format!("row {} has {} columns, expected {}", i, row.len(), columns),
            ));
        }

        Ok(Self {
            columns,
            rows: rows.len(),
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Stored tile, or `None` outside the grid
    pub fn get(&self, x: i32, y: i32) -> Option<TileCode> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.columns || y >= self.rows {
            return None;
        }
        Some(self.tiles[y * self.columns + x])
    }

    /// Pixel positions of every tile matching `pred`, in row-major order
    pub fn positions_where(&self, pred: impl Fn(TileCode) -> bool) -> Vec<IVec2> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| pred(**tile))
            .map(|(i, _)| {
                let x = (i % self.columns) as i32;
                let y = (i / self.columns) as i32;
                IVec2::new(tile_origin(x), tile_origin(y))
            })
            .collect()
    }

    pub fn contains(&self, tile: TileCode) -> bool {
        self.tiles.contains(&tile)
    }
}

/// Physical parameters shared by every room of a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageParams {
    /// Ground friction applied to the player's horizontal speed (0 < f <= 1)
    pub friction: f64,
    pub enemy_speed: i32,
    pub ship_speed: i32,
    pub time_limit: i32,
}

/// A named stage: rooms plus physical parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    name: String,
    rooms: Vec<StageRoom>,
    params: StageParams,
}

impl Stage {
    /// Validate and assemble a stage
    pub fn new(name: impl Into<String>, rooms: Vec<StageRoom>, params: StageParams) -> Result<Self> {
        let name = name.into();
        if rooms.is_empty() {
            return Err(Error::malformed(&name, "stage has no rooms"));
        }
        if !(params.friction > 0.0 && params.friction <= 1.0) {
            return Err(Error::malformed(
                &name,
                format!("friction {} outside (0, 1]", params.friction),
            ));
        }
        if params.enemy_speed <= 0 {
            return Err(Error::malformed(&name, "enemySpeed must be positive"));
        }
        if params.ship_speed < 0 {
            return Err(Error::malformed(&name, "spaceShipSpeed must not be negative"));
        }
        if params.time_limit <= 0 {
            return Err(Error::malformed(&name, "timeLimit must be positive"));
        }
        // A door in the final room would lead nowhere
        if rooms.last().is_some_and(|room| room.contains(TileCode::DoorClosed)) {
            return Err(Error::MissingAsset(format!(
                "stage `{}`: door in room {} leads to an undefined room",
                name,
                rooms.len() - 1
            )));
        }

        Ok(Self {
            name,
            rooms,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rooms(&self) -> &[StageRoom] {
        &self.rooms
    }

    pub fn params(&self) -> &StageParams {
        &self.params
    }
}

/// The current stage and the room being played
#[derive(Debug, Clone)]
pub struct TileMap {
    stage: Stage,
    room_index: usize,
}

impl TileMap {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            room_index: 0,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn name(&self) -> &str {
        &self.stage.name
    }

    pub fn params(&self) -> &StageParams {
        &self.stage.params
    }

    pub fn room_index(&self) -> usize {
        self.room_index
    }

    pub fn room(&self) -> &StageRoom {
        &self.stage.rooms[self.room_index]
    }

    /// Move to the next room of the stage
    pub fn advance_room(&mut self) -> Result<()> {
        if self.room_index + 1 >= self.stage.rooms.len() {
            return Err(Error::MissingAsset(format!(
                "stage `{}` has no room after {}",
                self.stage.name, self.room_index
            )));
        }
        self.room_index += 1;
        log::info!(
            "Stage {}: entering room {}/{}",
            self.stage.name,
            self.room_index + 1,
            self.stage.rooms.len()
        );
        Ok(())
    }

    /// Tile at grid coordinates; anything outside the room is ground
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> TileCode {
        self.room().get(x, y).unwrap_or(TileCode::Ground)
    }

    /// Water, or open space directly beside or below water
    pub fn is_water_at(&self, x: i32, y: i32) -> bool {
        let tile = self.tile_at(x, y);
        tile != TileCode::Ground
            && (tile == TileCode::Water
                || self.tile_at(x - 1, y) == TileCode::Water
                || self.tile_at(x + 1, y) == TileCode::Water
                || self.tile_at(x, y - 1) == TileCode::Water)
    }

    /// True once a tile row lies below the bottom of the room
    #[inline]
    pub fn is_out_of_map(&self, tile_y: i32) -> bool {
        tile_y >= self.room().rows() as i32
    }

    pub fn width_px(&self) -> i32 {
        self.room().columns() as i32 * TILE_SIZE
    }

    pub fn height_px(&self) -> i32 {
        self.room().rows() as i32 * TILE_SIZE
    }

    /// Where the player appears: first start sign or open door, else the origin
    pub fn starting_point(&self) -> IVec2 {
        self.room()
            .positions_where(|t| matches!(t, TileCode::StageStart | TileCode::DoorOpen))
            .first()
            .copied()
            .unwrap_or(IVec2::ZERO)
    }

    /// Where the boss ship appears, if this room has one.
    /// Only the first ship tile counts, and one in column 0 means no ship.
    pub fn ship_spawn(&self) -> Option<IVec2> {
        self.room()
            .positions_where(|t| t == TileCode::ShipSpawn)
            .first()
            .copied()
            .filter(|position| position.x > 0)
    }

    pub fn enemy_spawns(&self) -> Vec<IVec2> {
        self.room().positions_where(|t| t == TileCode::EnemySpawn)
    }

    pub fn coin_positions(&self) -> Vec<IVec2> {
        self.room().positions_where(|t| t == TileCode::Coin)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a single-room map from rows of tile codes
    pub(crate) fn map_from_codes(rows: &[&[i32]]) -> TileMap {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|&c| TileCode::from_code(c).unwrap()).collect())
            .collect();
        let room = StageRoom::new("test", rows).unwrap();
        TileMap::new(Stage::new("test", vec![room], test_params()).unwrap())
    }

    pub(crate) fn test_params() -> StageParams {
        StageParams {
            friction: 0.8,
            enemy_speed: 5,
            ship_speed: 4,
            time_limit: 300,
        }
    }

    #[test]
    fn test_tile_at_outside_is_ground() {
        let map = map_from_codes(&[&[0, 0], &[1, 1]]);
        assert_eq!(map.tile_at(0, 0), TileCode::Empty);
        assert_eq!(map.tile_at(-1, 0), TileCode::Ground);
        assert_eq!(map.tile_at(2, 0), TileCode::Ground);
        assert_eq!(map.tile_at(0, -1), TileCode::Ground);
        assert_eq!(map.tile_at(0, 2), TileCode::Ground);
    }

    #[test]
    fn test_water_halo() {
        let map = map_from_codes(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 12, 0, 1],
            &[0, 0, 0, 12, 1],
            &[1, 1, 1, 1, 1],
        ]);
        assert!(map.is_water_at(2, 1));
        // left and right of water
        assert!(map.is_water_at(1, 1));
        assert!(map.is_water_at(3, 1));
        // below water
        assert!(map.is_water_at(2, 2));
        // above water is dry
        assert!(!map.is_water_at(2, 0));
        // ground beside water stays dry
        assert!(!map.is_water_at(4, 2));
        assert!(!map.is_water_at(0, 0));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let err = StageRoom::new("x", vec![vec![]]).unwrap_err();
        assert!(matches!(err, Error::MalformedStageData { .. }));
        let err = StageRoom::new("x", vec![]).unwrap_err();
        assert!(matches!(err, Error::MalformedStageData { .. }));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![TileCode::Empty; 3], vec![TileCode::Ground; 2]];
        assert!(matches!(
            StageRoom::new("x", rows),
            Err(Error::MalformedStageData { .. })
        ));
    }

    #[test]
    fn test_door_in_last_room_is_missing_asset() {
        let room = StageRoom::new("x", vec![vec![TileCode::DoorClosed, TileCode::Ground]]).unwrap();
        let err = Stage::new("x", vec![room], test_params()).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(_)));
    }

    #[test]
    fn test_spawn_points() {
        let map = map_from_codes(&[&[7, 0, 9, 8], &[0, 3, 7, 8], &[1, 1, 1, 1]]);
        assert_eq!(map.starting_point(), IVec2::new(50, 50));
        assert_eq!(map.ship_spawn(), Some(IVec2::new(100, 0)));
        assert_eq!(map.enemy_spawns(), vec![IVec2::new(0, 0), IVec2::new(100, 50)]);
        assert_eq!(map.coin_positions(), vec![IVec2::new(150, 0), IVec2::new(150, 50)]);
        assert_eq!(map.width_px(), 200);
        assert_eq!(map.height_px(), 150);
    }

    #[test]
    fn test_ship_in_first_column_is_absent() {
        let map = map_from_codes(&[&[9, 0, 9], &[1, 1, 1]]);
        assert_eq!(map.ship_spawn(), None);
        let map = map_from_codes(&[&[0, 0, 0], &[1, 1, 1]]);
        assert_eq!(map.ship_spawn(), None);
    }

    #[test]
    fn test_advance_room() {
        let first = StageRoom::new("x", vec![vec![TileCode::StageStart, TileCode::DoorClosed]]).unwrap();
        let second = StageRoom::new("x", vec![vec![TileCode::DoorOpen, TileCode::Empty]]).unwrap();
        let mut map = TileMap::new(Stage::new("x", vec![first, second], test_params()).unwrap());
        assert_eq!(map.tile_at(1, 0), TileCode::DoorClosed);
        map.advance_room().unwrap();
        assert_eq!(map.room_index(), 1);
        assert_eq!(map.tile_at(1, 0), TileCode::Empty);
        assert!(matches!(map.advance_room(), Err(Error::MissingAsset(_))));
        assert_eq!(map.room_index(), 1);
    }

    #[test]
    fn test_bad_params_rejected() {
        let room = || StageRoom::new("x", vec![vec![TileCode::Empty]]).unwrap();
        let mut params = test_params();
        params.friction = 0.0;
        assert!(Stage::new("x", vec![room()], params).is_err());
        params.friction = 1.0;
        assert!(Stage::new("x", vec![room()], params).is_ok());
        params.enemy_speed = 0;
        assert!(Stage::new("x", vec![room()], params).is_err());
        assert!(Stage::new("x", vec![], test_params()).is_err());
    }
}
