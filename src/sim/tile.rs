//! Tile codes stored in room grids

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileCode {
    #[default]
    Empty,
    Ground,
    StageStart,
    DoorClosed,
    DoorOpen,
    EnemySpawn,
    Coin,
    ShipSpawn,
    /// Slope high on its left edge, descending to the right
    HillLeft,
    /// Slope high on its right edge, ascending to the right
    HillRight,
    Water,
}

impl TileCode {
    /// Decode the integer used in stage data
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TileCode::Empty),
            1 => Some(TileCode::Ground),
            3 => Some(TileCode::StageStart),
            5 => Some(TileCode::DoorClosed),
            6 => Some(TileCode::DoorOpen),
            7 => Some(TileCode::EnemySpawn),
            8 => Some(TileCode::Coin),
            9 => Some(TileCode::ShipSpawn),
            10 => Some(TileCode::HillLeft),
            11 => Some(TileCode::HillRight),
            12 => Some(TileCode::Water),
            _ => None,
        }
    }

    /// Integer used in stage data
    pub fn code(self) -> i32 {
        match self {
            TileCode::Empty => 0,
            TileCode::Ground => 1,
            TileCode::StageStart => 3,
            TileCode::DoorClosed => 5,
            TileCode::DoorOpen => 6,
            TileCode::EnemySpawn => 7,
            TileCode::Coin => 8,
            TileCode::ShipSpawn => 9,
            TileCode::HillLeft => 10,
            TileCode::HillRight => 11,
            TileCode::Water => 12,
        }
    }

    #[inline]
    pub fn is_ground(self) -> bool {
        self == TileCode::Ground
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_codes_are_rejected() {
        assert_eq!(TileCode::from_code(2), None);
        assert_eq!(TileCode::from_code(4), None);
        assert_eq!(TileCode::from_code(13), None);
        assert_eq!(TileCode::from_code(-1), None);
    }

    #[test]
    fn test_code_matches_from_code() {
        for code in [0, 1, 3, 5, 6, 7, 8, 9, 10, 11, 12] {
            let tile = TileCode::from_code(code).unwrap();
            assert_eq!(tile.code(), code);
        }
    }
}
