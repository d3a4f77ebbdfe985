//! Stage table parser
//!
//! Stages are read from a properties-style text file, one stage per key:
//!
//! ```text
//! # comment
//! meadow = [ {3 0 5} {1 1 1} ] \
//!          [ {6 0 9} {1 1 1} ] \
//!          timeLimit=300 spaceShipSpeed=4 enemySpeed=5 friction=0.8
//! ```
//!
//! Each `[ ... ]` is a room and each `{ ... }` inside it one row of tile
//! codes. Scalars sit outside the brackets as `key=value`. A trailing `\`
//! continues the entry on the next line. Any malformed stage fails the
//! whole table; a partial grid is never returned.

use std::path::Path;

use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::sim::map::{Stage, StageParams, StageRoom};
use crate::sim::tile::TileCode;

/// Every stage of the game, in world-map order
#[derive(Debug, Clone, Default)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    /// Parse a whole table. Entry order is preserved.
    pub fn parse(text: &str) -> Result<Self> {
        let mut stages: Vec<Stage> = Vec::new();

        for (line_no, line) in logical_lines(text) {
            let Some((name, value)) = split_entry(&line) else {
                return Err(Error::malformed(
                    format!("line {}", line_no),
                    "expected `name = value`",
                ));
            };
            if name.is_empty() {
                return Err(Error::malformed(format!("line {}", line_no), "empty stage name"));
            }
            if stages.iter().any(|s| s.name() == name) {
                return Err(Error::malformed(name, "defined twice"));
            }
            stages.push(parse_stage(name, value)?);
        }

        Ok(Self { stages })
    }

    /// Read and parse a table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text)?;
        log::info!("Loaded {} stages from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Result<&Stage> {
        self.stages
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::MissingAsset(format!("no stage named `{}`", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name())
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The first stage is always open; each later one opens once the stage
    /// before it has been cleared.
    pub fn is_unlocked(&self, name: &str, progress: &Progress) -> Result<bool> {
        let index = self
            .stages
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| Error::MissingAsset(format!("no stage named `{}`", name)))?;

        Ok(index == 0 || progress.is_cleared(self.stages[index - 1].name()))
    }
}

/// Join continuation lines and drop comments and blanks.
/// Yields the 1-based line number each entry starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if current.is_none() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        let (body, continues) = match line.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (line, false),
        };
        let entry = current.get_or_insert_with(|| (i + 1, String::new()));
        entry.1.push_str(body);
        entry.1.push(' ');

        if !continues {
            lines.extend(current.take());
        }
    }
    // A continuation on the last line just ends the entry
    lines.extend(current.take());
    lines
}

/// Split at the first `=` or `:`
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let at = line.find(|c: char| c == '=' || c == ':')?;
    Some((line[..at].trim(), line[at + 1..].trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Outside,
    Room,
    Row,
}

fn parse_stage(name: &str, value: &str) -> Result<Stage> {
    let mut rooms = Vec::new();
    let mut rows: Vec<Vec<TileCode>> = Vec::new();
    let mut cells = String::new();
    let mut scalars = String::new();
    let mut nesting = Nesting::Outside;

    for (col, ch) in value.chars().enumerate() {
        match (nesting, ch) {
            (Nesting::Outside, '[') => nesting = Nesting::Room,
            (Nesting::Room, '{') => {
                cells.clear();
                nesting = Nesting::Row;
            }
            (Nesting::Row, '}') => {
                rows.push(parse_row(name, &cells)?);
                nesting = Nesting::Room;
            }
            (Nesting::Room, ']') => {
                rooms.push(StageRoom::new(name, std::mem::take(&mut rows))?);
                nesting = Nesting::Outside;
            }
            (Nesting::Row, c) if !matches!(c, '[' | ']' | '{') => cells.push(c),
            (Nesting::Room, c) if c.is_whitespace() => {}
            (Nesting::Outside, c) if !matches!(c, ']' | '{' | '}') => scalars.push(c),
            (_, c) => {
                return Err(Error::malformed(
                    name,
                    format!("unexpected `{}` at column {}", c, col + 1),
                ));
            }
        }
    }

    if nesting != Nesting::Outside {
        return Err(Error::malformed(name, "unbalanced brackets"));
    }
    if rooms.is_empty() {
        return Err(Error::malformed(name, "no rooms"));
    }

    let params = parse_params(name, &scalars)?;
    Stage::new(name, rooms, params)
}

fn parse_row(stage: &str, cells: &str) -> Result<Vec<TileCode>> {
    cells
        .split_whitespace()
        .map(|cell| {
            let code: i32 = cell
                .parse()
                .map_err(|_| Error::malformed(stage, format!("`{}` is not a tile code", cell)))?;
            TileCode::from_code(code)
                .ok_or_else(|| Error::malformed(stage, format!("unknown tile code {}", code)))
        })
        .collect()
}

fn parse_params(stage: &str, scalars: &str) -> Result<StageParams> {
    let mut time_limit = None;
    let mut ship_speed = None;
    let mut enemy_speed = None;
    let mut friction = None;

    for token in scalars.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| Error::malformed(stage, format!("stray text `{}`", token)))?;
        match key {
            "timeLimit" => time_limit = Some(parse_number::<i32>(stage, key, value)?),
            "spaceShipSpeed" => ship_speed = Some(parse_number::<i32>(stage, key, value)?),
            "enemySpeed" => enemy_speed = Some(parse_number::<i32>(stage, key, value)?),
            "friction" => friction = Some(parse_number::<f64>(stage, key, value)?),
            _ => return Err(Error::malformed(stage, format!("unknown key `{}`", key))),
        }
    }

    let missing = |key: &str| Error::malformed(stage, format!("missing `{}`", key));
    Ok(StageParams {
        time_limit: time_limit.ok_or_else(|| missing("timeLimit"))?,
        ship_speed: ship_speed.ok_or_else(|| missing("spaceShipSpeed"))?,
        enemy_speed: enemy_speed.ok_or_else(|| missing("enemySpeed"))?,
        friction: friction.ok_or_else(|| missing("friction"))?,
    })
}

fn parse_number<T: std::str::FromStr>(stage: &str, key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::malformed(stage, format!("`{}` is not a number for `{}`", value, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../stages/stages.properties");
    const SCALARS: &str = "timeLimit=100 spaceShipSpeed=2 enemySpeed=3 friction=0.5";

    fn one(value: &str) -> Result<StageTable> {
        StageTable::parse(&format!("s = {}", value))
    }

    fn assert_malformed(result: Result<StageTable>) {
        match result {
            Err(Error::MalformedStageData { .. }) => {}
            other => panic!("expected MalformedStageData, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_table() {
        let table = StageTable::parse(SAMPLE).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["meadow", "lagoon"]);

        let meadow = table.get("meadow").unwrap();
        assert_eq!(meadow.rooms().len(), 2);
        assert_eq!(meadow.rooms()[0].columns(), 20);
        assert_eq!(meadow.rooms()[0].rows(), 8);
        assert_eq!(meadow.params().time_limit, 300);
        assert_eq!(meadow.params().friction, 0.8);

        let lagoon = table.get("lagoon").unwrap();
        assert!(lagoon.rooms()[0].contains(TileCode::Water));
        assert!(lagoon.rooms()[0].contains(TileCode::ShipSpawn));
    }

    #[test]
    fn test_unlock_order() {
        let table = StageTable::parse(SAMPLE).unwrap();
        let mut progress = Progress::new();
        assert!(table.is_unlocked("meadow", &progress).unwrap());
        assert!(!table.is_unlocked("lagoon", &progress).unwrap());
        progress.mark_cleared("meadow");
        assert!(table.is_unlocked("lagoon", &progress).unwrap());
        assert!(matches!(
            table.is_unlocked("volcano", &progress),
            Err(Error::MissingAsset(_))
        ));
    }

    #[test]
    fn test_unknown_stage_is_missing_asset() {
        let table = StageTable::parse(SAMPLE).unwrap();
        assert!(matches!(table.get("volcano"), Err(Error::MissingAsset(_))));
    }

    #[test]
    fn test_colon_comments_and_continuation() {
        let text = format!(
            "# first\n! second\n\ns: [ {{3 0}} \\\n   {{1 1}} ] \\\n  {}\n",
            SCALARS
        );
        let table = StageTable::parse(&text).unwrap();
        let stage = table.get("s").unwrap();
        assert_eq!(stage.rooms()[0].rows(), 2);
        assert_eq!(stage.params().enemy_speed, 3);
    }

    #[test]
    fn test_whitespace_tolerant() {
        let table = one(&format!("[{{3 0}}{{ 1   1 }}]   {}", SCALARS)).unwrap();
        assert_eq!(table.get("s").unwrap().rooms()[0].columns(), 2);
    }

    #[test]
    fn test_bracket_errors() {
        assert_malformed(one(&format!("[ [ {{0}} ] ] {}", SCALARS)));
        assert_malformed(one(&format!("[ {{0 {{0}} }} ] {}", SCALARS)));
        assert_malformed(one(&format!("[ {{0}} {}", SCALARS)));
        assert_malformed(one(&format!("{{0}} ] {}", SCALARS)));
        assert_malformed(one(&format!("[ {{0 0}} ]] {}", SCALARS)));
    }

    #[test]
    fn test_stray_text_in_room() {
        assert_malformed(one(&format!("[ x {{0}} ] {}", SCALARS)));
    }

    #[test]
    fn test_bad_cells() {
        assert_malformed(one(&format!("[ {{0 a}} ] {}", SCALARS)));
        assert_malformed(one(&format!("[ {{0 4}} ] {}", SCALARS)));
        // ragged
        assert_malformed(one(&format!("[ {{0 0}} {{0}} ] {}", SCALARS)));
        // zero columns
        assert_malformed(one(&format!("[ {{ }} ] {}", SCALARS)));
        assert_malformed(one(&format!("[ ] {}", SCALARS)));
    }

    #[test]
    fn test_scalar_errors() {
        assert_malformed(one("[ {0} ] timeLimit=100 spaceShipSpeed=2 enemySpeed=3"));
        assert_malformed(one("[ {0} ] timeLimit=ten spaceShipSpeed=2 enemySpeed=3 friction=0.5"));
        assert_malformed(one("[ {0} ] timeLimit=100 spaceShipSpeed=2 enemySpeed=3 friction=1.5"));
        assert_malformed(one("[ {0} ] timeLimit=0 spaceShipSpeed=2 enemySpeed=3 friction=0.5"));
        assert_malformed(one("[ {0} ] timeLimit=100 spaceShipSpeed=-1 enemySpeed=3 friction=0.5"));
        assert_malformed(one("[ {0} ] timeLimit=100 spaceShipSpeed=2 enemySpeed=0 friction=0.5"));
        assert_malformed(one("[ {0} ] timeLimit=100 spaceShipSpeed=2 enemySpeed=3 friction=0.5 gravity=2"));
        assert_malformed(one("[ {0} ] oops timeLimit=100 spaceShipSpeed=2 enemySpeed=3 friction=0.5"));
    }

    #[test]
    fn test_zero_rooms() {
        assert_malformed(one(SCALARS));
    }

    #[test]
    fn test_entry_errors() {
        assert_malformed(StageTable::parse("just some words\n"));
        assert_malformed(StageTable::parse(&format!(
            "a = [ {{0}} ] {s}\na = [ {{0}} ] {s}\n",
            s = SCALARS
        )));
    }

    #[test]
    fn test_one_bad_stage_fails_the_table() {
        let text = format!("good = [ {{0}} ] {s}\nbad = [ {{0}} {s}\n", s = SCALARS);
        assert_malformed(StageTable::parse(&text));
    }
}
