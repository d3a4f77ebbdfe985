//! Progress carried between stage attempts
//!
//! Lives, coins and gems plus the set of cleared stages. The simulation reads
//! this on stage entry and hands it back on exit; only the runner touches disk.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{COIN_MAX, GEM_MAX, LIFE_MAX, STARTING_LIVES};
use crate::error::{Error, Result};

/// Persisted counters and cleared flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub lives: u32,
    pub coins: u32,
    pub gems: u32,
    /// Names of cleared stages
    pub cleared: BTreeSet<String>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            lives: STARTING_LIVES,
            coins: 0,
            gems: 0,
            cleared: BTreeSet::new(),
        }
    }
}

impl Progress {
    /// Fresh save
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self, stage: &str) -> bool {
        self.cleared.contains(stage)
    }

    pub fn mark_cleared(&mut self, stage: &str) {
        self.cleared.insert(stage.to_string());
    }

    /// One more life, never reaching `LIFE_MAX`
    pub fn grant_life(&mut self) {
        self.lives = (self.lives + 1).min(LIFE_MAX - 1);
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Count a coin. Returns true if it completed a set and bought a life.
    pub fn add_coin(&mut self) -> bool {
        self.coins += 1;
        if self.coins >= COIN_MAX {
            self.coins = 0;
            self.grant_life();
            return true;
        }
        false
    }

    /// Count a gem. Returns true if it completed a set and bought a life.
    pub fn add_gem(&mut self) -> bool {
        self.gems += 1;
        if self.gems >= GEM_MAX {
            self.gems = 0;
            self.grant_life();
            return true;
        }
        false
    }

    /// Apply the rules for leaving a stage
    pub fn apply_exit(&mut self, stage: &str, cleared: bool) {
        if self.lives == 0 {
            log::info!("Out of lives, progress reset");
            *self = Self::default();
        }
        // A clear on the last life still counts after the reset
        if cleared {
            self.mark_cleared(stage);
        }
    }

    /// Load progress from a JSON file. A missing file is a fresh save.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let progress: Self = serde_json::from_str(&json)?;
        log::info!(
            "Loaded progress: {} lives, {} cleared stages",
            progress.lives,
            progress.cleared.len()
        );
        Ok(progress)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Progress saved to {}", path.display());
        Ok(())
    }
}
