//! Hillside headless runner
//!
//! Loads a stage table, replays a scripted input tape against a synthetic
//! fixed-step clock, logs what happens and writes the resulting progress.

use std::path::{Path, PathBuf};

use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;
use serde::Deserialize;

use hillside::consts::SIM_DT;
use hillside::sim::{GameState, TickInput, tick};
use hillside::{Error, Progress, Result, StageTable, Tuning};

/// Play one stage of Hillside from a scripted input tape
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stage table file
    #[arg(long)]
    stages: PathBuf,

    /// Name of the stage to play
    #[arg(long)]
    stage: String,

    /// JSON input tape: `[{ "ticks": 20, "input": { "right": true } }, ...]`
    #[arg(long)]
    tape: Option<PathBuf>,

    /// Progress file, read on entry and written on exit
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Tuning overrides (JSON)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Stop after this many ticks even if the stage is still running
    #[arg(long, default_value_t = 6000)]
    max_ticks: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Hold `input` for `ticks` consecutive ticks
#[derive(Debug, Deserialize)]
struct TapeSegment {
    ticks: usize,
    #[serde(default)]
    input: TickInput,
}

/// Info by default, debug with `--verbose`; `RUST_LOG` wins over both
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn load_tape(path: &Path) -> Result<Vec<TapeSegment>> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tape: Vec<TapeSegment> = serde_json::from_str(&json)?;
    log::info!(
        "Loaded tape with {} segments ({} ticks)",
        tape.len(),
        tape.iter().map(|s| s.ticks).sum::<usize>()
    );
    Ok(tape)
}

fn run(args: &Args) -> Result<()> {
    let table = StageTable::load(&args.stages)?;
    let stage = table.get(&args.stage)?.clone();
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let progress = match &args.progress {
        Some(path) => Progress::load(path)?,
        None => Progress::new(),
    };

    if !table.is_unlocked(&args.stage, &progress)? {
        log::warn!(
            "Stage {} is locked until the stage before it is cleared",
            args.stage
        );
        return Ok(());
    }

    let tape = match &args.tape {
        Some(path) => load_tape(path)?,
        None => Vec::new(),
    };
    // Idle input once the tape runs out
    let mut inputs = tape
        .iter()
        .flat_map(|segment| std::iter::repeat_n(segment.input, segment.ticks));

    let mut state = GameState::enter(stage, progress, tuning)?;
    let mut ticks: u64 = 0;
    while ticks < args.max_ticks && !state.is_finished() {
        let input = inputs.next().unwrap_or_default();
        tick(&mut state, &input, ticks as f64 * SIM_DT);
        for event in &state.events {
            log::debug!("tick {}: {:?}", ticks, event);
        }
        ticks += 1;
    }

    if !state.is_finished() {
        log::warn!("Stopped after {} ticks with the stage still running", ticks);
    }
    log::info!(
        "{:?} after {} ticks: room {}, {}s left, player hp {}",
        state.phase,
        ticks,
        state.map.room_index() + 1,
        state.time_remaining,
        state.player.body.hp
    );

    let progress = state.acknowledge();
    log::info!(
        "Progress: {} lives, {} coins, {} gems, {} stages cleared",
        progress.lives,
        progress.coins,
        progress.gems,
        progress.cleared.len()
    );
    if let Some(path) = &args.progress {
        progress.save(path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    log::info!("Hillside (headless) starting...");

    run(&args).inspect_err(|e| log::error!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tape_parses() {
        let tape: Vec<TapeSegment> =
            serde_json::from_str(include_str!("../stages/meadow.tape.json")).unwrap();
        assert_eq!(tape.len(), 9);
        assert!(!tape[0].input.right);
        assert_eq!(tape[0].ticks, 10);
        assert!(tape[2].input.right && tape[2].input.attack);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["hillside", "--stages", "s.properties", "--stage", "meadow"]);
        assert_eq!(args.max_ticks, 6000);
        assert!(args.tape.is_none());
        assert!(!args.verbose);
    }
}
