use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::Serialize;
use twofold_core::*;

use crate::config::GameArgs;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Uniformly random legal direction
    Random,
    /// Direction with the highest immediate merge gain
    Greedy,
}

/// Tie-break order for the greedy policy.
const GREEDY_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Right,
    Direction::Down,
];

impl Policy {
    pub fn choose<S: TileSpawner>(
        self,
        engine: &PlayEngine<S>,
        rng: &mut impl Rng,
    ) -> Option<Direction> {
        match self {
            Policy::Random => {
                let legal: Vec<_> = engine.legal_moves().collect();
                legal.choose(rng).copied()
            }
            Policy::Greedy => {
                let mut best: Option<(Direction, Score)> = None;
                for direction in GREEDY_ORDER {
                    let Some(gained) = engine.preview(direction) else {
                        continue;
                    };
                    if best.is_none_or(|(_, best_gain)| gained > best_gain) {
                        best = Some((direction, gained));
                    }
                }
                best.map(|(direction, _)| direction)
            }
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct AutoArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Number of games to play
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub games: usize,

    #[arg(long, value_enum, default_value_t = Policy::Greedy)]
    pub policy: Policy,

    /// Print one JSON object per game followed by the summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameResult {
    pub seed: u64,
    pub score: Score,
    pub max_tile: TileValue,
    pub moves: u64,
    pub reached_target: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub mean_score: f64,
    pub best_score: Score,
    pub best_tile: TileValue,
    pub reached_target: usize,
}

impl Summary {
    pub fn from_results(results: &[GameResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let total: Score = results.iter().map(|result| result.score).sum();
        Self {
            games: results.len(),
            mean_score: total as f64 / results.len() as f64,
            best_score: results.iter().map(|result| result.score).max().unwrap_or(0),
            best_tile: results.iter().map(|result| result.max_tile).max().unwrap_or(0),
            reached_target: results.iter().filter(|result| result.reached_target).count(),
        }
    }
}

/// Plays one game to the end, continuing past the target tile.
pub fn play_game(config: GameConfig, seed: u64, policy: Policy) -> Result<GameResult> {
    let mut engine = PlayEngine::with_seed(config, seed)?;
    let mut rng = SmallRng::seed_from_u64(seed.rotate_left(32));
    let mut moves = 0;
    let mut reached_target = false;

    while !engine.is_over() {
        engine.keep_playing();
        let Some(direction) = policy.choose(&engine, &mut rng) else {
            break;
        };
        let report = engine
            .play(direction)
            .with_context(|| format!("move {} in game {}", moves, seed))?;
        if report.outcome.has_update() {
            moves += 1;
        }
        reached_target |= report.outcome == MoveOutcome::ReachedTarget;
    }

    Ok(GameResult {
        seed,
        score: engine.score(),
        max_tile: engine.max_tile().unwrap_or(0),
        moves,
        reached_target,
    })
}

pub fn run_auto<W: Write>(args: AutoArgs, mut output: W) -> Result<()> {
    let (config, seed) = args.game.resolve()?;
    log::info!(
        "playing {} games with {:?} policy, base seed {}",
        args.games,
        args.policy,
        seed
    );

    let mut results = Vec::with_capacity(args.games);
    for index in 0..args.games {
        let game_seed = seed.wrapping_add(index as u64);
        let result = play_game(config, game_seed, args.policy)?;
        if args.json {
            writeln!(output, "{}", serde_json::to_string(&result)?)?;
        } else {
            writeln!(
                output,
                "game {:>3}: score {:>7}, max tile {:>5}, {} moves",
                index + 1,
                result.score,
                result.max_tile,
                result.moves
            )?;
        }
        results.push(result);
    }

    let summary = Summary::from_results(&results);
    if args.json {
        writeln!(output, "{}", serde_json::to_string(&summary)?)?;
    } else {
        writeln!(
            output,
            "{} games, mean score {:.1}, best score {}, best tile {}, target reached {} times",
            summary.games,
            summary.mean_score,
            summary.best_score,
            summary.best_tile,
            summary.reached_target
        )?;
    }
    Ok(())
}
