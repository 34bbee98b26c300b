use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use twofold_core::{Coord, GameConfig, TileValue};

/// Contents of a `--config` TOML file.
///
/// ```toml
/// seed = 1234
///
/// [game]
/// size = 5
/// target = 4096
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Settings {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Clone, Debug, Default, Args)]
pub struct GameArgs {
    /// TOML file with a `seed` and a `[game]` table
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Grid width and height
    #[arg(long, value_name = "N")]
    pub size: Option<Coord>,

    /// Seed for tile spawning (random when omitted)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Tile value that wins the game
    #[arg(long, value_name = "VALUE", conflicts_with = "endless")]
    pub target: Option<TileValue>,

    /// Play without a target tile
    #[arg(long)]
    pub endless: bool,
}

impl GameArgs {
    /// Merges the config file with command line overrides and picks a seed.
    pub fn resolve(&self) -> Result<(GameConfig, u64)> {
        let settings = match &self.config {
            Some(path) => Settings::from_toml(path)?,
            None => Settings::default(),
        };
        let mut game = settings.game;

        if let Some(size) = self.size {
            game.size = size;
        }
        if let Some(target) = self.target {
            game.target = Some(target);
        }
        if self.endless {
            game.target = None;
        }

        let config = GameConfig::new(
            game.size,
            game.target,
            game.start_tiles,
            game.four_probability,
        );
        let seed = self.seed.or(settings.seed).unwrap_or_else(rand::random);
        Ok((config, seed))
    }
}
