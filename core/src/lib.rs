#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use direction::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use input::*;
pub use moves::*;
pub use spawn::*;
pub use tile::*;
pub use types::*;

mod direction;
mod engine;
mod error;
mod grid;
mod input;
mod moves;
mod spawn;
mod tile;
mod types;

/// Largest supported grid dimension.
pub const MAX_SIZE: Coord = 16;

/// Chance of a freshly spawned tile being a 4 rather than a 2.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square grid.
    pub size: Coord,
    /// Tile value that counts as reaching the goal, `None` plays endlessly.
    pub target: Option<TileValue>,
    /// Tiles placed on an empty grid at the start of every game.
    pub start_tiles: CellCount,
    pub four_probability: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(4, Some(2048), 2, DEFAULT_FOUR_PROBABILITY)
    }
}

impl GameConfig {
    pub const fn new_unchecked(
        size: Coord,
        target: Option<TileValue>,
        start_tiles: CellCount,
        four_probability: f64,
    ) -> Self {
        Self {
            size,
            target,
            start_tiles,
            four_probability,
        }
    }

    /// Builds a config, clamping every field into its supported range.
    pub fn new(
        size: Coord,
        target: Option<TileValue>,
        start_tiles: CellCount,
        four_probability: f64,
    ) -> Self {
        let clamped_size = size.clamp(1, MAX_SIZE);
        if clamped_size != size {
            log::warn!("Grid size {} out of range, using {}", size, clamped_size);
        }
        let total = mult(clamped_size, clamped_size);
        let clamped_start = start_tiles.clamp(1, total);
        if clamped_start != start_tiles {
            log::warn!(
                "Cannot start with {} tiles on {} cells, using {}",
                start_tiles,
                total,
                clamped_start
            );
        }
        let four_probability = if four_probability.is_nan() {
            DEFAULT_FOUR_PROBABILITY
        } else {
            four_probability.clamp(0.0, 1.0)
        };
        Self::new_unchecked(clamped_size, target, clamped_start, four_probability)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }

    pub fn validate(self) -> Result<Self> {
        if self.size == 0 || self.size > MAX_SIZE {
            return Err(GameError::InvalidSize);
        }
        if self.start_tiles == 0 || self.start_tiles > self.total_cells() {
            return Err(GameError::InvalidSize);
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidSize);
        }
        Ok(self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The direction was illegal or no direction was given, nothing changed.
    NoChange,
    Moved,
    /// A merge produced the target tile for the first time.
    ReachedTarget,
    /// No direction is legal after the spawn.
    GameOver,
}

impl MoveOutcome {
    pub const fn has_update(self) -> bool {
        use MoveOutcome::*;
        match self {
            NoChange => false,
            Moved => true,
            ReachedTarget => true,
            GameOver => true,
        }
    }
}
