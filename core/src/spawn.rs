use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Source of randomness for new tiles.
pub trait TileSpawner {
    /// Picks an index in `0..candidates`, `candidates` is never zero.
    fn choose(&mut self, candidates: usize) -> usize;

    /// Value of the next spawned tile.
    fn roll_value(&mut self) -> TileValue;
}

impl<T: TileSpawner + ?Sized> TileSpawner for &mut T {
    fn choose(&mut self, candidates: usize) -> usize {
        (**self).choose(candidates)
    }

    fn roll_value(&mut self) -> TileValue {
        (**self).roll_value()
    }
}

/// Uniform cell choice, spawns a 4 with `four_probability` and a 2 otherwise.
#[derive(Clone, Debug)]
pub struct RandomSpawner {
    rng: SmallRng,
    four_probability: f64,
}

impl RandomSpawner {
    pub fn new(seed: u64) -> Self {
        Self::with_four_probability(seed, DEFAULT_FOUR_PROBABILITY)
    }

    pub fn with_four_probability(seed: u64, four_probability: f64) -> Self {
        let four_probability = if four_probability.is_nan() {
            DEFAULT_FOUR_PROBABILITY
        } else {
            four_probability.clamp(0.0, 1.0)
        };
        Self {
            rng: SmallRng::seed_from_u64(seed),
            four_probability,
        }
    }

    pub fn from_config(seed: u64, config: &GameConfig) -> Self {
        Self::with_four_probability(seed, config.four_probability)
    }

    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }
}

impl TileSpawner for RandomSpawner {
    fn choose(&mut self, candidates: usize) -> usize {
        self.rng.random_range(0..candidates)
    }

    fn roll_value(&mut self) -> TileValue {
        if self.rng.random_bool(self.four_probability) {
            4
        } else {
            2
        }
    }
}
