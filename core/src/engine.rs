use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Start tiles are placed, no move made yet.
    #[default]
    Ready,
    Active,
    /// The target tile was produced, input is paused until [`PlayEngine::keep_playing`].
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Everything that happened during one input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub gained: Score,
    pub events: Vec<TileEvent>,
}

impl MoveReport {
    pub const fn no_change() -> Self {
        Self {
            outcome: MoveOutcome::NoChange,
            gained: 0,
            events: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub x: Coord,
    pub y: Coord,
    pub value: TileValue,
}

/// Renderer-facing view of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: Coord,
    pub score: Score,
    pub state: EngineState,
    pub tiles: Vec<TileView>,
}

/// A game session: owns the grid, the score and the spawner.
#[derive(Clone, Debug)]
pub struct PlayEngine<S = RandomSpawner> {
    config: GameConfig,
    grid: Grid,
    score: Score,
    state: EngineState,
    target_reached: bool,
    spawner: S,
}

impl PlayEngine<RandomSpawner> {
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::new(config, RandomSpawner::from_config(seed, &config))
    }
}

impl<S: TileSpawner> PlayEngine<S> {
    pub fn new(config: GameConfig, spawner: S) -> Result<Self> {
        let config = config.validate()?;
        let mut engine = Self {
            config,
            grid: Grid::new(config.size)?,
            score: 0,
            state: Default::default(),
            target_reached: false,
            spawner,
        };
        engine.restart()?;
        Ok(engine)
    }

    /// Starts from an existing board, useful to resume or to set up positions.
    pub fn from_grid(config: GameConfig, grid: Grid, spawner: S) -> Result<Self> {
        let config = GameConfig { size: grid.size(), ..config }.validate()?;
        let target_reached = config
            .target
            .zip(grid.max_tile())
            .is_some_and(|(target, max)| max >= target);
        let mut engine = Self {
            config,
            grid,
            score: 0,
            state: EngineState::Active,
            target_reached,
            spawner,
        };
        if !engine.has_any_move() {
            engine.state = EngineState::Lost;
        }
        Ok(engine)
    }

    /// Clears the board and score, then places the start tiles.
    pub fn restart(&mut self) -> Result<()> {
        self.grid.clear();
        self.score = 0;
        self.target_reached = false;
        self.state = EngineState::Ready;

        for _ in 0..self.config.start_tiles {
            self.grid.spawn_random(&mut self.spawner)?;
        }

        if !self.has_any_move() {
            log::info!("No move possible right after start");
            self.state = EngineState::Lost;
        }
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, EngineState::Lost)
    }

    pub fn max_tile(&self) -> Option<TileValue> {
        self.grid.max_tile()
    }

    pub fn can_move(&self, direction: Direction) -> bool {
        moves::can_move(&self.grid, &self.grid.groups(direction))
    }

    pub fn has_any_move(&self) -> bool {
        Direction::ALL
            .into_iter()
            .any(|direction| self.can_move(direction))
    }

    pub fn legal_moves(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(|&direction| self.can_move(direction))
    }

    /// Score a move would gain without spawning anything, `None` when illegal.
    pub fn preview(&self, direction: Direction) -> Option<Score> {
        let mut grid = self.grid.clone();
        let mut events = Vec::new();
        moves::shift(&mut grid, direction, &mut events)
    }

    /// Resumes after the target tile was reached.
    pub fn keep_playing(&mut self) {
        if matches!(self.state, EngineState::Won) {
            log::debug!("continuing past the target tile");
            self.state = EngineState::Active;
        }
    }

    pub fn handle_input(&mut self, direction: Option<Direction>) -> Result<MoveReport> {
        match direction {
            Some(direction) => self.play(direction),
            None => Ok(MoveReport::no_change()),
        }
    }

    /// Unknown keys are ignored.
    pub fn handle_key(&mut self, key: &str) -> Result<MoveReport> {
        match Direction::from_key(key) {
            Ok(direction) => self.play(direction),
            Err(err) => {
                log::trace!("ignoring key {:?}: {}", key, err);
                Ok(MoveReport::no_change())
            }
        }
    }

    /// Executes one full turn: move, merge resolution, spawn and game over check.
    pub fn play(&mut self, direction: Direction) -> Result<MoveReport> {
        self.check_not_finished()?;

        let groups = self.grid.groups(direction);
        if !moves::can_move(&self.grid, &groups) {
            log::trace!("move {} is not possible", direction);
            return Ok(MoveReport::no_change());
        }

        let mut events = Vec::new();
        moves::apply_move(&mut self.grid, &groups, &mut events);
        let gained = moves::resolve_merges(&mut self.grid, &mut events);
        self.score += gained;
        log::debug!("moved {}, gained {}, score {}", direction, gained, self.score);

        let (at, tile) = self.grid.spawn_random(&mut self.spawner)?;
        events.push(TileEvent::Spawned {
            id: tile.id(),
            at,
            value: tile.value(),
        });

        let reached_target = !self.target_reached
            && self.config.target.is_some_and(|target| {
                events.iter().any(|event| {
                    matches!(event, TileEvent::Merged { value, .. } if *value >= target)
                })
            });

        let outcome = if !self.has_any_move() {
            log::info!("game over with score {}", self.score);
            self.state = EngineState::Lost;
            MoveOutcome::GameOver
        } else if reached_target {
            log::info!("target tile reached with score {}", self.score);
            self.target_reached = true;
            self.state = EngineState::Won;
            MoveOutcome::ReachedTarget
        } else {
            self.state = EngineState::Active;
            MoveOutcome::Moved
        };

        Ok(MoveReport {
            outcome,
            gained,
            events,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.grid.size(),
            score: self.score,
            state: self.state,
            tiles: self
                .grid
                .tiles()
                .map(|((x, y), tile)| TileView {
                    id: tile.id(),
                    x,
                    y,
                    value: tile.value(),
                })
                .collect(),
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::vec;

    /// Spawns into the first empty cell, cycling through the given values.
    #[derive(Clone, Debug)]
    struct Scripted {
        values: VecDeque<TileValue>,
    }

    impl Scripted {
        fn new(values: &[TileValue]) -> Self {
            Self {
                values: values.iter().copied().collect(),
            }
        }
    }

    impl TileSpawner for Scripted {
        fn choose(&mut self, _candidates: usize) -> usize {
            0
        }

        fn roll_value(&mut self) -> TileValue {
            let value = self.values.pop_front().unwrap_or(2);
            self.values.push_back(value);
            value
        }
    }

    fn config(size: Coord, target: Option<TileValue>) -> GameConfig {
        GameConfig::new_unchecked(size, target, 2, 0.1)
    }

    fn engine(rows: &[[TileValue; 4]], target: Option<TileValue>) -> PlayEngine<Scripted> {
        let grid = Grid::from_rows(rows).unwrap();
        PlayEngine::from_grid(config(4, target), grid, Scripted::new(&[2])).unwrap()
    }

    #[test]
    fn new_game_starts_with_two_tiles_and_zero_score() {
        let engine = PlayEngine::with_seed(GameConfig::default(), 42).unwrap();

        assert_eq!(engine.grid().tiles().count(), 2);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(EngineState::default(), EngineState::Ready);
        assert!(engine.has_any_move());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = PlayEngine::with_seed(config(0, None), 1);

        assert_eq!(result.err(), Some(GameError::InvalidSize));
    }

    #[test]
    fn legal_move_merges_scores_and_spawns() {
        let mut engine = engine(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], None);

        let report = engine.play(Direction::Right).unwrap();

        assert_eq!(report.outcome, MoveOutcome::Moved);
        assert_eq!(report.gained, 4);
        assert_eq!(engine.score(), 4);
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.grid().tile_at((3, 0)).map(Tile::value), Some(4));
        assert_eq!(engine.grid().tiles().count(), 2);
        assert!(matches!(report.events.last(), Some(TileEvent::Spawned { value: 2, .. })));
    }

    #[test]
    fn illegal_move_does_not_spawn() {
        let mut engine = engine(&[[0, 0, 4, 2], [0; 4], [0; 4], [0; 4]], None);

        let report = engine.play(Direction::Right).unwrap();

        assert_eq!(report, MoveReport::no_change());
        assert_eq!(engine.grid().tiles().count(), 2);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn unknown_key_and_noop_are_ignored() {
        let mut engine = engine(&[[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]], None);

        assert_eq!(engine.handle_key("Escape").unwrap(), MoveReport::no_change());
        assert_eq!(engine.handle_input(None).unwrap(), MoveReport::no_change());
        assert_eq!(engine.grid().tiles().count(), 1);

        let report = engine.handle_key("ArrowDown").unwrap();
        assert_eq!(report.outcome, MoveOutcome::Moved);
    }

    #[test]
    fn filling_the_last_gap_without_moves_ends_the_game() {
        let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [0, 8, 16, 32]];
        let grid = Grid::from_rows(&rows).unwrap();
        let mut engine =
            PlayEngine::from_grid(config(4, None), grid, Scripted::new(&[64])).unwrap();

        let report = engine.play(Direction::Left).unwrap();

        assert_eq!(report.outcome, MoveOutcome::GameOver);
        assert_eq!(engine.grid().values()[3], vec![8, 16, 32, 64]);
        assert!(!engine.has_any_move());
        assert!(engine.is_over());
        assert_eq!(engine.play(Direction::Up), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn restart_clears_score_and_resumes_input() {
        let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let grid = Grid::from_rows(&rows).unwrap();
        let mut engine = PlayEngine::from_grid(config(4, None), grid, Scripted::new(&[2])).unwrap();
        assert!(engine.is_over());

        engine.restart().unwrap();

        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.grid().tiles().count(), 2);
        assert!(engine.handle_key("d").is_ok());
    }

    #[test]
    fn reaching_target_pauses_until_keep_playing() {
        let mut engine = engine(&[[0, 0, 8, 8], [0; 4], [0; 4], [0; 4]], Some(16));

        let report = engine.play(Direction::Right).unwrap();

        assert_eq!(report.outcome, MoveOutcome::ReachedTarget);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.play(Direction::Left), Err(GameError::AlreadyEnded));

        engine.keep_playing();
        assert_eq!(engine.state(), EngineState::Active);

        engine.play(Direction::Left).unwrap();
        let report = engine.play(Direction::Right).unwrap();
        assert_ne!(report.outcome, MoveOutcome::ReachedTarget);
    }

    #[test]
    fn preview_matches_play_without_side_effects() {
        let engine = engine(&[[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]], None);

        assert_eq!(engine.preview(Direction::Left), Some(12));
        assert_eq!(engine.preview(Direction::Down), Some(0));
        assert_eq!(engine.preview(Direction::Up), None);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.grid().tiles().count(), 4);
    }

    #[test]
    fn legal_moves_lists_only_possible_directions() {
        let engine = engine(&[[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]], None);
        let moves: Vec<_> = engine.legal_moves().collect();

        assert_eq!(moves, vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn score_only_increases_over_a_seeded_game() {
        let mut engine = PlayEngine::with_seed(GameConfig::default(), 7).unwrap();
        let mut last_score = 0;
        let mut turns = 0;

        while !engine.is_finished() && turns < 5000 {
            let direction = Direction::ALL[turns % 4];
            let before = engine.grid().tile_sum();
            let report = engine.play(direction).unwrap();
            if report.outcome.has_update() {
                let spawned = report
                    .events
                    .iter()
                    .find_map(|event| match *event {
                        TileEvent::Spawned { value, .. } => Some(u64::from(value)),
                        _ => None,
                    })
                    .unwrap();
                assert_eq!(engine.grid().tile_sum(), before + spawned);
            }
            assert!(engine.score() >= last_score);
            last_score = engine.score();
            turns += 1;
        }

        assert!(engine.max_tile().unwrap() >= 4);
    }

    #[test]
    fn snapshot_serializes_tiles() {
        let engine = engine(&[[2, 0, 0, 0], [0, 0, 0, 4], [0; 4], [0; 4]], None);

        let snapshot = engine.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(snapshot.tiles.len(), 2);
        assert_eq!(json["size"], 4);
        assert_eq!(json["state"], "Active");
        assert_eq!(json["tiles"][1]["value"], 4);
        assert_eq!(json["tiles"][1]["x"], 3);
    }
}
