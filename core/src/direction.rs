use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// How a direction slices the grid into groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grouping {
    ByRow,
    ByColumn,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grouping and reversal that put the destination edge at the end of every group.
    pub const fn grouping(self) -> (Grouping, bool) {
        use Direction::*;
        match self {
            Up => (Grouping::ByColumn, true),
            Down => (Grouping::ByColumn, false),
            Left => (Grouping::ByRow, true),
            Right => (Grouping::ByRow, false),
        }
    }

    pub const fn name(self) -> &'static str {
        use Direction::*;
        match self {
            Up => "up",
            Down => "down",
            Left => "left",
            Right => "right",
        }
    }

    /// Translates a key name (`ArrowUp`, `w`, `k`, `up`, ...) into a direction.
    pub fn from_key(key: &str) -> Result<Self> {
        use Direction::*;

        let direction = match key {
            "ArrowUp" => Up,
            "ArrowDown" => Down,
            "ArrowLeft" => Left,
            "ArrowRight" => Right,
            _ => {
                const ALIASES: [(&str, Direction); 12] = [
                    ("w", Up),
                    ("s", Down),
                    ("a", Left),
                    ("d", Right),
                    ("k", Up),
                    ("j", Down),
                    ("h", Left),
                    ("l", Right),
                    ("up", Up),
                    ("down", Down),
                    ("left", Left),
                    ("right", Right),
                ];
                ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
                    .map(|&(_, direction)| direction)
                    .ok_or(GameError::InvalidDirection)?
            }
        };
        Ok(direction)
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s.trim())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
