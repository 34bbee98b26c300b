//! Compaction and merge rules over groups of cells.
//!
//! Every group is scanned from its second-to-last cell back to the first, each tile sliding toward
//! the end of its group. Merging happens in two phases: [`apply_move`] only consolidates occupancy
//! and flags the destination cell, [`resolve_merges`] doubles the flagged tiles afterwards.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Change notifications for a renderer, in the order they happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEvent {
    Spawned {
        id: TileId,
        at: Coord2,
        value: TileValue,
    },
    Moved {
        id: TileId,
        from: Coord2,
        to: Coord2,
    },
    /// The tile was consumed by a merge and no longer exists.
    Removed { id: TileId, at: Coord2 },
    /// The tile absorbed its pair and now holds `value`.
    Merged {
        id: TileId,
        at: Coord2,
        value: TileValue,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Destination {
    Slide(Coord2),
    Merge(Coord2),
}

/// Whether any tile in `groups` could slide into a gap or merge with its neighbour.
pub fn can_move(grid: &Grid, groups: &[Group]) -> bool {
    groups.iter().any(|group| group_can_move(grid, group))
}

fn group_can_move(grid: &Grid, group: &Group) -> bool {
    let Some(last) = group.len().checked_sub(1) else {
        return false;
    };

    for i in (0..last).rev() {
        let Some(current) = grid[group[i]].value() else {
            continue;
        };

        for &next in &group[i + 1..] {
            match grid[next].value() {
                None => return true,
                Some(value) if value == current => return true,
                Some(_) => break,
            }
        }
    }
    false
}

/// Slides and merges every group toward its end, returns whether anything moved.
///
/// Merged destinations are only flagged here, their values stay untouched until
/// [`resolve_merges`] runs.
pub fn apply_move(grid: &mut Grid, groups: &[Group], events: &mut Vec<TileEvent>) -> bool {
    let mut changed = false;
    for group in groups {
        changed |= apply_group(grid, group, events);
    }
    changed
}

fn apply_group(grid: &mut Grid, group: &Group, events: &mut Vec<TileEvent>) -> bool {
    let Some(last) = group.len().checked_sub(1) else {
        return false;
    };
    let mut changed = false;

    for i in (0..last).rev() {
        let from = group[i];
        let Some(current) = grid[from].tile() else {
            continue;
        };

        let mut destination = None;
        for &next in &group[i + 1..] {
            let cell = &grid[next];
            if cell.merged_this_turn() {
                break;
            }
            if let Some(other) = cell.tile() {
                if other.value() == current.value() {
                    destination = Some(Destination::Merge(next));
                }
                break;
            }
            destination = Some(Destination::Slide(next));
        }

        let Some(destination) = destination else {
            continue;
        };

        grid.cell_mut(from).take();
        match destination {
            Destination::Slide(to) => {
                grid.cell_mut(to).put(current);
                events.push(TileEvent::Moved {
                    id: current.id(),
                    from,
                    to,
                });
            }
            Destination::Merge(to) => {
                let cell = grid.cell_mut(to);
                let consumed = cell.put(current);
                cell.set_merged(true);
                events.push(TileEvent::Moved {
                    id: current.id(),
                    from,
                    to,
                });
                if let Some(consumed) = consumed {
                    events.push(TileEvent::Removed {
                        id: consumed.id(),
                        at: to,
                    });
                }
            }
        }
        changed = true;
    }
    changed
}

/// Doubles every tile flagged by a merge, clears the flags and returns the score gained.
pub fn resolve_merges(grid: &mut Grid, events: &mut Vec<TileEvent>) -> Score {
    let size = grid.size();
    let mut gained: Score = 0;

    for x in 0..size {
        for y in 0..size {
            let cell = grid.cell_mut((x, y));
            if !cell.merged_this_turn() {
                continue;
            }
            cell.set_merged(false);
            if let Some(tile) = cell.tile_mut() {
                let value = tile.double();
                gained += Score::from(value);
                events.push(TileEvent::Merged {
                    id: tile.id(),
                    at: (x, y),
                    value,
                });
            }
        }
    }
    gained
}

/// Runs a full move in `direction` on `grid`, returning the score gained or `None` when illegal.
pub fn shift(grid: &mut Grid, direction: Direction, events: &mut Vec<TileEvent>) -> Option<Score> {
    let groups = grid.groups(direction);
    if !can_move(grid, &groups) {
        return None;
    }
    apply_move(grid, &groups, events);
    Some(resolve_merges(grid, events))
}
