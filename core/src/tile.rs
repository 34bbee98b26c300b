use serde::{Deserialize, Serialize};

use crate::*;

/// Session-unique handle a renderer can key its visual element on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    value: TileValue,
}

impl Tile {
    /// Whether `value` can be carried by a tile.
    pub const fn is_valid_value(value: TileValue) -> bool {
        value >= 2 && value.is_power_of_two()
    }

    pub(crate) const fn new(id: TileId, value: TileValue) -> Self {
        Self { id, value }
    }

    pub const fn id(self) -> TileId {
        self.id
    }

    pub const fn value(self) -> TileValue {
        self.value
    }

    /// Base-2 logarithm of the value, 1 for a 2-tile.
    pub const fn rank(self) -> u32 {
        self.value.trailing_zeros()
    }

    pub(crate) fn double(&mut self) -> TileValue {
        self.value = self.value.saturating_mul(2);
        self.value
    }
}

/// A grid slot. The `merged` flag only lives for the duration of one move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    tile: Option<Tile>,
    merged: bool,
}

impl Cell {
    pub(crate) const fn new(coords: Coord2) -> Self {
        Self {
            coords,
            tile: None,
            merged: false,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn tile(&self) -> Option<Tile> {
        self.tile
    }

    pub const fn value(&self) -> Option<TileValue> {
        match self.tile {
            Some(tile) => Some(tile.value),
            None => None,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.tile.is_none()
    }

    pub const fn merged_this_turn(&self) -> bool {
        self.merged
    }

    pub(crate) fn tile_mut(&mut self) -> Option<&mut Tile> {
        self.tile.as_mut()
    }

    pub(crate) fn put(&mut self, tile: Tile) -> Option<Tile> {
        self.tile.replace(tile)
    }

    pub(crate) fn take(&mut self) -> Option<Tile> {
        self.tile.take()
    }

    pub(crate) fn set_merged(&mut self, merged: bool) {
        self.merged = merged;
    }

    pub(crate) fn reset(&mut self) {
        self.tile = None;
        self.merged = false;
    }
}
