use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// One row or column of cell coordinates, ordered so the last entry is the edge tiles move toward.
pub type Group = SmallVec<[Coord2; 8]>;

/// A square board of cells indexed by `(x, y)`. Cells are created once, only occupancy changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    cells: Array2<Cell>,
    next_tile_id: u32,
}

/// Unchecked serialized form of a [`Grid`].
#[derive(Deserialize)]
struct GridData {
    cells: Array2<Cell>,
    next_tile_id: u32,
}

impl TryFrom<GridData> for Grid {
    type Error = GameError;

    fn try_from(GridData { cells, next_tile_id }: GridData) -> Result<Self> {
        let (width, height) = cells.dim();
        if width != height || width == 0 || width > usize::from(MAX_SIZE) {
            return Err(GameError::InvalidBoardShape);
        }

        let mut max_id = None;
        for ((x, y), cell) in cells.indexed_iter() {
            if cell.coords() != (x as Coord, y as Coord) || cell.merged_this_turn() {
                return Err(GameError::InvalidBoardShape);
            }
            if let Some(tile) = cell.tile() {
                if !Tile::is_valid_value(tile.value()) {
                    return Err(GameError::InvalidValue);
                }
                max_id = max_id.max(Some(tile.id().0));
            }
        }

        // keep fresh ids distinct from the ones already on the board
        let next_tile_id = match max_id {
            Some(max_id) => next_tile_id.max(max_id.wrapping_add(1)),
            None => next_tile_id,
        };
        Ok(Self {
            cells,
            next_tile_id,
        })
    }
}

impl Grid {
    pub fn new(size: Coord) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(GameError::InvalidSize);
        }
        let dim = usize::from(size);
        let cells = Array2::from_shape_fn((dim, dim), |(x, y)| Cell::new((x as Coord, y as Coord)));
        Ok(Self {
            cells,
            next_tile_id: 0,
        })
    }

    /// Builds a grid from rows listed top to bottom, `0` marks an empty cell.
    pub fn from_rows<R: AsRef<[TileValue]>>(rows: &[R]) -> Result<Self> {
        let size: Coord = rows.len().try_into().map_err(|_| GameError::InvalidSize)?;
        let mut grid = Self::new(size)?;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != rows.len() {
                return Err(GameError::InvalidSize);
            }
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    grid.place((x as Coord, y as Coord), value)?;
                }
            }
        }

        Ok(grid)
    }

    pub fn size(&self) -> Coord {
        self.cells.dim().0 as Coord
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size(), self.size())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self.cells[coords.to_nd_index()])
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.cells
            .get(coords.to_nd_index())
            .and_then(|cell| cell.tile())
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.tile().map(|tile| (cell.coords(), tile)))
    }

    /// Empty cells in storage order, column by column.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.is_empty())
            .map(|cell| cell.coords())
    }

    pub fn empty_count(&self) -> CellCount {
        self.empty_cells().count() as CellCount
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn tile_sum(&self) -> u64 {
        self.tiles().map(|(_, tile)| u64::from(tile.value())).sum()
    }

    pub fn max_tile(&self) -> Option<TileValue> {
        self.tiles().map(|(_, tile)| tile.value()).max()
    }

    /// Puts a new tile with `value` into the empty cell at `coords`.
    pub fn place(&mut self, coords: Coord2, value: TileValue) -> Result<Tile> {
        let coords = self.validate_coords(coords)?;
        if !Tile::is_valid_value(value) {
            return Err(GameError::InvalidValue);
        }
        if !self[coords].is_empty() {
            return Err(GameError::CellOccupied);
        }
        let tile = Tile::new(TileId(self.next_tile_id), value);
        self.next_tile_id = self.next_tile_id.wrapping_add(1);
        self.cell_mut(coords).put(tile);
        Ok(tile)
    }

    pub fn pick_random_empty_cell(&self, spawner: &mut impl TileSpawner) -> Result<Coord2> {
        let empty = self.empty_count();
        if empty == 0 {
            return Err(GameError::NoEmptyCell);
        }
        let index = spawner.choose(usize::from(empty));
        self.empty_cells().nth(index).ok_or(GameError::NoEmptyCell)
    }

    pub fn spawn_random(&mut self, spawner: &mut impl TileSpawner) -> Result<(Coord2, Tile)> {
        let coords = self.pick_random_empty_cell(spawner)?;
        let tile = self.place(coords, spawner.roll_value())?;
        log::debug!("spawned {} at {:?}", tile.value(), coords);
        Ok((coords, tile))
    }

    /// One group per row, cells ordered left to right (right to left when `reversed`).
    pub fn groups_by_row(&self, reversed: bool) -> Vec<Group> {
        let size = self.size();
        (0..size)
            .map(|y| make_group(size, reversed, |i| (i, y)))
            .collect()
    }

    /// One group per column, cells ordered top to bottom (bottom to top when `reversed`).
    pub fn groups_by_column(&self, reversed: bool) -> Vec<Group> {
        let size = self.size();
        (0..size)
            .map(|x| make_group(size, reversed, |i| (x, i)))
            .collect()
    }

    pub fn groups(&self, direction: Direction) -> Vec<Group> {
        match direction.grouping() {
            (Grouping::ByRow, reversed) => self.groups_by_row(reversed),
            (Grouping::ByColumn, reversed) => self.groups_by_column(reversed),
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(Cell::reset);
    }

    /// Tile values row by row, `0` for empty cells.
    pub fn values(&self) -> Vec<Vec<TileValue>> {
        let size = self.size();
        (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| self[(x, y)].value().unwrap_or(0))
                    .collect()
            })
            .collect()
    }
}

fn make_group(size: Coord, reversed: bool, coords: impl Fn(Coord) -> Coord2) -> Group {
    if reversed {
        (0..size).rev().map(coords).collect()
    } else {
        (0..size).map(coords).collect()
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .max_tile()
            .map(|value| value.checked_ilog10().unwrap_or(0) as usize + 1)
            .unwrap_or(1);
        let size = self.size();

        for y in 0..size {
            for x in 0..size {
                if x > 0 {
                    f.write_str(" ")?;
                }
                match self[(x, y)].value() {
                    Some(value) => write!(f, "{value:>width$}")?,
                    None => write!(f, "{:>width$}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    struct FirstSlot;

    impl TileSpawner for FirstSlot {
        fn choose(&mut self, _candidates: usize) -> usize {
            0
        }

        fn roll_value(&mut self) -> TileValue {
            2
        }
    }

    #[test]
    fn new_rejects_zero_size() {
        assert_eq!(Grid::new(0), Err(GameError::InvalidSize));
    }

    #[test]
    fn cells_keep_their_coordinates() {
        let grid = Grid::new(3).unwrap();

        assert_eq!(grid.cell_at((2, 1)).unwrap().coords(), (2, 1));
        assert_eq!(grid.cells().count(), 9);
    }

    #[test]
    fn cell_at_out_of_bounds() {
        let grid = Grid::new(4).unwrap();

        assert_eq!(grid.cell_at((4, 0)), Err(GameError::OutOfBounds));
        assert_eq!(grid.cell_at((0, 4)), Err(GameError::OutOfBounds));
    }

    #[test]
    fn from_rows_places_tiles_by_row() {
        let grid = Grid::from_rows(&[[0, 2], [4, 0]]).unwrap();

        assert_eq!(grid.tile_at((1, 0)).map(Tile::value), Some(2));
        assert_eq!(grid.tile_at((0, 1)).map(Tile::value), Some(4));
        assert_eq!(grid.values(), vec![vec![0, 2], vec![4, 0]]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows: [&[TileValue]; 2] = [&[0, 2], &[4]];

        assert_eq!(Grid::from_rows(&rows), Err(GameError::InvalidSize));
    }

    #[test]
    fn place_rejects_values_that_are_not_powers_of_two() {
        let mut grid = Grid::new(2).unwrap();

        assert_eq!(grid.place((0, 0), 3), Err(GameError::InvalidValue));
        assert_eq!(grid.place((0, 0), 1), Err(GameError::InvalidValue));
        assert_eq!(grid.place((0, 0), 6), Err(GameError::InvalidValue));
        assert_eq!(grid.place((0, 0), 8).map(Tile::value), Ok(8));
        assert_eq!(Grid::from_rows(&[[3, 3], [0, 0]]), Err(GameError::InvalidValue));
    }

    #[test]
    fn place_rejects_occupied_cell() {
        let mut grid = Grid::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let existing = grid.tile_at((0, 0));

        assert_eq!(grid.place((0, 0), 4), Err(GameError::CellOccupied));
        assert_eq!(grid.tile_at((0, 0)), existing);
    }

    #[test]
    fn serialized_grid_round_trips() {
        let grid = Grid::from_rows(&[[2, 0, 4], [0, 8, 0], [0, 0, 16]]).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let mut restored: Grid = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, grid);
        let fresh = restored.place((1, 0), 2).unwrap();
        assert!(grid.tiles().all(|(_, tile)| tile.id() != fresh.id()));
    }

    #[test]
    fn deserialize_rejects_non_square_cells() {
        let grid = Grid::new(3).unwrap();
        let mut value = serde_json::to_value(&grid).unwrap();
        value["cells"]["dim"] = serde_json::json!([3, 2]);
        value["cells"]["data"].as_array_mut().unwrap().truncate(6);

        let restored = serde_json::from_value::<Grid>(value);

        assert!(restored.is_err());
    }

    #[test]
    fn deserialize_rejects_mismatched_coords_and_values() {
        let grid = Grid::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let value = serde_json::to_value(&grid).unwrap();

        let mut swapped = value.clone();
        swapped["cells"]["data"].as_array_mut().unwrap().swap(0, 1);
        assert!(serde_json::from_value::<Grid>(swapped).is_err());

        let mut odd = value;
        odd["cells"]["data"][0]["tile"]["value"] = serde_json::json!(3);
        assert!(serde_json::from_value::<Grid>(odd).is_err());
    }

    #[test]
    fn empty_cells_lists_every_unoccupied_cell() {
        let grid = Grid::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let empty: Vec<_> = grid.empty_cells().collect();

        assert_eq!(empty, vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(grid.empty_count(), 3);
    }

    #[test]
    fn groups_by_row_respects_reversal() {
        let grid = Grid::new(3).unwrap();

        let rows = grid.groups_by_row(false);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].as_slice(), &[(0, 1), (1, 1), (2, 1)]);

        let reversed = grid.groups_by_row(true);
        assert_eq!(reversed[1].as_slice(), &[(2, 1), (1, 1), (0, 1)]);
    }

    #[test]
    fn groups_by_column_respects_reversal() {
        let grid = Grid::new(3).unwrap();

        let columns = grid.groups_by_column(false);
        assert_eq!(columns[2].as_slice(), &[(2, 0), (2, 1), (2, 2)]);

        let reversed = grid.groups_by_column(true);
        assert_eq!(reversed[2].as_slice(), &[(2, 2), (2, 1), (2, 0)]);
    }

    #[test]
    fn groups_end_at_destination_edge() {
        let grid = Grid::new(4).unwrap();

        assert_eq!(grid.groups(Direction::Up)[0].last(), Some(&(0, 0)));
        assert_eq!(grid.groups(Direction::Down)[0].last(), Some(&(0, 3)));
        assert_eq!(grid.groups(Direction::Left)[0].last(), Some(&(0, 0)));
        assert_eq!(grid.groups(Direction::Right)[0].last(), Some(&(3, 0)));
    }

    #[test]
    fn spawn_fills_empty_cell_with_fresh_id() {
        let mut grid = Grid::from_rows(&[[2, 0], [0, 0]]).unwrap();

        let (coords, tile) = grid.spawn_random(&mut FirstSlot).unwrap();

        assert_eq!(coords, (0, 1));
        assert_eq!(tile.value(), 2);
        assert_ne!(tile.id(), grid.tile_at((0, 0)).unwrap().id());
    }

    #[test]
    fn spawn_on_full_grid_fails() {
        let mut grid = Grid::from_rows(&[[2, 4], [8, 16]]).unwrap();

        assert_eq!(
            grid.spawn_random(&mut FirstSlot),
            Err(GameError::NoEmptyCell)
        );
    }

    #[test]
    fn clear_removes_tiles_and_flags() {
        let mut grid = Grid::from_rows(&[[2, 4], [8, 16]]).unwrap();
        grid.cell_mut((1, 1)).set_merged(true);

        grid.clear();

        assert_eq!(grid.empty_count(), 4);
        assert!(grid.cells().all(|cell| !cell.merged_this_turn()));
    }

    #[test]
    fn display_aligns_columns() {
        let grid = Grid::from_rows(&[[2, 0], [128, 4]]).unwrap();

        assert_eq!(grid.to_string(), "  2   .\n128   4\n");
    }
}
