//! Known state of the opponent board: cell statuses plus the ship inventory.

use crate::bitboard::{BitBoard, Mask};
use crate::common::{BoardError, ShipId, Shot};
use crate::ship::{Placement, ShipSpec};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// Largest fleet the text format can name (`A`..`Z`).
pub const MAX_SHIPS: usize = 26;

/// What is known about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Unknown,
    Miss,
    Hit,
    /// Part of a ship known to be sunk.
    Sunk(ShipId),
}

impl Cell {
    fn symbol(&self) -> char {
        match self {
            Cell::Unknown => '.',
            Cell::Miss => 'o',
            Cell::Hit => 'x',
            Cell::Sunk(id) if *id < MAX_SHIPS => (b'A' + *id as u8) as char,
            Cell::Sunk(_) => '?',
        }
    }

    fn from_symbol(ch: char) -> Option<Cell> {
        match ch {
            '.' => Some(Cell::Unknown),
            'o' => Some(Cell::Miss),
            'x' => Some(Cell::Hit),
            'A'..='Z' => Some(Cell::Sunk(ch as usize - 'A' as usize)),
            _ => None,
        }
    }
}

/// Row-major `width×height` grid of cell statuses.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-unknown grid. Fails if the board does not fit a [`Mask`].
    pub fn new(width: usize, height: usize) -> Result<Self, BoardError> {
        Mask::try_new(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Unknown; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Status of (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, BoardError> {
        if row >= self.height || col >= self.width {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(self.cells[row * self.width + col])
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.width + col] = cell;
    }

    /// All cells as `(row, col, status)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i / width, i % width, cell))
    }

    /// Mask of the cells whose status satisfies `pred`.
    pub fn mask_where<F: Fn(Cell) -> bool>(&self, pred: F) -> Mask {
        let mut mask = BitBoard::new(self.width, self.height);
        for (r, c, cell) in self.iter() {
            if pred(cell) {
                mask.insert(r, c);
            }
        }
        mask
    }

    pub fn unknown(&self) -> Mask {
        self.mask_where(|c| c == Cell::Unknown)
    }

    pub fn misses(&self) -> Mask {
        self.mask_where(|c| c == Cell::Miss)
    }

    pub fn hits(&self) -> Mask {
        self.mask_where(|c| c == Cell::Hit)
    }

    /// Cells marked as part of ship `id`.
    pub fn sunk(&self, id: ShipId) -> Mask {
        self.mask_where(|c| c == Cell::Sunk(id))
    }

    /// Cells of any sunk ship.
    pub fn sunk_any(&self) -> Mask {
        self.mask_where(|c| matches!(c, Cell::Sunk(_)))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                write!(f, "{}", self.cells[r * self.width + c].symbol())?;
            }
            if r + 1 < self.height {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}:", self.width, self.height)?;
        fmt::Display::fmt(self, f)
    }
}

/// Parses the text board format: one row per line, `.` unknown, `o` miss,
/// `x` hit, `A`-`Z` sunk ship 0-25. Blank lines are ignored.
impl FromStr for Grid {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::new();
        let mut width = None;
        let mut height = 0;
        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let before = cells.len();
            for ch in line.chars().filter(|ch| !ch.is_whitespace()) {
                let cell = Cell::from_symbol(ch).ok_or(BoardError::Parse {
                    line: i + 1,
                    reason: "unrecognised cell symbol",
                })?;
                cells.push(cell);
            }
            let row_width = cells.len() - before;
            match width {
                None => width = Some(row_width),
                Some(w) if w != row_width => {
                    return Err(BoardError::Parse {
                        line: i + 1,
                        reason: "rows have different lengths",
                    })
                }
                Some(_) => {}
            }
            height += 1;
        }
        let width = width.ok_or(BoardError::Parse {
            line: 0,
            reason: "board is empty",
        })?;
        let mut grid = Grid::new(width, height)?;
        grid.cells = cells;
        Ok(grid)
    }
}

/// Grid plus fleet inventory: everything the sampler knows on a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    grid: Grid,
    ships: Vec<ShipSpec>,
}

impl BoardState {
    /// Fresh game: all cells unknown, every ship afloat.
    pub fn new(width: usize, height: usize, lengths: &[usize]) -> Result<Self, BoardError> {
        Self::with_grid(Grid::new(width, height)?, lengths)
    }

    /// Resume from a known grid. Ships with any `Sunk` cell are marked sunk.
    pub fn with_grid(grid: Grid, lengths: &[usize]) -> Result<Self, BoardError> {
        let mut ships: Vec<ShipSpec> = lengths
            .iter()
            .enumerate()
            .map(|(id, &len)| ShipSpec::new(id, len))
            .collect();
        for (_, _, cell) in grid.iter() {
            if let Cell::Sunk(id) = cell {
                let ship = ships.get_mut(id).ok_or(BoardError::UnknownShip(id))?;
                ship.sunk = true;
            }
        }
        for ship in &ships {
            if grid.sunk(ship.id).count_ones() > ship.length {
                return Err(BoardError::FootprintMismatch(ship.id));
            }
        }
        Ok(Self { grid, ships })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ships(&self) -> &[ShipSpec] {
        &self.ships
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn ship(&self, id: ShipId) -> Result<&ShipSpec, BoardError> {
        self.ships.get(id).ok_or(BoardError::UnknownShip(id))
    }

    /// Apply a confirmed shot outcome at (row, col).
    pub fn record_shot(&mut self, row: usize, col: usize, shot: Shot) -> Result<(), BoardError> {
        if self.grid.get(row, col)? != Cell::Unknown {
            return Err(BoardError::AlreadyShot { row, col });
        }
        match shot {
            Shot::Miss => self.grid.set(row, col, Cell::Miss),
            Shot::Hit => self.grid.set(row, col, Cell::Hit),
            Shot::Sunk(id) => {
                let ship = self.ships.get_mut(id).ok_or(BoardError::UnknownShip(id))?;
                if ship.sunk {
                    return Err(BoardError::ShipAlreadySunk(id));
                }
                ship.sunk = true;
                self.grid.set(row, col, Cell::Sunk(id));
            }
        }
        Ok(())
    }

    /// Mark the exact footprint of a sunk ship, for games that reveal it.
    ///
    /// Every footprint cell must already be a hit or part of the same ship.
    pub fn reveal_sunk(&mut self, placement: &Placement) -> Result<(), BoardError> {
        let id = placement.ship;
        let ship = *self.ship(id)?;
        if placement.length != ship.length || !placement.fits(self.width(), self.height()) {
            return Err(BoardError::FootprintMismatch(id));
        }
        let footprint = placement
            .mask(self.width(), self.height())
            .ok_or(BoardError::FootprintMismatch(id))?;
        let known = self.grid.sunk(id);
        if !known.is_subset(&footprint) {
            return Err(BoardError::FootprintMismatch(id));
        }
        for (r, c) in placement.cells() {
            match self.grid.get(r, c)? {
                Cell::Hit => {}
                Cell::Sunk(owner) if owner == id => {}
                _ => return Err(BoardError::FootprintMismatch(id)),
            }
        }
        for (r, c) in placement.cells() {
            self.grid.set(r, c, Cell::Sunk(id));
        }
        self.ships[id].sunk = true;
        Ok(())
    }

    /// A ship is resolved once it is sunk and its whole footprint is known.
    pub fn is_resolved(&self, id: ShipId) -> bool {
        match self.ships.get(id) {
            Some(ship) => ship.sunk && self.grid.sunk(id).count_ones() == ship.length,
            None => false,
        }
    }

    /// Ships the generator still has to place.
    pub fn unresolved(&self) -> impl Iterator<Item = &ShipSpec> + '_ {
        self.ships.iter().filter(move |s| !self.is_resolved(s.id))
    }

    /// Total length of the unresolved ships.
    pub fn remaining_cells(&self) -> usize {
        self.unresolved().map(|s| s.length).sum()
    }

    /// Cells every layout must cover: hits plus sunk cells of unresolved ships.
    pub fn pinned(&self) -> Mask {
        let mut pinned = self.grid.hits();
        for ship in self.unresolved().filter(|s| s.sunk) {
            pinned |= self.grid.sunk(ship.id);
        }
        pinned
    }

    /// Shortest ship still afloat.
    pub fn smallest_afloat(&self) -> Option<usize> {
        self.ships
            .iter()
            .filter(|s| !s.sunk)
            .map(|s| s.length)
            .min()
    }

    /// True once every ship has been sunk.
    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(|s| s.sunk)
    }
}
