//! Ship inventory entries, placements and layouts.

use crate::bitboard::Mask;
use crate::common::ShipId;
use alloc::vec::Vec;

/// Orientation of a ship on the board.
///
/// `Horizontal` orders before `Vertical`, which fixes the enumeration order
/// of candidate placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One entry of the fleet inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipSpec {
    pub id: ShipId,
    pub length: usize,
    pub sunk: bool,
}

impl ShipSpec {
    /// Create an afloat ship.
    pub const fn new(id: ShipId, length: usize) -> Self {
        Self {
            id,
            length,
            sunk: false,
        }
    }
}

/// A ship placed at an origin cell with an orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub ship: ShipId,
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
    pub length: usize,
}

impl Placement {
    pub fn new(
        ship: ShipId,
        length: usize,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Self {
        Self {
            ship,
            row,
            col,
            orientation,
            length,
        }
    }

    /// Whether the whole footprint lies on a `width×height` board.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        match self.orientation {
            Orientation::Horizontal => self.row < height && self.col + self.length <= width,
            Orientation::Vertical => self.col < width && self.row + self.length <= height,
        }
    }

    /// Cells covered by the ship, origin first.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (row, col, orientation) = (self.row, self.col, self.orientation);
        (0..self.length).map(move |k| match orientation {
            Orientation::Horizontal => (row, col + k),
            Orientation::Vertical => (row + k, col),
        })
    }

    /// Occupancy mask of the footprint, or `None` if it leaves the board.
    pub fn mask(&self, width: usize, height: usize) -> Option<Mask> {
        if !self.fits(width, height) {
            return None;
        }
        let mut mask = Mask::try_new(width, height).ok()?;
        for (r, c) in self.cells() {
            mask.insert(r, c);
        }
        Some(mask)
    }
}

/// Every in-bounds placement of `ship`, ordered by (row, col, orientation).
///
/// Single-cell ships are only emitted horizontally so each footprint appears
/// once.
pub fn placements(
    ship: &ShipSpec,
    width: usize,
    height: usize,
) -> impl Iterator<Item = Placement> + '_ {
    let orientations: &'static [Orientation] = if ship.length == 1 {
        &[Orientation::Horizontal]
    } else {
        &[Orientation::Horizontal, Orientation::Vertical]
    };
    (0..height).flat_map(move |row| {
        (0..width).flat_map(move |col| {
            orientations
                .iter()
                .map(move |&o| Placement::new(ship.id, ship.length, row, col, o))
                .filter(move |p| p.fits(width, height))
        })
    })
}

/// One placement per unresolved ship, mutually non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    placements: Vec<Placement>,
    occupied: Mask,
}

impl Layout {
    /// Build a layout; placements are stored sorted by ship id.
    pub fn new(mut placements: Vec<Placement>, occupied: Mask) -> Self {
        placements.sort_unstable_by_key(|p| p.ship);
        Self {
            placements,
            occupied,
        }
    }

    /// Build a layout from placements alone, computing the occupancy mask.
    /// Returns `None` if any placement leaves the board.
    pub fn from_placements(placements: Vec<Placement>, width: usize, height: usize) -> Option<Self> {
        let mut occupied = Mask::try_new(width, height).ok()?;
        for p in &placements {
            occupied |= p.mask(width, height)?;
        }
        Some(Self::new(placements, occupied))
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Union of all footprints.
    pub fn occupied(&self) -> Mask {
        self.occupied
    }

    /// Total number of ship cells, counting overlaps twice.
    pub fn cell_count(&self) -> usize {
        self.placements.iter().map(|p| p.length).sum()
    }

    /// True when no two placements share a cell.
    pub fn is_disjoint(&self) -> bool {
        self.cell_count() == self.occupied.count_ones()
    }
}
