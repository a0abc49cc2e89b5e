//! Common types: shot outcomes and the error enums shared by every module.

use crate::bitboard::BitBoardError;
use core::fmt;

/// Index of a ship in the fleet inventory.
pub type ShipId = usize;

/// Outcome of a shot, as reported by the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Shot {
    /// Shot hit a ship that is still afloat.
    Hit,
    /// Shot missed all ships.
    Miss,
    /// Shot sank a ship, carrying its id.
    Sunk(ShipId),
}

impl Shot {
    /// Reward signal handed to learning agents: 1 for any hit, 0 for a miss.
    pub fn reward(&self) -> f64 {
        match self {
            Shot::Hit | Shot::Sunk(_) => 1.0,
            Shot::Miss => 0.0,
        }
    }
}

/// Errors returned by grid updates and board parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error (e.g., invalid size or index).
    BitBoardError(BitBoardError),
    /// Cell lies outside the board.
    OutOfBounds { row: usize, col: usize },
    /// A shot was already recorded at this position.
    AlreadyShot { row: usize, col: usize },
    /// Ship id not present in the inventory.
    UnknownShip(ShipId),
    /// Ship was reported sunk twice.
    ShipAlreadySunk(ShipId),
    /// Revealed footprint disagrees with the grid or the ship's length.
    FootprintMismatch(ShipId),
    /// Grid and inventory/configuration disagree on the board size.
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Inventory size differs from the configured fleet.
    FleetMismatch { expected: usize, found: usize },
    /// Text board could not be parsed.
    Parse { line: usize, reason: &'static str },
    /// Random fleet placement gave up.
    UnableToPlaceFleet,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoardError(err)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            BoardError::OutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the board", row, col)
            }
            BoardError::AlreadyShot { row, col } => {
                write!(f, "Cell ({}, {}) was already shot", row, col)
            }
            BoardError::UnknownShip(id) => write!(f, "Ship {} is not in the inventory", id),
            BoardError::ShipAlreadySunk(id) => write!(f, "Ship {} is already sunk", id),
            BoardError::FootprintMismatch(id) => {
                write!(f, "Revealed footprint of ship {} does not match the grid", id)
            }
            BoardError::DimensionMismatch { expected, found } => write!(
                f,
                "Board is {}x{} but {}x{} was expected",
                found.0, found.1, expected.0, expected.1
            ),
            BoardError::FleetMismatch { expected, found } => {
                write!(f, "Board tracks {} ships but {} were expected", found, expected)
            }
            BoardError::Parse { line, reason } => {
                write!(f, "Board parse error on line {}: {}", line, reason)
            }
            BoardError::UnableToPlaceFleet => write!(f, "Unable to place fleet"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}

/// Configuration rejected before any turn runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    ZeroDimension,
    /// Board area does not fit the bitboard word.
    BoardTooLarge { cells: usize, capacity: usize },
    /// No ships configured.
    EmptyFleet,
    /// More ships than the board text format can name.
    FleetTooLarge { ships: usize, max: usize },
    /// A ship has length zero.
    ZeroLengthShip { ship: ShipId },
    /// A ship does not fit in either orientation.
    ShipTooLong { ship: ShipId, length: usize },
    /// Agent blend weight outside `[0, 1]`.
    BlendOutOfRange(f64),
    /// `max_attempts_per_sample` is zero.
    ZeroAttempts,
    /// `workers` is zero.
    ZeroWorkers,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimension => write!(f, "Board dimensions must be positive"),
            ConfigError::BoardTooLarge { cells, capacity } => write!(
                f,
                "Board has {} cells but at most {} are supported",
                cells, capacity
            ),
            ConfigError::EmptyFleet => write!(f, "Fleet must contain at least one ship"),
            ConfigError::FleetTooLarge { ships, max } => {
                write!(f, "Fleet has {} ships but at most {} are supported", ships, max)
            }
            ConfigError::ZeroLengthShip { ship } => write!(f, "Ship {} has length zero", ship),
            ConfigError::ShipTooLong { ship, length } => write!(
                f,
                "Ship {} of length {} does not fit on the board",
                ship, length
            ),
            ConfigError::BlendOutOfRange(w) => {
                write!(f, "Agent blend weight {} is outside [0, 1]", w)
            }
            ConfigError::ZeroAttempts => write!(f, "max_attempts_per_sample must be positive"),
            ConfigError::ZeroWorkers => write!(f, "workers must be positive"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Why the board admits no layout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// No single placement of this ship satisfies the constraints.
    NoPlacement { ship: ShipId },
    /// A hit cell cannot be covered by any remaining ship.
    UncoverableHit { row: usize, col: usize },
    /// More hit cells than remaining ship cells.
    TooManyHits { hits: usize, cells: usize },
}

/// Errors surfaced by a targeting turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// The grid and inventory are inconsistent; fatal for the turn.
    InfeasibleBoard(Infeasibility),
    /// Every cell has been shot.
    NoUnknownCells,
    /// The caller cancelled before the turn started.
    Cancelled,
    Config(ConfigError),
    Board(BoardError),
}

impl From<ConfigError> for SamplerError {
    fn from(err: ConfigError) -> Self {
        SamplerError::Config(err)
    }
}

impl From<BoardError> for SamplerError {
    fn from(err: BoardError) -> Self {
        SamplerError::Board(err)
    }
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::InfeasibleBoard(Infeasibility::NoPlacement { ship }) => {
                write!(f, "Infeasible board: ship {} has no valid placement", ship)
            }
            SamplerError::InfeasibleBoard(Infeasibility::UncoverableHit { row, col }) => write!(
                f,
                "Infeasible board: no remaining ship can cover the hit at ({}, {})",
                row, col
            ),
            SamplerError::InfeasibleBoard(Infeasibility::TooManyHits { hits, cells }) => write!(
                f,
                "Infeasible board: {} hits but only {} ship cells remain",
                hits, cells
            ),
            SamplerError::NoUnknownCells => write!(f, "No unknown cells left to target"),
            SamplerError::Cancelled => write!(f, "Turn was cancelled"),
            SamplerError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SamplerError::Board(e) => write!(f, "Board error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SamplerError {}
