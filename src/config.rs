use crate::bitboard::Mask;
use crate::board::{BoardState, MAX_SHIPS};
use crate::common::{BoardError, ConfigError};
use alloc::vec::Vec;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;
/// Classic fleet: carrier, battleship, cruiser, submarine, destroyer.
pub const CLASSIC_FLEET: [usize; 5] = [5, 4, 3, 3, 2];

/// How the selector scores a candidate cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize, clap::ValueEnum)
)]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum Policy {
    /// Highest occupancy weight.
    #[default]
    MaxProbability,
    /// Highest binary entropy of the occupancy probability.
    MaxInformation,
}

/// Tunables for one targeting engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct SamplerConfig {
    pub width: usize,
    pub height: usize,
    /// Ship lengths; the index is the ship id.
    pub ships: Vec<usize>,
    /// Maximum layouts generated per turn.
    pub sample_budget: usize,
    /// Rejection-sampling retries per sample slot.
    pub max_attempts_per_sample: usize,
    pub seed: u64,
    /// Weight of agent scores in the selector, `0.0` disables the agent.
    pub agent_blend: f64,
    /// Restrict hunting shots to one residue class of the smallest ship.
    pub parity: bool,
    pub policy: Policy,
    /// When false, ships may not touch, diagonals included.
    pub ships_may_touch: bool,
    /// Enumerate exhaustively when the candidate product is at most this.
    pub exhaustive_limit: usize,
    /// Sampled turns with fewer layouts are flagged as degraded.
    pub min_confident_layouts: usize,
    /// Worker threads for parallel sampling.
    pub workers: usize,
    /// Wall-clock cap on sampling, in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            ships: CLASSIC_FLEET.to_vec(),
            sample_budget: 2000,
            max_attempts_per_sample: 200,
            seed: 0,
            agent_blend: 0.0,
            parity: true,
            policy: Policy::MaxProbability,
            ships_may_touch: true,
            exhaustive_limit: 100_000,
            min_confident_layouts: 50,
            workers: 1,
            time_limit_ms: None,
        }
    }
}

impl SamplerConfig {
    /// Reject configurations no turn could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if Mask::try_new(self.width, self.height).is_err() {
            return Err(ConfigError::BoardTooLarge {
                cells: self.width.saturating_mul(self.height),
                capacity: Mask::capacity(),
            });
        }
        if self.ships.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }
        if self.ships.len() > MAX_SHIPS {
            return Err(ConfigError::FleetTooLarge {
                ships: self.ships.len(),
                max: MAX_SHIPS,
            });
        }
        for (ship, &length) in self.ships.iter().enumerate() {
            if length == 0 {
                return Err(ConfigError::ZeroLengthShip { ship });
            }
            if length > self.width.max(self.height) {
                return Err(ConfigError::ShipTooLong { ship, length });
            }
        }
        if !(0.0..=1.0).contains(&self.agent_blend) {
            return Err(ConfigError::BlendOutOfRange(self.agent_blend));
        }
        if self.max_attempts_per_sample == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Empty board for a new game with this configuration.
    pub fn new_board(&self) -> Result<BoardState, BoardError> {
        BoardState::new(self.width, self.height, &self.ships)
    }

    /// Total number of ship cells in the fleet.
    pub fn total_ship_cells(&self) -> usize {
        self.ships.iter().sum()
    }

    /// Load and validate a JSON configuration file. Missing keys take defaults.
    #[cfg(feature = "std")]
    pub fn from_json_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SamplerConfig = serde_json::from_str(&text)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }
}
