//! A hidden fleet that answers shots, and the loop that plays a sampler
//! against it.

use crate::agent::{Agent, Transition};
use crate::bitboard::Mask;
use crate::common::{BoardError, SamplerError, ShipId, Shot};
use crate::config::SamplerConfig;
use crate::ship::{Orientation, Placement};
use crate::sampler::Sampler;
use alloc::vec;
use alloc::vec::Vec;
use rand::Rng;

const PLACEMENT_ATTEMPTS: usize = 100;
const FLEET_ATTEMPTS: usize = 100;

/// The opponent's ships, as known only to the referee.
#[derive(Debug, Clone)]
pub struct Fleet {
    width: usize,
    height: usize,
    placements: Vec<Placement>,
    occupied: Mask,
    shots: Mask,
    hits: Vec<usize>,
}

impl Fleet {
    /// Place the configured ships at random, honouring the touch rule.
    pub fn random<R: Rng>(config: &SamplerConfig, rng: &mut R) -> Result<Self, BoardError> {
        let (width, height) = (config.width, config.height);
        for _ in 0..FLEET_ATTEMPTS {
            if let Some(placements) = try_place(config, rng) {
                return Self::from_placements(width, height, placements);
            }
        }
        Err(BoardError::UnableToPlaceFleet)
    }

    /// Fleet from explicit placements. Ship ids must be `0..n` in order.
    pub fn from_placements(
        width: usize,
        height: usize,
        placements: Vec<Placement>,
    ) -> Result<Self, BoardError> {
        let mut occupied = Mask::try_new(width, height)?;
        for (id, p) in placements.iter().enumerate() {
            if p.ship != id {
                return Err(BoardError::UnknownShip(p.ship));
            }
            let mask = p
                .mask(width, height)
                .ok_or(BoardError::FootprintMismatch(id))?;
            if mask.intersects(&occupied) {
                return Err(BoardError::FootprintMismatch(id));
            }
            occupied |= mask;
        }
        Ok(Self {
            width,
            height,
            hits: vec![0; placements.len()],
            placements,
            occupied,
            shots: Mask::new(width, height),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn placement(&self, id: ShipId) -> Option<&Placement> {
        self.placements.get(id)
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Cells covered by any ship.
    pub fn occupied(&self) -> Mask {
        self.occupied
    }

    /// Resolve a shot at (row, col).
    pub fn fire(&mut self, row: usize, col: usize) -> Result<Shot, BoardError> {
        if row >= self.height || col >= self.width {
            return Err(BoardError::OutOfBounds { row, col });
        }
        if self.shots.contains(row, col) {
            return Err(BoardError::AlreadyShot { row, col });
        }
        self.shots.set(row, col)?;
        let owner = self
            .placements
            .iter()
            .find(|p| p.cells().any(|cell| cell == (row, col)));
        let Some(p) = owner else {
            return Ok(Shot::Miss);
        };
        let id = p.ship;
        self.hits[id] += 1;
        if self.hits[id] == p.length {
            Ok(Shot::Sunk(id))
        } else {
            Ok(Shot::Hit)
        }
    }

    pub fn shots_fired(&self) -> usize {
        self.shots.count_ones()
    }

    pub fn all_sunk(&self) -> bool {
        self.placements
            .iter()
            .all(|p| self.hits[p.ship] == p.length)
    }
}

fn try_place<R: Rng>(config: &SamplerConfig, rng: &mut R) -> Option<Vec<Placement>> {
    let (width, height) = (config.width, config.height);
    let mut occupied = Mask::new(width, height);
    let mut placements = Vec::with_capacity(config.ships.len());
    for (id, &length) in config.ships.iter().enumerate() {
        let forbidden = if config.ships_may_touch {
            occupied
        } else {
            occupied.dilate()
        };
        let mut placed = None;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let span = match orientation {
                Orientation::Horizontal => height.checked_sub(1).zip(width.checked_sub(length)),
                Orientation::Vertical => height.checked_sub(length).zip(width.checked_sub(1)),
            };
            // ship does not fit this way round
            let Some((max_r, max_c)) = span else {
                continue;
            };
            let row = rng.random_range(0..=max_r);
            let col = rng.random_range(0..=max_c);
            let p = Placement::new(id, length, row, col, orientation);
            let Some(mask) = p.mask(width, height) else {
                continue;
            };
            if !mask.intersects(&forbidden) {
                placed = Some((p, mask));
                break;
            }
        }
        let (p, mask) = placed?;
        occupied |= mask;
        placements.push(p);
    }
    Some(placements)
}

/// Outcome of one autoplayed game.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GameReport {
    pub shots: usize,
    pub hits: usize,
    /// Turns that ran on a low-confidence heatmap.
    pub degraded_turns: usize,
    /// Every shot in firing order.
    pub history: Vec<(usize, usize, Shot)>,
}

/// Play `sampler` against `fleet` until every ship is sunk.
///
/// When `reveal_sunk` is set, a sinking shot also discloses the ship's exact
/// footprint to the board, as some rule sets do.
pub fn autoplay<R: Rng>(
    sampler: &mut Sampler,
    fleet: &mut Fleet,
    rng: &mut R,
    mut agent: Option<&mut dyn Agent>,
    reveal_sunk: bool,
) -> Result<GameReport, SamplerError> {
    let mut state = sampler.new_board()?;
    let mut report = GameReport {
        shots: 0,
        hits: 0,
        degraded_turns: 0,
        history: Vec::new(),
    };
    let limit = fleet.width() * fleet.height();

    while !fleet.all_sunk() {
        if report.shots >= limit {
            return Err(SamplerError::NoUnknownCells);
        }
        let decision = sampler.decide(&state, rng, agent.as_deref())?;
        let (row, col) = (decision.target.row, decision.target.col);
        let shot = fleet.fire(row, col)?;
        state.record_shot(row, col, shot)?;
        if let (Shot::Sunk(id), true) = (shot, reveal_sunk) {
            if let Some(p) = fleet.placement(id).copied() {
                state.reveal_sunk(&p)?;
            }
        }
        if let Some(agent) = agent.as_deref_mut() {
            agent.observe(&Transition::new(row, col, shot));
        }

        report.shots += 1;
        if shot != Shot::Miss {
            report.hits += 1;
        }
        if decision.heatmap.is_degraded() {
            report.degraded_turns += 1;
        }
        report.history.push((row, col, shot));
        log::debug!("shot {} at ({}, {}): {:?}", report.shots, row, col, shot);
    }

    log::info!(
        "game over after {} shots ({} hits, {} degraded turns)",
        report.shots,
        report.hits,
        report.degraded_turns
    );
    Ok(report)
}
