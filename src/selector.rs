//! Heatmap to coordinate. Candidates are unknown cells only; ties resolve
//! towards the board centre, then the lowest (row, col).

use crate::agent::Scores;
use crate::bitboard::Mask;
use crate::board::BoardState;
use crate::common::SamplerError;
use crate::config::{Policy, SamplerConfig};
use crate::heatmap::{Confidence, Heatmap};
use core::cmp::Ordering;

/// The chosen shot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub row: usize,
    pub col: usize,
    /// Final blended score of the cell.
    pub score: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSelector {
    parity: bool,
    policy: Policy,
    blend: f64,
}

impl TargetSelector {
    pub fn new(parity: bool, policy: Policy, blend: f64) -> Self {
        Self {
            parity,
            policy,
            blend,
        }
    }

    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(config.parity, config.policy, config.agent_blend)
    }

    /// Cells eligible this turn: unknown cells, narrowed to one parity class
    /// while hunting.
    ///
    /// Parity only applies when nothing is pinned, since a half-found ship
    /// must be chased wherever it extends. The narrowed set is dropped if it
    /// carries no weight while other unknown cells do.
    pub fn candidates(&self, heatmap: &Heatmap, state: &BoardState) -> Mask {
        let unknown = state.grid().unknown();
        if !self.parity || !state.pinned().is_empty() {
            return unknown;
        }
        let Some(step) = state.smallest_afloat() else {
            return unknown;
        };
        let mut parity = Mask::new(state.width(), state.height());
        for (r, c) in unknown.iter_set_bits().filter(|&(r, c)| (r + c) % step == 0) {
            parity.insert(r, c);
        }
        if parity.is_empty() {
            return unknown;
        }
        let best = |mask: Mask| {
            mask.iter_set_bits()
                .map(|(r, c)| heatmap.get(r, c))
                .fold(0.0, f64::max)
        };
        if best(parity) == 0.0 && best(unknown) > 0.0 {
            unknown
        } else {
            parity
        }
    }

    /// Pick the next shot. Never fails while an unknown cell remains, even on
    /// an all-zero heatmap.
    pub fn select(
        &self,
        heatmap: &Heatmap,
        state: &BoardState,
        agent: Option<&Scores>,
    ) -> Result<Target, SamplerError> {
        let pool = self.candidates(heatmap, state);
        if pool.is_empty() {
            return Err(SamplerError::NoUnknownCells);
        }

        let base = |r: usize, c: usize| match self.policy {
            Policy::MaxProbability => heatmap.get(r, c),
            Policy::MaxInformation => binary_entropy(heatmap.probability(r, c)),
        };
        let agent = agent.filter(|_| self.blend > 0.0);
        let heat_range = range(pool, base);
        let agent_range = agent.map(|scores| range(pool, |r, c| scores.get(r, c)));

        let score = |r: usize, c: usize| match (agent, agent_range) {
            (Some(scores), Some(agent_range)) => {
                (1.0 - self.blend) * rescale(base(r, c), heat_range)
                    + self.blend * rescale(scores.get(r, c), agent_range)
            }
            _ => base(r, c),
        };

        let (height, width) = (state.height(), state.width());
        let mut best: Option<(usize, usize, f64)> = None;
        for (r, c) in pool.iter_set_bits() {
            let s = score(r, c);
            let better = match best {
                None => true,
                Some((br, bc, bs)) => match s.total_cmp(&bs) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => {
                        let d = centre_distance(r, c, height, width);
                        let bd = centre_distance(br, bc, height, width);
                        d < bd || (d == bd && (r, c) < (br, bc))
                    }
                },
            };
            if better {
                best = Some((r, c, s));
            }
        }

        let (row, col, score) = best.ok_or(SamplerError::NoUnknownCells)?;
        Ok(Target {
            row,
            col,
            score,
            confidence: heatmap.confidence(),
        })
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::from_config(&SamplerConfig::default())
    }
}

/// Squared distance to the board centre in doubled coordinates.
fn centre_distance(row: usize, col: usize, height: usize, width: usize) -> usize {
    let dr = (2 * row).abs_diff(height - 1);
    let dc = (2 * col).abs_diff(width - 1);
    dr * dr + dc * dc
}

fn range<F: Fn(usize, usize) -> f64>(pool: Mask, f: F) -> (f64, f64) {
    pool.iter_set_bits()
        .map(|(r, c)| f(r, c))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn rescale(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        (value - lo) / (hi - lo)
    } else {
        0.0
    }
}

/// Entropy in bits of a Bernoulli(p) outcome.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -(p * libm::log2(p) + (1.0 - p) * libm::log2(1.0 - p))
}
