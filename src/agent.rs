//! Boundary to external move estimators (learned or otherwise).
//!
//! The sampler never looks at how an [`Agent`] computes its scores. A trained
//! network, a lookup table or a stub can all sit behind the trait.

use crate::board::BoardState;
use crate::common::Shot;
use alloc::vec;
use alloc::vec::Vec;

/// Score per cell, higher is better. Scale is arbitrary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Scores {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Scores {
    /// Every cell scores `value`.
    pub fn uniform(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    /// Row-major values; `None` if the length does not match the board.
    pub fn from_vec(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == width * height).then_some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Score at (row, col); zero outside the board.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.height || col >= self.width {
            return 0.0;
        }
        self.values[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.height && col < self.width {
            self.values[row * self.width + col] = value;
        }
    }
}

/// One step of experience: where we fired, what happened, the reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub row: usize,
    pub col: usize,
    pub shot: Shot,
    pub reward: f64,
}

impl Transition {
    pub fn new(row: usize, col: usize, shot: Shot) -> Self {
        Self {
            row,
            col,
            shot,
            reward: shot.reward(),
        }
    }
}

/// A move estimator consulted alongside the heatmap.
pub trait Agent {
    /// Score every cell for the given board.
    fn predict(&self, state: &BoardState) -> Scores;

    /// Feedback after the chosen shot resolved.
    fn observe(&mut self, _transition: &Transition) {}
}

/// Stub returning the same score everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformAgent;

impl Agent for UniformAgent {
    fn predict(&self, state: &BoardState) -> Scores {
        Scores::uniform(state.width(), state.height(), 1.0)
    }
}

/// Table of running mean rewards per cell.
///
/// Cells never observed score `prior`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupAgent {
    width: usize,
    height: usize,
    prior: f64,
    totals: Vec<f64>,
    counts: Vec<u64>,
}

impl LookupAgent {
    pub fn new(width: usize, height: usize, prior: f64) -> Self {
        Self {
            width,
            height,
            prior,
            totals: vec![0.0; width * height],
            counts: vec![0; width * height],
        }
    }

    /// Mean observed reward at (row, col).
    pub fn value(&self, row: usize, col: usize) -> f64 {
        if row >= self.height || col >= self.width {
            return 0.0;
        }
        let i = row * self.width + col;
        match self.counts[i] {
            0 => self.prior,
            n => self.totals[i] / n as f64,
        }
    }

    /// Times (row, col) has been observed.
    pub fn visits(&self, row: usize, col: usize) -> u64 {
        if row >= self.height || col >= self.width {
            return 0;
        }
        self.counts[row * self.width + col]
    }

    #[cfg(feature = "std")]
    pub fn to_bincode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a saved table, rejecting one whose tables do not match its
    /// dimensions.
    #[cfg(feature = "std")]
    pub fn from_bincode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        let agent: Self = bincode::deserialize(bytes)?;
        let cells = agent.width.checked_mul(agent.height);
        if cells != Some(agent.totals.len()) || agent.counts.len() != agent.totals.len() {
            return Err(Box::new(bincode::ErrorKind::Custom(format!(
                "agent table is {}x{} but holds {} totals and {} counts",
                agent.width,
                agent.height,
                agent.totals.len(),
                agent.counts.len()
            ))));
        }
        Ok(agent)
    }
}

impl Agent for LookupAgent {
    fn predict(&self, state: &BoardState) -> Scores {
        let mut scores = Scores::uniform(state.width(), state.height(), 0.0);
        for r in 0..state.height() {
            for c in 0..state.width() {
                scores.set(r, c, self.value(r, c));
            }
        }
        scores
    }

    fn observe(&mut self, transition: &Transition) {
        let (row, col) = (transition.row, transition.col);
        if row < self.height && col < self.width {
            let i = row * self.width + col;
            self.totals[i] += transition.reward;
            self.counts[i] += 1;
        }
    }
}
