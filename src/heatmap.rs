//! Occupancy heatmaps accumulated over generated layouts.

use crate::bitboard::Mask;
use crate::board::BoardState;
use crate::ship::Layout;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// How much the caller should trust a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Confidence {
    Full,
    /// Zero or too few layouts were sampled within budget.
    Degraded,
}

/// Accumulates per-cell occupancy over a stream of layouts.
///
/// Only cells that were still unknown when the aggregator was created
/// receive weight. Partial aggregators over disjoint layout sets can be
/// combined with [`HeatmapAggregator::merge`] in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapAggregator {
    width: usize,
    height: usize,
    targets: Mask,
    weights: Vec<f64>,
    layouts: usize,
    total_weight: f64,
}

impl HeatmapAggregator {
    pub fn new(state: &BoardState) -> Self {
        let (width, height) = (state.width(), state.height());
        Self {
            width,
            height,
            targets: state.grid().unknown(),
            weights: vec![0.0; width * height],
            layouts: 0,
            total_weight: 0.0,
        }
    }

    pub fn add(&mut self, layout: &Layout) {
        self.add_weighted(layout, 1.0);
    }

    /// Count `layout` with an importance weight.
    pub fn add_weighted(&mut self, layout: &Layout, weight: f64) {
        for (r, c) in (layout.occupied() & self.targets).iter_set_bits() {
            self.weights[r * self.width + c] += weight;
        }
        self.layouts += 1;
        self.total_weight += weight;
    }

    /// Element-wise sum with another accumulator for the same board.
    pub fn merge(mut self, other: Self) -> Self {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (w, o) in self.weights.iter_mut().zip(other.weights) {
            *w += o;
        }
        self.layouts += other.layouts;
        self.total_weight += other.total_weight;
        self
    }

    pub fn layouts(&self) -> usize {
        self.layouts
    }

    /// Freeze into a heatmap of raw counts.
    ///
    /// `exact` marks an exhaustive enumeration, which is never degraded
    /// unless it found no layout at all.
    pub fn finish(self, exact: bool, min_confident_layouts: usize) -> Heatmap {
        let degraded =
            self.layouts == 0 || (!exact && self.layouts < min_confident_layouts);
        Heatmap {
            width: self.width,
            height: self.height,
            weights: self.weights,
            layouts: self.layouts,
            total_weight: self.total_weight,
            normalized: false,
            confidence: if degraded {
                Confidence::Degraded
            } else {
                Confidence::Full
            },
        }
    }
}

impl<'a> Extend<&'a Layout> for HeatmapAggregator {
    fn extend<I: IntoIterator<Item = &'a Layout>>(&mut self, iter: I) {
        for layout in iter {
            self.add(layout);
        }
    }
}

impl Extend<Layout> for HeatmapAggregator {
    fn extend<I: IntoIterator<Item = Layout>>(&mut self, iter: I) {
        for layout in iter {
            self.add(&layout);
        }
    }
}

/// Aggregate a complete layout stream in one call.
pub fn aggregate<I>(state: &BoardState, layouts: I, exact: bool, min_confident_layouts: usize) -> Heatmap
where
    I: IntoIterator<Item = Layout>,
{
    let mut aggregator = HeatmapAggregator::new(state);
    aggregator.extend(layouts);
    aggregator.finish(exact, min_confident_layouts)
}

/// Per-cell occupancy weights, raw counts or probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    width: usize,
    height: usize,
    weights: Vec<f64>,
    layouts: usize,
    total_weight: f64,
    normalized: bool,
    confidence: Confidence,
}

impl Heatmap {
    /// All-zero degraded heatmap.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            weights: vec![0.0; width * height],
            layouts: 0,
            total_weight: 0.0,
            normalized: false,
            confidence: Confidence::Degraded,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Weight at (row, col); zero outside the board.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.height || col >= self.width {
            return 0.0;
        }
        self.weights[row * self.width + col]
    }

    /// Estimated probability that (row, col) holds a ship.
    pub fn probability(&self, row: usize, col: usize) -> f64 {
        if self.normalized {
            self.get(row, col)
        } else if self.total_weight > 0.0 {
            self.get(row, col) / self.total_weight
        } else {
            0.0
        }
    }

    /// Divide by the total layout weight, giving values in `[0, 1]`.
    /// Empty heatmaps stay all-zero.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if !self.normalized && self.total_weight > 0.0 {
            for w in out.weights.iter_mut() {
                *w /= self.total_weight;
            }
            out.normalized = true;
        }
        out
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn layouts(&self) -> usize {
        self.layouts
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence == Confidence::Degraded
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Largest weight on the board.
    pub fn max(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// `(row, col, weight)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.width;
        self.weights
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i / width, i % width, w))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

/// Probability table with lettered columns and numbered rows.
impl fmt::Display for Heatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.width {
            let ch = (b'A' + (c % 26) as u8) as char;
            write!(f, " {:>4}", ch)?;
        }
        writeln!(f)?;
        for r in 0..self.height {
            write!(f, "{:2} ", r + 1)?;
            for c in 0..self.width {
                write!(f, " {:4.2}", self.probability(r, c))?;
            }
            if r + 1 < self.height {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
