//! The per-turn decision cycle: generate layouts, aggregate them into a
//! heatmap, select a target.
//!
//! Nothing is retained between turns apart from configuration; the caller
//! owns the [`BoardState`] and applies the shot outcome after the cycle
//! returns.

use crate::agent::Agent;
use crate::board::BoardState;
use crate::common::{BoardError, SamplerError};
use crate::config::SamplerConfig;
use crate::generator::{GenerationStats, Mode, PlacementGenerator};
use crate::heatmap::{Heatmap, HeatmapAggregator};
use crate::selector::{Target, TargetSelector};
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Where the cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Aggregating,
    Selecting,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct Decision {
    pub target: Target,
    pub heatmap: Heatmap,
    pub stats: GenerationStats,
}

/// Shared flag a caller flips to abandon the game. Checked only when a turn
/// starts, so a heatmap in flight is always completed.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Targeting engine for one game configuration.
pub struct Sampler {
    config: SamplerConfig,
    selector: TargetSelector,
    cancel: CancelFlag,
    phase: Phase,
}

impl Sampler {
    /// Validates the configuration before any turn can run.
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self {
            selector: TargetSelector::from_config(&config),
            config,
            cancel: CancelFlag::new(),
            phase: Phase::Idle,
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle for cancelling future turns from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Empty board matching this configuration.
    pub fn new_board(&self) -> Result<BoardState, SamplerError> {
        Ok(self.config.new_board()?)
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("sampler: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn check_turn(&self, state: &BoardState) -> Result<(), SamplerError> {
        if self.cancel.is_cancelled() {
            return Err(SamplerError::Cancelled);
        }
        let expected = (self.config.width, self.config.height);
        let found = (state.width(), state.height());
        if expected != found {
            return Err(BoardError::DimensionMismatch { expected, found }.into());
        }
        if state.ships().len() != self.config.ships.len() {
            return Err(BoardError::FleetMismatch {
                expected: self.config.ships.len(),
                found: state.ships().len(),
            }
            .into());
        }
        Ok(())
    }

    /// Run one turn with the caller's random source.
    pub fn decide<R: Rng>(
        &mut self,
        state: &BoardState,
        rng: &mut R,
        agent: Option<&dyn Agent>,
    ) -> Result<Decision, SamplerError> {
        let result = self.run(state, agent, |gen, state| {
            let mut layouts = gen.generate(rng);
            let mut aggregator = HeatmapAggregator::new(state);
            aggregator.extend(&mut layouts);
            (aggregator, layouts.stats())
        });
        self.enter(Phase::Idle);
        result
    }

    /// Run one turn seeded from the configuration, fully reproducible.
    pub fn decide_seeded(
        &mut self,
        state: &BoardState,
        agent: Option<&dyn Agent>,
    ) -> Result<Decision, SamplerError> {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        self.decide(state, &mut rng, agent)
    }

    /// Run one turn across `workers` threads.
    ///
    /// Worker `i` samples with `seed + i`; partial heatmaps are merged in
    /// worker order, so the result does not depend on scheduling.
    #[cfg(feature = "std")]
    pub fn decide_parallel(
        &mut self,
        state: &BoardState,
        agent: Option<&dyn Agent>,
    ) -> Result<Decision, SamplerError> {
        use rayon::prelude::*;

        let workers = self.config.workers;
        let seed = self.config.seed;
        let result = self.run(state, agent, |gen, state| {
            let shards: Vec<(HeatmapAggregator, GenerationStats)> = (0..workers)
                .into_par_iter()
                .map(|i| {
                    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                    let mut layouts = gen.generate_shard(&mut rng, i, workers);
                    let mut aggregator = HeatmapAggregator::new(state);
                    aggregator.extend(&mut layouts);
                    (aggregator, layouts.stats())
                })
                .collect();
            let mut shards = shards.into_iter();
            let first = shards
                .next()
                .unwrap_or_else(|| (HeatmapAggregator::new(state), GenerationStats::new(gen.mode())));
            shards.fold(first, |(agg, stats), (a, s)| (agg.merge(a), stats.merge(s)))
        });
        self.enter(Phase::Idle);
        result
    }

    fn run<F>(
        &mut self,
        state: &BoardState,
        agent: Option<&dyn Agent>,
        sample: F,
    ) -> Result<Decision, SamplerError>
    where
        F: FnOnce(&PlacementGenerator, &BoardState) -> (HeatmapAggregator, GenerationStats),
    {
        self.check_turn(state)?;

        self.enter(Phase::Generating);
        let gen = PlacementGenerator::new(state, &self.config)?;

        self.enter(Phase::Aggregating);
        let (aggregator, stats) = sample(&gen, state);
        let heatmap = aggregator.finish(
            stats.mode == Mode::Exhaustive,
            self.config.min_confident_layouts,
        );
        if heatmap.is_degraded() {
            log::warn!(
                "low-confidence heatmap: {} layouts from {} proposals ({} slots failed)",
                stats.layouts,
                stats.proposals,
                stats.failed_slots
            );
        }

        self.enter(Phase::Selecting);
        let scores = match agent {
            Some(agent) if self.config.agent_blend > 0.0 => Some(agent.predict(state)),
            _ => None,
        };
        let target = self.selector.select(&heatmap, state, scores.as_ref())?;
        log::debug!(
            "target ({}, {}) score {:.4} from {} {:?} layouts",
            target.row,
            target.col,
            target.score,
            stats.layouts,
            stats.mode
        );
        Ok(Decision {
            target,
            heatmap,
            stats,
        })
    }
}
