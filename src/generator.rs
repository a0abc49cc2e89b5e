//! Layout generation: exhaustive backtracking for small search spaces,
//! bounded rejection sampling otherwise.
//!
//! Both modes draw from the same per-ship candidate lists, which hold every
//! placement that passes the single-ship check. Candidates are kept in
//! (row, col, orientation) order so exhaustive output is deterministic, and
//! sampling only ever reads randomness from the injected generator.

use crate::bitboard::Mask;
use crate::board::BoardState;
use crate::common::{Infeasibility, SamplerError, ShipId};
use crate::config::SamplerConfig;
use crate::constraint::Constraints;
use crate::ship::{self, Layout, Placement};
use alloc::vec;
use alloc::vec::Vec;
use rand::Rng;

/// Which strategy produced a batch of layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Exhaustive,
    Sampling,
}

/// Counters reported by a finished (or abandoned) generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    pub mode: Mode,
    pub layouts: usize,
    /// Candidate layouts (sampling) or branch extensions (exhaustive) tried.
    pub proposals: usize,
    pub rejected: usize,
    /// Sample slots that ran out of attempts.
    pub failed_slots: usize,
    pub timed_out: bool,
}

impl GenerationStats {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            mode,
            layouts: 0,
            proposals: 0,
            rejected: 0,
            failed_slots: 0,
            timed_out: false,
        }
    }

    /// Combine the counters of two shards of the same pass.
    pub fn merge(self, other: Self) -> Self {
        Self {
            mode: self.mode,
            layouts: self.layouts + other.layouts,
            proposals: self.proposals + other.proposals,
            rejected: self.rejected + other.rejected,
            failed_slots: self.failed_slots + other.failed_slots,
            timed_out: self.timed_out || other.timed_out,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    placement: Placement,
    mask: Mask,
}

#[derive(Debug, Clone)]
struct ShipCandidates {
    ship: ShipId,
    candidates: Vec<Candidate>,
    /// Union of all candidate footprints.
    reach: Mask,
}

impl ShipCandidates {
    fn new(ship: ShipId, candidates: Vec<Candidate>, empty: Mask) -> Self {
        let mut entry = Self {
            ship,
            candidates,
            reach: empty,
        };
        entry.recompute_reach();
        entry
    }

    fn recompute_reach(&mut self) {
        let mut reach = self.reach;
        reach.clear_all();
        for c in &self.candidates {
            reach |= c.mask;
        }
        self.reach = reach;
    }
}

/// Candidate placements for every unresolved ship on one turn.
#[derive(Debug, Clone)]
pub struct PlacementGenerator {
    constraints: Constraints,
    /// Most constrained ship first.
    ships: Vec<ShipCandidates>,
    /// `suffix_reach[d]` is the union of reaches of `ships[d..]`.
    suffix_reach: Vec<Mask>,
    mode: Mode,
    budget: usize,
    max_attempts: usize,
    time_limit_ms: Option<u64>,
}

impl PlacementGenerator {
    /// Build candidate lists for `state`. Fails when some ship has no legal
    /// placement or some hit cannot be covered at all.
    pub fn new(state: &BoardState, config: &SamplerConfig) -> Result<Self, SamplerError> {
        let constraints = Constraints::new(state, config.ships_may_touch);
        let (width, height) = (state.width(), state.height());
        let empty = Mask::new(width, height);
        let pinned = constraints.pinned();

        let remaining = state.remaining_cells();
        if pinned.count_ones() > remaining {
            return Err(SamplerError::InfeasibleBoard(Infeasibility::TooManyHits {
                hits: pinned.count_ones(),
                cells: remaining,
            }));
        }

        let mut ships = Vec::new();
        for spec in constraints.unresolved() {
            let candidates: Vec<Candidate> = ship::placements(spec, width, height)
                .filter_map(|placement| {
                    let mask = placement.mask(width, height)?;
                    constraints
                        .is_feasible_mask(spec, mask)
                        .then_some(Candidate { placement, mask })
                })
                .collect();
            if candidates.is_empty() {
                return Err(SamplerError::InfeasibleBoard(Infeasibility::NoPlacement {
                    ship: spec.id,
                }));
            }
            ships.push(ShipCandidates::new(spec.id, candidates, empty));
        }

        refine_hit_owners(&mut ships, pinned)?;
        ships.sort_by_key(|s| (s.candidates.len(), s.ship));

        let mut suffix_reach = vec![empty; ships.len() + 1];
        for d in (0..ships.len()).rev() {
            suffix_reach[d] = suffix_reach[d + 1] | ships[d].reach;
        }

        let product = ships
            .iter()
            .try_fold(1usize, |acc, s| acc.checked_mul(s.candidates.len()));
        let limit = config.sample_budget.min(config.exhaustive_limit);
        let mode = match product {
            Some(p) if p <= limit => Mode::Exhaustive,
            _ => Mode::Sampling,
        };
        log::debug!(
            "generator: {} ships to place, candidates {:?}, mode {:?}",
            ships.len(),
            ships
                .iter()
                .map(|s| (s.ship, s.candidates.len()))
                .collect::<Vec<_>>(),
            mode
        );

        Ok(Self {
            constraints,
            ships,
            suffix_reach,
            mode,
            budget: config.sample_budget,
            max_attempts: config.max_attempts_per_sample,
            time_limit_ms: config.time_limit_ms,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Number of surviving candidates for `ship`, `None` if it is resolved.
    pub fn candidate_count(&self, ship: ShipId) -> Option<usize> {
        self.ships
            .iter()
            .find(|s| s.ship == ship)
            .map(|s| s.candidates.len())
    }

    /// Lazily produce at most `sample_budget` layouts. Calling again restarts.
    pub fn generate<'g, R: Rng>(&'g self, rng: &'g mut R) -> Layouts<'g, R> {
        self.generate_shard(rng, 0, 1)
    }

    /// Produce shard `shard` of `shards` disjoint portions of the pass.
    ///
    /// Exhaustive shards split the first ship's candidates round-robin, so
    /// their union is exactly the full enumeration. Sampling shards split the
    /// budget.
    pub fn generate_shard<'g, R: Rng>(
        &'g self,
        rng: &'g mut R,
        shard: usize,
        shards: usize,
    ) -> Layouts<'g, R> {
        let shards = shards.max(1);
        match self.mode {
            Mode::Exhaustive => Layouts::Exhaustive(Exhaustive::new(self, shard, shards)),
            Mode::Sampling => {
                let slots = self.budget / shards + usize::from(shard < self.budget % shards);
                Layouts::Sampled(Sampled::new(self, rng, slots))
            }
        }
    }
}

/// Restrict ships that are the sole possible owner of a pinned cell to the
/// candidates covering it, until nothing changes.
fn refine_hit_owners(ships: &mut [ShipCandidates], pinned: Mask) -> Result<(), SamplerError> {
    loop {
        let mut changed = false;
        for (row, col) in pinned.iter_set_bits() {
            let mut owners = ships
                .iter()
                .enumerate()
                .filter(|(_, s)| s.reach.contains(row, col))
                .map(|(i, _)| i);
            let (first, second) = (owners.next(), owners.next());
            match (first, second) {
                (None, _) => {
                    return Err(SamplerError::InfeasibleBoard(
                        Infeasibility::UncoverableHit { row, col },
                    ))
                }
                (Some(i), None) => {
                    let entry = &mut ships[i];
                    let before = entry.candidates.len();
                    entry.candidates.retain(|c| c.mask.contains(row, col));
                    if entry.candidates.len() != before {
                        entry.recompute_reach();
                        changed = true;
                    }
                }
                _ => {}
            }
        }
        if !changed {
            return Ok(());
        }
    }
}

/// Lazy stream of layouts from either mode.
pub enum Layouts<'g, R> {
    Exhaustive(Exhaustive<'g>),
    Sampled(Sampled<'g, R>),
}

impl<'g, R> Layouts<'g, R> {
    /// Counters so far; final once the iterator is exhausted.
    pub fn stats(&self) -> GenerationStats {
        match self {
            Layouts::Exhaustive(e) => e.stats,
            Layouts::Sampled(s) => s.stats,
        }
    }

    pub fn mode(&self) -> Mode {
        self.stats().mode
    }
}

impl<'g, R: Rng> Iterator for Layouts<'g, R> {
    type Item = Layout;

    fn next(&mut self) -> Option<Layout> {
        match self {
            Layouts::Exhaustive(e) => e.next(),
            Layouts::Sampled(s) => s.next(),
        }
    }
}

/// Depth-first enumeration of every valid layout.
pub struct Exhaustive<'g> {
    gen: &'g PlacementGenerator,
    /// Candidate index tried at each depth.
    stack: Vec<usize>,
    /// Occupancy before placing the ship at each depth.
    occupied: Vec<Mask>,
    shards: usize,
    emit_empty: bool,
    remaining: usize,
    stats: GenerationStats,
}

impl<'g> Exhaustive<'g> {
    fn new(gen: &'g PlacementGenerator, shard: usize, shards: usize) -> Self {
        let empty = Mask::new(gen.constraints.width(), gen.constraints.height());
        let no_ships = gen.ships.is_empty();
        Self {
            gen,
            stack: if no_ships { Vec::new() } else { vec![shard] },
            occupied: if no_ships { Vec::new() } else { vec![empty] },
            shards,
            emit_empty: no_ships && shard == 0 && gen.constraints.pinned().is_empty(),
            remaining: gen.budget,
            stats: GenerationStats::new(Mode::Exhaustive),
        }
    }

    fn advance(&mut self, depth: usize) {
        self.stack[depth] += if depth == 0 { self.shards } else { 1 };
    }
}

impl<'g> Iterator for Exhaustive<'g> {
    type Item = Layout;

    fn next(&mut self) -> Option<Layout> {
        let gen = self.gen;
        if self.remaining == 0 {
            return None;
        }
        if self.emit_empty {
            self.emit_empty = false;
            self.remaining -= 1;
            self.stats.layouts += 1;
            let empty = Mask::new(gen.constraints.width(), gen.constraints.height());
            return Some(Layout::new(Vec::new(), empty));
        }
        let pinned = gen.constraints.pinned();
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let entry = &gen.ships[depth];
            let idx = self.stack[depth];
            if idx >= entry.candidates.len() {
                self.stack.pop();
                self.occupied.pop();
                if let Some(parent) = self.stack.len().checked_sub(1) {
                    self.advance(parent);
                }
                continue;
            }

            let candidate = &entry.candidates[idx];
            let base = self.occupied[depth];
            self.stats.proposals += 1;
            if !gen.constraints.compatible(base, candidate.mask) {
                self.stats.rejected += 1;
                self.advance(depth);
                continue;
            }
            let occupied = base | candidate.mask;
            let uncovered = pinned & !occupied;
            if !uncovered.is_subset(&gen.suffix_reach[depth + 1]) {
                self.stats.rejected += 1;
                self.advance(depth);
                continue;
            }

            if depth + 1 == gen.ships.len() {
                let placements = self
                    .stack
                    .iter()
                    .enumerate()
                    .map(|(d, &i)| gen.ships[d].candidates[i].placement)
                    .collect();
                self.advance(depth);
                self.remaining -= 1;
                self.stats.layouts += 1;
                return Some(Layout::new(placements, occupied));
            }
            self.stack.push(0);
            self.occupied.push(occupied);
        }
    }
}

/// Rejection sampler: each slot retries independent uniform draws per ship
/// until a valid layout appears or the attempt cap is reached.
pub struct Sampled<'g, R> {
    gen: &'g PlacementGenerator,
    rng: &'g mut R,
    slots: usize,
    picks: Vec<usize>,
    stats: GenerationStats,
    #[cfg(feature = "std")]
    deadline: Option<std::time::Instant>,
}

impl<'g, R: Rng> Sampled<'g, R> {
    fn new(gen: &'g PlacementGenerator, rng: &'g mut R, slots: usize) -> Self {
        Self {
            gen,
            rng,
            slots,
            picks: Vec::with_capacity(gen.ships.len()),
            stats: GenerationStats::new(Mode::Sampling),
            #[cfg(feature = "std")]
            deadline: gen.time_limit_ms.map(|ms| {
                std::time::Instant::now() + std::time::Duration::from_millis(ms)
            }),
        }
    }

    #[cfg(feature = "std")]
    fn expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| std::time::Instant::now() >= deadline)
    }

    #[cfg(not(feature = "std"))]
    fn expired(&self) -> bool {
        false
    }

    fn propose(&mut self) -> Option<Layout> {
        let gen = self.gen;
        let mut occupied = Mask::new(gen.constraints.width(), gen.constraints.height());
        self.picks.clear();
        for entry in &gen.ships {
            let idx = self.rng.random_range(0..entry.candidates.len());
            let mask = entry.candidates[idx].mask;
            if !gen.constraints.compatible(occupied, mask) {
                return None;
            }
            occupied |= mask;
            self.picks.push(idx);
        }
        if !gen.constraints.pinned().is_subset(&occupied) {
            return None;
        }
        let placements = self
            .picks
            .iter()
            .zip(&gen.ships)
            .map(|(&i, entry)| entry.candidates[i].placement)
            .collect();
        Some(Layout::new(placements, occupied))
    }
}

impl<'g, R: Rng> Iterator for Sampled<'g, R> {
    type Item = Layout;

    fn next(&mut self) -> Option<Layout> {
        while self.slots > 0 {
            if self.expired() {
                log::warn!(
                    "sampling time limit reached with {} slots left",
                    self.slots
                );
                self.stats.timed_out = true;
                self.slots = 0;
                return None;
            }
            self.slots -= 1;
            for _ in 0..self.gen.max_attempts {
                self.stats.proposals += 1;
                if let Some(layout) = self.propose() {
                    self.stats.layouts += 1;
                    return Some(layout);
                }
                self.stats.rejected += 1;
            }
            self.stats.failed_slots += 1;
        }
        None
    }
}
