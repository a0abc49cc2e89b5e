//! Feasibility predicates derived from the known grid.
//!
//! Everything is precomputed as masks when [`Constraints`] is built, so the
//! per-placement check inside the generator's inner loop is a handful of word
//! operations.

use crate::bitboard::Mask;
use crate::board::BoardState;
use crate::common::ShipId;
use crate::ship::{Layout, Placement, ShipSpec};
use alloc::vec::Vec;

/// Masks describing what any valid layout must respect on this turn.
#[derive(Debug, Clone)]
pub struct Constraints {
    width: usize,
    height: usize,
    ships: Vec<ShipSpec>,
    resolved: Vec<bool>,
    /// Cells no unresolved ship may cover.
    blocked: Mask,
    /// Cells that were shot and hit, whatever their owner.
    struck: Mask,
    sunk_any: Mask,
    sunk_by_ship: Vec<Mask>,
    pinned: Mask,
    ships_may_touch: bool,
}

impl Constraints {
    pub fn new(state: &BoardState, ships_may_touch: bool) -> Self {
        let grid = state.grid();
        let ships = state.ships().to_vec();
        let resolved: Vec<bool> = ships.iter().map(|s| state.is_resolved(s.id)).collect();
        let sunk_by_ship: Vec<Mask> = ships.iter().map(|s| grid.sunk(s.id)).collect();

        let mut footprints = Mask::new(state.width(), state.height());
        for ship in ships.iter().filter(|s| resolved[s.id]) {
            footprints |= sunk_by_ship[ship.id];
        }
        let mut blocked = grid.misses() | footprints;
        if !ships_may_touch {
            blocked |= footprints.dilate();
        }
        let sunk_any = grid.sunk_any();

        Self {
            width: state.width(),
            height: state.height(),
            ships,
            resolved,
            blocked,
            struck: grid.hits() | sunk_any,
            sunk_any,
            sunk_by_ship,
            pinned: state.pinned(),
            ships_may_touch,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells every layout must cover.
    pub fn pinned(&self) -> Mask {
        self.pinned
    }

    /// Cells no unresolved ship may cover.
    pub fn blocked(&self) -> Mask {
        self.blocked
    }

    pub fn ships_may_touch(&self) -> bool {
        self.ships_may_touch
    }

    /// Ships the generator must place, in id order.
    pub fn unresolved(&self) -> impl Iterator<Item = &ShipSpec> + '_ {
        self.ships.iter().filter(move |s| !self.resolved[s.id])
    }

    pub fn is_resolved(&self, id: ShipId) -> bool {
        self.resolved.get(id).copied().unwrap_or(false)
    }

    /// Single-ship check against a precomputed footprint mask.
    pub fn is_feasible_mask(&self, ship: &ShipSpec, footprint: Mask) -> bool {
        if footprint.intersects(&self.blocked) {
            return false;
        }
        if ship.sunk {
            // A sunk ship lies on struck cells only and owns all its sunk marks.
            let Some(&own) = self.sunk_by_ship.get(ship.id) else {
                return false;
            };
            let allowed = (self.struck & !self.sunk_any) | own;
            footprint.is_subset(&allowed) && own.is_subset(&footprint)
        } else {
            !footprint.intersects(&self.sunk_any)
        }
    }

    /// Whether `placement` is a legal position for `ship` considered alone.
    pub fn is_feasible_placement(&self, ship: &ShipSpec, placement: &Placement) -> bool {
        if placement.ship != ship.id || placement.length != ship.length {
            return false;
        }
        if ship.id >= self.ships.len() || self.resolved[ship.id] {
            return false;
        }
        match placement.mask(self.width, self.height) {
            Some(footprint) => self.is_feasible_mask(ship, footprint),
            None => false,
        }
    }

    /// Whether `footprint` may join a partial layout occupying `occupied`.
    #[inline]
    pub fn compatible(&self, occupied: Mask, footprint: Mask) -> bool {
        if self.ships_may_touch {
            !occupied.intersects(&footprint)
        } else {
            !occupied.dilate().intersects(&footprint)
        }
    }

    /// Full check: one feasible placement per unresolved ship, no overlaps,
    /// every pinned cell covered.
    pub fn is_feasible_layout(&self, layout: &Layout) -> bool {
        let placements = layout.placements();
        if placements.len() != self.unresolved().count() {
            return false;
        }
        let mut seen = Vec::with_capacity(placements.len());
        let mut occupied = Mask::new(self.width, self.height);
        for placement in placements {
            if seen.contains(&placement.ship) {
                return false;
            }
            seen.push(placement.ship);
            let Some(ship) = self.ships.get(placement.ship) else {
                return false;
            };
            if !self.is_feasible_placement(ship, placement) {
                return false;
            }
            let Some(footprint) = placement.mask(self.width, self.height) else {
                return false;
            };
            if !self.compatible(occupied, footprint) {
                return false;
            }
            occupied |= footprint;
        }
        occupied == layout.occupied() && self.pinned.is_subset(&occupied)
    }
}

/// One-off single-ship check straight from a board state.
pub fn is_feasible_placement(
    state: &BoardState,
    ship: &ShipSpec,
    placement: &Placement,
    ships_may_touch: bool,
) -> bool {
    Constraints::new(state, ships_may_touch).is_feasible_placement(ship, placement)
}

/// One-off layout check straight from a board state.
pub fn is_feasible_layout(state: &BoardState, layout: &Layout, ships_may_touch: bool) -> bool {
    Constraints::new(state, ships_may_touch).is_feasible_layout(layout)
}
