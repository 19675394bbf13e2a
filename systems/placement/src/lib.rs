#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Retry-bounded randomized obstacle placement for level construction.

use std::collections::BTreeSet;

use gemfall_core::{CellCoord, ObstacleKind, RowSpan};
use rand::Rng;

/// Attempts allowed per cell of capacity before placement gives up.
const ATTEMPTS_PER_CELL: u64 = 4;

/// Target region and obstacle count for one placement run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementRequest {
    /// Absolute board rows obstacles may land in.
    pub rows: RowSpan,
    /// Number of board columns.
    pub columns: u32,
    /// Number of obstacles asked for; clamped to the region capacity.
    pub requested: u32,
}

/// A single obstacle chosen by the placer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstaclePlacement {
    /// Coordinate the obstacle occupies.
    pub cell: CellCoord,
    /// Kind drawn for the obstacle.
    pub kind: ObstacleKind,
}

/// Result of a placement run, including any shortfall.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Obstacles chosen, in placement order. No two share a coordinate.
    pub placed: Vec<ObstaclePlacement>,
    /// Count the run aimed for after clamping to capacity.
    pub target: u32,
}

impl PlacementOutcome {
    /// Number of obstacles the run failed to place before exhausting its
    /// retry budget. Zero means the request was met in full.
    #[must_use]
    pub fn shortfall(&self) -> u32 {
        self.target.saturating_sub(self.placed.len() as u32)
    }
}

/// Chooses obstacle positions by rejection sampling.
///
/// Coordinates are drawn uniformly within the requested region; a draw that
/// lands on an occupied cell (per the caller's `is_occupied` view or an
/// earlier placement from this run) is discarded. The total number of draws
/// is bounded by four times the region capacity, so a crowded region ends
/// with a reported shortfall instead of an unbounded loop. Never places two
/// obstacles in one cell and never exceeds the region capacity.
pub fn place_obstacles<R, F>(
    request: PlacementRequest,
    kinds: &[ObstacleKind],
    rng: &mut R,
    mut is_occupied: F,
) -> PlacementOutcome
where
    R: Rng + ?Sized,
    F: FnMut(CellCoord) -> bool,
{
    let capacity = u64::from(request.rows.len()) * u64::from(request.columns);
    let target = u64::from(request.requested).min(capacity) as u32;

    let mut outcome = PlacementOutcome {
        placed: Vec::with_capacity(target as usize),
        target,
    };

    if target == 0 || kinds.is_empty() {
        return outcome;
    }

    let attempt_budget = capacity.saturating_mul(ATTEMPTS_PER_CELL);
    let mut taken: BTreeSet<CellCoord> = BTreeSet::new();
    let mut attempts = 0;

    while (outcome.placed.len() as u32) < target && attempts < attempt_budget {
        attempts += 1;

        let row = rng.gen_range(request.rows.start()..request.rows.end());
        let column = rng.gen_range(0..request.columns);
        let cell = CellCoord::new(column, row);

        if taken.contains(&cell) || is_occupied(cell) {
            continue;
        }

        let kind = kinds[rng.gen_range(0..kinds.len())];
        let _ = taken.insert(cell);
        outcome.placed.push(ObstaclePlacement { cell, kind });
    }

    outcome
}
