//! Cascade resolution: clear matched runs, refill, repeat until stable.

use gemfall_core::{Cell, CellCoord, Event};
use gemfall_system_match_finding::find_matches;
use gemfall_system_tile_allocation::TileAllocator;
use rand_chacha::ChaCha8Rng;

use crate::board::Board;

/// Hard bound on resolution passes per cascade.
///
/// The refill policies cannot guarantee convergence for every configuration
/// (a single allowed kind rematches forever), so the loop carries an
/// explicit budget instead of trusting the probabilistic argument.
pub(crate) const PASS_LIMIT: u32 = 1_024;

/// Refill strategy and event policy for one cascade run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResolveMode {
    /// Level construction: no score events, cleared cells refill in place,
    /// every pass scans the whole board including the spawn buffer.
    Settle,
    /// Gameplay: score events and gravity refill. The first pass scans the
    /// visible rows only (it judges the player-visible board); later passes
    /// scan everything so runs formed in the buffer are cleared too.
    Scoring,
}

/// Raised when a cascade exhausts [`PASS_LIMIT`] without converging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CascadeOverflow {
    /// Number of passes executed before giving up.
    pub(crate) passes: u32,
}

/// Runs the cascade loop until no matched run remains, returning the number
/// of clear/refill passes it needed.
///
/// Every mutation is reported through `out_events` so presentation
/// collaborators can mirror the board without reading it: `CellCleared`
/// releases a handle, `TileSpawned` acquires one, `MoveIssued` relocates
/// one. In scoring mode each pass additionally emits `MatchResolved` before
/// the clears it describes.
pub(crate) fn resolve(
    board: &mut Board,
    allocator: &TileAllocator,
    rng: &mut ChaCha8Rng,
    mode: ResolveMode,
    score_per_tile: u32,
    out_events: &mut Vec<Event>,
) -> Result<u32, CascadeOverflow> {
    let mut passes = 0;

    loop {
        let span = match mode {
            ResolveMode::Settle => board.full_span(),
            ResolveMode::Scoring if passes == 0 => board.visible_span(),
            ResolveMode::Scoring => board.full_span(),
        };

        let matches = find_matches(&board.view(), span);
        if matches.is_empty() {
            out_events.push(Event::CascadeSettled { passes });
            return Ok(passes);
        }

        if passes >= PASS_LIMIT {
            if mode == ResolveMode::Scoring {
                out_events.push(Event::CascadeHalted { passes });
            }
            return Err(CascadeOverflow { passes });
        }
        passes += 1;

        if mode == ResolveMode::Scoring {
            let count = matches.len() as u32;
            out_events.push(Event::MatchResolved {
                count,
                score_delta: count.saturating_mul(score_per_tile),
            });
        }

        let mut cleared: Vec<(CellCoord, Cell)> = Vec::with_capacity(matches.len());
        for coord in matches.iter() {
            if let Some(previous) = board.get(coord) {
                let _ = board.set(coord, Cell::Empty);
                out_events.push(Event::CellCleared {
                    at: coord,
                    previous,
                });
                cleared.push((coord, previous));
            }
        }

        match mode {
            ResolveMode::Settle => fill_in_place(board, allocator, rng, &cleared, out_events),
            ResolveMode::Scoring => settle_columns(board, allocator, rng, out_events),
        }
    }
}

/// Replaces each cleared cell immediately, without shifting anything.
///
/// The kind the cell held before clearing is excluded from the draw when an
/// alternative exists, which dampens immediate rematches during the initial
/// settle.
fn fill_in_place(
    board: &mut Board,
    allocator: &TileAllocator,
    rng: &mut ChaCha8Rng,
    cleared: &[(CellCoord, Cell)],
    out_events: &mut Vec<Event>,
) {
    for (coord, previous) in cleared {
        let kind = match previous.tile_kind() {
            Some(prev) => allocator.kind_excluding(prev, rng),
            None => allocator.kind(rng),
        };
        let power = allocator.power(rng);
        let _ = board.set(*coord, Cell::tile(kind, power));
        out_events.push(Event::TileSpawned {
            at: *coord,
            kind,
            power,
        });
    }
}

/// Closes every hole by pulling content down and topping up the buffer.
///
/// One gravity pack leaves each column's holes at its top; refilling the
/// buffer then fills at least one of them, so the round count is bounded by
/// the board size and the loop always terminates.
fn settle_columns(
    board: &mut Board,
    allocator: &TileAllocator,
    rng: &mut ChaCha8Rng,
    out_events: &mut Vec<Event>,
) {
    loop {
        apply_gravity(board, out_events);
        refill_buffer(board, allocator, rng, out_events);
        if !board.has_empty_cells() {
            return;
        }
    }
}

/// Packs every column toward the bottom, preserving relative order.
///
/// Scanning bottom to top, each empty cell pulls down the nearest occupied
/// cell above it; obstacles fall exactly like tiles.
fn apply_gravity(board: &mut Board, out_events: &mut Vec<Event>) {
    for column in 0..board.columns() {
        for row in (0..board.total_rows()).rev() {
            let target = CellCoord::new(column, row);
            if board.get(target) != Some(Cell::Empty) {
                continue;
            }

            for above in (0..row).rev() {
                let source = CellCoord::new(column, above);
                let Some(cell) = board.get(source) else {
                    break;
                };
                if cell.is_empty() {
                    continue;
                }

                let _ = board.set(target, cell);
                let _ = board.set(source, Cell::Empty);
                out_events.push(Event::MoveIssued {
                    from: source,
                    to: target,
                });
                break;
            }
        }
    }
}

/// Fills empty spawn-buffer cells with freshly drawn tiles.
fn refill_buffer(
    board: &mut Board,
    allocator: &TileAllocator,
    rng: &mut ChaCha8Rng,
    out_events: &mut Vec<Event>,
) {
    for row in 0..board.spawn_rows() {
        for column in 0..board.columns() {
            let coord = CellCoord::new(column, row);
            if board.get(coord) != Some(Cell::Empty) {
                continue;
            }

            let kind = allocator.kind(rng);
            let power = allocator.power(rng);
            let _ = board.set(coord, Cell::tile(kind, power));
            out_events.push(Event::TileSpawned {
                at: coord,
                kind,
                power,
            });
        }
    }
}
