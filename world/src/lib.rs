#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Gemfall.
//!
//! The world owns the grid, the seeded random number generator, and the
//! player-interaction state machine. It is created once per level from a
//! validated [`LevelConfig`], mutated exclusively through [`apply`], and
//! observed through [`query`]. Everything the presentation layer needs to
//! mirror arrives as [`Event`] values.

mod board;
mod cascade;

use gemfall_core::{
    Cell, CellCoord, Command, Direction, Event, LevelConfig, LevelError, SwapRejection, SwapToken,
};
use gemfall_system_match_finding::find_matches;
use gemfall_system_placement::{place_obstacles, PlacementRequest};
use gemfall_system_tile_allocation::TileAllocator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::cascade::ResolveMode;

/// Represents the authoritative Gemfall world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    allocator: TileAllocator,
    rng: ChaCha8Rng,
    lock: InteractionLock,
    phase: SwapPhase,
    next_token: u32,
    score_per_tile: u32,
}

impl World {
    /// Creates a level from the provided configuration.
    ///
    /// Validates the configuration, places obstacles, fills every remaining
    /// cell (spawn buffer included) with random tiles, and resolves any
    /// incidental matches with a non-scoring settle cascade. Construction
    /// events (placement shortfall, settle activity) are pushed to
    /// `out_events`; on error no world is produced. The returned world is
    /// the initial board snapshot — query it rather than replaying events.
    pub fn create(config: &LevelConfig, out_events: &mut Vec<Event>) -> Result<Self, LevelError> {
        config.validate()?;

        let allocator = TileAllocator::new(config.tile_kinds.clone(), config.power_weights)
            .ok_or(LevelError::NoTileKinds)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut board = Board::new(config.columns, config.visible_rows, config.spawn_rows);

        let request = PlacementRequest {
            rows: config.obstacle_span.unwrap_or_else(|| config.visible_span()),
            columns: config.columns,
            requested: config.obstacle_target(),
        };
        let outcome = place_obstacles(request, &config.obstacle_kinds, &mut rng, |cell| {
            board.get(cell).map_or(true, |content| !content.is_empty())
        });
        for placement in &outcome.placed {
            let _ = board.set(placement.cell, Cell::obstacle(placement.kind));
        }
        if outcome.shortfall() > 0 {
            out_events.push(Event::ObstacleShortfall {
                placed: outcome.placed.len() as u32,
                requested: outcome.target,
            });
        }

        for row in 0..board.total_rows() {
            for column in 0..board.columns() {
                let coord = CellCoord::new(column, row);
                if board.get(coord) == Some(Cell::Empty) {
                    let kind = allocator.kind(&mut rng);
                    let power = allocator.power(&mut rng);
                    let _ = board.set(coord, Cell::tile(kind, power));
                }
            }
        }

        let mut world = Self {
            board,
            allocator,
            rng,
            lock: InteractionLock::default(),
            phase: SwapPhase::Idle,
            next_token: 0,
            score_per_tile: config.score_per_tile,
        };

        world.lock.acquire();
        let settled = cascade::resolve(
            &mut world.board,
            &world.allocator,
            &mut world.rng,
            ResolveMode::Settle,
            world.score_per_tile,
            out_events,
        );
        world.lock.release();

        match settled {
            Ok(_) => Ok(world),
            Err(overflow) => Err(LevelError::CascadeDiverged {
                passes: overflow.passes,
            }),
        }
    }

    fn allocate_token(&mut self) -> SwapToken {
        let token = SwapToken::new(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        token
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RequestSwap { at, direction } => request_swap(world, at, direction, out_events),
        Command::AnimationComplete { token } => animation_complete(world, token, out_events),
    }
}

/// Validates and commits a swap request.
///
/// The board mutation happens immediately; the presentation only animates
/// the already-committed exchange and acknowledges it later. Invalid
/// requests leave the board, the lock, and the phase untouched.
fn request_swap(
    world: &mut World,
    at: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let reject = |reason: SwapRejection, out_events: &mut Vec<Event>| {
        out_events.push(Event::SwapRejected {
            at,
            direction,
            reason,
        });
    };

    if world.lock.is_locked() {
        reject(SwapRejection::Locked, out_events);
        return;
    }

    let Some(neighbor) = direction.offset(at) else {
        reject(SwapRejection::OutOfBounds, out_events);
        return;
    };

    let (Some(source), Some(target)) = (world.board.get(at), world.board.get(neighbor)) else {
        reject(SwapRejection::OutOfBounds, out_events);
        return;
    };

    if !source.is_tile() || !target.is_tile() {
        reject(SwapRejection::NotATile, out_events);
        return;
    }

    let _ = world.board.swap(at, neighbor);
    world.lock.acquire();
    let token = world.allocate_token();
    world.phase = SwapPhase::PendingSwap {
        token,
        first: at,
        second: neighbor,
    };
    out_events.push(Event::SwapAccepted {
        token,
        first: at,
        second: neighbor,
    });
}

/// Advances the swap state machine on a presentation acknowledgement.
///
/// A matching token after a committed swap either starts the scoring
/// cascade or reverts the exchange; a matching token after a revert returns
/// the world to idle. Anything else is a stale acknowledgement and is
/// ignored.
fn animation_complete(world: &mut World, token: SwapToken, out_events: &mut Vec<Event>) {
    match world.phase {
        SwapPhase::PendingSwap {
            token: expected,
            first,
            second,
        } if expected == token => {
            let matches = find_matches(&world.board.view(), world.board.visible_span());
            if matches.is_empty() {
                let _ = world.board.swap(first, second);
                world.phase = SwapPhase::PendingRevert { token: expected };
                out_events.push(Event::SwapReverted {
                    token: expected,
                    first,
                    second,
                });
            } else {
                world.phase = SwapPhase::Resolving;
                world.lock.acquire();
                // Overflow is report-only here: the resolver has already
                // emitted CascadeHalted and the board stays playable.
                let _ = cascade::resolve(
                    &mut world.board,
                    &world.allocator,
                    &mut world.rng,
                    ResolveMode::Scoring,
                    world.score_per_tile,
                    out_events,
                );
                world.lock.release();
                world.phase = SwapPhase::Idle;
                world.lock.release();
            }
        }
        SwapPhase::PendingRevert { token: expected } if expected == token => {
            world.phase = SwapPhase::Idle;
            world.lock.release();
        }
        _ => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{SwapPhase, World};
    use gemfall_core::{BoardView, SwapToken};

    /// Captures a read-only view of the current board cells.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Current depth of the re-entrant interaction lock.
    #[must_use]
    pub fn lock_count(world: &World) -> u32 {
        world.lock.count()
    }

    /// Reports whether a swap request would currently be considered.
    #[must_use]
    pub fn is_accepting_input(world: &World) -> bool {
        !world.lock.is_locked()
    }

    /// Token of the swap or revert awaiting acknowledgement, if any.
    #[must_use]
    pub fn pending_swap(world: &World) -> Option<SwapToken> {
        match world.phase {
            SwapPhase::PendingSwap { token, .. } | SwapPhase::PendingRevert { token } => {
                Some(token)
            }
            SwapPhase::Idle | SwapPhase::Resolving => None,
        }
    }
}

/// Re-entrant counter gating player input.
///
/// Several inhibiting reasons can overlap (an in-flight swap while its
/// cascade resolves), so the gate counts holders instead of toggling a
/// flag; input is accepted only at zero.
#[derive(Debug, Default)]
struct InteractionLock {
    count: u32,
}

impl InteractionLock {
    fn acquire(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    fn release(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    fn is_locked(&self) -> bool {
        self.count > 0
    }

    fn count(&self) -> u32 {
        self.count
    }
}

/// Player-interaction state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SwapPhase {
    /// No swap in flight; input is considered.
    Idle,
    /// A swap is committed to the board and awaits its acknowledgement.
    PendingSwap {
        token: SwapToken,
        first: CellCoord,
        second: CellCoord,
    },
    /// The scoring cascade is running.
    Resolving,
    /// A revert is committed and awaits its acknowledgement.
    PendingRevert { token: SwapToken },
}

#[cfg(test)]
mod tests {
    use super::{apply, query, InteractionLock, SwapPhase, World};
    use crate::board::Board;
    use gemfall_core::{
        Cell, CellCoord, Command, Direction, Event, LevelConfig, LevelError, ObstacleKind,
        PowerWeights, SwapRejection, SwapToken, TileKind, TilePower,
    };
    use gemfall_system_match_finding::find_matches;
    use gemfall_system_tile_allocation::TileAllocator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Builds a world around a hand-written board; `.` empty, `#` rock,
    /// letters tile kinds. The first `spawn_rows` rows form the buffer.
    fn world_from_rows(rows: &[&str], spawn_rows: u32, kinds: &[TileKind]) -> World {
        let columns = rows[0].len() as u32;
        let total_rows = rows.len() as u32;
        let mut board = Board::new(columns, total_rows - spawn_rows, spawn_rows);

        for (row, line) in rows.iter().enumerate() {
            for (column, symbol) in line.chars().enumerate() {
                let cell = match symbol {
                    '.' => Cell::Empty,
                    '#' => Cell::obstacle(ObstacleKind::Rock),
                    'R' => Cell::tile(TileKind::Red, TilePower::Normal),
                    'B' => Cell::tile(TileKind::Blue, TilePower::Normal),
                    'G' => Cell::tile(TileKind::Green, TilePower::Normal),
                    'Y' => Cell::tile(TileKind::Yellow, TilePower::Normal),
                    other => panic!("unknown board symbol {other}"),
                };
                assert!(board.set(CellCoord::new(column as u32, row as u32), cell));
            }
        }

        World {
            board,
            allocator: TileAllocator::new(kinds.to_vec(), PowerWeights::none())
                .expect("non-empty kinds"),
            rng: ChaCha8Rng::seed_from_u64(99),
            lock: InteractionLock::default(),
            phase: SwapPhase::Idle,
            next_token: 0,
            score_per_tile: 10,
        }
    }

    fn accepted_token(events: &[Event]) -> SwapToken {
        events
            .iter()
            .find_map(|event| match event {
                Event::SwapAccepted { token, .. } => Some(*token),
                _ => None,
            })
            .expect("swap accepted")
    }

    #[test]
    fn create_rejects_invalid_dimensions() {
        let config = LevelConfig {
            columns: 0,
            ..LevelConfig::default()
        };
        let mut events = Vec::new();
        assert!(matches!(
            World::create(&config, &mut events),
            Err(LevelError::InvalidDimensions { .. })
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn create_settles_to_a_matchless_board() {
        for seed in 0..8 {
            let config = LevelConfig {
                rng_seed: seed,
                ..LevelConfig::default()
            };
            let mut events = Vec::new();
            let world = World::create(&config, &mut events).expect("level builds");

            let view = query::board_view(&world);
            assert!(
                find_matches(&view, view.full_span()).is_empty(),
                "seed {seed} left unresolved matches"
            );
            assert!(query::is_accepting_input(&world));
            assert_eq!(query::lock_count(&world), 0);
        }
    }

    #[test]
    fn create_is_deterministic_for_a_seed() {
        let config = LevelConfig {
            rng_seed: 42,
            ..LevelConfig::default()
        };

        let mut first_events = Vec::new();
        let first = World::create(&config, &mut first_events).expect("level builds");
        let mut second_events = Vec::new();
        let second = World::create(&config, &mut second_events).expect("level builds");

        assert_eq!(
            query::board_view(&first).cells(),
            query::board_view(&second).cells()
        );
        assert_eq!(first_events, second_events);
    }

    #[test]
    fn create_reports_divergence_for_a_single_kind() {
        let config = LevelConfig {
            tile_kinds: vec![TileKind::Red],
            rng_seed: 5,
            ..LevelConfig::default()
        };
        let mut events = Vec::new();
        assert!(matches!(
            World::create(&config, &mut events),
            Err(LevelError::CascadeDiverged { .. })
        ));
    }

    #[test]
    fn swap_requests_are_rejected_while_locked() {
        let mut world = world_from_rows(
            &[
                "....", //
                "RBRB",
                "BRBR",
                "RBRB",
            ],
            1,
            &[TileKind::Red, TileKind::Blue, TileKind::Green],
        );

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(0, 1),
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(query::lock_count(&world), 1);

        let snapshot = query::board_view(&world).cells().to_vec();
        let mut rejected_events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(2, 2),
                direction: Direction::West,
            },
            &mut rejected_events,
        );

        assert_eq!(
            rejected_events,
            vec![Event::SwapRejected {
                at: CellCoord::new(2, 2),
                direction: Direction::West,
                reason: SwapRejection::Locked,
            }]
        );
        assert_eq!(query::lock_count(&world), 1);
        assert_eq!(query::board_view(&world).cells(), snapshot.as_slice());
    }

    #[test]
    fn out_of_bounds_and_non_tile_targets_are_rejected() {
        let mut world = world_from_rows(
            &[
                "....", //
                "RB#B",
                "BRBR",
                "RBRB",
            ],
            1,
            &[TileKind::Red, TileKind::Blue],
        );
        let snapshot = query::board_view(&world).cells().to_vec();

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(3, 2),
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SwapRejected {
                at: CellCoord::new(3, 2),
                direction: Direction::East,
                reason: SwapRejection::OutOfBounds,
            }]
        );

        events.clear();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(1, 1),
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SwapRejected {
                at: CellCoord::new(1, 1),
                direction: Direction::East,
                reason: SwapRejection::NotATile,
            }]
        );

        assert_eq!(query::board_view(&world).cells(), snapshot.as_slice());
        assert_eq!(query::lock_count(&world), 0);
    }

    #[test]
    fn matchless_swap_reverts_to_the_original_board() {
        let mut world = world_from_rows(
            &[
                "....", //
                "RBRB",
                "BRBR",
                "RBRB",
            ],
            1,
            &[TileKind::Red, TileKind::Blue, TileKind::Green],
        );
        let original = query::board_view(&world).cells().to_vec();

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(0, 1),
                direction: Direction::East,
            },
            &mut events,
        );
        let token = accepted_token(&events);
        assert_ne!(query::board_view(&world).cells(), original.as_slice());

        events.clear();
        apply(&mut world, Command::AnimationComplete { token }, &mut events);

        assert_eq!(
            events,
            vec![Event::SwapReverted {
                token,
                first: CellCoord::new(0, 1),
                second: CellCoord::new(1, 1),
            }]
        );
        assert_eq!(query::board_view(&world).cells(), original.as_slice());
        assert_eq!(query::lock_count(&world), 1);
        assert_eq!(query::pending_swap(&world), Some(token));

        events.clear();
        apply(&mut world, Command::AnimationComplete { token }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::lock_count(&world), 0);
        assert!(query::is_accepting_input(&world));
        assert_eq!(query::pending_swap(&world), None);
    }

    #[test]
    fn matching_swap_scores_and_cascades_to_stability() {
        let mut world = world_from_rows(
            &[
                "....", //
                "RBR.",
                "BRBY",
                "YYBB",
            ],
            1,
            &[
                TileKind::Red,
                TileKind::Blue,
                TileKind::Green,
                TileKind::Yellow,
            ],
        );

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(1, 1),
                direction: Direction::South,
            },
            &mut events,
        );
        let token = accepted_token(&events);

        events.clear();
        apply(&mut world, Command::AnimationComplete { token }, &mut events);

        let first_resolution = events.iter().find_map(|event| match event {
            Event::MatchResolved { count, score_delta } => Some((*count, *score_delta)),
            _ => None,
        });
        assert_eq!(first_resolution, Some((6, 60)));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::CascadeSettled { .. })));

        let view = query::board_view(&world);
        assert!(find_matches(&view, view.full_span()).is_empty());
        assert_eq!(query::lock_count(&world), 0);
        assert!(query::is_accepting_input(&world));
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut world = world_from_rows(
            &[
                "....", //
                "RBRB",
                "BRBR",
                "RBRB",
            ],
            1,
            &[TileKind::Red, TileKind::Blue],
        );

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AnimationComplete {
                token: SwapToken::new(17),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::lock_count(&world), 0);

        apply(
            &mut world,
            Command::RequestSwap {
                at: CellCoord::new(0, 1),
                direction: Direction::East,
            },
            &mut events,
        );
        let token = accepted_token(&events);
        let snapshot = query::board_view(&world).cells().to_vec();

        events.clear();
        apply(
            &mut world,
            Command::AnimationComplete {
                token: SwapToken::new(token.get().wrapping_add(1)),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::board_view(&world).cells(), snapshot.as_slice());
        assert_eq!(query::pending_swap(&world), Some(token));
    }
}
