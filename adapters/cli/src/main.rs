#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Gemfall level by itself.
//!
//! The binary stands in for the full presentation stack: it keeps a pooled
//! handle registry in sync with world events, acknowledges every animation
//! instantly, drives seeded random swaps, and prints the visible board
//! between moves.

mod pool;

use anyhow::{Context, Result};
use clap::Parser;
use gemfall_core::{
    Cell, CellCoord, Command, Direction, Event, LevelConfig, ObstacleBudget, TileKind,
};
use gemfall_system_scoring::ScoreTally;
use gemfall_world::{apply, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::pool::PresentationPool;

/// Options accepted by the self-playing session.
#[derive(Debug, Parser)]
#[command(name = "gemfall", about = "Self-playing Gemfall session")]
struct Options {
    /// Visible rows of the play area.
    #[arg(long, default_value_t = 8)]
    rows: u32,
    /// Columns of the play area.
    #[arg(long, default_value_t = 8)]
    columns: u32,
    /// Hidden spawn-buffer rows above the play area.
    #[arg(long, default_value_t = 2)]
    spawn_rows: u32,
    /// Obstacles to place, as an absolute count.
    #[arg(long, default_value_t = 6)]
    obstacles: u32,
    /// Seed shared by level generation and the swap driver.
    #[arg(long, default_value_t = 2024)]
    seed: u64,
    /// Number of random swaps to attempt.
    #[arg(long, default_value_t = 24)]
    swaps: u32,
}

/// Entry point for the Gemfall command-line session.
fn main() -> Result<()> {
    env_logger::init();
    let options = Options::parse();

    let config = LevelConfig {
        visible_rows: options.rows,
        columns: options.columns,
        spawn_rows: options.spawn_rows,
        obstacle_budget: ObstacleBudget::Count(options.obstacles),
        rng_seed: options.seed,
        ..LevelConfig::default()
    };

    let mut events = Vec::new();
    let mut world = World::create(&config, &mut events).context("level construction failed")?;
    log_notable(&events);

    let mut pool = PresentationPool::new();
    pool.adopt_board(&query::board_view(&world));
    let mut tally = ScoreTally::new();

    log::info!(
        "level ready: {}x{} visible cells, {} live handles",
        options.columns,
        options.rows,
        pool.live_count()
    );
    println!("initial board");
    println!("{}", render_visible(&world));

    let mut driver = ChaCha8Rng::seed_from_u64(options.seed);
    let mut accepted = 0_u32;
    let mut rejected = 0_u32;

    for attempt in 0..options.swaps {
        let view = query::board_view(&world);
        let at = CellCoord::new(
            driver.gen_range(0..view.columns()),
            driver.gen_range(view.visible_span().start()..view.visible_span().end()),
        );
        let direction = Direction::ALL[driver.gen_range(0..Direction::ALL.len())];

        events.clear();
        apply(&mut world, Command::RequestSwap { at, direction }, &mut events);
        pool.observe(&events);
        tally.handle(&events);

        let Some(token) = events.iter().find_map(|event| match event {
            Event::SwapAccepted { token, .. } => Some(*token),
            _ => None,
        }) else {
            rejected += 1;
            log::debug!("swap {attempt} at {at:?} toward {direction:?} rejected");
            continue;
        };
        accepted += 1;

        // The animation "finishes" immediately; the world decides whether
        // the committed swap cascades or reverts.
        events.clear();
        apply(&mut world, Command::AnimationComplete { token }, &mut events);
        pool.observe(&events);
        tally.handle(&events);
        log_notable(&events);

        if events
            .iter()
            .any(|event| matches!(event, Event::SwapReverted { .. }))
        {
            events.clear();
            apply(&mut world, Command::AnimationComplete { token }, &mut events);
            pool.observe(&events);
            log::debug!("swap {attempt} at {at:?} produced no match and was undone");
        } else {
            log::debug!("swap {attempt} at {at:?} resolved, score now {}", tally.total());
            println!("after swap {attempt} ({at:?} toward {direction:?})");
            println!("{}", render_visible(&world));
        }
    }

    println!("final board");
    println!("{}", render_visible(&world));
    println!(
        "swaps: {accepted} accepted, {rejected} rejected; score: {}",
        tally.total()
    );
    println!(
        "pool: {} live handles, {} idle, {} reuses",
        pool.live_count(),
        pool.idle_count(),
        pool.reuse_count()
    );

    Ok(())
}

/// Renders the visible play area as one character per cell.
fn render_visible(world: &World) -> String {
    let view = query::board_view(world);
    let mut output = String::new();
    for row in view.visible_span().rows() {
        for column in 0..view.columns() {
            let symbol = match view.cell(CellCoord::new(column, row)) {
                Some(Cell::Tile { kind, .. }) => tile_symbol(kind),
                Some(Cell::Obstacle { .. }) => '#',
                _ => '.',
            };
            output.push(symbol);
        }
        output.push('\n');
    }
    output
}

fn tile_symbol(kind: TileKind) -> char {
    match kind {
        TileKind::Red => 'R',
        TileKind::Pink => 'N',
        TileKind::Blue => 'B',
        TileKind::Green => 'G',
        TileKind::Yellow => 'Y',
        TileKind::Purple => 'P',
        TileKind::Brown => 'W',
    }
}

/// Surfaces events an operator should notice in the log.
fn log_notable(events: &[Event]) {
    for event in events {
        match event {
            Event::ObstacleShortfall { placed, requested } => {
                log::warn!("obstacle placement fell short: {placed} of {requested}");
            }
            Event::CascadeHalted { passes } => {
                log::warn!("cascade halted after {passes} passes without converging");
            }
            _ => {}
        }
    }
}
