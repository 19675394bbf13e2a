#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Event-driven score aggregation for presentation collaborators.
//!
//! The world only ever emits per-pass score deltas; keeping the running
//! total is a collaborator concern, handled here so every adapter agrees on
//! the arithmetic.

use gemfall_core::Event;

/// Running score total folded from world events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreTally {
    total: u32,
}

impl ScoreTally {
    /// Creates a tally starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score total. Never below zero.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Consumes world events, accumulating every resolved match's delta.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::MatchResolved { score_delta, .. } = event {
                self.total = self.total.saturating_add(*score_delta);
            }
        }
    }

    /// Resets the total to zero, e.g. on level teardown.
    pub fn reset(&mut self) {
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreTally;
    use gemfall_core::{CellCoord, Event, SwapToken};

    #[test]
    fn accumulates_resolved_match_deltas() {
        let mut tally = ScoreTally::new();
        tally.handle(&[
            Event::MatchResolved {
                count: 3,
                score_delta: 30,
            },
            Event::MatchResolved {
                count: 4,
                score_delta: 40,
            },
        ]);
        assert_eq!(tally.total(), 70);
    }

    #[test]
    fn ignores_unrelated_events() {
        let mut tally = ScoreTally::new();
        tally.handle(&[
            Event::SwapReverted {
                token: SwapToken::new(1),
                first: CellCoord::new(0, 0),
                second: CellCoord::new(1, 0),
            },
            Event::CascadeSettled { passes: 2 },
        ]);
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut tally = ScoreTally::new();
        tally.handle(&[Event::MatchResolved {
            count: 3,
            score_delta: 30,
        }]);
        tally.reset();
        assert_eq!(tally.total(), 0);
    }
}
