#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random tile kind and power selection for initial fill and refill.

use gemfall_core::{PowerWeights, TileKind, TilePower};
use rand::Rng;

/// Draws tile kinds and powers from a level's allowed set.
///
/// The allocator is pure apart from the caller-provided RNG, so equal seeds
/// reproduce equal fills.
#[derive(Clone, Debug)]
pub struct TileAllocator {
    kinds: Vec<TileKind>,
    weights: PowerWeights,
}

impl TileAllocator {
    /// Creates an allocator over the provided kind set.
    ///
    /// Returns `None` when the set is empty; a level without tile kinds has
    /// nothing to fill the board with.
    #[must_use]
    pub fn new(kinds: Vec<TileKind>, weights: PowerWeights) -> Option<Self> {
        if kinds.is_empty() {
            return None;
        }
        Some(Self { kinds, weights })
    }

    /// Kinds the allocator draws from.
    #[must_use]
    pub fn kinds(&self) -> &[TileKind] {
        &self.kinds
    }

    /// Draws a uniformly random kind from the allowed set.
    pub fn kind<R>(&self, rng: &mut R) -> TileKind
    where
        R: Rng + ?Sized,
    {
        self.kinds[rng.gen_range(0..self.kinds.len())]
    }

    /// Draws a uniformly random kind, excluding `previous` when possible.
    ///
    /// The exclusion reduces, but does not eliminate, immediate re-matches
    /// after an in-place refill. When `previous` is the only allowed kind
    /// the draw falls back to the full set.
    pub fn kind_excluding<R>(&self, previous: TileKind, rng: &mut R) -> TileKind
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<TileKind> = self
            .kinds
            .iter()
            .copied()
            .filter(|kind| *kind != previous)
            .collect();

        if candidates.is_empty() {
            self.kind(rng)
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        }
    }

    /// Rolls a tile power from the configured spawn percentages.
    ///
    /// The configured fields claim consecutive slices of a single roll in
    /// `0..100`; whatever mass they leave uncovered yields
    /// [`TilePower::Normal`].
    pub fn power<R>(&self, rng: &mut R) -> TilePower
    where
        R: Rng + ?Sized,
    {
        let roll: f32 = rng.gen_range(0.0..100.0);
        let mut threshold = self.weights.horizontal_clear;
        if roll < threshold {
            return TilePower::HorizontalClear;
        }
        threshold += self.weights.vertical_clear;
        if roll < threshold {
            return TilePower::VerticalClear;
        }
        threshold += self.weights.bomb;
        if roll < threshold {
            return TilePower::Bomb;
        }
        threshold += self.weights.color_clear;
        if roll < threshold {
            return TilePower::ColorClear;
        }
        TilePower::Normal
    }
}
