#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure run-detection system that scans a board region for matches.

use std::collections::BTreeSet;

use gemfall_core::{BoardView, CellCoord, RowSpan};

/// Minimum run length that counts as a match.
const MIN_RUN: u32 = 3;

/// Set of board coordinates that belong to at least one matched run.
///
/// Horizontal and vertical contributions are unioned, so the intersection
/// cell of an L- or T-shaped match appears exactly once. Iteration order is
/// stable (the backing set is ordered) so downstream event emission stays
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSet {
    cells: BTreeSet<CellCoord>,
}

impl MatchSet {
    /// Reports whether no matched run was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of distinct matched coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the provided coordinate belongs to a matched run.
    #[must_use]
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains(&coord)
    }

    /// Iterator over the matched coordinates in stable order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    fn insert(&mut self, coord: CellCoord) {
        let _ = self.cells.insert(coord);
    }
}

impl IntoIterator for MatchSet {
    type Item = CellCoord;
    type IntoIter = std::collections::btree_set::IntoIter<CellCoord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Scans the provided row span for runs of at least three same-kind tiles.
///
/// Rows are scanned left to right and columns top to bottom, grouping
/// maximal consecutive runs of identical tile kind; empty and obstacle
/// cells always break a run. The full column range is always covered;
/// callers pick the row span to include or exclude the spawn buffer. The
/// scan is pure and deterministic for a given board snapshot.
#[must_use]
pub fn find_matches(view: &BoardView<'_>, span: RowSpan) -> MatchSet {
    let mut matches = MatchSet::default();
    let columns = view.columns();
    let row_end = span.end().min(view.total_rows());
    let row_start = span.start().min(row_end);

    for row in row_start..row_end {
        let mut column = 0;
        while column < columns {
            let Some(kind) = view.tile_kind(CellCoord::new(column, row)) else {
                column += 1;
                continue;
            };

            let mut run = 1;
            while column + run < columns
                && view.tile_kind(CellCoord::new(column + run, row)) == Some(kind)
            {
                run += 1;
            }

            if run >= MIN_RUN {
                for step in 0..run {
                    matches.insert(CellCoord::new(column + step, row));
                }
            }

            column += run;
        }
    }

    for column in 0..columns {
        let mut row = row_start;
        while row < row_end {
            let Some(kind) = view.tile_kind(CellCoord::new(column, row)) else {
                row += 1;
                continue;
            };

            let mut run = 1;
            while row + run < row_end
                && view.tile_kind(CellCoord::new(column, row + run)) == Some(kind)
            {
                run += 1;
            }

            if run >= MIN_RUN {
                for step in 0..run {
                    matches.insert(CellCoord::new(column, row + step));
                }
            }

            row += run;
        }
    }

    matches
}
