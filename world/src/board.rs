//! Dense cell storage backing the authoritative board.

use gemfall_core::{BoardView, Cell, CellCoord, RowSpan};

/// Row-major grid of cells, spawn buffer on top.
///
/// Dimensions are fixed at construction for the lifetime of a level. The
/// grid stores content only; all gameplay rules live in the world's command
/// handling and the cascade resolver, which are the grid's sole writers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Board {
    columns: u32,
    total_rows: u32,
    spawn_rows: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an all-empty board with the provided dimensions.
    pub(crate) fn new(columns: u32, visible_rows: u32, spawn_rows: u32) -> Self {
        let total_rows = spawn_rows.saturating_add(visible_rows);
        let capacity_u64 = u64::from(columns) * u64::from(total_rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            total_rows,
            spawn_rows,
            cells: vec![Cell::Empty; capacity],
        }
    }

    /// Content of the provided cell, or `None` outside the board.
    pub(crate) fn get(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord).and_then(|index| self.cells.get(index).copied())
    }

    /// Stores `cell` at the provided coordinate.
    ///
    /// Returns `false` without mutating anything when the coordinate lies
    /// outside the board.
    pub(crate) fn set(&mut self, coord: CellCoord, cell: Cell) -> bool {
        match self.index(coord) {
            Some(index) => {
                self.cells[index] = cell;
                true
            }
            None => false,
        }
    }

    /// Exchanges the contents of two cells.
    pub(crate) fn swap(&mut self, first: CellCoord, second: CellCoord) -> bool {
        match (self.index(first), self.index(second)) {
            (Some(a), Some(b)) => {
                self.cells.swap(a, b);
                true
            }
            _ => false,
        }
    }

    /// Number of board columns.
    pub(crate) fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of rows including the spawn buffer.
    pub(crate) fn total_rows(&self) -> u32 {
        self.total_rows
    }

    /// Number of hidden spawn-buffer rows at the top of the board.
    pub(crate) fn spawn_rows(&self) -> u32 {
        self.spawn_rows
    }

    /// Span of the visible, interactive rows.
    pub(crate) fn visible_span(&self) -> RowSpan {
        RowSpan::new(self.spawn_rows, self.total_rows)
    }

    /// Span covering every row, spawn buffer included.
    pub(crate) fn full_span(&self) -> RowSpan {
        RowSpan::new(0, self.total_rows)
    }

    /// Reports whether any cell on the board is empty.
    pub(crate) fn has_empty_cells(&self) -> bool {
        self.cells.iter().any(Cell::is_empty)
    }

    /// Captures a read-only view of the current cells.
    pub(crate) fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.columns, self.total_rows, self.spawn_rows)
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.column() < self.columns && coord.row() < self.total_rows {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
