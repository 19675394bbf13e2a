#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gemfall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation collaborators to react to deterministically. Systems consume
//! read-only views such as [`BoardView`] and respond with plain data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of matchable tiles a level may draw from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    /// Red gem.
    Red,
    /// Pink gem.
    Pink,
    /// Blue gem.
    Blue,
    /// Green gem.
    Green,
    /// Yellow gem.
    Yellow,
    /// Purple gem.
    Purple,
    /// Brown gem.
    Brown,
}

impl TileKind {
    /// Every tile kind the engine understands, in declaration order.
    pub const ALL: [TileKind; 7] = [
        TileKind::Red,
        TileKind::Pink,
        TileKind::Blue,
        TileKind::Green,
        TileKind::Yellow,
        TileKind::Purple,
        TileKind::Brown,
    ];
}

/// Secondary tag carried by a tile.
///
/// Powers are assigned when a tile spawns but remain inert during match
/// resolution: a powered tile clears only itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TilePower {
    /// Plain tile with no special effect.
    Normal,
    /// Reserved: clears its entire row when activated.
    HorizontalClear,
    /// Reserved: clears its entire column when activated.
    VerticalClear,
    /// Reserved: clears a surrounding area when activated.
    Bomb,
    /// Reserved: clears every tile of one kind when activated.
    ColorClear,
}

/// Kinds of non-matchable obstacles a level may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Rock obstacle.
    Rock,
    /// Wood obstacle.
    Wood,
    /// Ice obstacle.
    Ice,
    /// Metal obstacle.
    Metal,
}

impl ObstacleKind {
    /// Every obstacle kind the engine understands, in declaration order.
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Rock,
        ObstacleKind::Wood,
        ObstacleKind::Ice,
        ObstacleKind::Metal,
    ];

    /// Durability assigned to freshly placed obstacles of this kind.
    ///
    /// No interaction damages obstacles yet; the value seeds the `hp` field
    /// carried by [`Cell::Obstacle`] so presentation layers can display it.
    #[must_use]
    pub const fn max_hp(self) -> u32 {
        match self {
            Self::Wood | Self::Ice => 1,
            Self::Rock => 2,
            Self::Metal => 3,
        }
    }
}

/// Content of a single board cell.
///
/// Exactly one variant describes a cell at any time; obstacles never match
/// and always interrupt a run of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// No content; gravity and refill target these cells.
    Empty,
    /// A matchable tile.
    Tile {
        /// Kind the tile matches against.
        kind: TileKind,
        /// Inert secondary tag assigned at spawn time.
        power: TilePower,
    },
    /// A non-matchable obstacle.
    Obstacle {
        /// Kind of the obstacle.
        kind: ObstacleKind,
        /// Remaining durability; starts at [`ObstacleKind::max_hp`].
        hp: u32,
    },
}

impl Cell {
    /// Creates a tile cell with the provided kind and power.
    #[must_use]
    pub const fn tile(kind: TileKind, power: TilePower) -> Self {
        Self::Tile { kind, power }
    }

    /// Creates an obstacle cell at full durability.
    #[must_use]
    pub const fn obstacle(kind: ObstacleKind) -> Self {
        Self::Obstacle {
            kind,
            hp: kind.max_hp(),
        }
    }

    /// Reports whether the cell holds no content.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reports whether the cell holds a matchable tile.
    #[must_use]
    pub const fn is_tile(&self) -> bool {
        matches!(self, Self::Tile { .. })
    }

    /// Kind of the tile stored in the cell, if any.
    ///
    /// Empty and obstacle cells yield `None`, which is what lets them break
    /// runs during match detection.
    #[must_use]
    pub const fn tile_kind(&self) -> Option<TileKind> {
        match self {
            Self::Tile { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Location of a single board cell expressed as column and row coordinates.
///
/// Row zero is the top of the hidden spawn buffer; columns grow left to
/// right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Cardinal directions a swap request may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every cardinal direction, in clockwise order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Coordinate one step away in this direction, if it does not underflow.
    ///
    /// Callers still need to bounds-check the result against the board; only
    /// the zero edge is handled here.
    #[must_use]
    pub fn offset(self, from: CellCoord) -> Option<CellCoord> {
        match self {
            Self::North => from
                .row()
                .checked_sub(1)
                .map(|row| CellCoord::new(from.column(), row)),
            Self::South => from
                .row()
                .checked_add(1)
                .map(|row| CellCoord::new(from.column(), row)),
            Self::East => from
                .column()
                .checked_add(1)
                .map(|column| CellCoord::new(column, from.row())),
            Self::West => from
                .column()
                .checked_sub(1)
                .map(|column| CellCoord::new(column, from.row())),
        }
    }
}

/// Half-open interval of board rows selecting a scan or placement range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowSpan {
    start: u32,
    end: u32,
}

impl RowSpan {
    /// Creates a new span covering rows `start..end`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// First row contained in the span.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// First row past the end of the span.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Number of rows covered by the span.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Reports whether the span covers no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Reports whether the provided row falls inside the span.
    #[must_use]
    pub const fn contains(&self, row: u32) -> bool {
        self.start <= row && row < self.end
    }

    /// Iterator over the rows covered by the span.
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.start..self.end
    }
}

/// Opaque identifier pairing a swap's move instructions with the
/// collaborator's animation-complete acknowledgement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwapToken(u32);

impl SwapToken {
    /// Creates a new swap token with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the token.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Per-power spawn percentages rolled when a tile is allocated.
///
/// Each field is a percentage in `0..=100`; the remaining probability mass
/// falls to [`TilePower::Normal`]. The resolver treats every power as inert,
/// so these only shape what presentation layers get to display.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerWeights {
    /// Chance, in percent, that a spawned tile clears its row when activated.
    pub horizontal_clear: f32,
    /// Chance, in percent, that a spawned tile clears its column when activated.
    pub vertical_clear: f32,
    /// Chance, in percent, that a spawned tile carries a bomb charge.
    pub bomb: f32,
    /// Chance, in percent, that a spawned tile clears a whole color.
    pub color_clear: f32,
}

impl PowerWeights {
    /// Weights that spawn exclusively normal tiles.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            horizontal_clear: 0.0,
            vertical_clear: 0.0,
            bomb: 0.0,
            color_clear: 0.0,
        }
    }

    /// Sum of the configured percentages.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.horizontal_clear + self.vertical_clear + self.bomb + self.color_clear
    }
}

impl Default for PowerWeights {
    fn default() -> Self {
        Self::none()
    }
}

/// How many obstacles a level asks for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObstacleBudget {
    /// Absolute number of obstacles to place.
    Count(u32),
    /// Percentage of the visible play area to cover, rounded to the nearest
    /// whole cell.
    Percent(f32),
}

/// Immutable per-level parameters consumed when a world is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Number of visible, interactive rows.
    pub visible_rows: u32,
    /// Number of board columns.
    pub columns: u32,
    /// Number of hidden spawn-buffer rows above the visible area.
    pub spawn_rows: u32,
    /// Tile kinds the allocator may draw from. Must not be empty.
    pub tile_kinds: Vec<TileKind>,
    /// Obstacle kinds the placer may draw from.
    pub obstacle_kinds: Vec<ObstacleKind>,
    /// Requested obstacle coverage.
    pub obstacle_budget: ObstacleBudget,
    /// Optional absolute row span obstacles are restricted to; defaults to
    /// the whole visible area. Must lie within the visible rows.
    pub obstacle_span: Option<RowSpan>,
    /// Per-power spawn percentages applied by the tile allocator.
    pub power_weights: PowerWeights,
    /// Score awarded per cleared tile during scoring cascades.
    pub score_per_tile: u32,
    /// Seed for the world's random number generator; equal seeds reproduce
    /// identical levels and cascades.
    pub rng_seed: u64,
}

impl LevelConfig {
    /// Total number of board rows including the spawn buffer.
    #[must_use]
    pub const fn total_rows(&self) -> u32 {
        self.spawn_rows.saturating_add(self.visible_rows)
    }

    /// Span of the visible, interactive rows.
    #[must_use]
    pub const fn visible_span(&self) -> RowSpan {
        RowSpan::new(self.spawn_rows, self.total_rows())
    }

    /// Number of obstacles the budget resolves to over the visible area.
    #[must_use]
    pub fn obstacle_target(&self) -> u32 {
        match self.obstacle_budget {
            ObstacleBudget::Count(count) => count,
            ObstacleBudget::Percent(percent) => {
                let visible_cells = self.visible_rows as f32 * self.columns as f32;
                (visible_cells * percent / 100.0).round() as u32
            }
        }
    }

    /// Checks the configuration for fatal construction errors.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.visible_rows == 0 || self.columns == 0 {
            return Err(LevelError::InvalidDimensions {
                rows: self.visible_rows,
                columns: self.columns,
            });
        }

        if self.spawn_rows == 0 {
            return Err(LevelError::NoSpawnBuffer);
        }

        if self.tile_kinds.is_empty() {
            return Err(LevelError::NoTileKinds);
        }

        if let ObstacleBudget::Percent(percent) = self.obstacle_budget {
            if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
                return Err(LevelError::ObstaclePercentOutOfRange { percent });
            }
        }

        if self.obstacle_target() > 0 && self.obstacle_kinds.is_empty() {
            return Err(LevelError::NoObstacleKinds);
        }

        if let Some(span) = self.obstacle_span {
            let visible = self.visible_span();
            if span.is_empty() || span.start() < visible.start() || span.end() > visible.end() {
                return Err(LevelError::ObstacleSpanOutOfBounds { span });
            }
        }

        Ok(())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            visible_rows: 8,
            columns: 8,
            spawn_rows: 2,
            tile_kinds: vec![
                TileKind::Red,
                TileKind::Blue,
                TileKind::Green,
                TileKind::Yellow,
                TileKind::Purple,
            ],
            obstacle_kinds: ObstacleKind::ALL.to_vec(),
            obstacle_budget: ObstacleBudget::Count(0),
            obstacle_span: None,
            power_weights: PowerWeights::none(),
            score_per_tile: 10,
            rng_seed: 0,
        }
    }
}

/// Fatal errors surfaced while constructing a level.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum LevelError {
    /// The configured play area has a zero dimension.
    #[error("board dimensions must be positive, got {rows} rows x {columns} columns")]
    InvalidDimensions {
        /// Configured visible row count.
        rows: u32,
        /// Configured column count.
        columns: u32,
    },
    /// The spawn buffer has no rows, so gravity refill could never run.
    #[error("at least one spawn-buffer row is required")]
    NoSpawnBuffer,
    /// The allowed tile kind set is empty.
    #[error("at least one tile kind must be allowed")]
    NoTileKinds,
    /// Obstacles were requested but no obstacle kind is allowed.
    #[error("obstacles requested with an empty obstacle kind set")]
    NoObstacleKinds,
    /// The obstacle percentage falls outside `0..=100`.
    #[error("obstacle percentage {percent} is outside 0..=100")]
    ObstaclePercentOutOfRange {
        /// Rejected percentage value.
        percent: f32,
    },
    /// The configured obstacle span reaches outside the visible rows.
    #[error("obstacle span {span:?} lies outside the visible play area")]
    ObstacleSpanOutOfBounds {
        /// Rejected row span.
        span: RowSpan,
    },
    /// The initial settle cascade failed to converge within its pass budget.
    #[error("initial cascade did not settle within {passes} passes")]
    CascadeDiverged {
        /// Number of passes executed before giving up.
        passes: u32,
    },
}

/// Commands that express all permissible world mutations after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the tile at `at` swap with its neighbor in `direction`.
    RequestSwap {
        /// Coordinate of the tile the player grabbed.
        at: CellCoord,
        /// Cardinal direction of the requested exchange.
        direction: Direction,
    },
    /// Informs the world that the presentation finished animating the moves
    /// associated with the provided token.
    AnimationComplete {
        /// Token carried by the acknowledged swap or revert.
        token: SwapToken,
    },
}

/// Reasons a swap request is rejected without mutating the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapRejection {
    /// The interaction lock is held; input is ignored until it clears.
    Locked,
    /// The request or its neighbor falls outside the board.
    OutOfBounds,
    /// One of the two cells does not hold a matchable tile.
    NotATile,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reports that obstacle placement ran out of retries before reaching
    /// the requested count; the level proceeds with fewer obstacles.
    ObstacleShortfall {
        /// Number of obstacles actually placed.
        placed: u32,
        /// Number of obstacles the configuration asked for.
        requested: u32,
    },
    /// Confirms that a swap request was accepted and committed to the board.
    SwapAccepted {
        /// Token the presentation must echo once its animation finishes.
        token: SwapToken,
        /// Coordinate the grabbed tile moved from.
        first: CellCoord,
        /// Coordinate of the neighbor it exchanged with.
        second: CellCoord,
    },
    /// Reports that a swap request was ignored.
    SwapRejected {
        /// Coordinate named by the rejected request.
        at: CellCoord,
        /// Direction named by the rejected request.
        direction: Direction,
        /// Specific reason the request was ignored.
        reason: SwapRejection,
    },
    /// Announces that a committed swap produced no match and was undone.
    SwapReverted {
        /// Token the presentation must echo once the revert animation ends.
        token: SwapToken,
        /// Coordinate restored to its pre-swap content first.
        first: CellCoord,
        /// Coordinate restored to its pre-swap content second.
        second: CellCoord,
    },
    /// Instructs the presentation to move the handle shown at `from` to
    /// `to`. Emitted for gravity relocations, so processed in order the
    /// target coordinate never holds a handle; exchanges travel on
    /// [`Event::SwapAccepted`] and [`Event::SwapReverted`] instead.
    MoveIssued {
        /// Coordinate the content left.
        from: CellCoord,
        /// Coordinate the content now occupies.
        to: CellCoord,
    },
    /// Reports one resolved match pass during a scoring cascade.
    MatchResolved {
        /// Number of tiles cleared by the pass.
        count: u32,
        /// Score awarded for the pass.
        score_delta: u32,
    },
    /// Signals that a cell's content was cleared; presentation layers
    /// release the handle they hold for the coordinate.
    CellCleared {
        /// Coordinate that became empty.
        at: CellCoord,
        /// Content the cell held before clearing.
        previous: Cell,
    },
    /// Signals that a fresh tile entered the board; presentation layers
    /// acquire a handle for the coordinate.
    TileSpawned {
        /// Coordinate the tile appeared at.
        at: CellCoord,
        /// Kind assigned to the tile.
        kind: TileKind,
        /// Power assigned to the tile.
        power: TilePower,
    },
    /// Announces that a cascade converged with no matches left.
    CascadeSettled {
        /// Number of passes the cascade needed.
        passes: u32,
    },
    /// Reports that a gameplay cascade hit its pass budget and stopped
    /// early; the board is left as the final pass produced it.
    CascadeHalted {
        /// Number of passes executed before stopping.
        passes: u32,
    },
}

/// Read-only view into a dense board snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [Cell],
    columns: u32,
    total_rows: u32,
    spawn_rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Cell], columns: u32, total_rows: u32, spawn_rows: u32) -> Self {
        Self {
            cells,
            columns,
            total_rows,
            spawn_rows,
        }
    }

    /// Content of the provided cell, or `None` outside the board.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord).and_then(|index| self.cells.get(index).copied())
    }

    /// Kind of the tile at the provided cell.
    ///
    /// Out-of-bounds, empty, and obstacle cells all yield `None`, so run
    /// scanners can treat every non-tile uniformly as a break.
    #[must_use]
    pub fn tile_kind(&self, coord: CellCoord) -> Option<TileKind> {
        self.cell(coord).and_then(|cell| cell.tile_kind())
    }

    /// Number of board columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of board rows including the spawn buffer.
    #[must_use]
    pub const fn total_rows(&self) -> u32 {
        self.total_rows
    }

    /// Number of hidden spawn-buffer rows at the top of the board.
    #[must_use]
    pub const fn spawn_rows(&self) -> u32 {
        self.spawn_rows
    }

    /// Span of the visible, interactive rows.
    #[must_use]
    pub const fn visible_span(&self) -> RowSpan {
        RowSpan::new(self.spawn_rows, self.total_rows)
    }

    /// Span covering every board row, spawn buffer included.
    #[must_use]
    pub const fn full_span(&self) -> RowSpan {
        RowSpan::new(0, self.total_rows)
    }

    /// Underlying row-major cell slice.
    #[must_use]
    pub const fn cells(&self) -> &'a [Cell] {
        self.cells
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

#[cfg(test)]
mod tests {
    use super::{
        Cell, CellCoord, Direction, LevelConfig, LevelError, ObstacleBudget, ObstacleKind,
        PowerWeights, RowSpan, TileKind, TilePower,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&Cell::tile(TileKind::Green, TilePower::Bomb));
        assert_round_trip(&Cell::obstacle(ObstacleKind::Metal));
        assert_round_trip(&Cell::Empty);
    }

    #[test]
    fn level_config_round_trips_through_bincode() {
        assert_round_trip(&LevelConfig::default());
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn obstacle_hp_seeds_from_kind() {
        let cell = Cell::obstacle(ObstacleKind::Rock);
        assert_eq!(
            cell,
            Cell::Obstacle {
                kind: ObstacleKind::Rock,
                hp: ObstacleKind::Rock.max_hp(),
            }
        );
    }

    #[test]
    fn direction_offsets_follow_compass() {
        let origin = CellCoord::new(3, 4);
        assert_eq!(Direction::North.offset(origin), Some(CellCoord::new(3, 3)));
        assert_eq!(Direction::South.offset(origin), Some(CellCoord::new(3, 5)));
        assert_eq!(Direction::East.offset(origin), Some(CellCoord::new(4, 4)));
        assert_eq!(Direction::West.offset(origin), Some(CellCoord::new(2, 4)));
    }

    #[test]
    fn direction_offset_stops_at_zero_edges() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(Direction::North.offset(corner), None);
        assert_eq!(Direction::West.offset(corner), None);
    }

    #[test]
    fn row_span_reports_membership() {
        let span = RowSpan::new(2, 10);
        assert!(span.contains(2));
        assert!(span.contains(9));
        assert!(!span.contains(10));
        assert_eq!(span.len(), 8);
        assert!(!span.is_empty());
        assert!(RowSpan::new(4, 4).is_empty());
    }

    #[test]
    fn default_config_validates() {
        assert_eq!(LevelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = LevelConfig {
            columns: 0,
            ..LevelConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(LevelError::InvalidDimensions {
                rows: 8,
                columns: 0,
            })
        );
    }

    #[test]
    fn missing_spawn_buffer_is_rejected() {
        let config = LevelConfig {
            spawn_rows: 0,
            ..LevelConfig::default()
        };
        assert_eq!(config.validate(), Err(LevelError::NoSpawnBuffer));
    }

    #[test]
    fn empty_tile_kind_set_is_rejected() {
        let config = LevelConfig {
            tile_kinds: Vec::new(),
            ..LevelConfig::default()
        };
        assert_eq!(config.validate(), Err(LevelError::NoTileKinds));
    }

    #[test]
    fn obstacles_without_kinds_are_rejected() {
        let config = LevelConfig {
            obstacle_budget: ObstacleBudget::Count(4),
            obstacle_kinds: Vec::new(),
            ..LevelConfig::default()
        };
        assert_eq!(config.validate(), Err(LevelError::NoObstacleKinds));
    }

    #[test]
    fn out_of_range_percent_is_rejected() {
        let config = LevelConfig {
            obstacle_budget: ObstacleBudget::Percent(140.0),
            ..LevelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LevelError::ObstaclePercentOutOfRange { .. })
        ));
    }

    #[test]
    fn percent_budget_rounds_over_visible_cells() {
        let config = LevelConfig {
            obstacle_budget: ObstacleBudget::Percent(25.0),
            ..LevelConfig::default()
        };
        assert_eq!(config.obstacle_target(), 16);
    }

    #[test]
    fn obstacle_span_must_stay_visible() {
        let config = LevelConfig {
            obstacle_span: Some(RowSpan::new(0, 4)),
            ..LevelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LevelError::ObstacleSpanOutOfBounds { .. })
        ));

        let config = LevelConfig {
            obstacle_span: Some(RowSpan::new(2, 10)),
            ..LevelConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn power_weights_default_to_normal_only() {
        let weights = PowerWeights::default();
        assert_eq!(weights.total(), 0.0);
    }

    #[test]
    fn board_view_bounds_checks_lookups() {
        use super::BoardView;

        let cells = vec![Cell::Empty; 12];
        let view = BoardView::new(&cells, 4, 3, 1);
        assert_eq!(view.cell(CellCoord::new(3, 2)), Some(Cell::Empty));
        assert_eq!(view.cell(CellCoord::new(4, 0)), None);
        assert_eq!(view.cell(CellCoord::new(0, 3)), None);
        assert_eq!(view.visible_span(), RowSpan::new(1, 3));
        assert_eq!(view.full_span(), RowSpan::new(0, 3));
    }
}
