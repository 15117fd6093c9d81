//! Core types module - shared data structures, constants and configuration
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no external dependencies, making it
//! usable from the core simulation, the terminal view and the leaderboard
//! adapter alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn anchor**: (3, 0)
//!
//! # Piece Catalog
//!
//! Pieces are numbered in catalog order; the number doubles as the color index
//! written into the board grid (`0` means empty):
//!
//! | Kind | Color index |
//! |------|-------------|
//! | I | 1 |
//! | O | 2 |
//! | S | 3 |
//! | Z | 4 |
//! | L | 5 |
//! | J | 6 |
//! | T | 7 |
//!
//! # Examples
//!
//! ```
//! use cascade_tetris_types::{GameAction, Modifier, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(PieceKind::T.color_index(), 7);
//! assert_eq!(PieceKind::from_color_index(1), Some(PieceKind::I));
//!
//! assert_eq!(GameAction::from_str("rotate180"), Some(GameAction::Rotate180));
//! assert_eq!(
//!     GameAction::from_str("bomb"),
//!     Some(GameAction::Activate(Modifier::Bomb))
//! );
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Largest extent of any piece shape in either dimension.
pub const MAX_SHAPE_DIM: usize = 4;

/// Fixed frame interval used by the terminal host (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Upper bound on settling iterations per gravity pass.
pub const GRAVITY_MAX_ITERATIONS: u32 = 50;

/// Default spawn anchor (x, y)
pub const SPAWN_POSITION: (i8, i8) = (3, 0);

/// Line clear scoring table, indexed by rows cleared in one pass.
///
/// Passes clearing more than four rows score nothing.
pub const LINE_SCORES: [u32; 5] = [0, 100, 250, 400, 600];

/// Scoring table of the simpler game variant.
pub const CLASSIC_LINE_SCORES: [u32; 5] = [0, 10, 25, 40, 60];

/// Points awarded every time a piece locks.
pub const PLACEMENT_SCORE: u32 = 10;

/// Hard drop bonus per (rounded) four rows descended.
pub const HARD_DROP_BONUS_PER_FOUR_ROWS: u32 = 10;

/// Initial gravity interval (ms per row).
pub const INITIAL_DROP_MS: u32 = 700;

/// Drop interval reduction per cleared line.
pub const SPEED_INCREASE_PER_LINE_MS: u32 = 20;

/// Absolute minimum drop interval (100ms)
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// The seven tetromino piece kinds, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    S,
    Z,
    L,
    J,
    T,
}

impl PieceKind {
    /// All kinds in catalog order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
        PieceKind::T,
    ];

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            "t" => Some(PieceKind::T),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::T => "t",
        }
    }

    /// Position in the catalog (0-based).
    pub fn catalog_index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::S => 2,
            PieceKind::Z => 3,
            PieceKind::L => 4,
            PieceKind::J => 5,
            PieceKind::T => 6,
        }
    }

    /// Grid color index (catalog index + 1, never 0).
    ///
    /// ```
    /// use cascade_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.color_index(), 1);
    /// assert_eq!(PieceKind::O.color_index(), 2);
    /// ```
    pub fn color_index(&self) -> u8 {
        self.catalog_index() as u8 + 1
    }

    /// Inverse of [`PieceKind::color_index`]. `0` and unknown values yield `None`.
    pub fn from_color_index(v: u8) -> Option<Self> {
        match v {
            1..=7 => Some(Self::ALL[(v - 1) as usize]),
            _ => None,
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell covered by a piece of that kind
pub type Cell = Option<PieceKind>;

/// Rendering angle of a placed piece, measured clockwise from its catalog shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use cascade_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::Deg0.rotate_cw(), Rotation::Deg90);
    /// assert_eq!(Rotation::Deg270.rotate_cw(), Rotation::Deg0);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// One-shot session modifiers ("bonus" buttons), each usable once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Add a fixed amount to the drop interval.
    Slow,
    /// Remove a fixed number of bottom rows regardless of completeness.
    RowClear,
    /// Blast a band of cells around a random occupied cell.
    Bomb,
    /// Swap the active piece for the linear piece.
    Replace,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Slow,
        Modifier::RowClear,
        Modifier::Bomb,
        Modifier::Replace,
    ];

    /// Stable slot index (0..4) used for usage flags and number-key bindings.
    pub fn index(&self) -> usize {
        match self {
            Modifier::Slow => 0,
            Modifier::RowClear => 1,
            Modifier::Bomb => 2,
            Modifier::Replace => 3,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slow" => Some(Modifier::Slow),
            "clear" | "rowclear" => Some(Modifier::RowClear),
            "bomb" => Some(Modifier::Bomb),
            "replace" => Some(Modifier::Replace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Slow => "slow",
            Modifier::RowClear => "clear",
            Modifier::Bomb => "bomb",
            Modifier::Replace => "replace",
        }
    }
}

/// Commands delivered to the session by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one row; locks the piece when it cannot move
    SoftDrop,
    /// Instantly drop piece to its landing row and lock it
    HardDrop,
    /// Rotate 90° clockwise with wall kicks
    RotateCw,
    /// Rotate 90° counter-clockwise (no kicks)
    RotateCcw,
    /// Rotate 180° (no kicks)
    Rotate180,
    /// Exchange the active piece with the queued next piece
    SwapWithNext,
    /// Use a one-shot modifier
    Activate(Modifier),
    /// Leave NotStarted
    Start,
    /// Toggle pause state
    Pause,
    /// Reset the session back to NotStarted
    Restart,
}

impl GameAction {
    /// Parse action from string (camelCase names, case-insensitive)
    ///
    /// ```
    /// use cascade_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "rotate180" => Some(GameAction::Rotate180),
            "swapwithnext" => Some(GameAction::SwapWithNext),
            "start" => Some(GameAction::Start),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            other => Modifier::from_str(other).map(GameAction::Activate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Rotate180 => "rotate180",
            GameAction::SwapWithNext => "swapWithNext",
            GameAction::Activate(m) => m.as_str(),
            GameAction::Start => "start",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Result of a modifier activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierOutcome {
    /// Consumed and applied.
    Applied,
    /// Consumed (penalty charged) but there was nothing to act on.
    AppliedNoTarget,
    /// Consumed (penalty charged) but no valid placement existed; state restored.
    Blocked,
    /// Already used this session; nothing changed.
    AlreadyUsed,
    /// Not usable right now (not running, or no active piece); nothing changed.
    Unavailable,
}

impl ModifierOutcome {
    /// Whether the modifier was consumed by this request.
    pub fn consumed(&self) -> bool {
        matches!(
            self,
            ModifierOutcome::Applied | ModifierOutcome::AppliedNoTarget | ModifierOutcome::Blocked
        )
    }
}

/// Core-side events drained by the host after each command or tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The active piece merged into the board.
    Locked {
        kind: PieceKind,
        x: i8,
        y: i8,
        rotation: Rotation,
    },
    /// One line-clear pass (the first, or a cascade).
    LinesCleared {
        pass: u32,
        rows: u32,
        points: u32,
        drop_interval_ms: u32,
    },
    /// Settling hit the iteration cap and stopped early.
    GravityCapped { iterations: u32 },
    /// A modifier was requested.
    Modifier {
        modifier: Modifier,
        outcome: ModifierOutcome,
    },
    /// The session ended.
    GameOver { score: u32, elapsed_ms: u64 },
}

/// Tunables for the one-shot modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierConfig {
    pub slow_amount_ms: u32,
    pub clear_rows: u8,
    pub bomb_radius: u8,
    pub bomb_height: u8,
    /// Score penalty per modifier, indexed by [`Modifier::index`].
    pub penalties: [u32; 4],
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            slow_amount_ms: 400,
            clear_rows: 2,
            bomb_radius: 2,
            bomb_height: 3,
            penalties: [500, 400, 300, 300],
        }
    }
}

impl ModifierConfig {
    pub fn penalty(&self, modifier: Modifier) -> u32 {
        self.penalties[modifier.index()]
    }
}

/// Session configuration, fixed when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub initial_drop_ms: u32,
    pub speed_increase_per_line_ms: u32,
    pub min_drop_ms: u32,
    pub line_scores: [u32; 5],
    pub placement_score: u32,
    pub hard_drop_bonus: u32,
    pub spawn: (i8, i8),
    pub modifiers: ModifierConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_drop_ms: INITIAL_DROP_MS,
            speed_increase_per_line_ms: SPEED_INCREASE_PER_LINE_MS,
            min_drop_ms: DROP_INTERVAL_MIN_MS,
            line_scores: LINE_SCORES,
            placement_score: PLACEMENT_SCORE,
            hard_drop_bonus: HARD_DROP_BONUS_PER_FOUR_ROWS,
            spawn: SPAWN_POSITION,
            modifiers: ModifierConfig::default(),
        }
    }
}

impl GameConfig {
    /// Simpler variant: classic score table, otherwise identical.
    pub fn classic() -> Self {
        Self {
            line_scores: CLASSIC_LINE_SCORES,
            ..Self::default()
        }
    }

    /// Points for one clear pass of `rows` rows.
    pub fn line_score(&self, rows: usize) -> u32 {
        self.line_scores.get(rows).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_published_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.initial_drop_ms, 700);
        assert_eq!(cfg.speed_increase_per_line_ms, 20);
        assert_eq!(cfg.min_drop_ms, 100);
        assert_eq!(cfg.spawn, (3, 0));
        assert_eq!(cfg.modifiers.penalty(Modifier::Slow), 500);
        assert_eq!(cfg.modifiers.penalty(Modifier::Replace), 300);
    }

    #[test]
    fn line_score_is_zero_outside_table() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.line_score(0), 0);
        assert_eq!(cfg.line_score(2), 250);
        assert_eq!(cfg.line_score(5), 0);
        assert_eq!(GameConfig::classic().line_score(4), 60);
    }

    #[test]
    fn color_index_roundtrips_through_catalog() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_color_index(kind.color_index()), Some(kind));
        }
        assert_eq!(PieceKind::from_color_index(0), None);
        assert_eq!(PieceKind::from_color_index(8), None);
    }

    #[test]
    fn modifier_actions_parse() {
        assert_eq!(
            GameAction::from_str("slow"),
            Some(GameAction::Activate(Modifier::Slow))
        );
        assert_eq!(
            GameAction::from_str("clear"),
            Some(GameAction::Activate(Modifier::RowClear))
        );
        assert_eq!(GameAction::Activate(Modifier::Bomb).as_str(), "bomb");
    }
}
