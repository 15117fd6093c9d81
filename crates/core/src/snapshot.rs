use crate::piece::Tetromino;
use crate::registry::PlacedPiece;
use crate::shape::Shape;
use crate::types::{Modifier, PieceKind, Rotation, SessionPhase, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation(),
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
    pub modified: bool,
}

impl From<&PlacedPiece> for PieceSnapshot {
    fn from(value: &PlacedPiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            shape: value.shape,
            x: value.x,
            y: value.y,
            modified: value.modified,
        }
    }
}

/// Read-only render feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Color index per cell, 0 = empty.
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub pieces: Vec<PieceSnapshot>,
    pub active: Option<ActiveSnapshot>,
    /// Anchor row the active piece would land on.
    pub landing_y: Option<i8>,
    pub next: PieceKind,
    pub can_swap: bool,
    pub phase: SessionPhase,
    pub seed: u32,
    pub score: u32,
    pub lines: u32,
    pub drop_interval_ms: u32,
    pub elapsed_ms: u64,
    /// Used-once flags, indexed by [`Modifier::index`].
    pub modifiers_used: [bool; 4],
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.pieces.clear();
        self.active = None;
        self.landing_y = None;
        self.next = PieceKind::I;
        self.can_swap = true;
        self.phase = SessionPhase::NotStarted;
        self.seed = 0;
        self.score = 0;
        self.lines = 0;
        self.drop_interval_ms = 0;
        self.elapsed_ms = 0;
        self.modifiers_used = [false; 4];
    }

    pub fn started(&self) -> bool {
        self.phase != SessionPhase::NotStarted
    }

    pub fn paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn playable(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn modifier_used(&self, modifier: Modifier) -> bool {
        self.modifiers_used[modifier.index()]
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            pieces: Vec::new(),
            active: None,
            landing_y: None,
            next: PieceKind::I,
            can_swap: true,
            phase: SessionPhase::NotStarted,
            seed: 0,
            score: 0,
            lines: 0,
            drop_interval_ms: 0,
            elapsed_ms: 0,
            modifiers_used: [false; 4],
        };
        s.clear();
        s
    }
}
