//! RNG module - uniform random piece generation
//!
//! Every spawn is an independent uniform draw over the seven kinds, with one
//! piece held back as the visible "next" preview.
//!
//! Also provides a simple LCG for deterministic testing.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Uniform piece generator with a one-piece preview
#[derive(Debug, Clone)]
pub struct PieceQueue {
    next: PieceKind,
    rng: SimpleRng,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let next = Self::roll(&mut rng);
        Self { next, rng }
    }

    fn roll(rng: &mut SimpleRng) -> PieceKind {
        PieceKind::ALL[rng.next_range(PieceKind::ALL.len() as u32) as usize]
    }

    /// The piece the next [`draw`](Self::draw) will return
    pub fn peek(&self) -> PieceKind {
        self.next
    }

    /// Take the previewed piece and roll a new preview
    pub fn draw(&mut self) -> PieceKind {
        let piece = self.next;
        self.next = Self::roll(&mut self.rng);
        piece
    }

    /// Replace the previewed piece, returning the old one.
    pub fn swap_next(&mut self, kind: PieceKind) -> PieceKind {
        std::mem::replace(&mut self.next, kind)
    }

    /// Get the current RNG state (for restarting game with a fresh sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
