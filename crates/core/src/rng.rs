//! RNG module - deterministic piece supply
//!
//! Provides a small LCG and three spawners built on it:
//!
//! - [`UniformSpawner`]: each kind drawn independently with equal odds
//! - [`BagSpawner`]: "7-bag" draws, every kind once per shuffled bag
//! - [`SequenceSpawner`]: a fixed cycle of kinds, for scripted games

use crate::collab::Spawner;
use crate::pieces::Piece;
use crate::types::{PieceKind, Pos};

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
    pub fn next_range(&mut self, max: u32) -> u32 {
        // Low LCG bits have short periods; sample the high half
        (self.next_u32() >> 16) % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Uniformly random kinds at a fixed spawn pivot
#[derive(Debug, Clone)]
pub struct UniformSpawner {
    rng: SimpleRng,
    pivot: Pos,
}

impl UniformSpawner {
    pub fn new(seed: u32, pivot: Pos) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            pivot,
        }
    }

    pub fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.next_range(PieceKind::ALL.len() as u32) as usize]
    }
}

impl Spawner for UniformSpawner {
    fn spawn_next(&mut self, id: u32) -> Piece {
        let kind = self.next_kind();
        Piece::new(kind, self.pivot, id)
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct BagSpawner {
    /// Current bag of pieces
    bag: [PieceKind; 7],
    /// Index into current bag
    bag_index: usize,
    /// RNG for shuffling
    rng: SimpleRng,
    pivot: Pos,
}

impl BagSpawner {
    pub fn new(seed: u32, pivot: Pos) -> Self {
        let mut spawner = Self {
            bag: PieceKind::ALL,
            bag_index: 0,
            rng: SimpleRng::new(seed),
            pivot,
        };
        spawner.refill_bag();
        spawner
    }

    /// Generate a new shuffled bag
    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next piece kind, refilling the bag when exhausted
    pub fn next_kind(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill_bag();
        }
        let kind = self.bag[self.bag_index];
        self.bag_index += 1;
        kind
    }
}

impl Spawner for BagSpawner {
    fn spawn_next(&mut self, id: u32) -> Piece {
        let kind = self.next_kind();
        Piece::new(kind, self.pivot, id)
    }
}

/// Cycles through a fixed list of kinds
#[derive(Debug, Clone)]
pub struct SequenceSpawner {
    kinds: Vec<PieceKind>,
    next: usize,
    pivot: Pos,
}

impl SequenceSpawner {
    /// An empty list falls back to the canonical I, O, T, S, Z, J, L cycle.
    pub fn new(kinds: &[PieceKind], pivot: Pos) -> Self {
        let kinds = if kinds.is_empty() {
            PieceKind::ALL.to_vec()
        } else {
            kinds.to_vec()
        };
        Self {
            kinds,
            next: 0,
            pivot,
        }
    }
}

impl Spawner for SequenceSpawner {
    fn spawn_next(&mut self, id: u32) -> Piece {
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next = self.next.wrapping_add(1);
        Piece::new(kind, self.pivot, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceState;
    use crate::types::{Rotation, SPAWN_X, SPAWN_Y};

    const SPAWN: Pos = Pos::new(SPAWN_X, SPAWN_Y);

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_bag_contains_every_kind_once() {
        let mut spawner = BagSpawner::new(12345, SPAWN);
        for _ in 0..3 {
            let mut bag: Vec<_> = (0..7).map(|_| spawner.next_kind()).collect();
            bag.sort_by_key(|k| k.as_str());
            let mut all = PieceKind::ALL.to_vec();
            all.sort_by_key(|k| k.as_str());
            assert_eq!(bag, all);
        }
    }

    #[test]
    fn test_uniform_spawner_reaches_every_kind() {
        let mut spawner = UniformSpawner::new(7, SPAWN);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(spawner.next_kind());
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_spawned_piece_is_fresh() {
        let mut spawner = UniformSpawner::new(99, SPAWN);
        let piece = spawner.spawn_next(5);
        assert_eq!(piece.pivot(), SPAWN);
        assert_eq!(piece.rotation(), Rotation::North);
        assert_eq!(piece.state(), PieceState::Falling);
        assert_eq!(piece.id(), 5);
    }

    #[test]
    fn test_sequence_spawner_cycles() {
        let mut spawner = SequenceSpawner::new(&[PieceKind::I, PieceKind::O], SPAWN);
        let kinds: Vec<_> = (0..5).map(|id| spawner.spawn_next(id).kind()).collect();
        assert_eq!(
            kinds,
            vec![PieceKind::I, PieceKind::O, PieceKind::I, PieceKind::O, PieceKind::I]
        );
    }
}
