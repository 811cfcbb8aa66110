//! Dice rolling behind an injectable trait
//!
//! Engine code never touches a global RNG. Every draw goes through a `Dice`
//! implementation owned by the active encounter, so a fixed seed reproduces
//! the whole sequence of rolls.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Result of a 2D6 roll, keeping both faces for doubles checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoD6 {
    pub first: u8,
    pub second: u8,
}

impl TwoD6 {
    pub fn new(first: u8, second: u8) -> Self {
        debug_assert!((1..=6).contains(&first) && (1..=6).contains(&second));
        Self { first, second }
    }

    pub fn total(&self) -> i32 {
        (self.first + self.second) as i32
    }

    pub fn is_doubles(&self) -> bool {
        self.first == self.second
    }

    pub fn is_double_six(&self) -> bool {
        self.first == 6 && self.second == 6
    }

    pub fn is_snake_eyes(&self) -> bool {
        self.first == 1 && self.second == 1
    }

    pub fn faces(&self) -> Vec<u8> {
        vec![self.first, self.second]
    }
}

/// Source of uniformly distributed die rolls
pub trait Dice: std::fmt::Debug {
    /// Roll 1D6 (1-6)
    fn d6(&mut self) -> u8;

    /// Roll 1D10 (1-10)
    fn d10(&mut self) -> u8;

    /// Roll 1D100 (1-100)
    fn d100(&mut self) -> u8;

    /// Roll 2D6 keeping both faces
    fn two_d6(&mut self) -> TwoD6 {
        let first = self.d6();
        let second = self.d6();
        TwoD6::new(first, second)
    }

    /// Percentile check: succeeds when 1D100 <= chance
    fn percent(&mut self, chance: u8) -> bool {
        chance > 0 && self.d100() <= chance
    }
}

/// Seedable dice backed by ChaCha8
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn d6(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn d10(&mut self) -> u8 {
        self.rng.gen_range(1..=10)
    }

    fn d100(&mut self) -> u8 {
        self.rng.gen_range(1..=100)
    }
}

/// Replays a fixed list of faces, one per die drawn
///
/// A 2D6 draw consumes two faces. Panics once the script runs out, which in a
/// test means the code under test drew more dice than expected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    pub fn push(&mut self, face: u8) {
        self.faces.push_back(face);
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }

    fn next_face(&mut self, sides: u8) -> u8 {
        let face = self
            .faces
            .pop_front()
            .unwrap_or_else(|| panic!("scripted dice exhausted while rolling a d{}", sides));
        assert!(
            (1..=sides).contains(&face),
            "scripted face {} is not valid for a d{}",
            face,
            sides
        );
        face
    }
}

impl Dice for ScriptedDice {
    fn d6(&mut self) -> u8 {
        self.next_face(6)
    }

    fn d10(&mut self) -> u8 {
        self.next_face(10)
    }

    fn d100(&mut self) -> u8 {
        self.next_face(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..500 {
            assert!((1..=6).contains(&dice.d6()));
            assert!((1..=10).contains(&dice.d10()));
            assert!((1..=100).contains(&dice.d100()));
            let roll = dice.two_d6();
            assert!((2..=12).contains(&roll.total()));
        }
    }

    #[test]
    fn test_seeded_dice_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let seq_a: Vec<u8> = (0..50).map(|_| a.d100()).collect();
        let seq_b: Vec<u8> = (0..50).map(|_| b.d100()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_scripted_two_d6_consumes_two_faces() {
        let mut dice = ScriptedDice::new([6, 6, 3]);
        let roll = dice.two_d6();
        assert!(roll.is_double_six());
        assert_eq!(roll.total(), 12);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.d6(), 3);
    }

    #[test]
    #[should_panic(expected = "scripted dice exhausted")]
    fn test_scripted_dice_panics_when_empty() {
        let mut dice = ScriptedDice::new([]);
        dice.d6();
    }

    #[test]
    fn test_percent_zero_never_rolls() {
        let mut dice = ScriptedDice::new([]);
        assert!(!dice.percent(0));
    }

    #[test]
    fn test_two_d6_flags() {
        assert!(TwoD6::new(1, 1).is_snake_eyes());
        assert!(TwoD6::new(3, 3).is_doubles());
        assert!(!TwoD6::new(3, 4).is_doubles());
    }
}
