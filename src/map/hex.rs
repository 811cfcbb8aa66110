//! Hex coordinate system for the encounter map (axial coordinates)
//!
//! The player tank always sits at the origin. Sectors number the six
//! directions around it clockwise from the east: 0 east, 1 south-east,
//! 2 south-west, 3 west, 4 north-west, 5 north-east.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate on the encounter map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Distance from the player hex
    pub fn ring(&self) -> u32 {
        self.distance(&Self::ORIGIN)
    }

    /// The 6 neighbouring hexes, indexed by sector
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q, self.r + 1),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q + 1, self.r - 1),
        ]
    }

    /// Hexes in a line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other) as i32;
        if n == 0 {
            return vec![*self];
        }

        // Nudge off exact hex edges so ties resolve the same way every time
        let (nudge_q, nudge_r) = (1e-6_f64, 2e-6_f64);
        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let q = self.q as f64 + nudge_q + (other.q - self.q) as f64 * t;
            let r = self.r as f64 + nudge_r + (other.r - self.r) as f64 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Round floating point hex to nearest integer hex
    fn round(q: f64, r: f64) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// All hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }
}

/// Sector lying directly opposite
pub fn opposite_sector(sector: u8) -> u8 {
    (sector + 3) % 6
}

/// Rotate a sector one step; positive is clockwise
pub fn rotate_sector(sector: u8, steps: i32) -> u8 {
    (sector as i32 + steps).rem_euclid(6) as u8
}
