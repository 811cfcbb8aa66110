//! The fixed 37-hex encounter map around the player tank

use serde::{Deserialize, Serialize};

use crate::core::types::RangeBand;
use crate::map::hex::HexCoord;

/// (q, r, ring, sector) for every hex around the player.
const MAP_LAYOUT: [(i32, i32, u32, u8); 36] = [
    // Long range
    (0, -3, 3, 4),
    (1, -3, 3, 4),
    (2, -3, 3, 5),
    (3, -3, 3, 5),
    (3, -2, 3, 5),
    (3, -1, 3, 0),
    (3, 0, 3, 0),
    (2, 1, 3, 0),
    (1, 2, 3, 1),
    (0, 3, 3, 1),
    (-1, 3, 3, 1),
    (-2, 3, 3, 2),
    (-3, 3, 3, 2),
    (-3, 2, 3, 2),
    (-3, 1, 3, 3),
    (-3, 0, 3, 3),
    (-2, -1, 3, 3),
    (-1, -2, 3, 4),
    // Medium range
    (0, -2, 2, 4),
    (1, -2, 2, 4),
    (2, -2, 2, 5),
    (2, -1, 2, 5),
    (2, 0, 2, 0),
    (1, 1, 2, 0),
    (0, 2, 2, 1),
    (-1, 2, 2, 2),
    (-2, 2, 2, 2),
    (-2, 1, 2, 3),
    (-2, 0, 2, 3),
    (-1, -1, 2, 4),
    // Close range
    (0, -1, 1, 4),
    (1, -1, 1, 5),
    (1, 0, 1, 0),
    (0, 1, 1, 1),
    (-1, 1, 1, 2),
    (-1, 0, 1, 3),
];

/// A single map hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapHex {
    pub coord: HexCoord,
    /// None for the player hex
    pub band: Option<RangeBand>,
    /// None for the player hex
    pub sector: Option<u8>,
    pub smoke: u8,
}

/// The encounter map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterMap {
    pub hexes: Vec<MapHex>,
}

impl Default for EncounterMap {
    fn default() -> Self {
        Self::new()
    }
}

impl EncounterMap {
    pub fn new() -> Self {
        let mut hexes = Vec::with_capacity(MAP_LAYOUT.len() + 1);
        hexes.push(MapHex {
            coord: HexCoord::ORIGIN,
            band: None,
            sector: None,
            smoke: 0,
        });
        for &(q, r, ring, sector) in MAP_LAYOUT.iter() {
            hexes.push(MapHex {
                coord: HexCoord::new(q, r),
                band: RangeBand::from_ring(ring),
                sector: Some(sector),
                smoke: 0,
            });
        }
        Self { hexes }
    }

    pub fn hex(&self, coord: HexCoord) -> Option<&MapHex> {
        self.hexes.iter().find(|h| h.coord == coord)
    }

    pub fn hex_mut(&mut self, coord: HexCoord) -> Option<&mut MapHex> {
        self.hexes.iter_mut().find(|h| h.coord == coord)
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.hex(coord).is_some()
    }

    pub fn band_of(&self, coord: HexCoord) -> Option<RangeBand> {
        self.hex(coord).and_then(|h| h.band)
    }

    pub fn sector_of(&self, coord: HexCoord) -> Option<u8> {
        self.hex(coord).and_then(|h| h.sector)
    }

    /// Hexes of one range band within one sector, in layout order
    pub fn hexes_in(&self, band: RangeBand, sector: u8) -> Vec<HexCoord> {
        self.hexes
            .iter()
            .filter(|h| h.band == Some(band) && h.sector == Some(sector))
            .map(|h| h.coord)
            .collect()
    }

    /// The single Close hex of a sector
    pub fn close_hex(&self, sector: u8) -> HexCoord {
        HexCoord::ORIGIN.neighbors()[(sector % 6) as usize]
    }

    /// Map hexes adjacent to `coord` within a given band
    pub fn adjacent_in_band(&self, coord: HexCoord, band: RangeBand) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.band_of(*n) == Some(band))
            .collect()
    }
}
