//! Encounter map - the player hex surrounded by three rings of hexes
//!
//! Range band and sector of every hex are fixed; only smoke changes.

pub mod encounter_map;
pub mod hex;
pub mod smoke;

pub use encounter_map::{EncounterMap, MapHex};
pub use hex::{opposite_sector, rotate_sector, HexCoord};
pub use smoke::SMOKE_DRM_PER_FACTOR;
