//! Combat tables - every base score in one place
//!
//! Scores are compared against 2D6, so all values are small integers and all
//! modifiers are additive.

use crate::core::types::RangeBand;
use crate::vehicle::spec::{AmmoType, FireMode, GunType};

// Spotting numbers (2D6 at or below spots the unit)
pub const SPOT_CLOSE: i32 = 8;
pub const SPOT_MEDIUM: i32 = 6;
pub const SPOT_LONG: i32 = 4;
/// Rolling this far under the spot number also identifies the unit
pub const IDENTIFY_MARGIN: i32 = 3;

// Movement
pub const BOG_THRESHOLD: i32 = 11;
pub const HULL_DOWN_TARGET: i32 = 6;
pub const UNBOG_TARGET: i32 = 4;
/// 1D6 at or below: enemy units in the arc of travel change range band
pub const MOVE_RANGE_CHANGE_D6: u8 = 2;
/// 1D6 at or below: a pivot costs the tank its hull-down position
pub const PIVOT_LOSE_HULL_DOWN_D6: u8 = 3;

// Crew condition
pub const STUN_THRESHOLD: i32 = 7;
pub const STUN_RECOVERY_TARGET: i32 = 8;
pub const UNCONSCIOUS_RECOVERY_TARGET: i32 = 5;
pub const BAIL_OUT_TARGET: i32 = 9;

// Infantry Fire Table
pub const IFT_PIN_MARGIN: i32 = 2;
/// Friendly artillery strikes on the IFT with this base
pub const ARTILLERY_IFT_BASE: i32 = 7;

/// To-Hit base score
pub fn to_hit_base(armoured: bool, mode: FireMode, range: RangeBand) -> i32 {
    use RangeBand::*;
    match (armoured, mode, range) {
        (true, FireMode::Direct, Close) => 10,
        (true, FireMode::Direct, Medium) => 8,
        (true, FireMode::Direct, Long) => 6,
        (true, FireMode::Area, Close) => 7,
        (true, FireMode::Area, Medium) => 6,
        (true, FireMode::Area, Long) => 5,
        (false, FireMode::Direct, Close) => 8,
        (false, FireMode::Direct, Medium) => 6,
        (false, FireMode::Direct, Long) => 4,
        (false, FireMode::Area, Close) => 9,
        (false, FireMode::Area, Medium) => 8,
        (false, FireMode::Area, Long) => 7,
    }
}

/// To-Kill base score against an armoured location
///
/// Panics on a gun/ammo pair that does not exist.
pub fn to_kill_armoured_base(gun: GunType, ammo: AmmoType) -> i32 {
    use GunType::*;
    match (gun, ammo) {
        (Gun20L, AmmoType::Ap) => 6,
        (Gun20L, AmmoType::He) => 3,
        (Gun50L, AmmoType::Ap) => 9,
        (Gun50L, AmmoType::He) => 4,
        (Gun75, AmmoType::Ap) => 10,
        (Gun75, AmmoType::He) => 5,
        (Gun75L, AmmoType::Ap) => 13,
        (Gun75L, AmmoType::He) => 5,
        (Gun75LL, AmmoType::Ap) => 16,
        (Gun75LL, AmmoType::He) => 5,
        (Gun76L, AmmoType::Ap) => 13,
        (Gun76L, AmmoType::Hvap) => 17,
        (Gun76L, AmmoType::He) => 4,
        (Gun76LL, AmmoType::Ap) => 18,
        (Gun76LL, AmmoType::Apds) => 22,
        (Gun76LL, AmmoType::He) => 4,
        (Gun88L, AmmoType::Ap) => 16,
        (Gun88L, AmmoType::He) => 6,
        (Gun88LL, AmmoType::Ap) => 20,
        (Gun88LL, AmmoType::He) => 6,
        (Panzerfaust, AmmoType::Pf) => 22,
        (gun, ammo) => panic!(
            "no To-Kill entry for {} firing {}",
            gun.name(),
            ammo.name()
        ),
    }
}

/// To-Kill base score against an unarmoured location (before critical doubling)
pub fn to_kill_unarmoured_base(gun: GunType, ammo: AmmoType) -> i32 {
    use GunType::*;
    match ammo {
        AmmoType::Ap | AmmoType::Hvap | AmmoType::Apds | AmmoType::Pf => {
            // validates the pair
            to_kill_armoured_base(gun, ammo);
            8
        }
        AmmoType::He => match gun {
            Gun20L => 7,
            Gun50L => 9,
            Gun75 | Gun75L | Gun75LL => 10,
            Gun76L | Gun76LL => 9,
            Gun88L | Gun88LL => 11,
            Panzerfaust => panic!("Panzerfaust has no HE round"),
        },
        AmmoType::Wp | AmmoType::Hcbi => {
            panic!("{} smoke rounds never roll To-Kill", ammo.name())
        }
    }
}

/// IFT base for a gun firing HE
pub fn ift_gun_base(gun: GunType) -> i32 {
    use GunType::*;
    match gun {
        Gun20L => 4,
        Gun50L => 5,
        Gun75 | Gun75L | Gun75LL => 7,
        Gun76L | Gun76LL => 6,
        Gun88L | Gun88LL => 8,
        Panzerfaust => panic!("Panzerfaust does not fire on the IFT"),
    }
}

/// IFT range modifier added to MG firepower
pub fn ift_mg_range_bonus(range: RangeBand) -> i32 {
    match range {
        RangeBand::Close => 3,
        RangeBand::Medium => 1,
        RangeBand::Long => -1,
    }
}

pub fn spot_number(range: RangeBand) -> i32 {
    match range {
        RangeBand::Close => SPOT_CLOSE,
        RangeBand::Medium => SPOT_MEDIUM,
        RangeBand::Long => SPOT_LONG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hit_base_falls_with_range() {
        for armoured in [true, false] {
            for mode in [FireMode::Direct, FireMode::Area] {
                let close = to_hit_base(armoured, mode, RangeBand::Close);
                let long = to_hit_base(armoured, mode, RangeBand::Long);
                assert!(close > long);
            }
        }
    }

    #[test]
    fn test_specialist_rounds_beat_ap() {
        assert!(
            to_kill_armoured_base(GunType::Gun76L, AmmoType::Hvap)
                > to_kill_armoured_base(GunType::Gun76L, AmmoType::Ap)
        );
        assert!(
            to_kill_armoured_base(GunType::Gun76LL, AmmoType::Apds)
                > to_kill_armoured_base(GunType::Gun76LL, AmmoType::Ap)
        );
    }

    #[test]
    #[should_panic(expected = "no To-Kill entry")]
    fn test_unknown_pair_panics() {
        to_kill_armoured_base(GunType::Gun75, AmmoType::Apds);
    }

    #[test]
    #[should_panic(expected = "never roll To-Kill")]
    fn test_smoke_to_kill_panics() {
        to_kill_unarmoured_base(GunType::Gun75, AmmoType::Wp);
    }

    #[test]
    fn test_ift_gun_families() {
        assert_eq!(ift_gun_base(GunType::Gun75LL), 7);
        assert_eq!(ift_gun_base(GunType::Gun76L), 6);
        assert_eq!(ift_gun_base(GunType::Gun88L), 8);
    }
}
