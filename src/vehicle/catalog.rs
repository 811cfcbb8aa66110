//! Vehicle catalog: player Shermans and the German vehicles they meet

use crate::core::error::{EngineError, Result};
use crate::vehicle::spec::{ArmourProfile, GunType, LoaderHatch, TargetSize, VehicleSpec};

pub const M4: &str = "M4";
pub const M4A1: &str = "M4A1";
pub const M4A3: &str = "M4A3";
pub const M4A3_75W: &str = "M4A3(75)W";
pub const JUMBO_75: &str = "M4A3E2 Jumbo (75)";
pub const JUMBO_76: &str = "M4A3E2 Jumbo (76)";
pub const M4A1_76W: &str = "M4A1(76)W";
pub const M4A3_76W: &str = "M4A3(76)W";
pub const SHERMAN_II: &str = "Sherman II";
pub const SHERMAN_V: &str = "Sherman V";
pub const FIREFLY: &str = "Sherman VC Firefly";

pub const PZ_IV_H: &str = "PzKw IV H";
pub const PANTHER: &str = "PzKw V G Panther";
pub const TIGER: &str = "PzKw VI E Tiger";
pub const KING_TIGER: &str = "PzKw VI B King Tiger";
pub const STUG_III_G: &str = "StuG III G";
pub const MARDER_II: &str = "Marder II";
pub const MARDER_III_H: &str = "Marder III H";
pub const JGDPZ_IV: &str = "JgdPzKw IV";
pub const JGDPZ_38T: &str = "JgdPz 38(t)";
pub const SPW_251: &str = "SPW 251";
pub const PSW_232: &str = "PSW 232";
pub const OPEL_TRUCK: &str = "Opel Truck";

/// Vehicles the player may command
pub const PLAYER_VEHICLES: [&str; 11] = [
    M4, M4A1, M4A3, M4A3_75W, JUMBO_75, JUMBO_76, M4A1_76W, M4A3_76W, SHERMAN_II, SHERMAN_V,
    FIREFLY,
];

/// Vehicles fielded by the enemy
pub const ENEMY_VEHICLES: [&str; 12] = [
    PZ_IV_H,
    PANTHER,
    TIGER,
    KING_TIGER,
    STUG_III_G,
    MARDER_II,
    MARDER_III_H,
    JGDPZ_IV,
    JGDPZ_38T,
    SPW_251,
    PSW_232,
    OPEL_TRUCK,
];

/// Look up a vehicle by catalog name
pub fn lookup(name: &str) -> Result<VehicleSpec> {
    let spec = match name {
        M4 => sherman_75(M4, 8, 89),
        M4A1 => sherman_75(M4A1, 11, 83),
        M4A3 => sherman_75(M4A3, 8, 89),
        M4A3_75W => VehicleSpec {
            main_gun_rounds: 100,
            ready_rack: 4,
            vision_cupola: true,
            wet_stowage: true,
            ..sherman_75(M4A3_75W, 11, 100)
        },
        JUMBO_75 => jumbo(JUMBO_75, GunType::Gun75, 100, 4, 5),
        JUMBO_76 => jumbo(JUMBO_76, GunType::Gun76L, 65, 6, 4),
        M4A1_76W => sherman_76w(M4A1_76W, LoaderHatch::Split),
        M4A3_76W => sherman_76w(M4A3_76W, LoaderHatch::Oval),
        SHERMAN_II => VehicleSpec {
            aa_mg: None,
            loader_hatch: LoaderHatch::None,
            ..sherman_75(SHERMAN_II, 11, 83)
        },
        SHERMAN_V => VehicleSpec {
            aa_mg: None,
            loader_hatch: LoaderHatch::None,
            ..sherman_75(SHERMAN_V, 8, 89)
        },
        FIREFLY => VehicleSpec {
            gun: Some(GunType::Gun76LL),
            bow_mg: None,
            aa_mg: None,
            main_gun_rounds: 73,
            ready_rack: 5,
            rof: 3,
            assistant_driver: false,
            ..sherman_75(FIREFLY, 8, 73)
        },

        PZ_IV_H => german(PZ_IV_H, Some(GunType::Gun75L), (8, 3, 6, 4), TargetSize::Normal, true),
        PANTHER => german(PANTHER, Some(GunType::Gun75LL), (18, 6, 14, 6), TargetSize::Large, true),
        TIGER => german(TIGER, Some(GunType::Gun88L), (11, 8, 14, 8), TargetSize::Large, true),
        KING_TIGER => german(
            KING_TIGER,
            Some(GunType::Gun88LL),
            (26, 8, 18, 11),
            TargetSize::VeryLarge,
            true,
        ),
        STUG_III_G => german(STUG_III_G, Some(GunType::Gun75L), (8, 3, 8, 3), TargetSize::Small, false),
        MARDER_II => german(MARDER_II, Some(GunType::Gun75L), (3, 1, 2, 0), TargetSize::Normal, false),
        MARDER_III_H => german(
            MARDER_III_H,
            Some(GunType::Gun75L),
            (4, 1, 3, 1),
            TargetSize::Normal,
            false,
        ),
        JGDPZ_IV => german(JGDPZ_IV, Some(GunType::Gun75L), (14, 3, 14, 4), TargetSize::Small, false),
        JGDPZ_38T => german(JGDPZ_38T, Some(GunType::Gun75L), (14, 3, 14, 3), TargetSize::Small, false),
        SPW_251 => VehicleSpec {
            coax_mg: None,
            bow_mg: Some(2),
            ..german(SPW_251, None, (1, 1, 1, 1), TargetSize::Small, false)
        },
        PSW_232 => german(PSW_232, Some(GunType::Gun20L), (3, 1, 3, 1), TargetSize::Normal, true),
        OPEL_TRUCK => VehicleSpec {
            coax_mg: None,
            armour: ArmourProfile::unarmoured(),
            ..german(OPEL_TRUCK, None, (0, 0, 0, 0), TargetSize::Normal, false)
        },
        other => return Err(EngineError::UnknownVehicle(other.to_string())),
    };
    Ok(spec)
}

fn sherman_75(name: &str, hull_front: u8, rounds: u16) -> VehicleSpec {
    VehicleSpec {
        name: name.to_string(),
        gun: Some(GunType::Gun75),
        coax_mg: Some(4),
        bow_mg: Some(2),
        aa_mg: Some(4),
        armour: ArmourProfile::new(hull_front, 4, 8, 6),
        size: TargetSize::Normal,
        has_turret: true,
        main_gun_rounds: rounds,
        ready_rack: 8,
        rof: 5,
        loader_hatch: LoaderHatch::Oval,
        smoke_mortar: true,
        vision_cupola: false,
        wet_stowage: false,
        assistant_driver: true,
    }
}

fn jumbo(name: &str, gun: GunType, rounds: u16, ready_rack: u8, rof: u8) -> VehicleSpec {
    VehicleSpec {
        gun: Some(gun),
        armour: ArmourProfile::new(18, 8, 18, 11),
        main_gun_rounds: rounds,
        ready_rack,
        rof,
        smoke_mortar: false,
        vision_cupola: true,
        ..sherman_75(name, 18, rounds)
    }
}

fn sherman_76w(name: &str, loader_hatch: LoaderHatch) -> VehicleSpec {
    VehicleSpec {
        gun: Some(GunType::Gun76L),
        main_gun_rounds: 65,
        ready_rack: 6,
        rof: 4,
        loader_hatch,
        smoke_mortar: false,
        vision_cupola: true,
        wet_stowage: true,
        ..sherman_75(name, 11, 65)
    }
}

fn german(
    name: &str,
    gun: Option<GunType>,
    (hf, hs, tf, ts): (u8, u8, u8, u8),
    size: TargetSize,
    has_turret: bool,
) -> VehicleSpec {
    VehicleSpec {
        name: name.to_string(),
        gun,
        coax_mg: if has_turret { Some(2) } else { None },
        bow_mg: None,
        aa_mg: None,
        armour: ArmourProfile::new(hf, hs, tf, ts),
        size,
        has_turret,
        main_gun_rounds: 0,
        ready_rack: 0,
        rof: 0,
        loader_hatch: LoaderHatch::None,
        smoke_mortar: false,
        vision_cupola: false,
        wet_stowage: false,
        assistant_driver: false,
    }
}
