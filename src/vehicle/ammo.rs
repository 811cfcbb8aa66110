//! Main gun ammunition stores
//!
//! Shells are moved between general stores, the ready rack and the breech,
//! never created or destroyed except by `stow` (resupply) and `fire`.

use serde::{Deserialize, Serialize};

use crate::vehicle::spec::{AmmoType, GunType, VehicleSpec};

/// Where a reload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSource {
    ReadyRack,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoStores {
    general: [u16; AmmoType::COUNT],
    ready_rack: [u16; AmmoType::COUNT],
    ready_rack_capacity: u16,
    /// Shell currently in the breech
    pub loaded: Option<AmmoType>,
    /// Type the loader reaches for on the next reload
    pub reload: Option<AmmoType>,
    pub use_ready_rack: bool,
}

impl AmmoStores {
    pub fn empty(ready_rack_capacity: u8) -> Self {
        Self {
            general: [0; AmmoType::COUNT],
            ready_rack: [0; AmmoType::COUNT],
            ready_rack_capacity: ready_rack_capacity as u16,
            loaded: None,
            reload: None,
            use_ready_rack: false,
        }
    }

    /// Standard load-out for a vehicle, with the gun loaded with AP
    pub fn standard_loadout(spec: &VehicleSpec) -> Self {
        let mut stores = Self::empty(spec.ready_rack);
        let Some(gun) = spec.gun else {
            return stores;
        };
        let total = spec.main_gun_rounds;

        let special = match gun {
            GunType::Gun76L => Some((AmmoType::Hvap, 2)),
            GunType::Gun76LL => Some((AmmoType::Apds, 2)),
            GunType::Gun75 => Some((AmmoType::Wp, total / 10)),
            _ => None,
        };
        let special_count = special.map(|(_, n)| n).unwrap_or(0);
        let he = (total - special_count) / 2;
        let ap = total - special_count - he;

        stores.stow(AmmoType::He, he);
        stores.stow(AmmoType::Ap, ap);
        if let Some((ammo, count)) = special {
            stores.stow(ammo, count);
        }

        // Ready rack half AP, half HE
        let half = stores.ready_rack_capacity / 2;
        stores.restock_ready_rack(AmmoType::Ap, stores.ready_rack_capacity - half);
        stores.restock_ready_rack(AmmoType::He, half);

        stores.reload = Some(AmmoType::Ap);
        stores.load();
        stores
    }

    /// Add shells to general stores (resupply)
    pub fn stow(&mut self, ammo: AmmoType, count: u16) {
        self.general[ammo.index()] += count;
    }

    pub fn general(&self, ammo: AmmoType) -> u16 {
        self.general[ammo.index()]
    }

    pub fn ready(&self, ammo: AmmoType) -> u16 {
        self.ready_rack[ammo.index()]
    }

    pub fn ready_rack_capacity(&self) -> u16 {
        self.ready_rack_capacity
    }

    pub fn ready_rack_total(&self) -> u16 {
        self.ready_rack.iter().sum()
    }

    /// Shells of a type that could still be loaded
    pub fn available(&self, ammo: AmmoType) -> u16 {
        self.general(ammo) + self.ready(ammo)
    }

    /// Everything of a type aboard, including a loaded shell
    pub fn total(&self, ammo: AmmoType) -> u16 {
        self.available(ammo) + u16::from(self.loaded == Some(ammo))
    }

    pub fn total_rounds(&self) -> u16 {
        AmmoType::ALL.iter().map(|a| self.total(*a)).sum()
    }

    /// Load the selected reload type into an empty breech
    ///
    /// Draws from the ready rack first when it is in use and holds the type,
    /// otherwise from general stores. Returns None when nothing was loaded.
    pub fn load(&mut self) -> Option<LoadSource> {
        if self.loaded.is_some() {
            return None;
        }
        let ammo = self.reload?;
        let i = ammo.index();
        if self.use_ready_rack && self.ready_rack[i] > 0 {
            self.ready_rack[i] -= 1;
            self.loaded = Some(ammo);
            Some(LoadSource::ReadyRack)
        } else if self.general[i] > 0 {
            self.general[i] -= 1;
            self.loaded = Some(ammo);
            Some(LoadSource::General)
        } else if self.ready_rack[i] > 0 {
            self.ready_rack[i] -= 1;
            self.loaded = Some(ammo);
            Some(LoadSource::ReadyRack)
        } else {
            None
        }
    }

    /// The next `load` would take a shell from the ready rack
    pub fn draws_from_ready_rack(&self) -> bool {
        self.loaded.is_none() && self.reload.is_some_and(|a| self.use_ready_rack && self.ready(a) > 0)
    }

    /// Load the reload type from general stores, leaving the ready rack alone
    pub fn load_from_general(&mut self) -> Option<LoadSource> {
        if self.loaded.is_some() {
            return None;
        }
        let ammo = self.reload?;
        let i = ammo.index();
        if self.general[i] == 0 {
            return None;
        }
        self.general[i] -= 1;
        self.loaded = Some(ammo);
        Some(LoadSource::General)
    }

    /// Unload the breech back into general stores and load the reload type
    pub fn change_load(&mut self) -> Option<LoadSource> {
        if let Some(current) = self.loaded.take() {
            self.general[current.index()] += 1;
        }
        self.load()
    }

    /// Fire the loaded shell
    pub fn fire(&mut self) -> Option<AmmoType> {
        self.loaded.take()
    }

    /// Move up to `count` shells of a type from general stores into the ready rack
    pub fn restock_ready_rack(&mut self, ammo: AmmoType, count: u16) -> u16 {
        let space = self.ready_rack_capacity.saturating_sub(self.ready_rack_total());
        let i = ammo.index();
        let moved = count.min(space).min(self.general[i]);
        self.general[i] -= moved;
        self.ready_rack[i] += moved;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::catalog;
    use proptest::prelude::*;

    fn m4_stores() -> AmmoStores {
        AmmoStores::standard_loadout(&catalog::lookup(catalog::M4).unwrap())
    }

    #[test]
    fn test_standard_loadout_accounts_for_every_round() {
        let stores = m4_stores();
        assert_eq!(stores.total_rounds(), 89);
        assert_eq!(stores.loaded, Some(AmmoType::Ap));
        assert_eq!(stores.ready_rack_total(), 8);
    }

    #[test]
    fn test_load_prefers_ready_rack_when_toggled() {
        let mut stores = m4_stores();
        stores.fire();
        stores.use_ready_rack = true;
        assert_eq!(stores.load(), Some(LoadSource::ReadyRack));
        stores.fire();
        stores.use_ready_rack = false;
        assert_eq!(stores.load(), Some(LoadSource::General));
    }

    #[test]
    fn test_load_from_general_spares_the_ready_rack() {
        let mut stores = m4_stores();
        stores.fire();
        stores.use_ready_rack = true;
        assert!(stores.draws_from_ready_rack());
        let (ready, general) = (stores.ready(AmmoType::Ap), stores.general(AmmoType::Ap));
        assert_eq!(stores.load_from_general(), Some(LoadSource::General));
        assert_eq!(stores.ready(AmmoType::Ap), ready);
        assert_eq!(stores.general(AmmoType::Ap), general - 1);
        assert!(!stores.draws_from_ready_rack());
    }

    #[test]
    fn test_load_refuses_when_breech_full() {
        let mut stores = m4_stores();
        assert_eq!(stores.load(), None);
    }

    #[test]
    fn test_load_fails_when_type_exhausted() {
        let mut stores = AmmoStores::empty(4);
        stores.reload = Some(AmmoType::Hvap);
        assert_eq!(stores.load(), None);
        assert_eq!(stores.loaded, None);
    }

    #[test]
    fn test_change_load_returns_shell_to_stores() {
        let mut stores = m4_stores();
        let he_before = stores.total(AmmoType::He);
        let ap_before = stores.total(AmmoType::Ap);
        stores.reload = Some(AmmoType::He);
        assert!(stores.change_load().is_some());
        assert_eq!(stores.loaded, Some(AmmoType::He));
        assert_eq!(stores.total(AmmoType::He), he_before);
        assert_eq!(stores.total(AmmoType::Ap), ap_before);
    }

    #[test]
    fn test_restock_respects_capacity() {
        let mut stores = AmmoStores::empty(3);
        stores.stow(AmmoType::He, 10);
        assert_eq!(stores.restock_ready_rack(AmmoType::He, 5), 3);
        assert_eq!(stores.general(AmmoType::He), 7);
        assert_eq!(stores.restock_ready_rack(AmmoType::He, 1), 0);
    }

    #[derive(Debug, Clone)]
    enum AmmoOp {
        Load,
        LoadGeneral,
        Fire,
        ChangeLoad(usize),
        SetReload(usize),
        ToggleRack,
        Restock(usize, u16),
    }

    fn ammo_op() -> impl Strategy<Value = AmmoOp> {
        prop_oneof![
            Just(AmmoOp::Load),
            Just(AmmoOp::LoadGeneral),
            Just(AmmoOp::Fire),
            (0usize..6).prop_map(AmmoOp::ChangeLoad),
            (0usize..6).prop_map(AmmoOp::SetReload),
            Just(AmmoOp::ToggleRack),
            ((0usize..6), 0u16..10).prop_map(|(a, n)| AmmoOp::Restock(a, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_ammo_never_created(ops in proptest::collection::vec(ammo_op(), 0..80)) {
            let mut stores = m4_stores();
            let mut budget: Vec<u16> = AmmoType::ALL.iter().map(|a| stores.total(*a)).collect();
            for op in ops {
                match op {
                    AmmoOp::Load => { stores.load(); }
                    AmmoOp::LoadGeneral => { stores.load_from_general(); }
                    AmmoOp::Fire => {
                        if let Some(fired) = stores.fire() {
                            budget[fired.index()] -= 1;
                        }
                    }
                    AmmoOp::ChangeLoad(a) => {
                        stores.reload = Some(AmmoType::ALL[a]);
                        stores.change_load();
                    }
                    AmmoOp::SetReload(a) => stores.reload = Some(AmmoType::ALL[a]),
                    AmmoOp::ToggleRack => stores.use_ready_rack = !stores.use_ready_rack,
                    AmmoOp::Restock(a, n) => { stores.restock_ready_rack(AmmoType::ALL[a], n); }
                }
                for ammo in AmmoType::ALL {
                    prop_assert_eq!(stores.total(ammo), budget[ammo.index()]);
                }
                prop_assert!(stores.ready_rack_total() <= stores.ready_rack_capacity());
            }
        }
    }
}
