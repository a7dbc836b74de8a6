use crate::character::CharacterItem;
use crate::item::{AmmoType, Weapon};

/// Rounds available to fire. `None` means the weapon does not use ammo.
pub fn ammo_count(weapon: &Weapon, stack: &CharacterItem, items: &[CharacterItem]) -> Option<i32> {
    match &weapon.ammo {
        AmmoType::NotApplicable => None,
        AmmoType::OwnStack => Some(stack.quantity),
        AmmoType::Item(ammo_id) => Some(
            items
                .iter()
                .filter(|item| &item.id == ammo_id)
                .map(|item| item.quantity)
                .sum(),
        ),
    }
}

/// Rounds spent by one attack.
pub fn ammo_per_shot(weapon: &Weapon) -> i32 {
    if weapon.ammo == AmmoType::NotApplicable {
        return 0;
    }
    if let Some(consumption) = weapon.ammo_consumption {
        return consumption;
    }
    if weapon.has_quality("qualityGatling") {
        return 10;
    }
    weapon
        .qualities
        .iter()
        .find_map(|q| q.strip_prefix("qualityAmmoHungry:"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

pub fn has_enough_ammo(weapon: &Weapon, stack: &CharacterItem, items: &[CharacterItem]) -> bool {
    if !weapon.category.uses_ammo() {
        return true;
    }
    match ammo_count(weapon, stack, items) {
        None => true,
        Some(count) => count >= ammo_per_shot(weapon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DamageType, WeaponCategory};

    fn weapon(category: WeaponCategory, ammo: AmmoType, qualities: &[&str]) -> Weapon {
        Weapon {
            category,
            damage_rating: 4,
            damage_type: DamageType::Physical,
            fire_rate: Some(2),
            range: None,
            ammo,
            qualities: qualities.iter().map(|q| q.to_string()).collect(),
            effects: Vec::new(),
            available_mods: Vec::new(),
            ammo_consumption: None,
            allow_muzzle_mod: false,
            reroll_hit_location: false,
        }
    }

    #[test]
    fn ammo_sources() {
        let items = vec![
            CharacterItem::new("weaponMinigun", 1),
            CharacterItem::new("ammo5mm", 25),
            CharacterItem::new("weaponMolotov", 3),
        ];
        let minigun = weapon(
            WeaponCategory::BigGuns,
            AmmoType::Item("ammo5mm".to_string()),
            &["qualityGatling"],
        );
        assert_eq!(ammo_count(&minigun, &items[0], &items), Some(25));
        assert_eq!(ammo_per_shot(&minigun), 10);

        let molotov = weapon(WeaponCategory::Throwing, AmmoType::OwnStack, &[]);
        assert_eq!(ammo_count(&molotov, &items[2], &items), Some(3));
        assert_eq!(ammo_per_shot(&molotov), 1);

        let bat = weapon(WeaponCategory::MeleeWeapons, AmmoType::NotApplicable, &[]);
        assert_eq!(ammo_count(&bat, &items[0], &items), None);
        assert_eq!(ammo_per_shot(&bat), 0);
    }

    #[test]
    fn ammo_hungry_sets_the_spend() {
        let laser = weapon(
            WeaponCategory::EnergyWeapons,
            AmmoType::Item("ammoFusionCell".to_string()),
            &["qualityAmmoHungry:4"],
        );
        assert_eq!(ammo_per_shot(&laser), 4);
        let stack = CharacterItem::new("weaponGatlingLaser", 1);
        let items = vec![stack.clone(), CharacterItem::new("ammoFusionCell", 3)];
        assert!(!has_enough_ammo(&laser, &stack, &items));
        let items = vec![stack.clone(), CharacterItem::new("ammoFusionCell", 4)];
        assert!(has_enough_ammo(&laser, &stack, &items));
    }

    #[test]
    fn melee_never_runs_dry() {
        let knife = weapon(WeaponCategory::MeleeWeapons, AmmoType::NotApplicable, &[]);
        let stack = CharacterItem::new("weaponKnife", 1);
        assert!(has_enough_ammo(&knife, &stack, &[]));
    }
}
