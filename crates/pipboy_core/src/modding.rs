//! Folds attached mods into an owned item's effective definition.

use std::borrow::Cow;

use tracing::warn;

use crate::character::CharacterItem;
use crate::database::GameDatabase;
use crate::effect::{ModEffect, push_unique, remove_tagged};
use crate::item::{Apparel, Item, ItemKind, ModItem, Weapon};

/// Mods in this slot change the base material; on torso-only armour their
/// cost and weight count twice.
pub const MATERIAL_SLOT: &str = "modSlotMaterial";

/// Returns the effective definition of an owned stack, or `None` when the
/// item is not in the database.
///
/// Unmodded and non-moddable items borrow the database record. Mods that are
/// missing or not mod items are skipped.
pub fn modified_item<'a>(owned: &CharacterItem, db: &'a GameDatabase) -> Option<Cow<'a, Item>> {
    let base = db.get_item(&owned.id)?;
    if !base.is_moddable() || owned.mods.is_empty() {
        return Some(Cow::Borrowed(base));
    }

    let mods: Vec<&ModItem> = owned
        .mods
        .iter()
        .filter_map(|mod_id| match db.get_item(mod_id) {
            Some(item) => {
                let data = item.as_mod();
                if data.is_none() {
                    warn!(item = %owned.id, mod_id = %mod_id, "attached id is not a mod");
                }
                data
            }
            None => {
                warn!(item = %owned.id, mod_id = %mod_id, "attached mod missing from database");
                None
            }
        })
        .collect();

    let mut item = base.clone();
    fold_cost_and_weight(&mut item, owned, db);
    apply_mods(&mut item, &mods);
    Some(Cow::Owned(item))
}

fn fold_cost_and_weight(item: &mut Item, owned: &CharacterItem, db: &GameDatabase) {
    let material_multiplier = match item.as_apparel() {
        Some(apparel) if apparel.is_torso_only() => 2,
        _ => 1,
    };
    for mod_id in &owned.mods {
        let Some(Item {
            kind: ItemKind::Mod(data),
            cost,
            weight,
            ..
        }) = db.get_item(mod_id)
        else {
            continue;
        };
        let multiplier = if data.slot_type == MATERIAL_SLOT {
            material_multiplier
        } else {
            1
        };
        item.cost += cost * multiplier;
        item.weight += weight * f64::from(multiplier);
    }
}

/// Applies every mod's additions in attach order, then every removal.
pub fn apply_mods(item: &mut Item, mods: &[&ModItem]) {
    for removals in [false, true] {
        for data in mods {
            for effect in data.effects.iter().filter(|e| e.is_removal() == removals) {
                apply_effect(item, effect);
            }
        }
    }
}

pub fn apply_effect(item: &mut Item, effect: &ModEffect) {
    match &mut item.kind {
        ItemKind::Weapon(weapon) => {
            apply_weapon_effect(weapon, effect);
            apply_shared_effect(&mut weapon.effects, effect);
        }
        ItemKind::Apparel(apparel) => {
            apply_apparel_effect(apparel, effect);
            apply_shared_effect(&mut apparel.effects, effect);
        }
        ItemKind::Aid(_) | ItemKind::Mod(_) | ItemKind::Other(_) => {}
    }
}

fn apply_weapon_effect(weapon: &mut Weapon, effect: &ModEffect) {
    match effect {
        ModEffect::DamageAdd(delta) => weapon.damage_rating += delta,
        ModEffect::DamageSet(value) => weapon.damage_rating = *value,
        ModEffect::FireRateAdd(delta) => {
            weapon.fire_rate = Some(weapon.fire_rate.unwrap_or(0) + delta);
        }
        ModEffect::DamageTypeChange(damage_type) => weapon.damage_type = *damage_type,
        ModEffect::AmmoChange(ammo) => weapon.ammo = ammo.clone(),
        ModEffect::RangeIncrease(steps) => {
            if let Some(range) = weapon.range {
                weapon.range = Some(range.stepped(*steps));
            }
        }
        ModEffect::QualityAdd(quality) => push_unique(&mut weapon.qualities, quality),
        ModEffect::QualityRemove(quality) => remove_tagged(&mut weapon.qualities, quality),
        ModEffect::AmmoConsumption(value) => weapon.ammo_consumption = Some(*value),
        ModEffect::AllowMuzzleMod(allowed) => weapon.allow_muzzle_mod = *allowed,
        ModEffect::RerollHitLocation(allowed) => weapon.reroll_hit_location = *allowed,
        _ => {}
    }
}

fn apply_apparel_effect(apparel: &mut Apparel, effect: &ModEffect) {
    match effect {
        ModEffect::PhysicalResAdd(delta) => apparel.physical_res = apparel.physical_res.plus(*delta),
        ModEffect::EnergyResAdd(delta) => apparel.energy_res = apparel.energy_res.plus(*delta),
        ModEffect::RadiationResAdd(delta) => {
            apparel.radiation_res = apparel.radiation_res.plus(*delta);
        }
        ModEffect::MeleeResAdd(delta) => apparel.melee_res += delta,
        ModEffect::ExplosiveResAdd(delta) => apparel.explosive_res += delta,
        ModEffect::FallDamageResAdd(delta) => apparel.fall_damage_res += delta,
        ModEffect::CarryWeightAdd(delta) => apparel.carry_weight_bonus += delta,
        ModEffect::UnarmedDamageAdd(delta) => apparel.unarmed_damage += delta,
        _ => {}
    }
}

fn apply_shared_effect(effects: &mut Vec<String>, effect: &ModEffect) {
    match effect {
        ModEffect::EffectAdd(id) => push_unique(effects, id),
        ModEffect::EffectRemove(id) => remove_tagged(effects, id),
        _ => {}
    }
}
