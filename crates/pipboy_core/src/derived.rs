//! Derived character state: everything the sheet shows that is not stored.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::body::{BodyPart, map_item_locations};
use crate::character::{CharacterItem, NormalizedCharacter, RawCharacter};
use crate::database::GameDatabase;
use crate::item::{Item, Resistance};
use crate::modding::modified_item;
use crate::origin::Origin;
use crate::special::{Skill, Special, SpecialStats};

/// Effects that act on the whole character rather than on the piece that
/// carries them. Only these are reported as active effects.
pub const GLOBAL_EFFECTS: [&str; 7] = [
    "effectShadowed",
    "effectBalanced",
    "effectMuffled",
    "effectStealthReroll",
    "effectStunResistance",
    "effectChemDuration",
    "effectSpecialReroll",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DamageResistance {
    pub physical: Resistance,
    pub energy: Resistance,
    pub radiation: Resistance,
}

/// A global effect and how many equipped pieces grant it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveEffect {
    pub id: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: Option<String>,
    pub background: Option<String>,
    pub origin: &'static Origin,
    pub level: i32,
    pub caps: i32,
    pub special: SpecialStats,
    /// Effective ranks, specialty bonus included and capped by origin.
    pub skills: BTreeMap<Skill, i32>,
    pub specialties: Vec<Skill>,
    pub items: Vec<CharacterItem>,

    pub max_hp: i32,
    pub current_hp: i32,
    pub max_luck: i32,
    pub current_luck: i32,
    pub max_weight: f64,
    pub current_weight: f64,
    pub defense: i32,
    pub initiative: i32,
    pub melee_damage: i32,
    pub locations_dr: BTreeMap<BodyPart, DamageResistance>,
    pub active_effects: Vec<ActiveEffect>,
}

impl Character {
    pub fn skill(&self, skill: Skill) -> i32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }

    /// The d20 target number: skill rank plus its governing attribute.
    pub fn skill_target(&self, skill: Skill) -> i32 {
        self.skill(skill) + self.special.get(skill.governing_special())
    }

    pub fn has_specialty(&self, skill: Skill) -> bool {
        self.specialties.contains(&skill)
    }
}

pub fn max_hp(special: &SpecialStats, level: i32) -> i32 {
    (special.endurance + special.luck).saturating_add(level - 1)
}

fn raw_max_hp(raw: &RawCharacter) -> i32 {
    max_hp(&raw.special_stats(), raw.level.unwrap_or(1).max(1))
}

pub fn melee_damage_bonus(strength: i32) -> i32 {
    match strength {
        ..7 => 0,
        7..=8 => 1,
        9..=10 => 2,
        _ => 3,
    }
}

pub fn defense(agility: i32) -> i32 {
    if agility >= 9 { 2 } else { 1 }
}

/// Carries HP across a change that may move max HP. Growth heals by the
/// same amount; shrinkage only clamps.
pub fn adjust_current_hp(prev: &RawCharacter, next: &mut RawCharacter) {
    let prev_max = raw_max_hp(prev);
    let next_max = raw_max_hp(next);
    let mut current = prev.current_hp.unwrap_or(prev_max).min(prev_max);
    if next_max > prev_max {
        current = current.saturating_add(next_max - prev_max);
    }
    next.current_hp = Some(current.clamp(0, next_max.max(0)));
}

/// Computes the full character. Never fails: unknown item ids contribute
/// nothing and are logged.
pub fn compute_character(raw: &RawCharacter, db: &GameDatabase) -> Character {
    derive(raw.normalize(), db)
}

fn derive(normal: NormalizedCharacter, db: &GameDatabase) -> Character {
    let origin = normal.origin;
    let special = normal.special;

    let skills = normal
        .skills
        .iter()
        .map(|(skill, base)| {
            let bonus = if normal.specialties.contains(skill) {
                Skill::SPECIALTY_BONUS
            } else {
                0
            };
            (*skill, base.saturating_add(bonus).min(origin.skill_max_value))
        })
        .collect();

    let max_hp = max_hp(&special, normal.level);
    let current_hp = normal.current_hp.unwrap_or(max_hp).min(max_hp).max(0);
    let max_luck = special.luck;
    let current_luck = normal.current_luck.unwrap_or(special.luck).min(max_luck).max(0);

    let resolved: Vec<Option<Cow<'_, Item>>> = normal
        .items
        .iter()
        .map(|owned| {
            let item = modified_item(owned, db);
            if item.is_none() {
                warn!(item = %owned.id, "owned item missing from game database; ignored");
            }
            item
        })
        .collect();

    let current_weight = normal
        .items
        .iter()
        .zip(&resolved)
        .filter_map(|(owned, item)| item.as_ref().map(|item| item.weight * f64::from(owned.quantity)))
        .sum();

    let carry_bonus: f64 = normal
        .items
        .iter()
        .zip(&resolved)
        .filter(|(owned, _)| owned.equipped)
        .filter_map(|(_, item)| item.as_ref()?.as_apparel().map(|a| a.carry_weight_bonus))
        .sum();

    let locations_dr = locations_dr(&normal.items, &resolved, origin);
    let active_effects = active_effects(&normal.items, db);

    Character {
        name: normal.name,
        background: normal.background,
        origin,
        level: normal.level,
        caps: normal.caps,
        special,
        skills,
        specialties: normal.specialties.into_iter().collect(),
        max_hp,
        current_hp,
        max_luck,
        current_luck,
        max_weight: origin.max_carry_weight(special.strength) + carry_bonus,
        current_weight,
        defense: defense(special.agility),
        initiative: special.agility + special.perception,
        melee_damage: melee_damage_bonus(special.get(Special::Strength)),
        locations_dr,
        active_effects,
        items: normal.items,
    }
}

/// Best piece per location and damage type; layers do not stack.
fn locations_dr(
    items: &[CharacterItem],
    resolved: &[Option<Cow<'_, Item>>],
    origin: &Origin,
) -> BTreeMap<BodyPart, DamageResistance> {
    let mut dr: BTreeMap<BodyPart, DamageResistance> = origin
        .body_parts
        .iter()
        .map(|part| (*part, DamageResistance::default()))
        .collect();

    for (owned, item) in items.iter().zip(resolved) {
        if !owned.equipped {
            continue;
        }
        let Some(apparel) = item.as_ref().and_then(|item| item.as_apparel()) else {
            continue;
        };
        if apparel.is_robot_part() && !origin.is_robot() {
            continue;
        }
        for part in map_item_locations(&apparel.locations_covered, owned.variation, origin.body_parts)
        {
            if let Some(entry) = dr.get_mut(&part) {
                entry.physical = entry.physical.max(apparel.physical_res);
                entry.energy = entry.energy.max(apparel.energy_res);
                entry.radiation = entry.radiation.max(apparel.radiation_res);
            }
        }
    }

    if origin.has_radiation_immunity {
        for entry in dr.values_mut() {
            entry.radiation = Resistance::Immune;
        }
    }
    dr
}

/// Counts, per global effect, the equipped pieces whose mods grant it.
fn active_effects(items: &[CharacterItem], db: &GameDatabase) -> Vec<ActiveEffect> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for owned in items.iter().filter(|owned| owned.equipped) {
        let granted: BTreeSet<&str> = owned
            .mods
            .iter()
            .filter_map(|mod_id| db.get_item(mod_id)?.as_mod())
            .flat_map(|data| data.effects.iter().filter_map(|effect| effect.granted()))
            .filter(|id| GLOBAL_EFFECTS.contains(id))
            .collect();
        for id in granted {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(id, count)| ActiveEffect {
            id: id.to_string(),
            count,
        })
        .collect()
}
