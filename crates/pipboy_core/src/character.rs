//! The persisted character record and its normalised form.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::body::Side;
use crate::core_api::CoreError;
use crate::origin::{Origin, OriginId};
use crate::special::{Skill, Special, SpecialStats};

/// One owned stack of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<Side>,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub equipped: bool,
    pub mods: Vec<String>,
}

impl CharacterItem {
    pub fn new(id: impl Into<String>, quantity: i32) -> Self {
        Self {
            id: id.into(),
            variation: None,
            quantity,
            equipped: false,
            mods: Vec::new(),
        }
    }

    pub fn with_mods<I, S>(mut self, mods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mods = mods.into_iter().map(Into::into).collect();
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn on_side(mut self, side: Side) -> Self {
        self.variation = Some(side);
        self
    }

    /// Two stacks are interchangeable when they hold the same item with the
    /// same set of mods, in any order.
    pub fn is_same_configuration(&self, other: &CharacterItem) -> bool {
        if self.id != other.id {
            return false;
        }
        let mine: BTreeSet<&str> = self.mods.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = other.mods.iter().map(String::as_str).collect();
        mine == theirs
    }

    pub fn has_mod(&self, mod_id: &str) -> bool {
        self.mods.iter().any(|m| m == mod_id)
    }
}

/// Per-attribute overrides. Attributes left out take the default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecialOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perception: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endurance: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charisma: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agility: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luck: Option<i32>,
}

impl SpecialOverrides {
    pub fn get(&self, special: Special) -> Option<i32> {
        match special {
            Special::Strength => self.strength,
            Special::Perception => self.perception,
            Special::Endurance => self.endurance,
            Special::Charisma => self.charisma,
            Special::Intelligence => self.intelligence,
            Special::Agility => self.agility,
            Special::Luck => self.luck,
        }
    }

    pub fn set(&mut self, special: Special, value: i32) {
        let slot = match special {
            Special::Strength => &mut self.strength,
            Special::Perception => &mut self.perception,
            Special::Endurance => &mut self.endurance,
            Special::Charisma => &mut self.charisma,
            Special::Intelligence => &mut self.intelligence,
            Special::Agility => &mut self.agility,
            Special::Luck => &mut self.luck,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        Special::iter().all(|s| self.get(s).is_none())
    }

    pub fn resolve(&self) -> SpecialStats {
        let mut stats = SpecialStats::default();
        for special in Special::iter() {
            if let Some(value) = self.get(special) {
                stats.set(special, value);
            }
        }
        stats
    }
}

/// The character as persisted. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCharacter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<OriginId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caps: Option<i32>,
    #[serde(default, skip_serializing_if = "SpecialOverrides::is_empty")]
    pub special: SpecialOverrides,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<Skill, i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specialties: Vec<Skill>,
    #[serde(default)]
    pub items: Vec<CharacterItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_luck: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<i32>,
}

impl RawCharacter {
    /// Parses an imported record. Shape errors (wrong types, unknown
    /// attribute, skill or origin ids, malformed items) are `Parse` errors.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::parse(format!("character record is not JSON: {e}")))?;
        if !value.is_object() {
            return Err(CoreError::parse("character record must be a JSON object"));
        }
        let raw: RawCharacter = serde_json::from_value(value)
            .map_err(|e| CoreError::parse(format!("invalid character record: {e}")))?;
        if let Some(item) = raw.items.iter().find(|item| item.quantity < 0) {
            return Err(CoreError::parse(format!(
                "invalid character record: {} has negative quantity {}",
                item.id, item.quantity
            )));
        }
        Ok(raw)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::parse(format!("failed to serialize character: {e}")))
    }

    pub fn origin(&self) -> &'static Origin {
        Origin::get(self.origin)
    }

    /// SPECIAL with defaults filled in and each value held to 1..=origin max.
    pub fn special_stats(&self) -> SpecialStats {
        let origin = self.origin();
        let mut stats = self.special.resolve();
        for special in Special::iter() {
            stats.set(special, stats.get(special).clamp(1, origin.special_max(special)));
        }
        stats
    }

    /// Resolves every default in one place.
    pub fn normalize(&self) -> NormalizedCharacter {
        let origin = self.origin();
        let specialties: BTreeSet<Skill> = self.specialties.iter().copied().collect();
        let skills = Skill::iter()
            .map(|skill| {
                let rank = self.skills.get(&skill).copied().unwrap_or(0);
                (skill, rank.clamp(0, origin.skill_max_value))
            })
            .collect();

        NormalizedCharacter {
            name: self.name.clone(),
            background: self.background.clone(),
            origin,
            level: self.level.unwrap_or(1).max(1),
            caps: self.caps.unwrap_or(0).max(0),
            special: self.special_stats(),
            skills,
            specialties,
            items: self.items.clone(),
            current_luck: self.current_luck,
            current_hp: self.current_hp,
        }
    }
}

/// A raw character with every default filled in; derivation works from this.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCharacter {
    pub name: Option<String>,
    pub background: Option<String>,
    pub origin: &'static Origin,
    pub level: i32,
    pub caps: i32,
    pub special: SpecialStats,
    /// Base ranks for all skills.
    pub skills: BTreeMap<Skill, i32>,
    pub specialties: BTreeSet<Skill>,
    pub items: Vec<CharacterItem>,
    pub current_luck: Option<i32>,
    pub current_hp: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_api::CoreErrorCode;

    #[test]
    fn empty_object_normalizes_to_defaults() {
        let raw = RawCharacter::from_json_slice(b"{}").unwrap();
        let normal = raw.normalize();
        assert_eq!(normal.level, 1);
        assert_eq!(normal.caps, 0);
        assert_eq!(normal.special, SpecialStats::default());
        assert_eq!(normal.skills.len(), 17);
        assert!(normal.skills.values().all(|v| *v == 0));
        assert_eq!(normal.origin.id, None);
    }

    #[test]
    fn partial_special_keeps_other_defaults() {
        let raw =
            RawCharacter::from_json_slice(br#"{"special":{"luck":8},"origin":"ghoul"}"#).unwrap();
        let normal = raw.normalize();
        assert_eq!(normal.special.luck, 8);
        assert_eq!(normal.special.strength, 5);
        assert_eq!(normal.origin.id, Some(OriginId::Ghoul));
    }

    #[test]
    fn special_is_held_to_origin_limits() {
        let raw = RawCharacter::from_json_slice(
            br#"{"origin":"superMutant","special":{"strength":14,"intelligence":9,"luck":0}}"#,
        )
        .unwrap();
        let special = raw.normalize().special;
        assert_eq!(special.strength, 12);
        assert_eq!(special.intelligence, 6);
        assert_eq!(special.luck, 1);
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let raw = RawCharacter::from_json_slice(br#"{"name":"Nate","schema":3}"#).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Nate"));
    }

    #[test]
    fn import_rejects_bad_shapes() {
        let bad: [&[u8]; 11] = [
            b"[]",
            b"7",
            br#"{"level":"two"}"#,
            br#"{"origin":"alien"}"#,
            br#"{"special":{"charm":4}}"#,
            br#"{"skills":{"hacking":2}}"#,
            br#"{"specialties":["hacking"]}"#,
            br#"{"items":[{"id":"x","quantity":1}]}"#,
            br#"{"items":[{"id":"x","quantity":1,"mods":[],"variation":"up"}]}"#,
            br#"{"items":[{"id":"ammo10mm","quantity":-50,"mods":[]}]}"#,
            b"{not json",
        ];
        for input in bad {
            let err = RawCharacter::from_json_slice(input).unwrap_err();
            assert_eq!(err.code, CoreErrorCode::Parse, "{}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn extreme_ranks_are_held_to_the_skill_cap() {
        let raw = RawCharacter::from_json_slice(
            br#"{"level":2147483647,"skills":{"sneak":2147483647,"repair":-4},"specialties":["sneak"]}"#,
        )
        .unwrap();
        let normal = raw.normalize();
        assert_eq!(normal.level, i32::MAX);
        assert_eq!(normal.skills[&Skill::Sneak], 6);
        assert_eq!(normal.skills[&Skill::Repair], 0);
    }

    #[test]
    fn export_omits_absent_fields() {
        let mut raw = RawCharacter {
            level: Some(3),
            ..RawCharacter::default()
        };
        raw.items.push(CharacterItem::new("ammo10mm", 12));
        let json: serde_json::Value = serde_json::from_str(&raw.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "level": 3,
                "items": [{"id": "ammo10mm", "quantity": 12, "mods": []}]
            })
        );
    }

    #[test]
    fn configuration_ignores_mod_order() {
        let a = CharacterItem::new("weapon10mmPistol", 1).with_mods(["modA", "modB"]);
        let b = CharacterItem::new("weapon10mmPistol", 3).with_mods(["modB", "modA"]);
        let c = CharacterItem::new("weapon10mmPistol", 1).with_mods(["modA"]);
        assert!(a.is_same_configuration(&b));
        assert!(!a.is_same_configuration(&c));
    }
}
