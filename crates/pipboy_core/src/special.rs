use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The seven core attributes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Special {
    Strength,
    Perception,
    Endurance,
    Charisma,
    Intelligence,
    Agility,
    Luck,
}

impl Special {
    pub const DEFAULT_VALUE: i32 = 5;

    pub fn id(&self) -> &'static str {
        self.into()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Special::Strength => "Strength",
            Special::Perception => "Perception",
            Special::Endurance => "Endurance",
            Special::Charisma => "Charisma",
            Special::Intelligence => "Intelligence",
            Special::Agility => "Agility",
            Special::Luck => "Luck",
        }
    }
}

/// A fully populated set of SPECIAL values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialStats {
    pub strength: i32,
    pub perception: i32,
    pub endurance: i32,
    pub charisma: i32,
    pub intelligence: i32,
    pub agility: i32,
    pub luck: i32,
}

impl SpecialStats {
    pub const fn uniform(value: i32) -> Self {
        Self {
            strength: value,
            perception: value,
            endurance: value,
            charisma: value,
            intelligence: value,
            agility: value,
            luck: value,
        }
    }

    pub fn get(&self, special: Special) -> i32 {
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
        match special {
            Special::Strength => self.strength = value,
            Special::Perception => self.perception = value,
            Special::Endurance => self.endurance = value,
            Special::Charisma => self.charisma = value,
            Special::Intelligence => self.intelligence = value,
            Special::Agility => self.agility = value,
            Special::Luck => self.luck = value,
        }
    }
}

impl Default for SpecialStats {
    fn default() -> Self {
        Self::uniform(Special::DEFAULT_VALUE)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Skill {
    Athletics,
    Barter,
    BigGuns,
    EnergyWeapons,
    Explosives,
    Lockpick,
    Medicine,
    MeleeWeapons,
    Pilot,
    Repair,
    Science,
    SmallGuns,
    Sneak,
    Speech,
    Survival,
    Throwing,
    Unarmed,
}

impl Skill {
    /// Rank bonus granted by a tagged specialty.
    pub const SPECIALTY_BONUS: i32 = 2;

    pub fn id(&self) -> &'static str {
        self.into()
    }

    /// The attribute a skill test rolls against by default.
    pub fn governing_special(&self) -> Special {
        match self {
            Skill::Athletics | Skill::MeleeWeapons | Skill::Unarmed => Special::Strength,
            Skill::EnergyWeapons | Skill::Explosives | Skill::Lockpick | Skill::Pilot => {
                Special::Perception
            }
            Skill::BigGuns | Skill::Survival => Special::Endurance,
            Skill::Barter | Skill::Speech => Special::Charisma,
            Skill::Medicine | Skill::Repair | Skill::Science => Special::Intelligence,
            Skill::SmallGuns | Skill::Sneak | Skill::Throwing => Special::Agility,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Skill::Athletics => "Athletics",
            Skill::Barter => "Barter",
            Skill::BigGuns => "Big Guns",
            Skill::EnergyWeapons => "Energy Weapons",
            Skill::Explosives => "Explosives",
            Skill::Lockpick => "Lockpick",
            Skill::Medicine => "Medicine",
            Skill::MeleeWeapons => "Melee Weapons",
            Skill::Pilot => "Pilot",
            Skill::Repair => "Repair",
            Skill::Science => "Science",
            Skill::SmallGuns => "Small Guns",
            Skill::Sneak => "Sneak",
            Skill::Speech => "Speech",
            Skill::Survival => "Survival",
            Skill::Throwing => "Throwing",
            Skill::Unarmed => "Unarmed",
        }
    }
}
