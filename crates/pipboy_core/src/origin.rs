//! Character origins and the rule variations each one carries.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::body::{BodyPart, HUMANOID_PARTS, ROBOT_PARTS};
use crate::special::{Special, SpecialStats};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OriginId {
    VaultDweller,
    Ghoul,
    Survivor,
    MrHandy,
    BrotherhoodInitiate,
    SuperMutant,
}

impl OriginId {
    pub fn id(&self) -> &'static str {
        self.into()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OriginId::VaultDweller => "Vault Dweller",
            OriginId::Ghoul => "Ghoul",
            OriginId::Survivor => "Survivor",
            OriginId::MrHandy => "Mister Handy",
            OriginId::BrotherhoodInitiate => "Brotherhood Initiate",
            OriginId::SuperMutant => "Super Mutant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CarryWeightRule {
    /// `base + per_point * strength`
    StrengthScaled { base: f64, per_point: f64 },
    /// Independent of strength; only gear can raise it.
    Fixed { value: f64 },
}

impl CarryWeightRule {
    pub fn max_carry_weight(&self, strength: i32) -> f64 {
        match *self {
            CarryWeightRule::StrengthScaled { base, per_point } => {
                base + per_point * f64::from(strength)
            }
            CarryWeightRule::Fixed { value } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub id: Option<OriginId>,
    pub carry_weight: CarryWeightRule,
    pub has_radiation_immunity: bool,
    pub has_poison_immunity: bool,
    pub body_parts: &'static [BodyPart],
    pub special_max_values: SpecialStats,
    pub skill_max_value: i32,
    pub needs_specialized_armor: bool,
    pub needs_specialized_weapons: bool,
    pub can_use_aid: bool,
    pub icon: &'static str,
}

const DEFAULT_CARRY_WEIGHT: CarryWeightRule = CarryWeightRule::StrengthScaled {
    base: 75.0,
    per_point: 5.0,
};

impl Origin {
    const fn humanoid(id: Option<OriginId>) -> Self {
        Self {
            id,
            carry_weight: DEFAULT_CARRY_WEIGHT,
            has_radiation_immunity: false,
            has_poison_immunity: false,
            body_parts: &HUMANOID_PARTS,
            special_max_values: SpecialStats::uniform(10),
            skill_max_value: 6,
            needs_specialized_armor: false,
            needs_specialized_weapons: false,
            can_use_aid: true,
            icon: "vaultboy-open-arms",
        }
    }

    /// Resolves an origin id; an absent id is the origin-less template.
    pub fn get(id: Option<OriginId>) -> &'static Origin {
        match id {
            None => &NO_ORIGIN,
            Some(OriginId::VaultDweller) => &VAULT_DWELLER,
            Some(OriginId::Ghoul) => &GHOUL,
            Some(OriginId::Survivor) => &SURVIVOR,
            Some(OriginId::MrHandy) => &MR_HANDY,
            Some(OriginId::BrotherhoodInitiate) => &BROTHERHOOD_INITIATE,
            Some(OriginId::SuperMutant) => &SUPER_MUTANT,
        }
    }

    /// Any body layout other than the humanoid one is a robot chassis.
    pub fn is_robot(&self) -> bool {
        self.body_parts != HUMANOID_PARTS.as_slice()
    }

    pub fn max_carry_weight(&self, strength: i32) -> f64 {
        self.carry_weight.max_carry_weight(strength)
    }

    pub fn display_name(&self) -> &'static str {
        self.id.map_or("None", |id| id.display_name())
    }

    pub fn special_max(&self, special: Special) -> i32 {
        self.special_max_values.get(special)
    }

    pub fn has_body_part(&self, part: BodyPart) -> bool {
        self.body_parts.contains(&part)
    }
}

static NO_ORIGIN: Origin = Origin::humanoid(None);

static VAULT_DWELLER: Origin = Origin::humanoid(Some(OriginId::VaultDweller));

static GHOUL: Origin = Origin {
    has_radiation_immunity: true,
    icon: "ghoul",
    ..Origin::humanoid(Some(OriginId::Ghoul))
};

static SURVIVOR: Origin = Origin::humanoid(Some(OriginId::Survivor));

static MR_HANDY: Origin = Origin {
    carry_weight: CarryWeightRule::Fixed { value: 75.0 },
    has_radiation_immunity: true,
    has_poison_immunity: true,
    body_parts: &ROBOT_PARTS,
    needs_specialized_armor: true,
    needs_specialized_weapons: true,
    can_use_aid: false,
    icon: "mrHandy",
    ..Origin::humanoid(Some(OriginId::MrHandy))
};

static BROTHERHOOD_INITIATE: Origin = Origin::humanoid(Some(OriginId::BrotherhoodInitiate));

static SUPER_MUTANT: Origin = Origin {
    has_radiation_immunity: true,
    has_poison_immunity: true,
    special_max_values: SpecialStats {
        strength: 12,
        endurance: 12,
        intelligence: 6,
        charisma: 6,
        ..SpecialStats::uniform(10)
    },
    ..Origin::humanoid(Some(OriginId::SuperMutant))
};
