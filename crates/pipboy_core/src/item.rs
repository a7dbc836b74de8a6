//! Static item definitions as held by the game database.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::body::{CoveredLocation, ItemLayer};
use crate::effect::ModEffect;
use crate::special::Skill;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ItemType {
    Weapon,
    Apparel,
    Aid,
    Mod,
    Other,
}

impl ItemType {
    pub fn id(&self) -> &'static str {
        self.into()
    }

    /// Directory holding this type's tables inside a data root.
    pub fn data_dir(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Apparel => "apparel",
            ItemType::Aid => "aid",
            ItemType::Mod => "mods",
            ItemType::Other => "other",
        }
    }

    /// Category ids browsable under this type.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            ItemType::Weapon => &[
                "smallGuns",
                "energyWeapons",
                "bigGuns",
                "meleeWeapons",
                "explosives",
                "throwing",
                "unarmed",
            ],
            ItemType::Apparel => &[
                "clothing",
                "outfit",
                "headgear",
                "raiderArmor",
                "leatherArmor",
                "metalArmor",
                "combatArmor",
                "syntheticArmor",
                "vaultTecSecurity",
                "robotPart",
            ],
            ItemType::Aid => &["food", "drinks", "meds"],
            ItemType::Mod => &["mods"],
            ItemType::Other => &["ammo"],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum WeaponCategory {
    SmallGuns,
    EnergyWeapons,
    BigGuns,
    MeleeWeapons,
    Explosives,
    Throwing,
    Unarmed,
}

impl WeaponCategory {
    pub fn id(&self) -> &'static str {
        self.into()
    }

    /// Skill rolled when attacking with a weapon of this category.
    pub fn skill(&self) -> Skill {
        match self {
            WeaponCategory::SmallGuns => Skill::SmallGuns,
            WeaponCategory::EnergyWeapons => Skill::EnergyWeapons,
            WeaponCategory::BigGuns => Skill::BigGuns,
            WeaponCategory::MeleeWeapons => Skill::MeleeWeapons,
            WeaponCategory::Explosives => Skill::Explosives,
            WeaponCategory::Throwing => Skill::Throwing,
            WeaponCategory::Unarmed => Skill::Unarmed,
        }
    }

    pub fn uses_ammo(&self) -> bool {
        !matches!(self, WeaponCategory::MeleeWeapons | WeaponCategory::Unarmed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ApparelCategory {
    Clothing,
    Outfit,
    Headgear,
    RaiderArmor,
    LeatherArmor,
    MetalArmor,
    CombatArmor,
    SyntheticArmor,
    VaultTecSecurity,
    RobotPart,
}

impl ApparelCategory {
    pub fn id(&self) -> &'static str {
        self.into()
    }

    pub fn layer(&self) -> ItemLayer {
        match self {
            ApparelCategory::Clothing => ItemLayer::Under,
            ApparelCategory::Outfit | ApparelCategory::Headgear | ApparelCategory::RobotPart => {
                ItemLayer::Both
            }
            ApparelCategory::RaiderArmor
            | ApparelCategory::LeatherArmor
            | ApparelCategory::MetalArmor
            | ApparelCategory::CombatArmor
            | ApparelCategory::SyntheticArmor
            | ApparelCategory::VaultTecSecurity => ItemLayer::Over,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AidCategory {
    Food,
    Drinks,
    Meds,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OtherCategory {
    Ammo,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DamageType {
    Physical,
    Energy,
    Radiation,
    Poison,
}

/// Weapon reach, shortest first.
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
    Display,
    EnumString,
    IntoStaticStr,
)]
pub enum Range {
    #[serde(rename = "rangeR")]
    #[strum(serialize = "rangeR")]
    Reach,
    #[serde(rename = "rangeC")]
    #[strum(serialize = "rangeC")]
    Close,
    #[serde(rename = "rangeM")]
    #[strum(serialize = "rangeM")]
    Medium,
    #[serde(rename = "rangeL")]
    #[strum(serialize = "rangeL")]
    Long,
    #[serde(rename = "rangeE")]
    #[strum(serialize = "rangeE")]
    Extreme,
}

impl Range {
    const ORDER: [Range; 5] = [
        Range::Reach,
        Range::Close,
        Range::Medium,
        Range::Long,
        Range::Extreme,
    ];

    /// Moves `steps` bands outwards (or inwards when negative), stopping at
    /// either end.
    pub fn stepped(self, steps: i32) -> Range {
        let index = Self::ORDER.iter().position(|r| *r == self).unwrap_or(0) as i64;
        let last = Self::ORDER.len() as i64 - 1;
        let target = (index + i64::from(steps)).clamp(0, last);
        Self::ORDER[target as usize]
    }
}

/// Where a weapon's ammunition comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AmmoType {
    /// `na`: no ammunition.
    NotApplicable,
    /// `self`: thrown weapons spend their own stack.
    OwnStack,
    Item(String),
}

impl AmmoType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "na" => AmmoType::NotApplicable,
            "self" => AmmoType::OwnStack,
            other => AmmoType::Item(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AmmoType::NotApplicable => "na",
            AmmoType::OwnStack => "self",
            AmmoType::Item(id) => id,
        }
    }
}

impl Serialize for AmmoType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A damage resistance value. Immunity outranks any finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resistance {
    Value(i32),
    Immune,
}

impl Resistance {
    pub const ZERO: Resistance = Resistance::Value(0);

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => Some(Self::ZERO),
            "Infinity" => Some(Resistance::Immune),
            other => other.parse().ok().map(Resistance::Value),
        }
    }

    /// Adds a delta; immunity absorbs it.
    pub fn plus(self, delta: i32) -> Self {
        match self {
            Resistance::Value(value) => Resistance::Value(value.saturating_add(delta)),
            Resistance::Immune => Resistance::Immune,
        }
    }

    pub fn is_immune(&self) -> bool {
        matches!(self, Resistance::Immune)
    }
}

impl Default for Resistance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Ord for Resistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Resistance::Value(a), Resistance::Value(b)) => a.cmp(b),
            (Resistance::Value(_), Resistance::Immune) => Ordering::Less,
            (Resistance::Immune, Resistance::Value(_)) => Ordering::Greater,
            (Resistance::Immune, Resistance::Immune) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Resistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Resistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resistance::Value(value) => write!(f, "{value}"),
            Resistance::Immune => f.write_str("Immune"),
        }
    }
}

/// Finite values serialize as numbers, immunity as the string `"Infinity"`.
impl Serialize for Resistance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resistance::Value(value) => serializer.serialize_i32(*value),
            Resistance::Immune => serializer.serialize_str("Infinity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub category: WeaponCategory,
    pub damage_rating: i32,
    pub damage_type: DamageType,
    /// `None` for weapons without a fire rate (`-` in the tables).
    pub fire_rate: Option<i32>,
    pub range: Option<Range>,
    pub ammo: AmmoType,
    pub qualities: Vec<String>,
    pub effects: Vec<String>,
    pub available_mods: Vec<String>,
    pub ammo_consumption: Option<i32>,
    pub allow_muzzle_mod: bool,
    pub reroll_hit_location: bool,
}

impl Weapon {
    pub fn has_quality(&self, quality: &str) -> bool {
        self.qualities.iter().any(|q| q == quality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apparel {
    pub category: ApparelCategory,
    pub physical_res: Resistance,
    pub energy_res: Resistance,
    pub radiation_res: Resistance,
    pub melee_res: i32,
    pub explosive_res: i32,
    pub fall_damage_res: i32,
    pub carry_weight_bonus: f64,
    pub unarmed_damage: i32,
    pub locations_covered: Vec<CoveredLocation>,
    pub qualities: Vec<String>,
    pub effects: Vec<String>,
    pub available_mods: Vec<String>,
}

impl Apparel {
    pub fn is_robot_part(&self) -> bool {
        self.category == ApparelCategory::RobotPart
    }

    pub fn layer(&self) -> ItemLayer {
        self.category.layer()
    }

    /// Body armour that protects the torso and nothing else.
    pub fn is_torso_only(&self) -> bool {
        matches!(
            self.locations_covered.as_slice(),
            [CoveredLocation::Part(crate::body::BodyPart::Torso)]
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AidKind {
    Food { hp_gain: i32, radioactive: bool },
    Meds { duration: String, addictive: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aid {
    pub category: AidCategory,
    pub effect: String,
    pub kind: AidKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModItem {
    pub slot_type: String,
    pub skill: Option<Skill>,
    pub perks: Vec<String>,
    pub effects: Vec<ModEffect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Weapon(Weapon),
    Apparel(Apparel),
    Aid(Aid),
    Mod(ModItem),
    Other(OtherCategory),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub weight: f64,
    pub cost: i32,
    pub rarity: i32,
    pub kind: ItemKind,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        match self.kind {
            ItemKind::Weapon(_) => ItemType::Weapon,
            ItemKind::Apparel(_) => ItemType::Apparel,
            ItemKind::Aid(_) => ItemType::Aid,
            ItemKind::Mod(_) => ItemType::Mod,
            ItemKind::Other(_) => ItemType::Other,
        }
    }

    pub fn category_id(&self) -> &'static str {
        match &self.kind {
            ItemKind::Weapon(weapon) => weapon.category.id(),
            ItemKind::Apparel(apparel) => apparel.category.id(),
            ItemKind::Aid(aid) => aid.category.into(),
            ItemKind::Mod(_) => "mods",
            ItemKind::Other(category) => category.into(),
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            ItemKind::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn as_apparel(&self) -> Option<&Apparel> {
        match &self.kind {
            ItemKind::Apparel(apparel) => Some(apparel),
            _ => None,
        }
    }

    pub fn as_mod(&self) -> Option<&ModItem> {
        match &self.kind {
            ItemKind::Mod(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_moddable(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon(_) | ItemKind::Apparel(_))
    }

    pub fn available_mods(&self) -> &[String] {
        match &self.kind {
            ItemKind::Weapon(weapon) => &weapon.available_mods,
            ItemKind::Apparel(apparel) => &apparel.available_mods,
            _ => &[],
        }
    }

    pub fn effects(&self) -> &[String] {
        match &self.kind {
            ItemKind::Weapon(weapon) => &weapon.effects,
            ItemKind::Apparel(apparel) => &apparel.effects,
            _ => &[],
        }
    }

    pub fn is_robot_part(&self) -> bool {
        self.as_apparel().is_some_and(Apparel::is_robot_part)
    }
}
