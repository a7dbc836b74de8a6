//! The `kind:payload` effect strings carried by mods, parsed once at load.

use std::str::FromStr;

use crate::item::{AmmoType, DamageType};

#[derive(Debug, Clone, PartialEq)]
pub enum ModEffect {
    // Weapon side.
    DamageAdd(i32),
    DamageSet(i32),
    FireRateAdd(i32),
    DamageTypeChange(DamageType),
    AmmoChange(AmmoType),
    RangeIncrease(i32),
    QualityAdd(String),
    /// Drops the quality and any parameterised form of it (`q:*`).
    QualityRemove(String),
    AmmoConsumption(i32),
    AllowMuzzleMod(bool),
    RerollHitLocation(bool),

    // Apparel side.
    PhysicalResAdd(i32),
    EnergyResAdd(i32),
    RadiationResAdd(i32),
    MeleeResAdd(i32),
    ExplosiveResAdd(i32),
    FallDamageResAdd(i32),
    CarryWeightAdd(f64),
    UnarmedDamageAdd(i32),

    // Both.
    EffectAdd(String),
    EffectRemove(String),

    /// Kept verbatim; applying it changes nothing.
    Unrecognized(String),
}

impl ModEffect {
    /// Parses one effect string. Never fails: anything that does not fit a
    /// known kind becomes [`ModEffect::Unrecognized`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (kind, payload) = raw.split_once(':').unwrap_or((raw, ""));
        Self::from_parts(kind, payload).unwrap_or_else(|| ModEffect::Unrecognized(raw.to_string()))
    }

    fn from_parts(kind: &str, payload: &str) -> Option<Self> {
        let effect = match kind {
            "damageAdd" => ModEffect::DamageAdd(number(payload)?),
            "damageSet" => ModEffect::DamageSet(number(payload)?),
            "fireRateAdd" => ModEffect::FireRateAdd(number(payload)?),
            "damageTypeChange" => ModEffect::DamageTypeChange(payload.parse().ok()?),
            "ammoChange" => ModEffect::AmmoChange(AmmoType::parse(non_empty(payload)?)),
            "rangeIncrease" => ModEffect::RangeIncrease(number(payload)?),
            "qualityAdd" => ModEffect::QualityAdd(non_empty(payload)?.to_string()),
            "qualityRemove" => ModEffect::QualityRemove(non_empty(payload)?.to_string()),
            "ammoConsumption" => ModEffect::AmmoConsumption(number(payload)?),
            "allowMuzzleMod" => ModEffect::AllowMuzzleMod(payload == "true"),
            "rerollHitLocation" => ModEffect::RerollHitLocation(payload == "true"),
            "physicalResAdd" | "damageReductionPhysicalAdd" => {
                ModEffect::PhysicalResAdd(number(payload)?)
            }
            "energyResAdd" | "damageReductionEnergyAdd" => {
                ModEffect::EnergyResAdd(number(payload)?)
            }
            "radiationResAdd" | "damageReductionRadiationAdd" => {
                ModEffect::RadiationResAdd(number(payload)?)
            }
            "meleeResAdd" => ModEffect::MeleeResAdd(number(payload)?),
            "explosiveResAdd" => ModEffect::ExplosiveResAdd(number(payload)?),
            "fallDamageResAdd" => ModEffect::FallDamageResAdd(number(payload)?),
            "carryWeightAdd" => ModEffect::CarryWeightAdd(number(payload)?),
            "unarmedDamageAdd" => ModEffect::UnarmedDamageAdd(number(payload)?),
            "effectAdd" => ModEffect::EffectAdd(non_empty(payload)?.to_string()),
            "effectRemove" => ModEffect::EffectRemove(non_empty(payload)?.to_string()),
            _ => return None,
        };
        Some(effect)
    }

    /// Removals run after every addition from every attached mod.
    pub fn is_removal(&self) -> bool {
        matches!(self, ModEffect::QualityRemove(_) | ModEffect::EffectRemove(_))
    }

    /// The effect or quality id this entry grants, if it grants one.
    pub fn granted(&self) -> Option<&str> {
        match self {
            ModEffect::EffectAdd(id) | ModEffect::QualityAdd(id) => Some(id),
            _ => None,
        }
    }
}

fn number<T: FromStr>(payload: &str) -> Option<T> {
    payload.trim().parse().ok()
}

fn non_empty(payload: &str) -> Option<&str> {
    let payload = payload.trim();
    (!payload.is_empty()).then_some(payload)
}

/// Drops `id` and every `id:<value>` entry.
pub(crate) fn remove_tagged(list: &mut Vec<String>, id: &str) {
    list.retain(|entry| {
        entry != id
            && !entry
                .strip_prefix(id)
                .is_some_and(|rest| rest.starts_with(':'))
    });
}

/// Appends `id` unless already present.
pub(crate) fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|entry| entry == id) {
        list.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_after_first_colon_is_kept_whole() {
        assert_eq!(
            ModEffect::parse("effectAdd:effectPiercing:1"),
            ModEffect::EffectAdd("effectPiercing:1".to_string())
        );
        assert_eq!(
            ModEffect::parse("effectAdd:strength:2"),
            ModEffect::EffectAdd("strength:2".to_string())
        );
    }

    #[test]
    fn resistance_aliases_share_a_variant() {
        assert_eq!(
            ModEffect::parse("damageReductionPhysicalAdd:2"),
            ModEffect::PhysicalResAdd(2)
        );
        assert_eq!(ModEffect::parse("physicalResAdd:2"), ModEffect::PhysicalResAdd(2));
    }

    #[test]
    fn typed_payloads_are_decoded() {
        assert_eq!(
            ModEffect::parse("damageTypeChange:energy"),
            ModEffect::DamageTypeChange(DamageType::Energy)
        );
        assert_eq!(
            ModEffect::parse("ammoChange:ammo308"),
            ModEffect::AmmoChange(AmmoType::Item("ammo308".to_string()))
        );
        assert_eq!(ModEffect::parse("carryWeightAdd:12.5"), ModEffect::CarryWeightAdd(12.5));
        assert_eq!(ModEffect::parse("allowMuzzleMod:true"), ModEffect::AllowMuzzleMod(true));
    }

    #[test]
    fn bad_input_is_kept_unrecognized() {
        assert_eq!(
            ModEffect::parse("damageAdd:lots"),
            ModEffect::Unrecognized("damageAdd:lots".to_string())
        );
        assert_eq!(
            ModEffect::parse("teleport:1"),
            ModEffect::Unrecognized("teleport:1".to_string())
        );
        assert_eq!(
            ModEffect::parse("qualityAdd:"),
            ModEffect::Unrecognized("qualityAdd:".to_string())
        );
    }

    #[test]
    fn removal_drops_parameterised_forms() {
        let mut list = vec![
            "qualityInaccurate".to_string(),
            "qualityPiercing:1".to_string(),
            "qualityPiercingShot".to_string(),
        ];
        remove_tagged(&mut list, "qualityPiercing");
        assert_eq!(list, vec!["qualityInaccurate", "qualityPiercingShot"]);

        push_unique(&mut list, "qualityInaccurate");
        assert_eq!(list.len(), 2);
    }
}
