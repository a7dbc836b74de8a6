//! Equip/unequip rules and body-location conflict resolution.

use crate::body::{BodyPart, map_item_locations};
use crate::character::CharacterItem;
use crate::core_api::CoreError;
use crate::database::GameDatabase;
use crate::item::{Apparel, Item};
use crate::origin::Origin;

fn covered_parts(owned: &CharacterItem, apparel: &Apparel, origin: &Origin) -> Vec<BodyPart> {
    map_item_locations(&apparel.locations_covered, owned.variation, origin.body_parts)
}

/// Indices of currently equipped apparel that must come off when
/// `items[target]` is put on: they share a body location and a layer.
pub fn resolve_equip_conflicts(
    items: &[CharacterItem],
    target: usize,
    origin: &Origin,
    db: &GameDatabase,
) -> Vec<usize> {
    let Some(owned) = items.get(target) else {
        return Vec::new();
    };
    let Some(apparel) = db.get_item(&owned.id).and_then(Item::as_apparel) else {
        return Vec::new();
    };
    let locations = covered_parts(owned, apparel, origin);
    let layer = apparel.layer();

    items
        .iter()
        .enumerate()
        .filter(|(index, other)| *index != target && other.equipped)
        .filter_map(|(index, other)| {
            let other_apparel = db.get_item(&other.id).and_then(Item::as_apparel)?;
            let overlaps = covered_parts(other, other_apparel, origin)
                .iter()
                .any(|part| locations.contains(part));
            (overlaps && layer.conflicts_with(other_apparel.layer())).then_some(index)
        })
        .collect()
}

/// Checks whether `origin` may put `item` on.
pub fn can_equip(origin: &Origin, item: &Item) -> Result<(), CoreError> {
    let Some(apparel) = item.as_apparel() else {
        return Err(CoreError::rejected("Cannot equip this item!"));
    };
    if apparel.is_robot_part() && !origin.is_robot() {
        return Err(CoreError::rejected("Only robots can equip robot parts."));
    }
    if !apparel.is_robot_part() && origin.needs_specialized_armor {
        return Err(CoreError::rejected(
            "This origin cannot wear regular armor or clothing.",
        ));
    }
    Ok(())
}

pub fn can_unequip(item_id: &str) -> Result<(), CoreError> {
    if GameDatabase::is_unacquirable(item_id) {
        return Err(CoreError::rejected("Cannot unequip this item!"));
    }
    Ok(())
}

pub fn can_sell(item_id: &str) -> Result<(), CoreError> {
    if GameDatabase::is_unacquirable(item_id) {
        return Err(CoreError::rejected("Cannot sell this item!"));
    }
    Ok(())
}

pub fn can_delete(item_id: &str) -> Result<(), CoreError> {
    if GameDatabase::is_unacquirable(item_id) {
        return Err(CoreError::rejected("Cannot delete this item!"));
    }
    Ok(())
}

/// Flips the equipped state of `items[index]`, returning the new list.
///
/// Equipping forces conflicting pieces off. The input is left untouched
/// when the toggle is rejected.
pub fn toggle_equip(
    items: &[CharacterItem],
    index: usize,
    origin: &Origin,
    db: &GameDatabase,
) -> Result<Vec<CharacterItem>, CoreError> {
    let owned = items
        .get(index)
        .ok_or_else(|| CoreError::rejected(format!("no inventory entry at position {index}")))?;
    let item = db.require_item(&owned.id)?;

    let mut updated = items.to_vec();
    if owned.equipped {
        can_unequip(&owned.id)?;
        updated[index].equipped = false;
        return Ok(updated);
    }

    can_equip(origin, item)?;
    for conflict in resolve_equip_conflicts(items, index, origin, db) {
        updated[conflict].equipped = false;
    }
    updated[index].equipped = true;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Side;
    use crate::core_api::CoreErrorCode;
    use crate::item::ItemType;
    use crate::origin::OriginId;

    const APPAREL: &str = "ID,CATEGORY,PHYSICAL_RES,ENERGY_RES,RADIATION_RES,LOCATIONS_COVERED\n\
apparelLeatherChest,leatherArmor,2,1,0,\"[\"\"torso\"\"]\"\n\
apparelMetalChest,metalArmor,3,1,0,\"[\"\"torso\"\"]\"\n\
apparelLeatherArm,leatherArmor,1,0,0,\"[\"\"arm\"\"]\"\n\
apparelVaultSuit,clothing,0,0,1,\"[\"\"torso\"\",\"\"arms\"\",\"\"legs\"\"]\"\n\
apparelHardHat,headgear,1,0,0,\"[\"\"head\"\"]\"\n\
apparelRaiderOutfit,outfit,1,1,1,\"[\"\"torso\"\",\"\"legs\"\"]\"\n\
robotPartArms,robotPart,1,1,0,\"[\"\"robotPartArms\"\"]\"\n";

    fn db() -> GameDatabase {
        let mut builder = GameDatabase::builder();
        builder
            .add_table(ItemType::Apparel, "apparel.csv", APPAREL)
            .unwrap()
            .add_table(
                ItemType::Weapon,
                "smallGuns.csv",
                "ID,CATEGORY,AMMO_TYPE\nweapon10mmPistol,smallGuns,ammo10mm\n",
            )
            .unwrap();
        builder.build()
    }

    fn humanoid() -> &'static Origin {
        Origin::get(Some(OriginId::VaultDweller))
    }

    #[test]
    fn same_layer_same_location_conflicts() {
        let db = db();
        let items = vec![
            CharacterItem::new("apparelLeatherChest", 1).equipped(),
            CharacterItem::new("apparelMetalChest", 1),
        ];
        let updated = toggle_equip(&items, 1, humanoid(), &db).unwrap();
        assert!(!updated[0].equipped);
        assert!(updated[1].equipped);
    }

    #[test]
    fn disjoint_locations_coexist() {
        let db = db();
        let items = vec![
            CharacterItem::new("apparelHardHat", 1).equipped(),
            CharacterItem::new("apparelLeatherChest", 1),
        ];
        let updated = toggle_equip(&items, 1, humanoid(), &db).unwrap();
        assert!(updated[0].equipped && updated[1].equipped);
    }

    #[test]
    fn under_and_over_layers_coexist_but_outfits_do_not() {
        let db = db();
        let items = vec![
            CharacterItem::new("apparelVaultSuit", 1).equipped(),
            CharacterItem::new("apparelLeatherChest", 1),
            CharacterItem::new("apparelRaiderOutfit", 1),
        ];
        let updated = toggle_equip(&items, 1, humanoid(), &db).unwrap();
        assert!(updated[0].equipped && updated[1].equipped);

        let updated = toggle_equip(&updated, 2, humanoid(), &db).unwrap();
        assert!(!updated[0].equipped);
        assert!(!updated[1].equipped);
        assert!(updated[2].equipped);
    }

    #[test]
    fn sided_pieces_only_conflict_on_their_side() {
        let db = db();
        let items = vec![
            CharacterItem::new("apparelLeatherArm", 1)
                .on_side(Side::Left)
                .equipped(),
            CharacterItem::new("apparelLeatherArm", 1).on_side(Side::Right),
        ];
        assert!(resolve_equip_conflicts(&items, 1, humanoid(), &db).is_empty());
    }

    #[test]
    fn only_apparel_is_equippable() {
        let db = db();
        let items = vec![CharacterItem::new("weapon10mmPistol", 1)];
        let err = toggle_equip(&items, 0, humanoid(), &db).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::InvalidMutation);
        assert_eq!(err.message, "Cannot equip this item!");
    }

    #[test]
    fn robot_parts_belong_to_robots() {
        let db = db();
        let items = vec![CharacterItem::new("robotPartArms", 1)];
        assert!(toggle_equip(&items, 0, humanoid(), &db).is_err());

        let robot = Origin::get(Some(OriginId::MrHandy));
        let updated = toggle_equip(&items, 0, robot, &db).unwrap();
        assert!(updated[0].equipped);
        assert!(toggle_equip(&updated, 0, robot, &db).is_err());

        let suit = vec![CharacterItem::new("apparelVaultSuit", 1)];
        assert!(toggle_equip(&suit, 0, robot, &db).is_err());
    }

    #[test]
    fn unacquirable_items_cannot_be_traded() {
        for id in crate::database::UNACQUIRABLE_IDS {
            assert!(can_sell(id).is_err());
            assert!(can_delete(id).is_err());
            assert!(can_unequip(id).is_err());
        }
        assert!(can_sell("apparelHardHat").is_ok());
    }
}
