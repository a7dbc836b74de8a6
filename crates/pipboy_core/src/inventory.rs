//! Inventory mutations. Each returns a new item list and leaves the input
//! alone, so a rejected action changes nothing.

use tracing::debug;

use crate::character::CharacterItem;
use crate::core_api::CoreError;
use crate::database::GameDatabase;
use crate::equipment::{can_delete, can_sell};
use crate::item::{Item, ModItem};

/// Slot shared by every robot part's plating; one plating covers the whole
/// chassis.
pub const ROBOT_PLATING_SLOT: &str = "modSlotRobotPlating";

/// Plating fitted to freshly built robot parts.
pub const DEFAULT_ROBOT_PLATING: &str = "modRobotPlatingStandard";

/// Adds `new_item`, merging into a stack with the same configuration.
pub fn add_item(
    items: &[CharacterItem],
    new_item: CharacterItem,
) -> Result<Vec<CharacterItem>, CoreError> {
    if new_item.quantity <= 0 {
        return Err(CoreError::rejected("Quantity must be at least 1."));
    }
    let mut updated = items.to_vec();
    match updated
        .iter_mut()
        .find(|existing| existing.is_same_configuration(&new_item))
    {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(new_item.quantity);
        }
        None => updated.push(new_item),
    }
    Ok(updated)
}

/// Takes `quantity` off the stack matching `target`'s configuration. Stacks
/// that reach zero are dropped.
pub fn remove_item(
    items: &[CharacterItem],
    target: &CharacterItem,
    quantity: i32,
) -> Vec<CharacterItem> {
    let mut updated = items.to_vec();
    if let Some(index) = updated
        .iter()
        .position(|existing| existing.is_same_configuration(target))
    {
        take_from(&mut updated, index, quantity);
    }
    updated
}

fn take_from(items: &mut Vec<CharacterItem>, index: usize, quantity: i32) {
    items[index].quantity -= quantity;
    if items[index].quantity <= 0 {
        items.remove(index);
    }
}

fn stack(items: &[CharacterItem], index: usize) -> Result<&CharacterItem, CoreError> {
    items
        .get(index)
        .ok_or_else(|| CoreError::rejected(format!("no inventory entry at position {index}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub items: Vec<CharacterItem>,
    pub caps_earned: i32,
}

/// Sells part of a stack at `unit_price` caps each (total rounded down).
pub fn sell_item(
    items: &[CharacterItem],
    index: usize,
    quantity: i32,
    unit_price: f64,
) -> Result<Sale, CoreError> {
    let owned = stack(items, index)?;
    can_sell(&owned.id)?;
    if quantity < 1 || quantity > owned.quantity {
        return Err(CoreError::rejected(format!(
            "Can only sell between 1 and {} of this item.",
            owned.quantity
        )));
    }
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(CoreError::rejected("Price must be zero or more."));
    }

    let caps_earned = (f64::from(quantity) * unit_price).floor() as i32;
    let mut updated = items.to_vec();
    take_from(&mut updated, index, quantity);
    debug!(item = %owned.id, quantity, caps_earned, "sold");
    Ok(Sale {
        items: updated,
        caps_earned,
    })
}

/// Removes the whole stack.
pub fn delete_item(items: &[CharacterItem], index: usize) -> Result<Vec<CharacterItem>, CoreError> {
    let owned = stack(items, index)?;
    can_delete(&owned.id)?;
    let mut updated = items.to_vec();
    updated.remove(index);
    Ok(updated)
}

fn mod_data<'a>(db: &'a GameDatabase, mod_id: &str) -> Result<&'a ModItem, CoreError> {
    db.require_item(mod_id)?
        .as_mod()
        .ok_or_else(|| CoreError::rejected(format!("{mod_id} is not a mod.")))
}

fn slot_of(db: &GameDatabase, mod_id: &str) -> Option<String> {
    db.get_item(mod_id)
        .and_then(Item::as_mod)
        .map(|data| data.slot_type.clone())
}

/// `mods` with anything in `slot` swapped out for `mod_id`.
fn with_mod_in_slot(mods: &[String], mod_id: &str, slot: &str, db: &GameDatabase) -> Vec<String> {
    let mut next: Vec<String> = mods
        .iter()
        .filter(|existing| slot_of(db, existing).as_deref() != Some(slot))
        .cloned()
        .collect();
    next.push(mod_id.to_string());
    next
}

/// Attaches `mod_id` to one unit of the stack at `index`. A mod already in
/// the same slot is replaced.
pub fn apply_mod(
    items: &[CharacterItem],
    index: usize,
    mod_id: &str,
    db: &GameDatabase,
) -> Result<Vec<CharacterItem>, CoreError> {
    let owned = stack(items, index)?;
    let item = db.require_item(&owned.id)?;
    let data = mod_data(db, mod_id)?;
    if !item.available_mods().iter().any(|m| m == mod_id) {
        return Err(CoreError::rejected(format!(
            "{mod_id} cannot be fitted to {}.",
            owned.id
        )));
    }
    if owned.has_mod(mod_id) {
        return Err(CoreError::rejected(format!("{mod_id} is already fitted.")));
    }

    let mut modded = owned.clone();
    modded.mods = with_mod_in_slot(&owned.mods, mod_id, &data.slot_type, db);
    modded.quantity = 1;

    let mut updated = items.to_vec();
    take_from(&mut updated, index, 1);
    let mut updated = add_item(&updated, modded)?;

    if item.is_robot_part() && data.slot_type == ROBOT_PLATING_SLOT {
        for part in updated.iter_mut() {
            let is_robot_part = db.get_item(&part.id).is_some_and(Item::is_robot_part);
            if is_robot_part && !part.has_mod(mod_id) {
                part.mods = with_mod_in_slot(&part.mods, mod_id, ROBOT_PLATING_SLOT, db);
            }
        }
    }
    debug!(item = %owned.id, mod_id, "mod applied");
    Ok(updated)
}

/// Detaches `mod_id` from one unit of the stack at `index`.
pub fn remove_mod(
    items: &[CharacterItem],
    index: usize,
    mod_id: &str,
    db: &GameDatabase,
) -> Result<Vec<CharacterItem>, CoreError> {
    let owned = stack(items, index)?;
    if !owned.has_mod(mod_id) {
        return Err(CoreError::rejected(format!("{mod_id} is not fitted.")));
    }
    let is_robot_part = db.get_item(&owned.id).is_some_and(Item::is_robot_part);
    if is_robot_part && slot_of(db, mod_id).as_deref() == Some(ROBOT_PLATING_SLOT) {
        return Err(CoreError::rejected("Robot parts must keep their plating."));
    }

    let mut stripped = owned.clone();
    stripped.mods.retain(|m| m != mod_id);
    stripped.quantity = 1;

    let mut updated = items.to_vec();
    take_from(&mut updated, index, 1);
    debug!(item = %owned.id, mod_id, "mod removed");
    add_item(&updated, stripped)
}
