use std::path::Path;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::body::ROBOT_PARTS;
use crate::character::{CharacterItem, RawCharacter};
use crate::database::GameDatabase;
use crate::derived::{Character, adjust_current_hp, compute_character};
use crate::equipment;
use crate::inventory::{self, DEFAULT_ROBOT_PLATING};
use crate::modding::modified_item;
use crate::origin::{Origin, OriginId};
use crate::special::{Skill, Special};

use super::error::{CoreError, CoreErrorCode};
use super::types::{InventoryEntry, SkillEntry};

/// Owns the game database and opens character sessions against it.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    database: Option<Arc<GameDatabase>>,
}

/// One character being viewed or edited. Every mutation replaces the raw
/// record and recomputes the derived character.
#[derive(Debug, Clone)]
pub struct Session {
    database: Arc<GameDatabase>,
    raw: RawCharacter,
    character: Character,
}

impl Engine {
    /// An engine with no database; sessions cannot be opened until one is
    /// attached.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database: GameDatabase) -> Self {
        Self {
            database: Some(Arc::new(database)),
        }
    }

    pub fn load_data_dir<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        GameDatabase::load_from_dir(path.as_ref()).map(Self::with_database)
    }

    pub fn database(&self) -> Option<&GameDatabase> {
        self.database.as_deref()
    }

    fn require_database(&self) -> Result<Arc<GameDatabase>, CoreError> {
        self.database.clone().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::DatabaseUninitialized,
                "game database has not been loaded",
            )
        })
    }

    pub fn compute(&self, raw: &RawCharacter) -> Result<Character, CoreError> {
        let database = self.require_database()?;
        Ok(compute_character(raw, &database))
    }

    /// A session on the default character.
    pub fn new_session(&self) -> Result<Session, CoreError> {
        Ok(Session::new(self.require_database()?, RawCharacter::default()))
    }

    pub fn open_raw(&self, raw: RawCharacter) -> Result<Session, CoreError> {
        Ok(Session::new(self.require_database()?, raw))
    }

    /// Opens a saved character from JSON bytes.
    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let database = self.require_database()?;
        let raw = RawCharacter::from_json_slice(bytes.as_ref()).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to import character: {}", e.message),
            )
        })?;
        Ok(Session::new(database, raw))
    }

    /// Like [`Engine::open_bytes`], but a record that fails to import yields
    /// the default character together with the import error.
    pub fn open_bytes_or_default<B: AsRef<[u8]>>(
        &self,
        bytes: B,
    ) -> Result<(Session, Option<CoreError>), CoreError> {
        match self.open_bytes(bytes) {
            Ok(session) => Ok((session, None)),
            Err(e) if e.code == CoreErrorCode::Parse => Ok((self.new_session()?, Some(e))),
            Err(e) => Err(e),
        }
    }
}

impl Session {
    fn new(database: Arc<GameDatabase>, raw: RawCharacter) -> Self {
        let character = compute_character(&raw, &database);
        info!(
            name = raw.name.as_deref().unwrap_or(""),
            items = raw.items.len(),
            "character loaded"
        );
        Self {
            database,
            raw,
            character,
        }
    }

    pub fn raw(&self) -> &RawCharacter {
        &self.raw
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn database(&self) -> &GameDatabase {
        &self.database
    }

    pub fn origin(&self) -> &'static Origin {
        self.character.origin
    }

    pub fn skills(&self) -> Vec<SkillEntry> {
        Skill::iter()
            .map(|skill| SkillEntry {
                skill,
                special: skill.governing_special(),
                rank: self.character.skill(skill),
                target: self.character.skill_target(skill),
                specialty: self.character.has_specialty(skill),
            })
            .collect()
    }

    /// Inventory rows in stored order, weights and cost taken from the
    /// modded item.
    pub fn inventory(&self) -> Vec<InventoryEntry> {
        self.raw
            .items
            .iter()
            .enumerate()
            .map(|(index, owned)| {
                let resolved = modified_item(owned, &self.database);
                let unit_weight = resolved.as_ref().map_or(0.0, |item| item.weight);
                InventoryEntry {
                    index,
                    id: owned.id.clone(),
                    item_type: resolved.as_ref().map(|item| item.item_type()),
                    category: resolved.as_ref().map(|item| item.category_id().to_string()),
                    quantity: owned.quantity,
                    equipped: owned.equipped,
                    variation: owned.variation,
                    mods: owned.mods.clone(),
                    unit_weight,
                    total_weight: unit_weight * f64::from(owned.quantity),
                    unit_cost: resolved.as_ref().map_or(0, |item| item.cost),
                }
            })
            .collect()
    }

    /// Index of the first stack holding `id`.
    pub fn find_item(&self, id: &str) -> Option<usize> {
        self.raw.items.iter().position(|item| item.id == id)
    }

    fn require_stack(&self, id: &str) -> Result<usize, CoreError> {
        self.find_item(id).ok_or_else(|| {
            CoreError::rejected(format!("{id} is not in the inventory."))
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let mut next = self.raw.clone();
        next.name = Some(name.into()).filter(|name| !name.is_empty());
        self.update(next);
    }

    pub fn set_background(&mut self, background: impl Into<String>) {
        let mut next = self.raw.clone();
        next.background = Some(background.into()).filter(|text| !text.is_empty());
        self.update(next);
    }

    pub fn set_origin(&mut self, origin: Option<OriginId>) {
        let mut next = self.raw.clone();
        next.origin = origin;
        self.update(next);
    }

    pub fn set_level(&mut self, level: i32) -> Result<(), CoreError> {
        if level < 1 {
            return Err(CoreError::rejected(format!(
                "level must be at least 1, got {level}"
            )));
        }
        let mut next = self.raw.clone();
        next.level = Some(level);
        self.update(next);
        Ok(())
    }

    pub fn set_special(&mut self, special: Special, value: i32) -> Result<(), CoreError> {
        let max = self.origin().special_max(special);
        if !(1..=max).contains(&value) {
            return Err(CoreError::rejected(format!(
                "{} must be between 1 and {max}, got {value}",
                special.display_name()
            )));
        }
        let mut next = self.raw.clone();
        next.special.set(special, value);
        self.update(next);
        Ok(())
    }

    pub fn set_skill(&mut self, skill: Skill, rank: i32) -> Result<(), CoreError> {
        let max = self.origin().skill_max_value;
        if !(0..=max).contains(&rank) {
            return Err(CoreError::rejected(format!(
                "{} must be between 0 and {max}, got {rank}",
                skill.display_name()
            )));
        }
        let mut next = self.raw.clone();
        next.skills.insert(skill, rank);
        self.update(next);
        Ok(())
    }

    pub fn set_specialty(&mut self, skill: Skill, specialty: bool) {
        let mut next = self.raw.clone();
        next.specialties.retain(|s| *s != skill);
        if specialty {
            next.specialties.push(skill);
        }
        self.update(next);
    }

    pub fn set_caps(&mut self, caps: i32) -> Result<(), CoreError> {
        if caps < 0 {
            return Err(CoreError::rejected(format!(
                "caps cannot be negative, got {caps}"
            )));
        }
        let mut next = self.raw.clone();
        next.caps = Some(caps);
        self.update(next);
        Ok(())
    }

    /// Clamped into `0..=max_hp`.
    pub fn set_current_hp(&mut self, hp: i32) {
        let mut next = self.raw.clone();
        next.current_hp = Some(hp.clamp(0, self.character.max_hp.max(0)));
        self.update(next);
    }

    /// Clamped into `0..=max_luck`.
    pub fn set_current_luck(&mut self, luck: i32) {
        let mut next = self.raw.clone();
        next.current_luck = Some(luck.clamp(0, self.character.max_luck.max(0)));
        self.update(next);
    }

    pub fn spend_luck(&mut self, points: i32) {
        self.set_current_luck(self.character.current_luck - points.max(0));
    }

    pub fn replenish_luck(&mut self) {
        self.set_current_luck(self.character.max_luck);
    }

    /// Back to a blank character.
    pub fn reset(&mut self) {
        self.raw = RawCharacter::default();
        self.recompute();
    }

    pub fn add_item(&mut self, item: CharacterItem) -> Result<(), CoreError> {
        self.database.require_item(&item.id)?;
        let items = inventory::add_item(&self.raw.items, item)?;
        self.update_items(items);
        Ok(())
    }

    pub fn toggle_equip(&mut self, id: &str) -> Result<(), CoreError> {
        let index = self.require_stack(id)?;
        let items = equipment::toggle_equip(&self.raw.items, index, self.origin(), &self.database)?;
        self.update_items(items);
        Ok(())
    }

    /// Sells from the first stack of `id`; returns the caps earned.
    pub fn sell_item(&mut self, id: &str, quantity: i32, unit_price: f64) -> Result<i32, CoreError> {
        let index = self.require_stack(id)?;
        let sale = inventory::sell_item(&self.raw.items, index, quantity, unit_price)?;
        let mut next = self.raw.clone();
        next.items = sale.items;
        next.caps = Some(self.character.caps.saturating_add(sale.caps_earned));
        self.update(next);
        Ok(sale.caps_earned)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<(), CoreError> {
        let index = self.require_stack(id)?;
        let items = inventory::delete_item(&self.raw.items, index)?;
        self.update_items(items);
        Ok(())
    }

    /// Fits `mod_id` to one unit of `id`, paying the mod's cost in caps.
    pub fn apply_mod(&mut self, id: &str, mod_id: &str) -> Result<(), CoreError> {
        let index = self.require_stack(id)?;
        let items = inventory::apply_mod(&self.raw.items, index, mod_id, &self.database)?;
        let cost = self.database.require_item(mod_id)?.cost.max(0);
        if cost > self.character.caps {
            return Err(CoreError::rejected(format!(
                "Not enough caps for {mod_id}: costs {cost}, have {}.",
                self.character.caps
            )));
        }
        let mut next = self.raw.clone();
        next.items = items;
        next.caps = Some(self.character.caps - cost);
        self.update(next);
        Ok(())
    }

    pub fn remove_mod(&mut self, id: &str, mod_id: &str) -> Result<(), CoreError> {
        let index = self.require_stack(id)?;
        let items = inventory::remove_mod(&self.raw.items, index, mod_id, &self.database)?;
        self.update_items(items);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, CoreError> {
        self.raw.to_json_pretty()
    }

    fn update_items(&mut self, items: Vec<CharacterItem>) {
        let mut next = self.raw.clone();
        next.items = items;
        self.update(next);
    }

    fn update(&mut self, mut next: RawCharacter) {
        let prev = &self.raw;
        let hp_inputs_changed = prev.level != next.level
            || prev.special.endurance != next.special.endurance
            || prev.special.luck != next.special.luck;
        if hp_inputs_changed {
            adjust_current_hp(prev, &mut next);
        }
        if prev.special.luck != next.special.luck {
            let max_luck = next.special_stats().luck;
            next.current_luck = next.current_luck.map(|luck| luck.clamp(0, max_luck));
        }
        if prev.origin != next.origin {
            apply_origin_change(prev.origin(), &mut next, &self.database);
        }
        self.raw = next;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.character = compute_character(&self.raw, &self.database);
        debug!(
            max_hp = self.character.max_hp,
            current_weight = self.character.current_weight,
            "character recomputed"
        );
    }
}

fn is_robot_part_id(id: &str) -> bool {
    ROBOT_PARTS.iter().any(|part| part.id() == id)
}

/// Moves equipment over to a new body plan.
fn apply_origin_change(previous: &Origin, next: &mut RawCharacter, db: &GameDatabase) {
    let origin = next.origin();
    if previous.needs_specialized_armor || origin.needs_specialized_armor {
        for owned in next.items.iter_mut().filter(|owned| owned.equipped) {
            let Some(apparel) = db.get_item(&owned.id).and_then(|item| item.as_apparel()) else {
                continue;
            };
            if apparel.is_robot_part() != origin.is_robot() {
                owned.equipped = false;
            }
        }
    }

    let owns_robot_parts = next.items.iter().any(|owned| is_robot_part_id(&owned.id));
    if origin.is_robot() {
        if owns_robot_parts {
            for owned in next.items.iter_mut().filter(|owned| is_robot_part_id(&owned.id)) {
                owned.equipped = true;
            }
        } else {
            next.items.extend(origin.body_parts.iter().map(|part| {
                CharacterItem::new(part.id(), 1)
                    .with_mods([DEFAULT_ROBOT_PLATING])
                    .equipped()
            }));
        }
    } else if owns_robot_parts {
        next.items.retain(|owned| !is_robot_part_id(&owned.id));
    }
    debug!(origin = ?origin.id, items = next.items.len(), "origin changed");
}
