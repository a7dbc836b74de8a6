use serde::Serialize;

use crate::body::Side;
use crate::item::ItemType;
use crate::special::{Skill, Special};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub skill: Skill,
    pub special: Special,
    /// Effective rank.
    pub rank: i32,
    pub target: i32,
    pub specialty: bool,
}

/// One inventory stack with its mods folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub index: usize,
    pub id: String,
    /// `None` when the id is not in the game database.
    pub item_type: Option<ItemType>,
    pub category: Option<String>,
    pub quantity: i32,
    pub equipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<Side>,
    pub mods: Vec<String>,
    pub unit_weight: f64,
    pub total_weight: f64,
    pub unit_cost: i32,
}

impl InventoryEntry {
    pub fn is_known(&self) -> bool {
        self.item_type.is_some()
    }
}
