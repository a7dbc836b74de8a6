//! The read-only game database: every item definition keyed by id.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::body::CoveredLocation;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::effect::ModEffect;
use crate::item::{
    Aid, AidCategory, AidKind, AmmoType, Apparel, ApparelCategory, DamageType, Item, ItemKind,
    ItemType, ModItem, OtherCategory, Range, Resistance, Weapon, WeaponCategory,
};
use crate::special::Skill;
use crate::table::{RowRef, Table};

/// Synthetic entries that exist for game mechanics only. They cannot be
/// sold, deleted or unequipped.
pub const UNACQUIRABLE_IDS: [&str; 10] = [
    "weaponUnarmedStrike",
    "weaponWeaponStock",
    "weaponWeaponStockOneHanded",
    "weaponBayonet",
    "weaponMissileLauncherBayonet",
    "weaponShredder",
    "robotPartSensors",
    "robotPartBody",
    "robotPartArms",
    "robotPartThrusters",
];

const TABLE_EXTENSION: &str = "csv";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDatabase {
    items: HashMap<String, Item>,
}

impl GameDatabase {
    pub fn builder() -> GameDatabaseBuilder {
        GameDatabaseBuilder::default()
    }

    /// Loads every table under `root/<type dir>/*.csv`, in file name order.
    pub fn load_from_dir(root: &Path) -> Result<Self, CoreError> {
        let mut builder = Self::builder();
        let mut tables = 0usize;

        for item_type in ItemType::iter() {
            let dir = root.join(item_type.data_dir());
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "no {} tables", item_type.id());
                continue;
            }
            for path in table_paths(&dir)? {
                let text = fs::read_to_string(&path).map_err(|e| {
                    CoreError::new(
                        CoreErrorCode::Io,
                        format!("failed to read {}: {e}", path.display()),
                    )
                })?;
                let source = path.display().to_string();
                builder.add_table(item_type, &source, &text)?;
                tables += 1;
            }
        }

        if tables == 0 {
            return Err(CoreError::new(
                CoreErrorCode::Io,
                format!(
                    "no item tables found under {}; expected weapon/, apparel/, aid/, mods/ or other/ directories of .csv files",
                    root.display()
                ),
            ));
        }

        let db = builder.build();
        info!(tables, items = db.len(), root = %root.display(), "game database loaded");
        Ok(db)
    }

    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn require_item(&self, id: &str) -> Result<&Item, CoreError> {
        self.get_item(id).ok_or_else(|| CoreError::item_not_found(id))
    }

    pub fn is_unacquirable(id: &str) -> bool {
        UNACQUIRABLE_IDS.contains(&id)
    }

    /// Item categories grouped by type, for browsing.
    pub fn item_type_map() -> Vec<(ItemType, &'static [&'static str])> {
        ItemType::iter()
            .map(|item_type| (item_type, item_type.categories()))
            .collect()
    }

    /// Items of one type, sorted by id.
    pub fn items_of_type(&self, item_type: ItemType) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .values()
            .filter(|item| item.item_type() == item_type)
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct GameDatabaseBuilder {
    items: HashMap<String, Item>,
    sources: BTreeMap<String, String>,
}

impl GameDatabaseBuilder {
    /// Parses one table of `item_type` rows and merges it in. An id that an
    /// earlier table already defined is rejected.
    pub fn add_table(
        &mut self,
        item_type: ItemType,
        source: &str,
        text: &str,
    ) -> Result<&mut Self, CoreError> {
        let table = Table::parse(source, text)?;
        let fallback_category = Path::new(source)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();

        for row in table.rows() {
            if row.text("ID").is_none() {
                debug!(source, line = row.line(), "row without ID skipped");
                continue;
            }
            let item = item_from_row(item_type, fallback_category, &row)?;
            self.insert(item, &format!("{source}:{}", row.line()))?;
        }
        debug!(source, rows = table.len(), "{} table merged", item_type.id());
        Ok(self)
    }

    pub fn add_item(&mut self, item: Item) -> Result<&mut Self, CoreError> {
        self.insert(item, "<inline>")?;
        Ok(self)
    }

    fn insert(&mut self, item: Item, origin: &str) -> Result<(), CoreError> {
        if let Some(previous) = self.sources.get(&item.id) {
            return Err(CoreError::new(
                CoreErrorCode::DuplicateItemId,
                format!("item id {} defined at {previous} and again at {origin}", item.id),
            ));
        }
        self.sources.insert(item.id.clone(), origin.to_string());
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    pub fn build(self) -> GameDatabase {
        GameDatabase { items: self.items }
    }
}

fn table_paths(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to read {}: {e}", dir.display()),
        )
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(TABLE_EXTENSION))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn item_from_row(
    item_type: ItemType,
    fallback_category: &str,
    row: &RowRef<'_>,
) -> Result<Item, CoreError> {
    let id = row.required_text("ID")?.to_string();
    let category = row.text("CATEGORY").unwrap_or(fallback_category);

    let kind = match item_type {
        ItemType::Weapon => ItemKind::Weapon(weapon_from_row(category, row)?),
        ItemType::Apparel => ItemKind::Apparel(apparel_from_row(category, row)?),
        ItemType::Aid => ItemKind::Aid(aid_from_row(category, row)?),
        ItemType::Mod => ItemKind::Mod(mod_from_row(&id, row)?),
        ItemType::Other => ItemKind::Other(parse_category::<OtherCategory>(category, row)?),
    };

    Ok(Item {
        id,
        weight: row.number("WEIGHT", 0.0)?,
        cost: row.number("COST", 0)?,
        rarity: row.number("RARITY", 0)?,
        kind,
    })
}

fn parse_category<T: std::str::FromStr>(category: &str, row: &RowRef<'_>) -> Result<T, CoreError> {
    category
        .parse()
        .map_err(|_| row.error("CATEGORY", &format!("unknown category {category:?}")))
}

fn weapon_from_row(category: &str, row: &RowRef<'_>) -> Result<Weapon, CoreError> {
    let category: WeaponCategory = parse_category(category, row)?;
    let damage_type = match row.text("DAMAGE_TYPE") {
        None => DamageType::Physical,
        Some(raw) => raw
            .parse()
            .map_err(|_| row.error("DAMAGE_TYPE", &format!("unknown damage type {raw:?}")))?,
    };
    let fire_rate = match row.text("FIRE_RATE") {
        None | Some("-") => None,
        Some(_) => Some(row.number("FIRE_RATE", 0)?),
    };
    let range = match row.text("RANGE") {
        None | Some("-") => None,
        Some(raw) => Some(
            raw.parse::<Range>()
                .map_err(|_| row.error("RANGE", &format!("unknown range {raw:?}")))?,
        ),
    };

    Ok(Weapon {
        category,
        damage_rating: row.number("DAMAGE_RATING", 0)?,
        damage_type,
        fire_rate,
        range,
        ammo: AmmoType::parse(row.raw("AMMO_TYPE")),
        qualities: row.list("QUALITIES")?,
        effects: row.list("EFFECTS")?,
        available_mods: row.list("AVAILABLE_MODS")?,
        ammo_consumption: None,
        allow_muzzle_mod: false,
        reroll_hit_location: false,
    })
}

fn resistance(row: &RowRef<'_>, column: &str) -> Result<Resistance, CoreError> {
    let raw = row.raw(column);
    Resistance::parse(raw)
        .ok_or_else(|| row.error(column, &format!("expected a number or Infinity, found {raw:?}")))
}

fn apparel_from_row(category: &str, row: &RowRef<'_>) -> Result<Apparel, CoreError> {
    let category: ApparelCategory = parse_category(category, row)?;
    let declared = row.list("LOCATIONS_COVERED")?;
    let locations_covered = CoveredLocation::parse_list(&declared);
    if locations_covered.len() != declared.len() {
        debug!(line = row.line(), ?declared, "unknown coverage entries dropped");
    }

    Ok(Apparel {
        category,
        physical_res: resistance(row, "PHYSICAL_RES")?,
        energy_res: resistance(row, "ENERGY_RES")?,
        radiation_res: resistance(row, "RADIATION_RES")?,
        melee_res: 0,
        explosive_res: 0,
        fall_damage_res: 0,
        carry_weight_bonus: row.number("CARRY_WEIGHT_BONUS", 0.0)?,
        unarmed_damage: 0,
        locations_covered,
        qualities: row.list("QUALITIES")?,
        effects: row.list("EFFECTS")?,
        available_mods: row.list("AVAILABLE_MODS")?,
    })
}

fn aid_from_row(category: &str, row: &RowRef<'_>) -> Result<Aid, CoreError> {
    let category: AidCategory = parse_category(category, row)?;
    let kind = match category {
        AidCategory::Food | AidCategory::Drinks => AidKind::Food {
            hp_gain: row.number("HP_GAIN", 0)?,
            radioactive: row.flag("RADIOACTIVE")?,
        },
        AidCategory::Meds => AidKind::Meds {
            duration: row.raw("DURATION").to_string(),
            addictive: row.flag("ADDICTIVE")?,
        },
    };
    Ok(Aid {
        category,
        effect: row.raw("EFFECT").to_string(),
        kind,
    })
}

fn mod_from_row(id: &str, row: &RowRef<'_>) -> Result<ModItem, CoreError> {
    let effects = row
        .list("EFFECTS")?
        .iter()
        .map(|raw| {
            let effect = ModEffect::parse(raw);
            if let ModEffect::Unrecognized(text) = &effect {
                warn!(mod_id = id, effect = %text, "unrecognized mod effect ignored");
            }
            effect
        })
        .collect();
    let skill = row.text("SKILL").and_then(|raw| {
        let parsed: Option<Skill> = raw.parse().ok();
        if parsed.is_none() {
            warn!(mod_id = id, skill = raw, "unknown mod skill ignored");
        }
        parsed
    });
    let slot_type = row
        .text("SLOT_TYPE")
        .or_else(|| row.text("DESCRIPTOR"))
        .unwrap_or_default()
        .to_string();

    Ok(ModItem {
        slot_type,
        skill,
        perks: row.list("PERKS")?,
        effects,
    })
}
