use std::fmt::Write as _;

use pipboy_core::core_api::{InventoryEntry, Session, SkillEntry};
use pipboy_core::derived::{ActiveEffect, Character};
use pipboy_core::item::Resistance;
use pipboy_core::special::Special;
use serde_json::{Map as JsonMap, Value as JsonValue};
use strum::IntoEnumIterator;

const SHEET_WIDTH: usize = 76;
const TWO_COL_WIDTH_LEFT: usize = 34;
const TWO_COL_WIDTH_RIGHT: usize = 40;
const INVENTORY_NAME_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    PipBoy,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: bool,
    pub background: bool,
    pub origin: bool,
    pub level: bool,
    pub caps: bool,
    pub hp: bool,
    pub max_hp: bool,
    pub luck: bool,
    pub special: bool,
    pub derived_stats: bool,
    pub weight: bool,
    pub skills: bool,
    pub resistances: bool,
    pub effects: bool,
    pub inventory: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.name
            || self.background
            || self.origin
            || self.level
            || self.caps
            || self.hp
            || self.max_hp
            || self.luck
            || self.special
            || self.derived_stats
            || self.weight
            || self.skills
            || self.resistances
            || self.effects
            || self.inventory
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    match style {
        TextStyle::PipBoy => render_pipboy_sheet(session),
    }
}

/// `key=value` pairs for the selected fields, in canonical order. List
/// fields repeat their key once per entry.
pub fn render_field_pairs(session: &Session, fields: &FieldSelection) -> Vec<(&'static str, String)> {
    let character = session.character();
    let mut out = Vec::new();

    if fields.name {
        out.push(("name", character.name.clone().unwrap_or_default()));
    }
    if fields.background {
        out.push(("background", character.background.clone().unwrap_or_default()));
    }
    if fields.origin {
        out.push(("origin", origin_id(character).to_string()));
    }
    if fields.level {
        out.push(("level", character.level.to_string()));
    }
    if fields.caps {
        out.push(("caps", character.caps.to_string()));
    }
    if fields.hp {
        out.push(("hp", character.current_hp.to_string()));
    }
    if fields.max_hp {
        out.push(("max_hp", character.max_hp.to_string()));
    }
    if fields.luck {
        out.push(("luck", character.current_luck.to_string()));
        out.push(("max_luck", character.max_luck.to_string()));
    }
    if fields.special {
        for special in Special::iter() {
            out.push((
                "special",
                format!(
                    "{}={}",
                    special.display_name(),
                    character.special.get(special)
                ),
            ));
        }
    }
    if fields.derived_stats {
        out.push(("derived_stat", format!("Defense={}", character.defense)));
        out.push(("derived_stat", format!("Initiative={}", character.initiative)));
        out.push(("derived_stat", format!("Melee Damage={}", character.melee_damage)));
    }
    if fields.weight {
        out.push(("weight", format_weight(character.current_weight)));
        out.push(("max_weight", format_weight(character.max_weight)));
    }
    if fields.skills {
        for s in session.skills() {
            let tag = if s.specialty { " [Specialty]" } else { "" };
            out.push(("skill", format!("{}={}{}", s.skill.display_name(), s.rank, tag)));
        }
    }
    if fields.resistances {
        for (part, dr) in &character.locations_dr {
            out.push((
                "dr",
                format!(
                    "{}={}/{}/{}",
                    part.display_name(),
                    dr.physical,
                    dr.energy,
                    dr.radiation
                ),
            ));
        }
    }
    if fields.effects {
        for effect in &character.active_effects {
            out.push(("effect", format!("{}={}", effect.id, effect.count)));
        }
    }
    if fields.inventory {
        for item in session.inventory() {
            let equipped = if item.equipped { " [Equipped]" } else { "" };
            out.push((
                "inventory",
                format!("{}x {}{}", item.quantity, item.id, equipped),
            ));
        }
    }

    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let character = session.character();
    let mut out = JsonMap::new();

    if fields.name {
        out.insert("name".to_string(), optional_string(&character.name));
    }
    if fields.background {
        out.insert("background".to_string(), optional_string(&character.background));
    }
    if fields.origin {
        out.insert("origin".to_string(), origin_json(character));
    }
    if fields.level {
        out.insert("level".to_string(), JsonValue::from(character.level));
    }
    if fields.caps {
        out.insert("caps".to_string(), JsonValue::from(character.caps));
    }
    if fields.hp {
        out.insert("hp".to_string(), JsonValue::from(character.current_hp));
    }
    if fields.max_hp {
        out.insert("max_hp".to_string(), JsonValue::from(character.max_hp));
    }
    if fields.luck {
        out.insert("luck".to_string(), JsonValue::from(character.current_luck));
        out.insert("max_luck".to_string(), JsonValue::from(character.max_luck));
    }
    if fields.special {
        out.insert("special".to_string(), special_to_json(character));
    }
    if fields.derived_stats {
        out.insert("derived_stats".to_string(), derived_stats_to_json(character));
    }
    if fields.weight {
        out.insert("weight".to_string(), weight_to_json(character));
    }
    if fields.skills {
        out.insert("skills".to_string(), skills_to_json(&session.skills()));
    }
    if fields.resistances {
        out.insert("resistances".to_string(), resistances_to_json(character));
    }
    if fields.effects {
        out.insert("effects".to_string(), effects_to_json(&character.active_effects));
    }
    if fields.inventory {
        out.insert("inventory".to_string(), inventory_to_json(&session.inventory()));
    }

    out
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let all = FieldSelection {
        name: true,
        background: true,
        origin: true,
        level: true,
        caps: true,
        hp: true,
        max_hp: true,
        luck: true,
        special: true,
        derived_stats: true,
        weight: true,
        skills: true,
        resistances: true,
        effects: true,
        inventory: true,
    };
    selected_json(&all, session)
}

fn optional_string(value: &Option<String>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.clone()),
        None => JsonValue::Null,
    }
}

fn origin_id(character: &Character) -> &'static str {
    character.origin.id.map_or("none", |id| id.id())
}

fn origin_json(character: &Character) -> JsonValue {
    match character.origin.id {
        Some(id) => JsonValue::String(id.id().to_string()),
        None => JsonValue::Null,
    }
}

fn special_to_json(character: &Character) -> JsonValue {
    let mut m = JsonMap::new();
    for special in Special::iter() {
        m.insert(
            special.id().to_string(),
            JsonValue::from(character.special.get(special)),
        );
    }
    JsonValue::Object(m)
}

fn derived_stats_to_json(character: &Character) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("defense".to_string(), JsonValue::from(character.defense));
    m.insert("initiative".to_string(), JsonValue::from(character.initiative));
    m.insert("melee_damage".to_string(), JsonValue::from(character.melee_damage));
    JsonValue::Object(m)
}

fn weight_to_json(character: &Character) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("current".to_string(), JsonValue::from(character.current_weight));
    m.insert("max".to_string(), JsonValue::from(character.max_weight));
    JsonValue::Object(m)
}

fn skills_to_json(skills: &[SkillEntry]) -> JsonValue {
    JsonValue::Array(
        skills
            .iter()
            .map(|s| {
                let mut m = JsonMap::new();
                m.insert("name".to_string(), JsonValue::String(s.skill.id().to_string()));
                m.insert("special".to_string(), JsonValue::String(s.special.id().to_string()));
                m.insert("rank".to_string(), JsonValue::from(s.rank));
                m.insert("target".to_string(), JsonValue::from(s.target));
                m.insert("specialty".to_string(), JsonValue::Bool(s.specialty));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn resistance_to_json(value: Resistance) -> JsonValue {
    match value {
        Resistance::Value(v) => JsonValue::from(v),
        Resistance::Immune => JsonValue::String("Infinity".to_string()),
    }
}

fn resistances_to_json(character: &Character) -> JsonValue {
    JsonValue::Array(
        character
            .locations_dr
            .iter()
            .map(|(part, dr)| {
                let mut m = JsonMap::new();
                m.insert("location".to_string(), JsonValue::String(part.id().to_string()));
                m.insert("physical".to_string(), resistance_to_json(dr.physical));
                m.insert("energy".to_string(), resistance_to_json(dr.energy));
                m.insert("radiation".to_string(), resistance_to_json(dr.radiation));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn effects_to_json(effects: &[ActiveEffect]) -> JsonValue {
    JsonValue::Array(
        effects
            .iter()
            .map(|effect| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::String(effect.id.clone()));
                m.insert("count".to_string(), JsonValue::from(effect.count));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn inventory_to_json(items: &[InventoryEntry]) -> JsonValue {
    JsonValue::Array(
        items
            .iter()
            .map(|item| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::String(item.id.clone()));
                m.insert(
                    "type".to_string(),
                    match item.item_type {
                        Some(t) => JsonValue::String(t.id().to_string()),
                        None => JsonValue::Null,
                    },
                );
                m.insert("category".to_string(), optional_string(&item.category));
                m.insert("quantity".to_string(), JsonValue::from(item.quantity));
                m.insert("equipped".to_string(), JsonValue::Bool(item.equipped));
                if let Some(side) = item.variation {
                    m.insert("variation".to_string(), JsonValue::String(side.to_string()));
                }
                m.insert(
                    "mods".to_string(),
                    JsonValue::Array(item.mods.iter().cloned().map(JsonValue::String).collect()),
                );
                m.insert("weight".to_string(), JsonValue::from(item.unit_weight));
                m.insert("total_weight".to_string(), JsonValue::from(item.total_weight));
                m.insert("cost".to_string(), JsonValue::from(item.unit_cost));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_pipboy_sheet(session: &Session) -> String {
    let character = session.character();
    let mut out = String::new();

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("PIP-BOY 3000", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("CHARACTER RECORD", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    let name = character.name.as_deref().unwrap_or("Unnamed");
    let name_section = format!("  Name: {:<22}", fit_column(name, 22));
    let origin_section = format!("Origin: {:<22}", character.origin.display_name());
    writeln!(
        &mut out,
        "{}{}Level: {:02}",
        name_section, origin_section, character.level
    )
    .expect("writing to String cannot fail");
    if let Some(background) = character.background.as_deref() {
        writeln!(&mut out, "  Background: {background}").expect("writing to String cannot fail");
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    write_stat_block(&mut out, character);
    writeln!(&mut out).expect("writing to String cannot fail");

    write_skills_resistance_grid(&mut out, &session.skills(), character);
    writeln!(&mut out).expect("writing to String cannot fail");

    write_effects_section(&mut out, &character.active_effects);
    writeln!(&mut out).expect("writing to String cannot fail");

    write_inventory_section(&mut out, character, &session.inventory());
    writeln!(&mut out).expect("writing to String cannot fail");

    out
}

fn write_stat_block(out: &mut String, character: &Character) {
    let middle: [(&str, String); 7] = [
        (
            "Hit Points",
            format!("{:03}/{:03}", character.current_hp, character.max_hp),
        ),
        (
            "Luck Points",
            format!("{:02}/{:02}", character.current_luck, character.max_luck),
        ),
        ("Defense", format!("{}", character.defense)),
        ("Initiative", format!("{:02}", character.initiative)),
        ("Melee Damage", format!("+{}", character.melee_damage)),
        ("Rad. Immune", yes_no(character.origin.has_radiation_immunity)),
        ("Poison Immune", yes_no(character.origin.has_poison_immunity)),
    ];
    let right: [Option<(&str, String)>; 7] = [
        Some((
            "Carry Weight",
            format!(
                "{}/{} lbs.",
                format_weight(character.current_weight),
                format_weight(character.max_weight)
            ),
        )),
        Some(("Caps", format_number_with_commas(character.caps))),
        None,
        None,
        None,
        None,
        None,
    ];

    for (row, special) in Special::iter().enumerate() {
        let mut line = String::with_capacity(80);
        let label = special.display_name();
        line.push_str(&" ".repeat(15usize.saturating_sub(label.len())));
        line.push_str(label);
        line.push_str(": ");
        line.push_str(&format!("{:02}", character.special.get(special)));

        let (mid_label, mid_value) = &middle[row];
        let mid_start = 38usize.saturating_sub(mid_label.len());
        while line.len() < mid_start {
            line.push(' ');
        }
        line.push_str(mid_label);
        line.push_str(": ");
        line.push_str(mid_value);

        if let Some((right_label, right_value)) = &right[row] {
            let right_start = 62usize.saturating_sub(right_label.len());
            while line.len() < right_start {
                line.push(' ');
            }
            line.push_str(right_label);
            line.push_str(": ");
            line.push_str(right_value);
        }

        writeln!(out, "{line}").expect("writing to String cannot fail");
    }
}

fn write_skills_resistance_grid(out: &mut String, skills: &[SkillEntry], character: &Character) {
    writeln!(out, " ::: Skills :::                    ::: Damage Resistance :::")
        .expect("writing to String cannot fail");

    let skill_lines: Vec<String> = skills
        .iter()
        .map(|entry| {
            let tag = if entry.specialty { " *" } else { "" };
            format!(
                "{}: {} ({}){}",
                entry.skill.display_name(),
                entry.rank,
                entry.target,
                tag
            )
        })
        .collect();
    let mut dr_lines = vec!["(phys/energy/rad)".to_string()];
    dr_lines.extend(character.locations_dr.iter().map(|(part, dr)| {
        format!(
            "{}: {}/{}/{}",
            part.display_name(),
            dr.physical,
            dr.energy,
            dr.radiation
        )
    }));

    let row_count = skill_lines.len().max(dr_lines.len());
    for row in 0..row_count {
        let left = skill_lines.get(row).map(String::as_str).unwrap_or("");
        let right = dr_lines.get(row).map(String::as_str).unwrap_or("");
        let line = format!(
            " {:<a$}{:<b$}",
            fit_column(left, TWO_COL_WIDTH_LEFT),
            fit_column(right, TWO_COL_WIDTH_RIGHT),
            a = TWO_COL_WIDTH_LEFT,
            b = TWO_COL_WIDTH_RIGHT
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn write_effects_section(out: &mut String, effects: &[ActiveEffect]) {
    writeln!(out, " ::: Active Effects :::").expect("writing to String cannot fail");
    if effects.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }
    for effect in effects {
        writeln!(out, "  {} (\u{d7}{})", effect_label(&effect.id), effect.count)
            .expect("writing to String cannot fail");
    }
}

fn write_inventory_section(out: &mut String, character: &Character, items: &[InventoryEntry]) {
    writeln!(out, " ::: Inventory :::").expect("writing to String cannot fail");
    writeln!(out).expect("writing to String cannot fail");
    writeln!(
        out,
        "{:>52}",
        format!("Caps: {}", format_number_with_commas(character.caps))
    )
    .expect("writing to String cannot fail");
    writeln!(
        out,
        "{:>52}",
        format!(
            "Total Weight: {}/{} lbs.",
            format_weight(character.current_weight),
            format_weight(character.max_weight)
        )
    )
    .expect("writing to String cannot fail");
    writeln!(out).expect("writing to String cannot fail");

    if items.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }

    for item in items {
        let marker = if item.equipped { "[E]" } else { "   " };
        let weight = if item.is_known() {
            format!("{} lbs.", format_weight(item.total_weight))
        } else {
            "unknown item".to_string()
        };
        let line = format!(
            "  {} {:>4}x {:<w$} {}",
            marker,
            format_number_with_commas(item.quantity),
            fit_column(&item.id, INVENTORY_NAME_WIDTH),
            weight,
            w = INVENTORY_NAME_WIDTH
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
        if !item.mods.is_empty() {
            writeln!(out, "{:>11}+ {}", "", item.mods.join(", "))
                .expect("writing to String cannot fail");
        }
    }
}

fn effect_label(id: &str) -> &str {
    id.strip_prefix("effect")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(id)
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// Whole numbers print without decimals; fractions keep up to two places.
pub fn format_weight(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

fn format_number_with_commas(n: i32) -> String {
    if n < 0 {
        return format!("-{}", format_number_with_commas(n.saturating_neg()));
    }
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_drop_trailing_zeros() {
        assert_eq!(format_weight(19.0), "19");
        assert_eq!(format_weight(0.5), "0.5");
        assert_eq!(format_weight(2.25), "2.25");
        assert_eq!(format_weight(0.0), "0");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(fit_column("apparelVaultJumpsuit", 10), "apparel...");
        assert_eq!(fit_column("short", 10), "short");
    }

    #[test]
    fn numbers_group_thousands() {
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
        assert_eq!(format_number_with_commas(-1200), "-1,200");
        assert_eq!(format_number_with_commas(12), "12");
    }

    #[test]
    fn effect_labels_drop_the_prefix() {
        assert_eq!(effect_label("effectShadowed"), "Shadowed");
        assert_eq!(effect_label("effect"), "effect");
        assert_eq!(effect_label("qualityBlast"), "qualityBlast");
    }
}
