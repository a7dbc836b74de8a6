use std::fs;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use pipboy_core::character::CharacterItem;
use pipboy_core::core_api::{Engine, Session};
use pipboy_core::origin::OriginId;
use pipboy_core::special::{Skill, Special};
use pipboy_render::{
    FieldSelection, JsonStyle, TextStyle, render_field_pairs, render_json_full,
    render_json_selected, render_text,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_FILTER: &str = "pipboy=info,pipboy_core=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OriginArg(Option<OriginId>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct SkillEdit {
    skill: Skill,
    rank: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct SaleEdit {
    id: String,
    quantity: i32,
    price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModEdit {
    id: String,
    mod_id: String,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "CHARACTER.json")]
    path: PathBuf,
    /// Directory holding the item tables.
    #[arg(long, value_name = "DIR", env = "PIPBOY_DATA_DIR")]
    data: PathBuf,
    #[arg(long)]
    name: bool,
    #[arg(long)]
    background: bool,
    #[arg(long)]
    origin: bool,
    #[arg(long)]
    level: bool,
    #[arg(long)]
    caps: bool,
    #[arg(long)]
    hp: bool,
    #[arg(long = "max-hp")]
    max_hp: bool,
    #[arg(long)]
    luck: bool,
    #[arg(long)]
    special: bool,
    #[arg(long = "derived-stats")]
    derived_stats: bool,
    #[arg(long)]
    weight: bool,
    #[arg(long)]
    skills: bool,
    #[arg(long)]
    resistances: bool,
    #[arg(long)]
    effects: bool,
    #[arg(long)]
    inventory: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-name")]
    set_name: Option<String>,
    #[arg(long = "set-background")]
    set_background: Option<String>,
    #[arg(long = "set-origin", value_parser = parse_origin)]
    set_origin: Option<OriginArg>,
    #[arg(long = "set-level")]
    set_level: Option<i32>,
    #[arg(long = "set-strength")]
    set_strength: Option<i32>,
    #[arg(long = "set-perception")]
    set_perception: Option<i32>,
    #[arg(long = "set-endurance")]
    set_endurance: Option<i32>,
    #[arg(long = "set-charisma")]
    set_charisma: Option<i32>,
    #[arg(long = "set-intelligence")]
    set_intelligence: Option<i32>,
    #[arg(long = "set-agility")]
    set_agility: Option<i32>,
    #[arg(long = "set-luck")]
    set_luck: Option<i32>,
    #[arg(long = "set-skill", value_name = "SKILL=N", value_parser = parse_skill_edit)]
    set_skill: Vec<SkillEdit>,
    #[arg(long = "set-specialty", value_name = "SKILL", value_parser = parse_skill)]
    set_specialty: Vec<Skill>,
    #[arg(long = "clear-specialty", value_name = "SKILL", value_parser = parse_skill)]
    clear_specialty: Vec<Skill>,
    #[arg(long = "set-caps", allow_hyphen_values = true)]
    set_caps: Option<i32>,
    #[arg(long = "set-hp", allow_hyphen_values = true)]
    set_hp: Option<i32>,
    #[arg(long = "set-luck-points", allow_hyphen_values = true)]
    set_luck_points: Option<i32>,
    #[arg(long = "add-item", value_name = "ID")]
    add_item: Vec<String>,
    #[arg(long = "toggle-equip", value_name = "ID")]
    toggle_equip: Vec<String>,
    #[arg(long = "apply-mod", value_name = "ID=MOD", value_parser = parse_mod_edit)]
    apply_mod: Vec<ModEdit>,
    #[arg(long = "remove-mod", value_name = "ID=MOD", value_parser = parse_mod_edit)]
    remove_mod: Vec<ModEdit>,
    #[arg(long, value_name = "ID=QTY@PRICE", value_parser = parse_sale_edit)]
    sell: Vec<SaleEdit>,
    #[arg(long, value_name = "ID")]
    delete: Vec<String>,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn fields(&self) -> FieldSelection {
        FieldSelection {
            name: self.name,
            background: self.background,
            origin: self.origin,
            level: self.level,
            caps: self.caps,
            hp: self.hp,
            max_hp: self.max_hp,
            luck: self.luck,
            special: self.special,
            derived_stats: self.derived_stats,
            weight: self.weight,
            skills: self.skills,
            resistances: self.resistances,
            effects: self.effects,
            inventory: self.inventory,
        }
    }

    fn special_edits(&self) -> [(Special, Option<i32>); 7] {
        [
            (Special::Strength, self.set_strength),
            (Special::Perception, self.set_perception),
            (Special::Endurance, self.set_endurance),
            (Special::Charisma, self.set_charisma),
            (Special::Intelligence, self.set_intelligence),
            (Special::Agility, self.set_agility),
            (Special::Luck, self.set_luck),
        ]
    }

    fn has_edits(&self) -> bool {
        self.set_name.is_some()
            || self.set_background.is_some()
            || self.set_origin.is_some()
            || self.set_level.is_some()
            || self.special_edits().iter().any(|(_, v)| v.is_some())
            || !self.set_skill.is_empty()
            || !self.set_specialty.is_empty()
            || !self.clear_specialty.is_empty()
            || self.set_caps.is_some()
            || self.set_hp.is_some()
            || self.set_luck_points.is_some()
            || !self.add_item.is_empty()
            || !self.toggle_equip.is_empty()
            || !self.apply_mod.is_empty()
            || !self.remove_mod.is_empty()
            || !self.sell.is_empty()
            || !self.delete.is_empty()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let fields = cli.fields();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--set-* and inventory edit flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }

    let engine = Engine::load_data_dir(&cli.data).unwrap_or_else(|e| {
        eprintln!("Error loading game data from {}", cli.data.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let mut session = engine.open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing character file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    apply_edits(&cli, &mut session);

    if let Some(out_path) = cli.output.as_ref() {
        let json = session.export_json().unwrap_or_else(|e| {
            eprintln!("Error exporting character: {e}");
            process::exit(1);
        });
        fs::write(out_path, json).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        info!(path = %out_path.display(), "wrote edited character");
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_field_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote edited character to {}", out_path.display());
        return;
    }

    print!("{}", render_text(&session, TextStyle::PipBoy));
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fail_edit(what: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("Error applying {what} edit: {e}");
    process::exit(1);
}

/// Identity and stats first, then inventory, then the HP and luck pools so
/// they clamp against the final maxima.
fn apply_edits(cli: &Cli, session: &mut Session) {
    if let Some(name) = &cli.set_name {
        session.set_name(name.as_str());
    }
    if let Some(background) = &cli.set_background {
        session.set_background(background.as_str());
    }
    if let Some(OriginArg(origin)) = cli.set_origin {
        session.set_origin(origin);
    }
    if let Some(level) = cli.set_level {
        session
            .set_level(level)
            .unwrap_or_else(|e| fail_edit("level", e));
    }
    for (special, value) in cli.special_edits() {
        if let Some(v) = value {
            session
                .set_special(special, v)
                .unwrap_or_else(|e| fail_edit("SPECIAL", e));
        }
    }
    for edit in &cli.set_skill {
        session
            .set_skill(edit.skill, edit.rank)
            .unwrap_or_else(|e| fail_edit("skill", e));
    }
    for &skill in &cli.set_specialty {
        session.set_specialty(skill, true);
    }
    for &skill in &cli.clear_specialty {
        session.set_specialty(skill, false);
    }
    if let Some(caps) = cli.set_caps {
        session
            .set_caps(caps)
            .unwrap_or_else(|e| fail_edit("caps", e));
    }

    for id in &cli.add_item {
        session
            .add_item(CharacterItem::new(id.as_str(), 1))
            .unwrap_or_else(|e| fail_edit("add item", e));
    }
    for id in &cli.toggle_equip {
        session
            .toggle_equip(id)
            .unwrap_or_else(|e| fail_edit("equip", e));
    }
    for edit in &cli.apply_mod {
        session
            .apply_mod(&edit.id, &edit.mod_id)
            .unwrap_or_else(|e| fail_edit("mod", e));
    }
    for edit in &cli.remove_mod {
        session
            .remove_mod(&edit.id, &edit.mod_id)
            .unwrap_or_else(|e| fail_edit("mod removal", e));
    }
    for sale in &cli.sell {
        let earned = session
            .sell_item(&sale.id, sale.quantity, sale.price)
            .unwrap_or_else(|e| fail_edit("sale", e));
        debug!(id = %sale.id, quantity = sale.quantity, earned, "sold items");
    }
    for id in &cli.delete {
        session
            .delete_item(id)
            .unwrap_or_else(|e| fail_edit("delete", e));
    }

    if let Some(hp) = cli.set_hp {
        session.set_current_hp(hp);
    }
    if let Some(luck) = cli.set_luck_points {
        session.set_current_luck(luck);
    }
}

fn parse_origin(value: &str) -> Result<OriginArg, String> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(OriginArg(None));
    }
    OriginId::from_str(value)
        .map(|id| OriginArg(Some(id)))
        .map_err(|_| format!("unknown origin '{value}'"))
}

fn parse_skill(value: &str) -> Result<Skill, String> {
    Skill::from_str(value).map_err(|_| format!("unknown skill '{value}'"))
}

fn parse_skill_edit(value: &str) -> Result<SkillEdit, String> {
    let (skill, rank) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SKILL=N, got '{value}'"))?;
    let rank = rank
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid skill rank '{rank}': {e}"))?;
    Ok(SkillEdit {
        skill: parse_skill(skill.trim())?,
        rank,
    })
}

fn parse_mod_edit(value: &str) -> Result<ModEdit, String> {
    match value.split_once('=') {
        Some((id, mod_id)) if !id.is_empty() && !mod_id.is_empty() => Ok(ModEdit {
            id: id.to_string(),
            mod_id: mod_id.to_string(),
        }),
        _ => Err(format!("expected ID=MOD, got '{value}'")),
    }
}

fn parse_sale_edit(value: &str) -> Result<SaleEdit, String> {
    let (id, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=QTY@PRICE, got '{value}'"))?;
    let (quantity, price) = rest
        .split_once('@')
        .ok_or_else(|| format!("expected ID=QTY@PRICE, got '{value}'"))?;
    if id.is_empty() {
        return Err(format!("expected ID=QTY@PRICE, got '{value}'"));
    }
    Ok(SaleEdit {
        id: id.to_string(),
        quantity: quantity
            .parse::<i32>()
            .map_err(|e| format!("invalid quantity '{quantity}': {e}"))?,
        price: price
            .parse::<f64>()
            .map_err(|e| format!("invalid price '{price}': {e}"))?,
    })
}
