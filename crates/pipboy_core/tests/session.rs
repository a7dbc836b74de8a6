use std::fs;
use std::path::PathBuf;

use pipboy_core::body::BodyPart;
use pipboy_core::character::{CharacterItem, RawCharacter};
use pipboy_core::core_api::{CoreErrorCode, Engine, Session};
use pipboy_core::derived::ActiveEffect;
use pipboy_core::item::Resistance;
use pipboy_core::origin::OriginId;
use pipboy_core::special::{Skill, Special};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn engine() -> Engine {
    Engine::load_data_dir(fixtures_dir().join("data")).expect("fixture database should load")
}

fn open(name: &str) -> Session {
    let path = fixtures_dir().join("characters").join(name);
    let bytes = fs::read(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e));
    engine()
        .open_bytes(&bytes)
        .unwrap_or_else(|e| panic!("failed to open {:?}: {}", path, e))
}

fn equipped_ids(session: &Session) -> Vec<&str> {
    session
        .raw()
        .items
        .iter()
        .filter(|item| item.equipped)
        .map(|item| item.id.as_str())
        .collect()
}

#[test]
fn wanderer_sheet_is_fully_derived() {
    let session = open("wanderer.json");
    let character = session.character();

    assert_eq!(character.name.as_deref(), Some("Wanderer"));
    assert_eq!(character.origin.id, Some(OriginId::VaultDweller));
    assert_eq!(character.level, 3);
    assert_eq!(character.caps, 120);
    assert_eq!(character.max_hp, 12);
    assert_eq!(character.current_hp, 8);
    assert_eq!(character.max_luck, 5);
    assert_eq!(character.current_luck, 3);
    assert_eq!(character.defense, 2);
    assert_eq!(character.initiative, 16);
    assert_eq!(character.melee_damage, 0);
    assert_eq!(character.max_weight, 115.0);
    assert_eq!(character.current_weight, 19.0);

    assert_eq!(character.skill(Skill::SmallGuns), 5);
    assert_eq!(character.skill(Skill::Sneak), 4);
    assert_eq!(character.skill(Skill::Lockpick), 1);
    assert_eq!(character.skill(Skill::Science), 0);
    assert_eq!(character.skill_target(Skill::SmallGuns), 14);

    let torso = character.locations_dr[&BodyPart::Torso];
    assert_eq!(torso.physical, Resistance::Value(3));
    assert_eq!(torso.energy, Resistance::Value(2));
    assert_eq!(torso.radiation, Resistance::Value(2));
    let left_arm = character.locations_dr[&BodyPart::LeftArm];
    assert_eq!(left_arm.physical, Resistance::Value(1));
    let right_arm = character.locations_dr[&BodyPart::RightArm];
    assert_eq!(right_arm.physical, Resistance::Value(0));
    assert_eq!(right_arm.radiation, Resistance::Value(2));
    assert_eq!(
        character.locations_dr[&BodyPart::Head].physical,
        Resistance::Value(0)
    );

    assert_eq!(
        character.active_effects,
        vec![ActiveEffect {
            id: "effectShadowed".to_string(),
            count: 1
        }]
    );
}

#[test]
fn skill_entries_carry_targets_and_specialties() {
    let session = open("wanderer.json");
    let skills = session.skills();
    assert_eq!(skills.len(), 17);
    let small_guns = skills
        .iter()
        .find(|entry| entry.skill == Skill::SmallGuns)
        .expect("small guns entry");
    assert_eq!(small_guns.special, Special::Agility);
    assert_eq!(small_guns.rank, 5);
    assert_eq!(small_guns.target, 14);
    assert!(small_guns.specialty);
}

#[test]
fn inventory_entries_use_modded_weight_and_cost() {
    let session = open("wanderer.json");
    let entries = session.inventory();
    assert_eq!(entries.len(), 8);

    let chest = &entries[3];
    assert_eq!(chest.id, "apparelLeatherChest");
    assert_eq!(chest.category.as_deref(), Some("leatherArmor"));
    assert_eq!(chest.unit_weight, 7.0);
    assert_eq!(chest.unit_cost, 48);

    let cola = &entries[7];
    assert_eq!(cola.total_weight, 2.0);
    assert!(entries.iter().all(|entry| entry.is_known()));
}

#[test]
fn hp_follows_level_and_endurance_changes() {
    let mut session = engine().new_session().expect("session");
    assert_eq!(session.character().max_hp, 10);
    assert_eq!(session.character().current_hp, 10);

    session.set_level(2).expect("level up");
    assert_eq!(session.character().max_hp, 11);
    assert_eq!(session.character().current_hp, 11);

    session.set_special(Special::Endurance, 3).expect("endurance");
    assert_eq!(session.character().max_hp, 9);
    assert_eq!(session.character().current_hp, 9);
}

#[test]
fn wounds_survive_a_level_up() {
    let mut session = open("wanderer.json");
    session.set_level(4).expect("level up");
    assert_eq!(session.character().max_hp, 13);
    assert_eq!(session.character().current_hp, 9);
}

#[test]
fn setters_reject_out_of_range_values() {
    let mut session = open("wanderer.json");
    let before = session.raw().clone();

    for err in [
        session.set_level(0).unwrap_err(),
        session.set_special(Special::Strength, 11).unwrap_err(),
        session.set_special(Special::Luck, 0).unwrap_err(),
        session.set_skill(Skill::Barter, 7).unwrap_err(),
        session.set_caps(-1).unwrap_err(),
    ] {
        assert_eq!(err.code, CoreErrorCode::InvalidMutation);
    }
    assert_eq!(session.raw(), &before);
}

#[test]
fn hp_and_luck_setters_clamp() {
    let mut session = open("wanderer.json");
    session.set_current_hp(99);
    assert_eq!(session.character().current_hp, 12);
    session.set_current_hp(-4);
    assert_eq!(session.character().current_hp, 0);

    session.spend_luck(2);
    assert_eq!(session.character().current_luck, 1);
    session.spend_luck(5);
    assert_eq!(session.character().current_luck, 0);
    session.replenish_luck();
    assert_eq!(session.character().current_luck, 5);
}

#[test]
fn lowering_luck_trims_spare_luck_points() {
    let mut session = open("wanderer.json");
    session.spend_luck(2);
    assert_eq!(session.raw().current_luck, Some(3));

    session.set_special(Special::Luck, 2).expect("lower luck");
    assert_eq!(session.raw().current_luck, Some(2));
    session.set_special(Special::Luck, 5).expect("raise luck");
    assert_eq!(session.raw().current_luck, Some(2));
    assert_eq!(session.character().current_luck, 2);
    assert_eq!(session.character().max_luck, 5);

    let exported: serde_json::Value =
        serde_json::from_str(&session.export_json().expect("export")).expect("json");
    assert_eq!(exported["currentLuck"], 2);
}

#[test]
fn specialties_toggle() {
    let mut session = open("wanderer.json");
    session.set_specialty(Skill::SmallGuns, false);
    assert_eq!(session.character().skill(Skill::SmallGuns), 3);
    session.set_specialty(Skill::Science, true);
    assert_eq!(session.character().skill(Skill::Science), 2);
}

#[test]
fn equipping_armour_displaces_same_layer_pieces() {
    let mut session = open("wanderer.json");
    session
        .add_item(CharacterItem::new("apparelCombatChest", 1))
        .expect("add combat chest");
    session.toggle_equip("apparelCombatChest").expect("equip");

    let equipped = equipped_ids(&session);
    assert!(equipped.contains(&"apparelCombatChest"));
    assert!(equipped.contains(&"apparelVaultJumpsuit"));
    assert!(!equipped.contains(&"apparelLeatherChest"));

    let torso = session.character().locations_dr[&BodyPart::Torso];
    assert_eq!(torso.physical, Resistance::Value(3));
    assert_eq!(torso.energy, Resistance::Value(3));
}

#[test]
fn outfits_displace_both_layers() {
    let mut session = open("wanderer.json");
    session
        .add_item(CharacterItem::new("apparelRaiderOutfit", 1))
        .expect("add outfit");
    session.toggle_equip("apparelRaiderOutfit").expect("equip");

    assert_eq!(
        equipped_ids(&session),
        vec!["apparelLeatherArm", "apparelRaiderOutfit"]
    );
    assert!(session.character().active_effects.is_empty());
}

#[test]
fn unequipping_is_a_plain_toggle() {
    let mut session = open("wanderer.json");
    session.toggle_equip("apparelLeatherChest").expect("unequip");
    assert_eq!(session.character().max_weight, 105.0);
    assert_eq!(
        session.character().locations_dr[&BodyPart::Torso].physical,
        Resistance::Value(0)
    );
}

#[test]
fn only_apparel_can_be_equipped() {
    let mut session = open("wanderer.json");
    let err = session.toggle_equip("weapon10mmPistol").unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidMutation);
    assert_eq!(err.message, "Cannot equip this item!");
}

#[test]
fn selling_moves_items_into_caps() {
    let mut session = open("wanderer.json");
    let earned = session.sell_item("ammo10mm", 10, 1.5).expect("sell");
    assert_eq!(earned, 15);
    assert_eq!(session.character().caps, 135);
    let ammo = session.find_item("ammo10mm").expect("ammo stack");
    assert_eq!(session.raw().items[ammo].quantity, 26);

    assert!(session.sell_item("ammo10mm", 0, 1.0).is_err());
    assert!(session.sell_item("ammo10mm", 27, 1.0).is_err());
    session.sell_item("ammo10mm", 26, 0.3).expect("sell the rest");
    assert_eq!(session.character().caps, 142);
    assert_eq!(session.find_item("ammo10mm"), None);
}

#[test]
fn deleting_drops_the_stack() {
    let mut session = open("wanderer.json");
    session.delete_item("foodNukaCola").expect("delete");
    assert_eq!(session.find_item("foodNukaCola"), None);
    assert_eq!(session.character().current_weight, 17.0);

    let err = session.delete_item("foodNukaCola").unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidMutation);
}

#[test]
fn weapon_mods_attach_and_detach() {
    let mut session = open("wanderer.json");
    session
        .apply_mod("weapon10mmPistol", "modHairTrigger")
        .expect("fit hair trigger");
    let index = session.find_item("weapon10mmPistol").expect("pistol");
    assert_eq!(
        session.raw().items[index].mods,
        vec!["modLongBarrel", "modHairTrigger"]
    );
    assert_eq!(session.inventory()[index].unit_cost, 85);

    assert!(session.apply_mod("weapon10mmPistol", "modShadowed").is_err());
    assert!(session.apply_mod("weapon10mmPistol", "modHairTrigger").is_err());

    session
        .remove_mod("weapon10mmPistol", "modLongBarrel")
        .expect("strip barrel");
    let index = session.find_item("weapon10mmPistol").expect("pistol");
    assert_eq!(session.raw().items[index].mods, vec!["modHairTrigger"]);
    assert!(session.remove_mod("weapon10mmPistol", "modLongBarrel").is_err());
}

#[test]
fn fitting_a_mod_costs_caps() {
    let mut session = open("wanderer.json");
    session
        .apply_mod("weapon10mmPistol", "modHairTrigger")
        .expect("fit hair trigger");
    assert_eq!(session.character().caps, 105);
    assert_eq!(session.raw().caps, Some(105));

    session.set_caps(14).expect("caps");
    session
        .remove_mod("weapon10mmPistol", "modHairTrigger")
        .expect("strip trigger");
    let before = session.raw().clone();
    let err = session
        .apply_mod("weapon10mmPistol", "modHairTrigger")
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidMutation);
    assert!(err.message.contains("Not enough caps"));
    assert_eq!(session.raw(), &before);

    session.set_caps(15).expect("caps");
    session
        .apply_mod("weapon10mmPistol", "modHairTrigger")
        .expect("fit with exact caps");
    assert_eq!(session.character().caps, 0);
}

#[test]
fn adding_unknown_items_fails() {
    let mut session = open("wanderer.json");
    let err = session
        .add_item(CharacterItem::new("weaponFatMan", 1))
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::ItemNotFound);
}

#[test]
fn robot_chassis_is_immune_and_locked_in() {
    let mut session = open("codsworth.json");
    let character = session.character();
    assert!(character.origin.is_robot());
    assert_eq!(character.max_weight, 75.0);
    assert_eq!(character.locations_dr.len(), 4);
    assert!(character
        .locations_dr
        .values()
        .all(|dr| dr.radiation == Resistance::Immune));
    assert_eq!(
        character.locations_dr[&BodyPart::RobotPartBody].physical,
        Resistance::Value(2)
    );

    for err in [
        session.toggle_equip("robotPartBody").unwrap_err(),
        session.sell_item("weaponUnarmedStrike", 1, 0.0).unwrap_err(),
        session.delete_item("robotPartArms").unwrap_err(),
    ] {
        assert_eq!(err.code, CoreErrorCode::InvalidMutation);
    }
}

#[test]
fn robot_plating_spreads_over_the_chassis() {
    let mut session = open("codsworth.json");
    let err = session
        .apply_mod("robotPartBody", "modRobotPlatingFactory")
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidMutation);

    session.set_caps(40).expect("caps");
    session
        .apply_mod("robotPartBody", "modRobotPlatingFactory")
        .expect("fit plating");
    assert_eq!(session.character().caps, 10);

    let parts: Vec<&CharacterItem> = session
        .raw()
        .items
        .iter()
        .filter(|item| item.id.starts_with("robotPart"))
        .collect();
    assert_eq!(parts.len(), 4);
    assert!(parts
        .iter()
        .all(|part| part.mods == vec!["modRobotPlatingFactory"]));
    assert_eq!(
        session.character().locations_dr[&BodyPart::RobotPartSensors].physical,
        Resistance::Value(2)
    );

    let err = session
        .remove_mod("robotPartBody", "modRobotPlatingFactory")
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidMutation);
}

#[test]
fn becoming_a_robot_swaps_equipment() {
    let mut session = open("wanderer.json");
    session.set_origin(Some(OriginId::MrHandy));

    let items = &session.raw().items;
    assert_eq!(items.len(), 12);
    for part in ["robotPartSensors", "robotPartBody", "robotPartArms", "robotPartThrusters"] {
        let index = session.find_item(part).expect("robot part added");
        assert!(items[index].equipped);
        assert_eq!(items[index].mods, vec!["modRobotPlatingStandard"]);
    }
    assert_eq!(equipped_ids(&session).len(), 4);
    assert_eq!(session.character().max_weight, 75.0);

    session.set_origin(Some(OriginId::VaultDweller));
    assert_eq!(session.raw().items.len(), 8);
    assert!(equipped_ids(&session).is_empty());
    assert_eq!(session.character().locations_dr.len(), 6);
}

#[test]
fn leaving_a_robot_origin_drops_the_chassis() {
    let mut session = open("codsworth.json");
    session.set_origin(Some(OriginId::Ghoul));
    assert_eq!(session.find_item("robotPartBody"), None);
    assert_eq!(session.raw().items.len(), 1);
}

#[test]
fn owned_robot_parts_are_reequipped_not_duplicated() {
    let raw = RawCharacter {
        items: vec![
            CharacterItem::new("robotPartBody", 1).with_mods(["modRobotPlatingFactory"]),
            CharacterItem::new("robotPartArms", 1).with_mods(["modRobotPlatingFactory"]),
        ],
        ..RawCharacter::default()
    };
    let mut session = engine().open_raw(raw).expect("session");
    session.set_origin(Some(OriginId::MrHandy));
    assert_eq!(session.raw().items.len(), 2);
    assert_eq!(equipped_ids(&session), vec!["robotPartBody", "robotPartArms"]);
}

#[test]
fn reset_restores_the_blank_character() {
    let mut session = open("wanderer.json");
    session.reset();
    assert_eq!(session.raw(), &Default::default());
    assert_eq!(session.character().max_hp, 10);
    assert!(session.character().items.is_empty());
}

#[test]
fn exported_json_reopens_to_the_same_character() {
    let mut session = open("wanderer.json");
    session.set_name("Lone Wanderer");
    session.sell_item("medsStimpak", 1, 25.0).expect("sell");

    let json = session.export_json().expect("export");
    let reopened = engine().open_bytes(json.as_bytes()).expect("reopen");
    assert_eq!(reopened.raw(), session.raw());
    assert_eq!(reopened.character(), session.character());
}

#[test]
fn missing_references_are_skipped() {
    let session = open("dangling_items.json");
    let character = session.character();
    assert_eq!(character.current_weight, 13.0);
    assert_eq!(
        character.locations_dr[&BodyPart::Head].physical,
        Resistance::Value(1)
    );
    let entries = session.inventory();
    assert!(!entries[1].is_known());
    assert_eq!(entries[1].total_weight, 0.0);
}

#[test]
fn malformed_records_fall_back_to_default() {
    let path = fixtures_dir().join("characters/unknown_origin.json");
    let bytes = fs::read(path).expect("fixture");

    let err = engine().open_bytes(&bytes).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Parse);

    let (session, err) = engine()
        .open_bytes_or_default(&bytes)
        .expect("database is loaded");
    assert_eq!(err.map(|e| e.code), Some(CoreErrorCode::Parse));
    assert_eq!(session.raw(), &Default::default());
}

#[test]
fn engine_without_database_refuses_work() {
    let engine = Engine::new();
    assert!(engine.database().is_none());
    let err = engine.open_bytes(b"{}").unwrap_err();
    assert_eq!(err.code, CoreErrorCode::DatabaseUninitialized);
    let err = engine.compute(&Default::default()).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::DatabaseUninitialized);
    assert!(engine.open_bytes_or_default(b"[]").is_err());
}
