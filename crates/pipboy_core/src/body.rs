//! Body locations covered by apparel, and how a piece's declared coverage
//! turns into concrete slots on a particular body.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

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
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BodyPart {
    Head,
    LeftArm,
    RightArm,
    Torso,
    LeftLeg,
    RightLeg,
    RobotPartSensors,
    RobotPartBody,
    RobotPartArms,
    RobotPartThrusters,
}

pub const HUMANOID_PARTS: [BodyPart; 6] = [
    BodyPart::Head,
    BodyPart::LeftArm,
    BodyPart::RightArm,
    BodyPart::Torso,
    BodyPart::LeftLeg,
    BodyPart::RightLeg,
];

pub const ROBOT_PARTS: [BodyPart; 4] = [
    BodyPart::RobotPartSensors,
    BodyPart::RobotPartBody,
    BodyPart::RobotPartArms,
    BodyPart::RobotPartThrusters,
];

impl BodyPart {
    pub fn id(&self) -> &'static str {
        self.into()
    }

    pub fn is_robot_part(&self) -> bool {
        ROBOT_PARTS.contains(self)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BodyPart::Head => "Head",
            BodyPart::LeftArm => "Left Arm",
            BodyPart::RightArm => "Right Arm",
            BodyPart::Torso => "Torso",
            BodyPart::LeftLeg => "Left Leg",
            BodyPart::RightLeg => "Right Leg",
            BodyPart::RobotPartSensors => "Sensors",
            BodyPart::RobotPartBody => "Body",
            BodyPart::RobotPartArms => "Arms",
            BodyPart::RobotPartThrusters => "Thrusters",
        }
    }
}

/// Left/right tag on an owned item that fits a symmetric slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

/// One entry of an apparel piece's `LOCATIONS_COVERED` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CoveredLocation {
    Part(BodyPart),
    /// `arm` / `arms`: either arm, chosen by the item's side.
    Arms,
    /// `leg` / `legs`.
    Legs,
}

impl CoveredLocation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "arm" | "arms" => Some(Self::Arms),
            "leg" | "legs" => Some(Self::Legs),
            other => other.parse::<BodyPart>().ok().map(Self::Part),
        }
    }

    /// Parses a coverage list. Unknown entries cover nothing and are dropped.
    pub fn parse_list<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
        raw.iter()
            .filter_map(|entry| Self::parse(entry.as_ref()))
            .collect()
    }

    fn expand(&self, side: Option<Side>) -> Vec<BodyPart> {
        match (self, side) {
            (Self::Arms, Some(Side::Left)) => vec![BodyPart::LeftArm],
            (Self::Arms, Some(Side::Right)) => vec![BodyPart::RightArm],
            (Self::Arms, None) => vec![BodyPart::LeftArm, BodyPart::RightArm],
            (Self::Legs, Some(Side::Left)) => vec![BodyPart::LeftLeg],
            (Self::Legs, Some(Side::Right)) => vec![BodyPart::RightLeg],
            (Self::Legs, None) => vec![BodyPart::LeftLeg, BodyPart::RightLeg],
            (Self::Part(part), _) => vec![*part],
        }
    }
}

/// Maps declared coverage onto concrete body parts.
///
/// Symmetric placeholders expand to both sides unless `side` picks one.
/// The result only contains parts present in `body_parts`, in coverage
/// order and without duplicates.
pub fn map_item_locations(
    covered: &[CoveredLocation],
    side: Option<Side>,
    body_parts: &[BodyPart],
) -> Vec<BodyPart> {
    let mut out = Vec::with_capacity(body_parts.len());
    for location in covered {
        for part in location.expand(side) {
            if body_parts.contains(&part) && !out.contains(&part) {
                out.push(part);
            }
        }
    }
    out
}

/// Clothing depth. Pieces may share a location only when one is worn under
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLayer {
    Under,
    Over,
    /// Occupies both layers, e.g. outfits and headgear.
    Both,
}

impl ItemLayer {
    pub fn conflicts_with(self, other: ItemLayer) -> bool {
        self == ItemLayer::Both || other == ItemLayer::Both || self == other
    }
}
