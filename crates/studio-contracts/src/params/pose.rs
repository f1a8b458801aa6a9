use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Original,
    StandingFront,
    Contrapposto,
    Walking,
    HandOnHip,
    CrossedLegs,
    SittingCasual,
    ShoulderTurn,
    ThreeQuarter,
}

impl Pose {
    pub const ALL: [Pose; 9] = [
        Pose::Original,
        Pose::StandingFront,
        Pose::Contrapposto,
        Pose::Walking,
        Pose::HandOnHip,
        Pose::CrossedLegs,
        Pose::SittingCasual,
        Pose::ShoulderTurn,
        Pose::ThreeQuarter,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Pose::Original => "original",
            Pose::StandingFront => "standing-front",
            Pose::Contrapposto => "contrapposto",
            Pose::Walking => "walking",
            Pose::HandOnHip => "hand-on-hip",
            Pose::CrossedLegs => "crossed-legs",
            Pose::SittingCasual => "sitting-casual",
            Pose::ShoulderTurn => "shoulder-turn",
            Pose::ThreeQuarter => "three-quarter",
        }
    }

    /// Instruction fragment for the pose change clause. `Original` keeps the
    /// source pose and has no fragment.
    pub fn instruction(self) -> Option<&'static str> {
        let text = match self {
            Pose::Original => return None,
            Pose::StandingFront => "standing straight facing the camera",
            Pose::Contrapposto => {
                "standing with weight on one leg, body forming a natural curve (contrapposto)"
            }
            Pose::Walking => "walking or mid-step, dynamic movement",
            Pose::HandOnHip => "standing with hand on hip, accentuating the silhouette",
            Pose::CrossedLegs => "position with crossed legs, casual and stylish",
            Pose::SittingCasual => "sitting naturally, body slightly leaning",
            Pose::ShoulderTurn => "shoulders turned, head slightly turned to camera",
            Pose::ThreeQuarter => "body at a three-quarter angle to show dimensionality",
        };
        Some(text)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Pose {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("pose_")
            .replace('_', "-");
        Pose::ALL
            .into_iter()
            .find(|pose| pose.key() == normalized)
            .ok_or_else(|| UnknownOption {
                kind: "pose",
                value: raw.to_string(),
                expected: Pose::ALL.map(Pose::key).join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_original_has_no_instruction() {
        for pose in Pose::ALL {
            assert_eq!(pose.instruction().is_none(), pose == Pose::Original);
        }
    }

    #[test]
    fn parses_cli_and_legacy_keys() {
        assert_eq!("walking".parse::<Pose>().unwrap(), Pose::Walking);
        assert_eq!("pose_hand_on_hip".parse::<Pose>().unwrap(), Pose::HandOnHip);
        assert_eq!(" Three-Quarter ".parse::<Pose>().unwrap(), Pose::ThreeQuarter);
        let err = "cartwheel".parse::<Pose>().unwrap_err();
        assert!(err.to_string().contains("standing-front"));
    }
}
