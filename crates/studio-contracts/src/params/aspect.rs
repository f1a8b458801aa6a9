use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "3:2")]
    Classic,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Story,
        AspectRatio::Landscape,
        AspectRatio::Classic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "4:5",
            AspectRatio::Story => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Classic => "3:2",
        }
    }

    /// Ratio code accepted by the image edit endpoint
    /// (`1:1`, `3:4`, `4:3`, `9:16`, `16:9`).
    pub fn image_code(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Story => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Classic => "4:3",
        }
    }

    /// The ratio the video endpoint will actually render. Only wide and tall
    /// are supported.
    pub fn video_ratio(self) -> AspectRatio {
        match self {
            AspectRatio::Portrait | AspectRatio::Story => AspectRatio::Story,
            AspectRatio::Square | AspectRatio::Landscape | AspectRatio::Classic => {
                AspectRatio::Landscape
            }
        }
    }

    pub fn video_code(self) -> &'static str {
        self.video_ratio().label()
    }

    pub fn composition_phrase(self) -> &'static str {
        match self {
            AspectRatio::Square => "square (1:1)",
            AspectRatio::Portrait => "portrait (4:5)",
            AspectRatio::Story => "vertical full screen (9:16)",
            AspectRatio::Landscape => "cinematic landscape (16:9)",
            AspectRatio::Classic => "commercial horizontal (3:2)",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let normalized = normalized.trim_start_matches("ratio_").replace(['_', 'x'], ":");
        let found = match normalized.as_str() {
            "square" => Some(AspectRatio::Square),
            "portrait" => Some(AspectRatio::Portrait),
            "story" | "vertical" => Some(AspectRatio::Story),
            "landscape" | "wide" => Some(AspectRatio::Landscape),
            "classic" => Some(AspectRatio::Classic),
            other => AspectRatio::ALL
                .into_iter()
                .find(|ratio| ratio.label() == other),
        };
        found.ok_or_else(|| UnknownOption {
            kind: "aspect ratio",
            value: raw.to_string(),
            expected: AspectRatio::ALL.map(AspectRatio::label).join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_codes_stay_within_supported_set() {
        let supported = ["1:1", "3:4", "9:16", "16:9", "4:3"];
        for ratio in AspectRatio::ALL {
            assert!(supported.contains(&ratio.image_code()), "{ratio}");
        }
        assert_eq!(AspectRatio::Portrait.image_code(), "3:4");
        assert_eq!(AspectRatio::Classic.image_code(), "4:3");
    }

    #[test]
    fn video_codes_snap_to_wide_or_tall() {
        for ratio in AspectRatio::ALL {
            assert!(matches!(ratio.video_code(), "16:9" | "9:16"), "{ratio}");
        }
        assert_eq!(AspectRatio::Square.video_code(), "16:9");
        assert_eq!(AspectRatio::Portrait.video_code(), "9:16");
        assert_eq!(AspectRatio::Classic.video_code(), "16:9");
        assert_eq!(AspectRatio::Story.video_code(), "9:16");
        assert_eq!(AspectRatio::Landscape.video_code(), "16:9");
    }

    #[test]
    fn parses_labels_keywords_and_legacy_keys() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!("ratio_4_5".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert_eq!("3x2".parse::<AspectRatio>().unwrap(), AspectRatio::Classic);
        assert_eq!("square".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        assert!("5:4".parse::<AspectRatio>().is_err());
    }
}
