use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display aspect ratio of a single carousel slide.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    /// Converts the enum variant to the ratio string stored on post records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1:1" | "square" => Ok(Self::Square),
            "16:9" | "wide" => Ok(Self::Wide),
            "9:16" | "tall" => Ok(Self::Tall),
            other => Err(format!("unknown aspect ratio: {other}")),
        }
    }
}
