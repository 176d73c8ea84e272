//! Caption tone requested from the narration service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationStyle {
    #[default]
    Comic,
    Epic,
    Grim,
}

impl NarrationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NarrationStyle::Comic => "comic",
            NarrationStyle::Epic => "epic",
            NarrationStyle::Grim => "grim",
        }
    }

    /// Tone instruction handed to the caption generator.
    pub fn tone(self) -> &'static str {
        match self {
            NarrationStyle::Comic => "light-hearted and slapstick, like a cartoon fight",
            NarrationStyle::Epic => "grand and heroic, like a saga being sung",
            NarrationStyle::Grim => "dark and gritty, every blow has weight",
        }
    }
}

impl fmt::Display for NarrationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NarrationStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comic" => Ok(NarrationStyle::Comic),
            "epic" => Ok(NarrationStyle::Epic),
            "grim" => Ok(NarrationStyle::Grim),
            other => Err(DomainError::parse(format!("Unknown narration style: {other}"))),
        }
    }
}
