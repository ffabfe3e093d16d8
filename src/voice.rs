use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The prebuilt synthetic voices the speech model offers. The pipeline
/// treats the selection as opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceName {
    #[default]
    Kore,
    Puck,
    Charon,
    Fenrir,
    Zephyr,
}

impl VoiceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceName::Kore => "Kore",
            VoiceName::Puck => "Puck",
            VoiceName::Charon => "Charon",
            VoiceName::Fenrir => "Fenrir",
            VoiceName::Zephyr => "Zephyr",
        }
    }
}

impl FromStr for VoiceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kore" => Ok(VoiceName::Kore),
            "Puck" => Ok(VoiceName::Puck),
            "Charon" => Ok(VoiceName::Charon),
            "Fenrir" => Ok(VoiceName::Fenrir),
            "Zephyr" => Ok(VoiceName::Zephyr),
            other => Err(format!("unknown voice: {}", other)),
        }
    }
}
