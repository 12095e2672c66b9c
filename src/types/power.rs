//! Power state token.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Power state for a light.
///
/// The string forms are `"on"`/`"off"`; the wire forms on the numeric
/// dialects are `1`/`0`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl PowerMode {
    /// The `1`/`0` wire form.
    pub fn on_off(&self) -> u8 {
        match self {
            PowerMode::On => 1,
            PowerMode::Off => 0,
        }
    }

    /// Inverse of [`PowerMode::on_off`]; values other than 0 and 1 match no
    /// known state.
    pub fn from_on_off(value: u8) -> Option<Self> {
        match value {
            1 => Some(PowerMode::On),
            0 => Some(PowerMode::Off),
            _ => None,
        }
    }

    /// The `"on"`/`"off"` token.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerMode::On => "on",
            PowerMode::Off => "off",
        }
    }
}

impl FromStr for PowerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(PowerMode::On),
            "off" => Ok(PowerMode::Off),
            other => Err(format!("expected \"on\" or \"off\", got {other:?}")),
        }
    }
}
