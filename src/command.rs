//! The abstract command vocabulary shared by every backend.

use serde_json::Value;

use crate::errors::Error;
use crate::types::{Brightness, Color, Kelvin, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// An abstract lighting command.
///
/// Every backend's capability translator is total over these four variants.
/// The wire names are `turn`, `brightness`, `color`, and `colorTem`.
///
/// # Examples
///
/// ```
/// use govee_lights_rs::{Command, PowerMode};
///
/// let command = Command::parse("turn", &serde_json::json!("on")).unwrap();
/// assert_eq!(command, Command::Turn(PowerMode::On));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Turn(PowerMode),
    Brightness(Brightness),
    Color(Color),
    ColorTem(Kelvin),
}

impl Command {
    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Turn(_) => "turn",
            Command::Brightness(_) => "brightness",
            Command::Color(_) => "color",
            Command::ColorTem(_) => "colorTem",
        }
    }

    /// Build a command from its wire name and a loosely typed value.
    ///
    /// An unrecognized name is the caller's error, never a silent no-op.
    pub fn parse(name: &str, value: &Value) -> Result<Command> {
        match name {
            "turn" => parse_power(value).map(Command::Turn).ok_or_else(|| {
                Error::invalid_value(name, "expected \"on\"/\"off\", a boolean, or 0/1")
            }),
            "brightness" => value
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .and_then(Brightness::create)
                .map(Command::Brightness)
                .ok_or_else(|| Error::invalid_value(name, "expected an integer between 0 and 100")),
            "color" => serde_json::from_value::<Color>(value.clone())
                .ok()
                .map(Command::Color)
                .ok_or_else(|| {
                    Error::invalid_value(name, "expected {r, g, b} with components 0-255")
                }),
            "colorTem" => value
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .and_then(Kelvin::create)
                .map(Command::ColorTem)
                .ok_or_else(|| {
                    Error::invalid_value(name, "expected an integer Kelvin between 2000 and 9000")
                }),
            other => Err(Error::UnknownCapability(other.to_string())),
        }
    }
}

fn parse_power(value: &Value) -> Option<PowerMode> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Bool(true) => Some(PowerMode::On),
        Value::Bool(false) => Some(PowerMode::Off),
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(PowerMode::from_on_off),
        _ => None,
    }
}
