//! Normalized device state.

use serde::Serialize;

use crate::types::{Color, PowerMode};

/// One reported property, serialized as a single-key record.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum StateProperty {
    PowerState(PowerMode),
    Brightness(u8),
    Color(Color),
    ColorTem(u16),
}

/// State read back from a device, normalized across dialects.
///
/// An ordered list of the properties the device actually reported; anything
/// the device omitted (or masked with a zero sentinel) is simply absent.
/// Serializes to the agent-facing shape, e.g.
/// `[{"powerState":"on"},{"brightness":80}]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct DeviceState {
    properties: Vec<StateProperty>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, property: StateProperty) {
        self.properties.push(property);
    }

    /// The reported properties, in report order.
    pub fn properties(&self) -> &[StateProperty] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Get the reported power state.
    pub fn power_state(&self) -> Option<PowerMode> {
        self.properties.iter().find_map(|p| match p {
            StateProperty::PowerState(power) => Some(*power),
            _ => None,
        })
    }

    /// Get the reported brightness.
    pub fn brightness(&self) -> Option<u8> {
        self.properties.iter().find_map(|p| match p {
            StateProperty::Brightness(value) => Some(*value),
            _ => None,
        })
    }

    /// Get the reported RGB color.
    pub fn color(&self) -> Option<Color> {
        self.properties.iter().find_map(|p| match p {
            StateProperty::Color(color) => Some(*color),
            _ => None,
        })
    }

    /// Get the reported color temperature in Kelvin.
    pub fn color_tem(&self) -> Option<u16> {
        self.properties.iter().find_map(|p| match p {
            StateProperty::ColorTem(kelvin) => Some(*kelvin),
            _ => None,
        })
    }
}
