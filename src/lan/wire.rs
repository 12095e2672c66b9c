//! Wire codec for the LAN datagram envelope.
//!
//! Every datagram is one JSON object of the form
//! `{"msg": {"cmd": <string>, "data": <object>}}`. Inbound datagrams that
//! match no known shape are dropped by the caller, never treated as errors.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::state::{DeviceState, StateProperty};
use crate::types::{Color, PowerMode};

/// An outbound datagram.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct Request {
    msg: RequestMsg,
}

impl Request {
    /// The discovery broadcast.
    pub fn scan() -> Self {
        Request {
            msg: RequestMsg::Scan {
                account_topic: AccountTopic::Reserve,
            },
        }
    }

    /// The status query.
    pub fn status() -> Self {
        Request {
            msg: RequestMsg::DevStatus {},
        }
    }
}

impl From<&Command> for Request {
    /// Translate an abstract command into its LAN wire shape.
    fn from(command: &Command) -> Self {
        let msg = match command {
            Command::Turn(power) => RequestMsg::Turn {
                value: power.on_off(),
            },
            Command::Brightness(brightness) => RequestMsg::Brightness {
                value: brightness.value(),
            },
            // One colorwc datagram carries both fields; the half that does
            // not apply is a zero sentinel.
            Command::Color(color) => RequestMsg::Colorwc {
                color: *color,
                color_tem_in_kelvin: 0,
            },
            Command::ColorTem(kelvin) => RequestMsg::Colorwc {
                color: Color::new(),
                color_tem_in_kelvin: kelvin.kelvin(),
            },
        };
        Request { msg }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "camelCase")]
pub(crate) enum RequestMsg {
    Scan {
        account_topic: AccountTopic,
    },
    DevStatus {},
    Turn {
        value: u8,
    },
    Brightness {
        value: u8,
    },
    Colorwc {
        color: Color,
        #[serde(rename = "colorTemInKelvin")]
        color_tem_in_kelvin: u16,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AccountTopic {
    Reserve,
}

/// An inbound datagram that matched a known shape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "camelCase")]
pub(crate) enum Response {
    Scan(ScanData),
    DevStatus(StatusData),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ResponseEnvelope {
    msg: Response,
}

impl Response {
    /// Typed, fallible parse. `None` means "matches no known shape" and the
    /// datagram should be dropped.
    pub fn parse(datagram: &[u8]) -> Option<Self> {
        serde_json::from_slice::<ResponseEnvelope>(datagram)
            .ok()
            .map(|envelope| envelope.msg)
    }
}

/// Payload of a scan response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScanData {
    pub ip: Ipv4Addr,
    pub device: String,
    pub sku: String,
    #[serde(default)]
    pub ble_version_hard: Option<String>,
    #[serde(default)]
    pub ble_version_soft: Option<String>,
    #[serde(default)]
    pub wifi_version_hard: Option<String>,
    #[serde(default)]
    pub wifi_version_soft: Option<String>,
}

/// Payload of a devStatus response. Every field is optional; devices report
/// what they have.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusData {
    #[serde(default)]
    pub on_off: Option<u8>,
    #[serde(default)]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub color_tem_in_kelvin: Option<u16>,
}

impl StatusData {
    /// Translate reported fields into the normalized property list.
    ///
    /// Zero sentinels are dropped: a color temperature of 0 means "in color
    /// mode" and an all-zero color means "in temperature mode".
    pub fn into_state(self) -> DeviceState {
        let mut state = DeviceState::new();
        if let Some(on_off) = self.on_off
            && let Some(power) = PowerMode::from_on_off(on_off)
        {
            state.push(StateProperty::PowerState(power));
        }
        if let Some(brightness) = self.brightness {
            state.push(StateProperty::Brightness(brightness));
        }
        if let Some(color) = self.color
            && color != Color::new()
        {
            state.push(StateProperty::Color(color));
        }
        if let Some(kelvin) = self.color_tem_in_kelvin
            && kelvin != 0
        {
            state.push(StateProperty::ColorTem(kelvin));
        }
        state
    }
}
