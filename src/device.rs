//! Agent-facing device and scene descriptions.

use serde::Serialize;
use serde_json::Value;

/// A device as reported by `list_devices`, normalized across backends.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeviceInfo {
    pub id: String,
    pub model: String,
    #[serde(rename = "displayName")]
    pub name: Option<String>,
    pub controllable: bool,
    pub retrievable: bool,
    #[serde(rename = "supportedCommandNames")]
    pub supported_commands: Vec<String>,
}

/// A preset scene offered by a cloud backend.
///
/// `value` is the dialect's opaque activation token; it is passed back
/// verbatim when the scene is activated.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Scene {
    pub name: String,
    pub value: Value,
}
