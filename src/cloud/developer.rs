//! The classic cloud REST dialect (`developer-api.govee.com`).
//!
//! Commands travel as `{"name": ..., "value": ...}` pairs in their natural
//! JSON shapes; state reads back as an array of single-key property records.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::cloud::ApiClient;
use crate::command::Command;
use crate::device::{DeviceInfo, Scene};
use crate::errors::Error;
use crate::state::{DeviceState, StateProperty};
use crate::types::{Color, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// Production host for this dialect.
pub const BASE_URL: &str = "https://developer-api.govee.com";

/// Backend speaking the classic developer API.
pub struct DeveloperBackend {
    client: ApiClient,
}

impl DeveloperBackend {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(BASE_URL, api_key)
    }

    /// Point the dialect at a different host, e.g. a proxy.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(DeveloperBackend {
            client: ApiClient::new(base_url, api_key)?,
        })
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let resp = self.client.get("/v1/devices").await?;
        let data = unwrap_envelope(resp)?;

        let entries: Vec<DeviceEntry> =
            serde_json::from_value(data.get("devices").cloned().unwrap_or(Value::Array(vec![])))
                .map_err(Error::JsonLoad)?;
        Ok(entries.into_iter().map(DeviceEntry::into_info).collect())
    }

    pub async fn device_state(&self, device_id: &str, model: &str) -> Result<DeviceState> {
        let path = format!("/v1/devices/state?device={device_id}&model={model}");
        let resp = self.client.get(&path).await?;
        let data = unwrap_envelope(resp)?;

        let properties = data
            .get("properties")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(decode_state(&properties))
    }

    pub async fn control(&self, device_id: &str, model: &str, command: &Command) -> Result<()> {
        let (name, value) = encode_command(command);
        let body = json!({
            "device": device_id,
            "model": model,
            "cmd": {"name": name, "value": value},
        });
        self.client.put("/v1/devices/control", &body).await?;
        Ok(())
    }

    pub async fn list_scenes(&self, device_id: &str, model: &str) -> Result<Vec<Scene>> {
        let path = format!("/v1/devices/scenes?device={device_id}&model={model}");
        let resp = self.client.get(&path).await?;
        let data = unwrap_envelope(resp)?;

        let entries: Vec<SceneEntry> =
            serde_json::from_value(data.get("scenes").cloned().unwrap_or(Value::Array(vec![])))
                .map_err(Error::JsonLoad)?;
        Ok(entries
            .into_iter()
            .map(|entry| Scene {
                name: entry.name,
                value: entry.value,
            })
            .collect())
    }

    pub async fn activate_scene(&self, device_id: &str, model: &str, scene: &Scene) -> Result<()> {
        let body = json!({
            "device": device_id,
            "model": model,
            "cmd": {"name": "scene", "value": scene.value},
        });
        self.client.put("/v1/devices/control", &body).await?;
        Ok(())
    }
}

/// Translate an abstract command into this dialect's `{name, value}` pair.
pub(crate) fn encode_command(command: &Command) -> (&'static str, Value) {
    match command {
        Command::Turn(power) => ("turn", json!(power.as_str())),
        Command::Brightness(brightness) => ("brightness", json!(brightness.value())),
        Command::Color(color) => (
            "color",
            json!({"r": color.red(), "g": color.green(), "b": color.blue()}),
        ),
        Command::ColorTem(kelvin) => ("colorTem", json!(kelvin.kelvin())),
    }
}

/// One record of the `properties` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Property {
    Online(bool),
    PowerState(PowerMode),
    Brightness(u8),
    Color(Color),
    ColorTem(u16),
}

/// Decode the `properties` array; records matching no known shape are
/// skipped rather than failing the read.
pub(crate) fn decode_state(properties: &[Value]) -> DeviceState {
    let mut state = DeviceState::new();
    for record in properties {
        let Ok(property) = serde_json::from_value::<Property>(record.clone()) else {
            continue;
        };
        match property {
            // Connectivity, not a lighting property.
            Property::Online(_) => {}
            Property::PowerState(power) => state.push(StateProperty::PowerState(power)),
            Property::Brightness(value) => state.push(StateProperty::Brightness(value)),
            Property::Color(color) => state.push(StateProperty::Color(color)),
            Property::ColorTem(kelvin) => state.push(StateProperty::ColorTem(kelvin)),
        }
    }
    state
}

/// Unwrap the `{code, message, data}` envelope.
fn unwrap_envelope(resp: Value) -> Result<Value> {
    let code = resp.get("code").and_then(Value::as_i64).unwrap_or(200);
    if code != 200 {
        let message = resp
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(Error::Api {
            status: u16::try_from(code).unwrap_or(0),
            message,
        });
    }
    Ok(resp.get("data").cloned().unwrap_or(Value::Null))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceEntry {
    device: String,
    model: String,
    #[serde(default)]
    device_name: Option<String>,
    #[serde(default)]
    controllable: bool,
    #[serde(default)]
    retrievable: bool,
    #[serde(default)]
    support_cmds: Vec<String>,
}

impl DeviceEntry {
    fn into_info(self) -> DeviceInfo {
        DeviceInfo {
            id: self.device,
            model: self.model,
            name: self.device_name,
            controllable: self.controllable,
            retrievable: self.retrievable,
            supported_commands: self.support_cmds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SceneEntry {
    name: String,
    #[serde(default)]
    value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Brightness, Kelvin};
    use serde_json::json;

    #[test]
    fn encodes_commands_in_natural_shapes() {
        let (name, value) = encode_command(&Command::Turn(PowerMode::On));
        assert_eq!((name, value), ("turn", json!("on")));

        let (name, value) = encode_command(&Command::Brightness(Brightness::create(50).unwrap()));
        assert_eq!((name, value), ("brightness", json!(50)));

        let (name, value) = encode_command(&Command::Color(Color::rgb(255, 128, 0)));
        assert_eq!((name, value), ("color", json!({"r": 255, "g": 128, "b": 0})));

        let (name, value) = encode_command(&Command::ColorTem(Kelvin::create(7200).unwrap()));
        assert_eq!((name, value), ("colorTem", json!(7200)));
    }

    #[test]
    fn decodes_the_properties_array() {
        let properties = vec![
            json!({"online": true}),
            json!({"powerState": "on"}),
            json!({"brightness": 82}),
            json!({"color": {"r": 0, "g": 255, "b": 60}}),
        ];
        let state = decode_state(&properties);

        assert_eq!(state.power_state(), Some(PowerMode::On));
        assert_eq!(state.brightness(), Some(82));
        assert_eq!(state.color(), Some(Color::rgb(0, 255, 60)));
        assert_eq!(state.color_tem(), None);
        // `online` is connectivity, not state.
        assert_eq!(state.properties().len(), 3);
    }

    #[test]
    fn unknown_property_records_are_skipped() {
        let properties = vec![
            json!({"powerState": "off"}),
            json!({"fanSpeed": 3}),
            json!("not even an object"),
            json!({"colorTem": 5000}),
        ];
        let state = decode_state(&properties);

        assert_eq!(state.power_state(), Some(PowerMode::Off));
        assert_eq!(state.color_tem(), Some(5000));
        assert_eq!(state.properties().len(), 2);
    }

    #[test]
    fn envelope_errors_surface_as_api_errors() {
        let err =
            unwrap_envelope(json!({"code": 429, "message": "Too many requests"})).unwrap_err();
        assert!(matches!(err, Error::Api { status: 429, .. }));

        let data = unwrap_envelope(json!({"code": 200, "data": {"devices": []}})).unwrap();
        assert_eq!(data, json!({"devices": []}));
    }
}
