//! The typed cloud REST dialect (`openapi.api.govee.com`).
//!
//! Everything is expressed as capability instances: a power switch carries
//! 1/0, brightness is a range, and colors travel as one packed integer
//! `(r<<16)|(g<<8)|b`. Control and state requests carry a fresh UUID
//! request id.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::cloud::ApiClient;
use crate::command::Command;
use crate::device::{DeviceInfo, Scene};
use crate::errors::Error;
use crate::state::{DeviceState, StateProperty};
use crate::types::{Color, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// Production host for this dialect.
pub const BASE_URL: &str = "https://openapi.api.govee.com";

const ON_OFF: &str = "devices.capabilities.on_off";
const RANGE: &str = "devices.capabilities.range";
const COLOR_SETTING: &str = "devices.capabilities.color_setting";
const DYNAMIC_SCENE: &str = "devices.capabilities.dynamic_scene";

/// Backend speaking the typed platform API.
pub struct PlatformBackend {
    client: ApiClient,
}

impl PlatformBackend {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(BASE_URL, api_key)
    }

    /// Point the dialect at a different host, e.g. a proxy.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(PlatformBackend {
            client: ApiClient::new(base_url, api_key)?,
        })
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let resp = self.client.get("/router/api/v1/user/devices").await?;
        ensure_success(&resp)?;

        let entries: Vec<DeviceEntry> =
            serde_json::from_value(resp.get("data").cloned().unwrap_or(Value::Array(vec![])))
                .map_err(Error::JsonLoad)?;
        Ok(entries.into_iter().map(DeviceEntry::into_info).collect())
    }

    pub async fn device_state(&self, device_id: &str, sku: &str) -> Result<DeviceState> {
        let body = json!({
            "requestId": Uuid::new_v4().to_string(),
            "payload": {"sku": sku, "device": device_id},
        });
        let resp = self.client.post("/router/api/v1/device/state", &body).await?;
        ensure_success(&resp)?;

        let capabilities = resp
            .pointer("/payload/capabilities")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(decode_state(&capabilities))
    }

    pub async fn control(&self, device_id: &str, sku: &str, command: &Command) -> Result<()> {
        self.send_capability(device_id, sku, &encode_command(command))
            .await
    }

    pub async fn list_scenes(&self, device_id: &str, sku: &str) -> Result<Vec<Scene>> {
        let body = json!({
            "requestId": Uuid::new_v4().to_string(),
            "payload": {"sku": sku, "device": device_id},
        });
        let resp = self.client.post("/router/api/v1/device/scenes", &body).await?;
        ensure_success(&resp)?;

        let options = resp
            .pointer("/payload/capabilities/0/parameters/options")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut scenes = Vec::new();
        for option in options {
            let Ok(entry) = serde_json::from_value::<SceneOption>(option) else {
                continue;
            };
            scenes.push(Scene {
                name: entry.name,
                value: entry.value,
            });
        }
        Ok(scenes)
    }

    pub async fn activate_scene(&self, device_id: &str, sku: &str, scene: &Scene) -> Result<()> {
        let capability = Capability {
            kind: DYNAMIC_SCENE,
            instance: "lightScene",
            value: scene.value.clone(),
        };
        self.send_capability(device_id, sku, &capability).await
    }

    async fn send_capability(
        &self,
        device_id: &str,
        sku: &str,
        capability: &Capability,
    ) -> Result<()> {
        let body = json!({
            "requestId": Uuid::new_v4().to_string(),
            "payload": {"sku": sku, "device": device_id, "capability": capability},
        });
        let resp = self
            .client
            .post("/router/api/v1/device/control", &body)
            .await?;
        ensure_success(&resp)?;
        Ok(())
    }
}

/// A capability write in the typed dialect.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct Capability {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub instance: &'static str,
    pub value: Value,
}

/// Translate an abstract command into its capability instance.
pub(crate) fn encode_command(command: &Command) -> Capability {
    match command {
        Command::Turn(power) => Capability {
            kind: ON_OFF,
            instance: "powerSwitch",
            value: json!(power.on_off()),
        },
        Command::Brightness(brightness) => Capability {
            kind: RANGE,
            instance: "brightness",
            value: json!(brightness.value()),
        },
        Command::Color(color) => Capability {
            kind: COLOR_SETTING,
            instance: "colorRgb",
            value: json!(color.packed()),
        },
        Command::ColorTem(kelvin) => Capability {
            kind: COLOR_SETTING,
            instance: "colorTemperatureK",
            value: json!(kelvin.kelvin()),
        },
    }
}

#[derive(Debug, Deserialize)]
struct CapabilityState {
    instance: String,
    state: CapabilityValue,
}

#[derive(Debug, Deserialize)]
struct CapabilityValue {
    #[serde(default)]
    value: Value,
}

/// Decode a state snapshot; instances matching no known shape are skipped.
pub(crate) fn decode_state(capabilities: &[Value]) -> DeviceState {
    let mut state = DeviceState::new();
    for entry in capabilities {
        let Ok(capability) = serde_json::from_value::<CapabilityState>(entry.clone()) else {
            continue;
        };
        let value = &capability.state.value;
        match capability.instance.as_str() {
            "powerSwitch" => {
                if let Some(v) = value.as_u64().and_then(|v| u8::try_from(v).ok())
                    && let Some(power) = PowerMode::from_on_off(v)
                {
                    state.push(StateProperty::PowerState(power));
                }
            }
            "brightness" => {
                if let Some(v) = value.as_u64().and_then(|v| u8::try_from(v).ok())
                    && v <= 100
                {
                    state.push(StateProperty::Brightness(v));
                }
            }
            "colorRgb" => {
                if let Some(v) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    state.push(StateProperty::Color(Color::from_packed(v)));
                }
            }
            "colorTemperatureK" => {
                if let Some(v) = value.as_u64().and_then(|v| u16::try_from(v).ok())
                    && v != 0
                {
                    state.push(StateProperty::ColorTem(v));
                }
            }
            _ => {}
        }
    }
    state
}

/// Envelope check for responses that are 200 at the HTTP layer but carry an
/// application-level error code.
fn ensure_success(resp: &Value) -> Result<()> {
    let code = resp.get("code").and_then(Value::as_i64).unwrap_or(200);
    if code != 200 {
        let message = resp
            .get("message")
            .or_else(|| resp.get("msg"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(Error::Api {
            status: u16::try_from(code).unwrap_or(0),
            message,
        });
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceEntry {
    device: String,
    sku: String,
    #[serde(default)]
    device_name: Option<String>,
    #[serde(default)]
    capabilities: Vec<CapabilityDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CapabilityDescriptor {
    #[serde(default)]
    instance: String,
}

impl DeviceEntry {
    fn into_info(self) -> DeviceInfo {
        let supported: Vec<String> = self
            .capabilities
            .iter()
            .filter_map(|capability| match capability.instance.as_str() {
                "powerSwitch" => Some("turn"),
                "brightness" => Some("brightness"),
                "colorRgb" => Some("color"),
                "colorTemperatureK" => Some("colorTem"),
                _ => None,
            })
            .map(String::from)
            .collect();

        DeviceInfo {
            id: self.device,
            model: self.sku,
            name: self.device_name,
            controllable: !supported.is_empty(),
            retrievable: true,
            supported_commands: supported,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SceneOption {
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
    fn encodes_the_four_capability_instances() {
        let cases = [
            (
                Command::Turn(PowerMode::On),
                json!({"type": ON_OFF, "instance": "powerSwitch", "value": 1}),
            ),
            (
                Command::Turn(PowerMode::Off),
                json!({"type": ON_OFF, "instance": "powerSwitch", "value": 0}),
            ),
            (
                Command::Brightness(Brightness::create(75).unwrap()),
                json!({"type": RANGE, "instance": "brightness", "value": 75}),
            ),
            (
                Command::Color(Color::rgb(255, 128, 0)),
                json!({"type": COLOR_SETTING, "instance": "colorRgb", "value": 16744448}),
            ),
            (
                Command::ColorTem(Kelvin::create(6500).unwrap()),
                json!({"type": COLOR_SETTING, "instance": "colorTemperatureK", "value": 6500}),
            ),
        ];

        for (command, expected) in cases {
            let encoded = serde_json::to_value(encode_command(&command)).unwrap();
            assert_eq!(encoded, expected, "capability for {}", command.name());
        }
    }

    #[test]
    fn decodes_a_state_snapshot() {
        let capabilities = vec![
            json!({"type": ON_OFF, "instance": "powerSwitch", "state": {"value": 1}}),
            json!({"type": RANGE, "instance": "brightness", "state": {"value": 60}}),
            json!({"type": COLOR_SETTING, "instance": "colorRgb", "state": {"value": 16744448}}),
            json!({"type": "devices.capabilities.mode", "instance": "gradientToggle", "state": {"value": 1}}),
        ];
        let state = decode_state(&capabilities);

        assert_eq!(state.power_state(), Some(PowerMode::On));
        assert_eq!(state.brightness(), Some(60));
        // The packed integer decomposes to the original triple.
        assert_eq!(state.color(), Some(Color::rgb(255, 128, 0)));
        assert_eq!(state.color_tem(), None);
        assert_eq!(state.properties().len(), 3);
    }

    #[test]
    fn empty_values_are_skipped() {
        let capabilities = vec![
            json!({"type": ON_OFF, "instance": "powerSwitch", "state": {}}),
            json!({"type": COLOR_SETTING, "instance": "colorTemperatureK", "state": {"value": 0}}),
        ];
        assert!(decode_state(&capabilities).is_empty());
    }

    #[test]
    fn device_entries_map_instances_to_command_names() {
        let entry: DeviceEntry = serde_json::from_value(json!({
            "device": "AA:BB:CC:DD:EE:FF",
            "sku": "H6160",
            "deviceName": "Desk strip",
            "capabilities": [
                {"type": ON_OFF, "instance": "powerSwitch"},
                {"type": RANGE, "instance": "brightness"},
                {"type": COLOR_SETTING, "instance": "colorRgb"},
                {"type": "devices.capabilities.music_setting", "instance": "musicMode"},
            ],
        }))
        .unwrap();

        let info = entry.into_info();
        assert_eq!(info.id, "AA:BB:CC:DD:EE:FF");
        assert_eq!(info.model, "H6160");
        assert_eq!(info.name.as_deref(), Some("Desk strip"));
        assert!(info.controllable);
        assert_eq!(info.supported_commands, vec!["turn", "brightness", "color"]);
    }

    #[test]
    fn application_level_errors_surface_as_api_errors() {
        let err = ensure_success(&json!({"code": 401, "msg": "unauthorized"})).unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
        assert!(ensure_success(&json!({"code": 200, "msg": "success"})).is_ok());
    }
}
