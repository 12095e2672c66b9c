//! The local-network backend: UDP multicast discovery plus datagram control.
//!
//! Discovery multicasts one scan request and collects unicast responses for
//! a fixed window; results are cached and concurrent discovery requests are
//! coalesced into a single scan. Control is best-effort: commands are
//! fire-and-forget datagrams and only status queries wait for a reply.

pub(crate) mod control;
mod discovery;
#[cfg(test)]
pub(crate) mod testutil;
pub(crate) mod wire;

pub use discovery::{Discovery, LanDevice};

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};

use crate::command::Command;
use crate::device::DeviceInfo;
use crate::errors::Error;
use crate::lan::wire::Request;
use crate::state::DeviceState;

type Result<T> = std::result::Result<T, Error>;

/// The multicast group Govee devices listen on.
pub const MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
/// Port the scan request is multicast to.
pub const DISCOVER_PORT: u16 = 4001;
/// Local port scan responses are addressed to.
pub const LISTEN_PORT: u16 = 4002;
/// Port devices accept control datagrams on.
pub const CONTROL_PORT: u16 = 4003;

/// Commands every LAN light accepts.
const SUPPORTED_COMMANDS: [&str; 4] = ["turn", "brightness", "color", "colorTem"];

/// Tunables for the LAN backend.
///
/// The defaults are the protocol constants; deployments normally leave them
/// untouched. Durations deserialize from milliseconds except `cache_ttl`,
/// which is in seconds.
#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanConfig {
    pub multicast_addr: Ipv4Addr,
    pub discover_port: u16,
    pub listen_port: u16,
    pub control_port: u16,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub scan_window: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub response_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub cache_ttl: Duration,
}

impl Default for LanConfig {
    fn default() -> Self {
        LanConfig {
            multicast_addr: MULTICAST_ADDR,
            discover_port: DISCOVER_PORT,
            listen_port: LISTEN_PORT,
            control_port: CONTROL_PORT,
            scan_window: Duration::from_millis(3000),
            response_timeout: Duration::from_millis(3000),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// The LAN backend behind the uniform command surface.
pub struct LanBackend {
    config: LanConfig,
    discovery: Discovery,
}

impl LanBackend {
    pub fn new(config: LanConfig) -> Self {
        let discovery = Discovery::new(config.clone());
        LanBackend { config, discovery }
    }

    /// The discovery component, e.g. for a direct [`Discovery::lookup`].
    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// List devices on the local segment, scanning if the cache is stale.
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let devices = self.discovery.discover().await?;
        Ok(devices.into_iter().map(device_info).collect())
    }

    /// Query the live state of a previously discovered device.
    pub async fn device_state(&self, device_id: &str) -> Result<DeviceState> {
        let device = self.find(device_id).await?;
        control::query_state(&self.config, &device).await
    }

    /// Fire one control datagram at a previously discovered device.
    pub async fn control(&self, device_id: &str, command: &Command) -> Result<()> {
        let device = self.find(device_id).await?;
        control::send_command(&self.config, &device, &Request::from(command)).await
    }

    async fn find(&self, device_id: &str) -> Result<LanDevice> {
        self.discovery
            .lookup(device_id)
            .await
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))
    }
}

fn device_info(device: LanDevice) -> DeviceInfo {
    DeviceInfo {
        id: device.device_id,
        model: device.sku,
        name: None,
        controllable: true,
        retrievable: true,
        supported_commands: SUPPORTED_COMMANDS.iter().map(|s| s.to_string()).collect(),
    }
}
