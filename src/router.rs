//! Backend selection behind the uniform command surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::cloud::developer::DeveloperBackend;
use crate::cloud::platform::PlatformBackend;
use crate::command::Command;
use crate::config::{CloudConfig, RouterConfig};
use crate::device::{DeviceInfo, Scene};
use crate::errors::Error;
use crate::lan::LanBackend;
use crate::state::DeviceState;

type Result<T> = std::result::Result<T, Error>;

/// The closed set of wire-protocol backends.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BackendName {
    Lan,
    Developer,
    Platform,
}

/// One instantiated wire-protocol backend.
///
/// All three speak the same abstract command vocabulary; the scene surface
/// only exists on the cloud dialects.
pub enum Backend {
    Lan(LanBackend),
    Developer(DeveloperBackend),
    Platform(PlatformBackend),
}

impl Backend {
    pub fn name(&self) -> BackendName {
        match self {
            Backend::Lan(_) => BackendName::Lan,
            Backend::Developer(_) => BackendName::Developer,
            Backend::Platform(_) => BackendName::Platform,
        }
    }

    /// List the devices this backend can reach.
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        match self {
            Backend::Lan(backend) => backend.list_devices().await,
            Backend::Developer(backend) => backend.list_devices().await,
            Backend::Platform(backend) => backend.list_devices().await,
        }
    }

    /// Read back the normalized state of one device.
    ///
    /// `model` is required by the cloud dialects and ignored on the LAN.
    pub async fn device_state(&self, device_id: &str, model: &str) -> Result<DeviceState> {
        match self {
            Backend::Lan(backend) => backend.device_state(device_id).await,
            Backend::Developer(backend) => backend.device_state(device_id, model).await,
            Backend::Platform(backend) => backend.device_state(device_id, model).await,
        }
    }

    /// Apply one abstract command to one device.
    pub async fn control(&self, device_id: &str, model: &str, command: &Command) -> Result<()> {
        match self {
            Backend::Lan(backend) => backend.control(device_id, command).await,
            Backend::Developer(backend) => backend.control(device_id, model, command).await,
            Backend::Platform(backend) => backend.control(device_id, model, command).await,
        }
    }

    /// List the preset scenes a device offers.
    ///
    /// Fails with [`Error::Unsupported`] on the LAN backend before any I/O.
    pub async fn list_scenes(&self, device_id: &str, model: &str) -> Result<Vec<Scene>> {
        match self {
            Backend::Lan(_) => Err(Error::unsupported(BackendName::Lan, "scene listing")),
            Backend::Developer(backend) => backend.list_scenes(device_id, model).await,
            Backend::Platform(backend) => backend.list_scenes(device_id, model).await,
        }
    }

    /// Activate a previously listed scene.
    ///
    /// Fails with [`Error::Unsupported`] on the LAN backend before any I/O.
    pub async fn activate_scene(&self, device_id: &str, model: &str, scene: &Scene) -> Result<()> {
        match self {
            Backend::Lan(_) => Err(Error::unsupported(BackendName::Lan, "scene activation")),
            Backend::Developer(backend) => backend.activate_scene(device_id, model, scene).await,
            Backend::Platform(backend) => backend.activate_scene(device_id, model, scene).await,
        }
    }
}

/// Resolves backend names to instances.
///
/// The mapping is built once from configuration and never changes; there is
/// no runtime enable/disable.
pub struct Router {
    backends: HashMap<BackendName, Backend>,
    default: BackendName,
}

impl Router {
    /// Build the routing table from configuration.
    pub fn new(config: RouterConfig) -> Result<Self> {
        let mut backends = HashMap::new();

        if let Some(lan) = config.lan {
            backends.insert(BackendName::Lan, Backend::Lan(LanBackend::new(lan)));
        }
        if let Some(cloud) = &config.developer {
            backends.insert(
                BackendName::Developer,
                Backend::Developer(match base_url(cloud) {
                    Some(url) => DeveloperBackend::with_base_url(url, &cloud.api_key)?,
                    None => DeveloperBackend::new(&cloud.api_key)?,
                }),
            );
        }
        if let Some(cloud) = &config.platform {
            backends.insert(
                BackendName::Platform,
                Backend::Platform(match base_url(cloud) {
                    Some(url) => PlatformBackend::with_base_url(url, &cloud.api_key)?,
                    None => PlatformBackend::new(&cloud.api_key)?,
                }),
            );
        }

        if !backends.contains_key(&config.default_backend) {
            return Err(Error::Config(format!(
                "default backend {} is not enabled",
                config.default_backend
            )));
        }

        Ok(Router {
            backends,
            default: config.default_backend,
        })
    }

    /// Resolve an optional explicit backend name against the default.
    pub fn resolve(&self, name: Option<BackendName>) -> Result<&Backend> {
        let name = name.unwrap_or(self.default);
        self.backends.get(&name).ok_or(Error::BackendDisabled(name))
    }

    pub fn default_backend(&self) -> BackendName {
        self.default
    }

    /// The enabled backend names, in no particular order.
    pub fn enabled(&self) -> impl Iterator<Item = BackendName> + '_ {
        self.backends.keys().copied()
    }
}

fn base_url(cloud: &CloudConfig) -> Option<&str> {
    cloud.base_url.as_deref()
}
