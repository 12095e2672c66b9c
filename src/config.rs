//! Construction-time configuration for the router and its backends.
//!
//! How these values get populated (environment, files, flags) is the host
//! application's concern; the structs only define the shape.

use serde::Deserialize;

use crate::lan::LanConfig;
use crate::router::BackendName;

/// Credentials and host override for one cloud dialect.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CloudConfig {
    pub api_key: String,
    /// Override the dialect's production host, e.g. for a proxy.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Which backends exist and which one is the default.
///
/// A `None` section disables that backend entirely; resolving its name at
/// runtime fails rather than instantiating it lazily.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub default_backend: BackendName,
    #[serde(default)]
    pub lan: Option<LanConfig>,
    #[serde(default)]
    pub developer: Option<CloudConfig>,
    #[serde(default)]
    pub platform: Option<CloudConfig>,
}

impl RouterConfig {
    /// A credential-free configuration with only the LAN backend enabled.
    pub fn lan_only() -> Self {
        RouterConfig {
            default_backend: BackendName::Lan,
            lan: Some(LanConfig::default()),
            developer: None,
            platform: None,
        }
    }
}
