//! # govee_lights_rs
//!
//! An async Rust library for controlling Govee smart lights over the local
//! LAN protocol and the Govee cloud APIs.
//!
//! Three interchangeable backends sit behind one abstract command surface:
//!
//! - **LAN**: UDP multicast discovery plus datagram control on the local
//!   network segment. No credentials, best effort, lowest latency.
//! - **Developer**: the classic cloud REST dialect
//!   (`developer-api.govee.com`) with commands in natural JSON shapes.
//! - **Platform**: the typed cloud REST dialect (`openapi.api.govee.com`)
//!   with capability instances and packed-integer colors.
//!
//! Every backend accepts the same four [`Command`]s (`turn`, `brightness`,
//! `color`, `colorTem`) and reports back the same normalized
//! [`DeviceState`]; the per-backend wire encodings are handled internally.
//!
//! ## Quick Start
//!
//! ```ignore
//! use govee_lights_rs::{Command, PowerMode, Router, RouterConfig};
//!
//! async fn turn_everything_on() -> Result<(), govee_lights_rs::Error> {
//!     let router = Router::new(RouterConfig::lan_only())?;
//!     let backend = router.resolve(None)?;
//!
//!     for device in backend.list_devices().await? {
//!         backend
//!             .control(&device.id, &device.model, &Command::Turn(PowerMode::On))
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Communication
//!
//! LAN discovery multicasts one scan request to `239.255.255.250:4001` and
//! collects unicast responses on port 4002 for a fixed 3 second window;
//! control datagrams go to each device on port 4003. Scan results are
//! cached for five minutes and concurrent discovery requests share a single
//! scan. Control commands are fire-and-forget: the protocol has no
//! acknowledgments, so success means "handed to the network".
//!
//! The cloud backends require an API key and additionally expose scene
//! listing and activation; calling those against the LAN backend fails with
//! [`Error::Unsupported`].

mod cloud;
mod command;
mod config;
mod device;
mod errors;
pub mod lan;
mod router;
mod state;
mod types;

// Re-export public API
pub use cloud::developer::DeveloperBackend;
pub use cloud::platform::PlatformBackend;
pub use command::Command;
pub use config::{CloudConfig, RouterConfig};
pub use device::{DeviceInfo, Scene};
pub use errors::Error;
pub use lan::{Discovery, LanBackend, LanConfig, LanDevice};
pub use router::{Backend, BackendName, Router};
pub use state::{DeviceState, StateProperty};
pub use types::{Brightness, Color, Kelvin, PowerMode};
