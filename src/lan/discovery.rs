//! Device discovery via UDP multicast, with caching and scan coalescing.

use std::collections::HashSet;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, oneshot};
use tokio::time::{Instant, timeout};

use crate::errors::Error;
use crate::lan::LanConfig;
use crate::lan::wire::{Request, Response, ScanData};

type Result<T> = std::result::Result<T, Error>;

/// A Govee device discovered on the local network.
///
/// Identity is `device_id`; a scan never yields two entries with the same
/// identifier.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanDevice {
    pub ip: Ipv4Addr,
    pub device_id: String,
    pub sku: String,
    pub ble_version_hard: Option<String>,
    pub ble_version_soft: Option<String>,
    pub wifi_version_hard: Option<String>,
    pub wifi_version_soft: Option<String>,
}

impl From<ScanData> for LanDevice {
    fn from(data: ScanData) -> Self {
        LanDevice {
            ip: data.ip,
            device_id: data.device,
            sku: data.sku,
            ble_version_hard: data.ble_version_hard,
            ble_version_soft: data.ble_version_soft,
            wifi_version_hard: data.wifi_version_hard,
            wifi_version_soft: data.wifi_version_soft,
        }
    }
}

/// A transport failure observed during a scan, in a shape that can be handed
/// to every coalesced waiter.
#[derive(Debug, Clone)]
struct ScanError {
    action: &'static str,
    kind: io::ErrorKind,
    message: String,
}

impl ScanError {
    fn new(action: &'static str, err: &io::Error) -> Self {
        ScanError {
            action,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    fn into_error(self) -> Error {
        Error::socket(self.action, io::Error::new(self.kind, self.message))
    }
}

type ScanResult = std::result::Result<Vec<LanDevice>, ScanError>;

struct CacheEntry {
    devices: Vec<LanDevice>,
    expires_at: Instant,
}

#[derive(Default)]
struct DiscoveryState {
    cache: Option<CacheEntry>,
    /// Present while a scan is in flight; concurrent callers park here.
    waiters: Option<Vec<oneshot::Sender<ScanResult>>>,
}

/// Owns the discovery cache and the in-flight scan token.
///
/// Instances are independent of each other; nothing here is global. Cloning
/// shares the same cache.
#[derive(Clone)]
pub struct Discovery {
    config: LanConfig,
    state: Arc<Mutex<DiscoveryState>>,
}

impl Discovery {
    pub fn new(config: LanConfig) -> Self {
        Discovery {
            config,
            state: Arc::new(Mutex::new(DiscoveryState::default())),
        }
    }

    /// Return the current device list, scanning the network if the cache is
    /// empty or expired.
    ///
    /// "No devices answered" is an empty list, not an error; only a failing
    /// bind or send surfaces as [`Error::Socket`]. Calls that arrive while a
    /// scan is running attach to that scan instead of starting another one.
    pub async fn discover(&self) -> Result<Vec<LanDevice>> {
        let rx = {
            let mut state = self.state.lock().await;
            if let Some(cache) = &state.cache
                && cache.expires_at > Instant::now()
            {
                return Ok(cache.devices.clone());
            }

            let (tx, rx) = oneshot::channel();
            match &mut state.waiters {
                Some(waiters) => waiters.push(tx),
                None => {
                    state.waiters = Some(vec![tx]);
                    // Detached so that a cancelled initiator cannot strand
                    // the coalesced waiters mid-scan.
                    let discovery = self.clone();
                    tokio::spawn(async move { discovery.run_scan().await });
                }
            }
            rx
        };

        match rx.await {
            Ok(Ok(devices)) => Ok(devices),
            Ok(Err(err)) => Err(err.into_error()),
            Err(_) => Err(Error::socket(
                "scan",
                io::Error::other("scan task terminated before settling"),
            )),
        }
    }

    /// Look up a previously discovered device by identifier.
    ///
    /// Only consults the non-expired cache; a miss never triggers a rescan.
    pub async fn lookup(&self, device_id: &str) -> Option<LanDevice> {
        let state = self.state.lock().await;
        let cache = state.cache.as_ref()?;
        if cache.expires_at <= Instant::now() {
            return None;
        }
        cache
            .devices
            .iter()
            .find(|device| device.device_id == device_id)
            .cloned()
    }

    async fn run_scan(&self) {
        let result = scan_cycle(&self.config).await;

        let mut state = self.state.lock().await;
        if let Ok(devices) = &result {
            state.cache = Some(CacheEntry {
                devices: devices.clone(),
                // Validity is measured from scan completion, not from when
                // discovery was first requested.
                expires_at: Instant::now() + self.config.cache_ttl,
            });
        }
        let waiters = state.waiters.take().unwrap_or_default();
        drop(state);

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

/// One bounded broadcast-and-collect cycle.
///
/// The protocol has no "all devices have answered" signal, so the fixed
/// collection window is the only termination condition.
async fn scan_cycle(config: &LanConfig) -> ScanResult {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.listen_port))
        .await
        .map_err(|e| ScanError::new("bind", &e))?;

    let request = serde_json::to_vec(&Request::scan())
        .map_err(|e| ScanError::new("encode", &io::Error::other(e)))?;
    socket
        .send_to(&request, (config.multicast_addr, config.discover_port))
        .await
        .map_err(|e| ScanError::new("send_to", &e))?;

    let deadline = Instant::now() + config.scan_window;
    let mut seen = HashSet::new();
    let mut devices = Vec::new();
    let mut buffer = [0u8; 2048];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, socket.recv_from(&mut buffer)).await {
            Ok(Ok((size, addr))) => {
                let Some(Response::Scan(data)) = Response::parse(&buffer[..size]) else {
                    debug!("dropping unrecognized datagram from {addr} during scan");
                    continue;
                };
                // First response wins; routers and chatty devices may answer
                // more than once.
                if seen.insert(data.device.clone()) {
                    devices.push(LanDevice::from(data));
                }
            }
            // recv errors are not fatal; the window keeps running.
            Ok(Err(_)) => continue,
            Err(_) => break,
        }
    }

    debug!("scan collected {} device(s)", devices.len());
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lan::testutil::FakeDevice;
    use std::time::Duration;

    #[tokio::test]
    async fn scan_collects_and_dedupes_by_device_id() {
        let fake = FakeDevice::spawn(
            vec![
                FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6160"),
                FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6999"),
                FakeDevice::scan_reply("11:22:33:44:55:66", "H6072"),
                "definitely not json".to_string(),
            ],
            vec![],
        )
        .await;
        let discovery = Discovery::new(fake.config());

        let devices = discovery.discover().await.unwrap();
        assert_eq!(devices.len(), 2);

        // First occurrence wins for duplicate identifiers.
        let first = devices
            .iter()
            .find(|d| d.device_id == "AA:BB:CC:DD:EE:FF")
            .unwrap();
        assert_eq!(first.sku, "H6160");
        assert_eq!(first.ip, Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn fresh_cache_prevents_a_second_send() {
        let fake = FakeDevice::spawn(
            vec![FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6160")],
            vec![],
        )
        .await;
        let discovery = Discovery::new(fake.config());

        let first = discovery.discover().await.unwrap();
        let second = discovery.discover().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fake.scan_count().await, 1);
    }

    #[tokio::test]
    async fn expired_cache_triggers_a_rescan() {
        let fake = FakeDevice::spawn(
            vec![FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6160")],
            vec![],
        )
        .await;
        let config = LanConfig {
            cache_ttl: Duration::ZERO,
            ..fake.config()
        };
        let discovery = Discovery::new(config);

        discovery.discover().await.unwrap();
        discovery.discover().await.unwrap();

        assert_eq!(fake.scan_count().await, 2);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_scan() {
        let fake = FakeDevice::spawn(
            vec![FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6160")],
            vec![],
        )
        .await;
        let discovery = Discovery::new(fake.config());

        let (a, b, c) = tokio::join!(
            discovery.discover(),
            discovery.discover(),
            discovery.discover()
        );
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(fake.scan_count().await, 1);
    }

    #[tokio::test]
    async fn no_answers_is_an_empty_list() {
        let fake = FakeDevice::spawn(vec![], vec![]).await;
        let discovery = Discovery::new(fake.config());

        assert!(discovery.discover().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookup_consults_the_cache_only() {
        let fake = FakeDevice::spawn(
            vec![FakeDevice::scan_reply("AA:BB:CC:DD:EE:FF", "H6160")],
            vec![],
        )
        .await;
        let discovery = Discovery::new(fake.config());

        // Nothing cached yet.
        assert!(discovery.lookup("AA:BB:CC:DD:EE:FF").await.is_none());

        discovery.discover().await.unwrap();
        assert!(discovery.lookup("AA:BB:CC:DD:EE:FF").await.is_some());
        assert!(discovery.lookup("00:00:00:00:00:00").await.is_none());

        // Lookups never triggered a rescan.
        assert_eq!(fake.scan_count().await, 1);
    }

    #[tokio::test]
    async fn bind_failure_is_a_transport_error() {
        let holder = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let config = LanConfig {
            multicast_addr: Ipv4Addr::LOCALHOST,
            discover_port: 9,
            listen_port: holder.local_addr().unwrap().port(),
            scan_window: Duration::from_millis(100),
            ..LanConfig::default()
        };
        let discovery = Discovery::new(config);

        let err = discovery.discover().await.unwrap_err();
        assert!(matches!(err, Error::Socket { .. }));
    }
}
