//! Scripted loopback UDP device for exercising the LAN paths.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::lan::LanConfig;

/// A fake device on a loopback port, answering scan and status queries with
/// pre-scripted datagrams and recording everything it receives.
pub(crate) struct FakeDevice {
    pub port: u16,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeDevice {
    pub async fn spawn(scan_replies: Vec<String>, status_replies: Vec<String>) -> FakeDevice {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = socket.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];
            loop {
                let Ok((size, from)) = socket.recv_from(&mut buffer).await else {
                    break;
                };
                let Ok(message) = serde_json::from_slice::<Value>(&buffer[..size]) else {
                    continue;
                };
                let cmd = message
                    .pointer("/msg/cmd")
                    .and_then(Value::as_str)
                    .map(String::from);
                log.lock().await.push(message);

                let replies = match cmd.as_deref() {
                    Some("scan") => &scan_replies,
                    Some("devStatus") => &status_replies,
                    _ => continue,
                };
                for reply in replies {
                    let _ = socket.send_to(reply.as_bytes(), from).await;
                }
            }
        });

        FakeDevice { port, received }
    }

    /// Scripted scan reply for a device claiming the loopback address.
    pub fn scan_reply(device_id: &str, sku: &str) -> String {
        format!(
            r#"{{"msg":{{"cmd":"scan","data":{{"ip":"127.0.0.1","device":"{device_id}","sku":"{sku}"}}}}}}"#
        )
    }

    /// Scripted devStatus reply.
    pub fn status_reply(on_off: u8, brightness: u8, (r, g, b): (u8, u8, u8), kelvin: u16) -> String {
        format!(
            r#"{{"msg":{{"cmd":"devStatus","data":{{"onOff":{on_off},"brightness":{brightness},"color":{{"r":{r},"g":{g},"b":{b}}},"colorTemInKelvin":{kelvin}}}}}}}"#
        )
    }

    /// Everything received so far.
    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }

    /// Wait until at least `count` datagrams have been recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<Value> {
        for _ in 0..200 {
            {
                let log = self.received.lock().await;
                if log.len() >= count {
                    return log.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.received.lock().await.clone()
    }

    pub async fn scan_count(&self) -> usize {
        self.received
            .lock()
            .await
            .iter()
            .filter(|m| m.pointer("/msg/cmd").and_then(Value::as_str) == Some("scan"))
            .count()
    }

    /// Config pointing every LAN port at this fake device, with windows
    /// short enough to keep tests fast.
    pub fn config(&self) -> LanConfig {
        LanConfig {
            multicast_addr: Ipv4Addr::LOCALHOST,
            discover_port: self.port,
            listen_port: 0,
            control_port: self.port,
            scan_window: Duration::from_millis(250),
            response_timeout: Duration::from_millis(250),
            cache_ttl: Duration::from_secs(60),
        }
    }
}
