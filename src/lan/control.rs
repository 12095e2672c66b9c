//! Per-operation datagram exchanges with a known device.
//!
//! Every call binds its own socket and releases it on every exit path;
//! nothing is pooled or reused, so concurrent operations are fully
//! independent.

use std::net::Ipv4Addr;

use log::debug;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

use crate::errors::Error;
use crate::lan::LanConfig;
use crate::lan::discovery::LanDevice;
use crate::lan::wire::{Request, Response};
use crate::state::DeviceState;

type Result<T> = std::result::Result<T, Error>;

/// Send one control datagram to a device.
///
/// Resolves as soon as the datagram is handed to the network. The protocol
/// has no acknowledgments, so success means "transmitted", not "applied".
pub(crate) async fn send_command(
    config: &LanConfig,
    device: &LanDevice,
    request: &Request,
) -> Result<()> {
    let socket = connect(device.ip, config.control_port).await?;
    let datagram = serde_json::to_vec(request).map_err(Error::JsonDump)?;
    socket
        .send(&datagram)
        .await
        .map_err(|e| Error::socket("send", e))?;
    Ok(())
}

/// Query a device for its current status.
///
/// Waits for the first response whose command tag is `devStatus`; anything
/// else arriving on the socket is ignored and waiting continues. Fails with
/// [`Error::Timeout`] when the response window elapses.
pub(crate) async fn query_state(config: &LanConfig, device: &LanDevice) -> Result<DeviceState> {
    let socket = connect(device.ip, config.control_port).await?;
    let datagram = serde_json::to_vec(&Request::status()).map_err(Error::JsonDump)?;
    socket
        .send(&datagram)
        .await
        .map_err(|e| Error::socket("send", e))?;

    let deadline = Instant::now() + config.response_timeout;
    let mut buffer = [0u8; 2048];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::timeout("status query"));
        }
        match timeout(remaining, socket.recv(&mut buffer)).await {
            Ok(Ok(size)) => match Response::parse(&buffer[..size]) {
                Some(Response::DevStatus(data)) => return Ok(data.into_state()),
                _ => debug!("ignoring non-status datagram from {}", device.ip),
            },
            Ok(Err(_)) => continue,
            Err(_) => return Err(Error::timeout("status query")),
        }
    }
}

async fn connect(ip: Ipv4Addr, port: u16) -> Result<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .await
        .map_err(|e| Error::socket("bind", e))?;
    socket
        .connect((ip, port))
        .await
        .map_err(|e| Error::socket("connect", e))?;
    Ok(socket)
}
