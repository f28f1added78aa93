//! Wake-on-LAN dispatcher
//!
//! Stateless: every call opens a throwaway UDP socket, sends one magic
//! packet and returns. No connection to the target is ever made, so this
//! works while the machine is off.

use crate::constants::{BROADCAST_ADDRESS, DEFAULT_WAKE_PORT};
use crate::normalize::{format_mac, parse_mac};
use crate::utils::WakeError;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

/// 6 sync bytes followed by the MAC repeated 16 times
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Build the magic packet for a hardware address
pub fn magic_packet(mac: &[u8; 6]) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(mac);
    }
    packet
}

/// Where the magic packet is sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeTarget {
    /// The profile's host address; reaches PCs whose ARP entry is still
    /// cached on the router or that sit behind a directed broadcast.
    #[default]
    Host,
    /// The limited broadcast address on the local segment
    Broadcast,
    /// A fixed address, typically a subnet-directed broadcast
    Address(String),
}

impl WakeTarget {
    pub fn destination<'a>(&'a self, host: &'a str) -> &'a str {
        match self {
            WakeTarget::Host => host,
            WakeTarget::Broadcast => BROADCAST_ADDRESS,
            WakeTarget::Address(addr) => addr,
        }
    }
}

/// Sends magic packets over UDP
#[derive(Debug, Clone, Copy)]
pub struct WakeDispatcher {
    port: u16,
}

impl Default for WakeDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_PORT)
    }
}

impl WakeDispatcher {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send one magic packet for `mac` to `destination`, or to the limited
    /// broadcast address when no destination is given.
    pub async fn send(&self, mac: &str, destination: Option<&str>) -> Result<(), WakeError> {
        let mac_bytes = parse_mac(mac).map_err(|_| WakeError::InvalidMac(mac.trim().to_string()))?;
        let packet = magic_packet(&mac_bytes);
        let destination = destination
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(BROADCAST_ADDRESS);

        tracing::info!(
            mac = %format_mac(&mac_bytes),
            destination,
            port = self.port,
            "Sending Wake-on-LAN packet"
        );

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| WakeError::Send(format!("failed to bind UDP socket: {}", e)))?;
        socket
            .set_broadcast(true)
            .map_err(|e| WakeError::Send(format!("failed to enable broadcast: {}", e)))?;

        let sent = socket
            .send_to(&packet, (destination, self.port))
            .await
            .map_err(|e| WakeError::Send(format!("{}:{}: {}", destination, self.port, e)))?;
        if sent != packet.len() {
            return Err(WakeError::Send(format!(
                "short write: {} of {} bytes",
                sent,
                packet.len()
            )));
        }
        Ok(())
    }

    /// [`send`](Self::send) flattened to the caller-facing contract:
    /// empty string on success, descriptive error otherwise.
    pub async fn dispatch(&self, mac: &str, destination: Option<&str>) -> String {
        match self.send(mac, destination).await {
            Ok(()) => String::new(),
            Err(e) => {
                tracing::error!("Error sending Wake-on-LAN packet: {}", e);
                e.to_string()
            }
        }
    }
}
