//! LIFX transport configuration.

use std::net::{Ipv4Addr, SocketAddr};

use serde::Deserialize;

/// UDP port every LIFX bulb listens on.
pub const LIFX_PORT: u16 = 56700;

/// Configuration for the LIFX LAN transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifxConfig {
    /// Local address the UDP socket binds to.
    pub bind: SocketAddr,
    /// Where discovery broadcasts are sent.
    pub broadcast: SocketAddr,
    /// Delay between two discovery broadcasts, in milliseconds.
    pub discovery_interval_ms: u64,
}

impl Default for LifxConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            broadcast: SocketAddr::from((Ipv4Addr::BROADCAST, LIFX_PORT)),
            discovery_interval_ms: 1000,
        }
    }
}
