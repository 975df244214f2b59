//! Device identifier newtype.
//!
//! LAN lights address each other with a 6-byte MAC carried in a 64-bit
//! target field; [`DeviceId`] keeps that representation so adapters can
//! round-trip it without conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a light on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(u64);

impl DeviceId {
    /// Build an identifier from a MAC address.
    #[must_use]
    pub fn from_mac(mac: [u8; 6]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..6].copy_from_slice(&mac);
        Self(u64::from_le_bytes(bytes))
    }

    /// Wrap a raw 64-bit target value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw 64-bit target value.
    #[must_use]
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// The 6 MAC bytes of this identifier.
    #[must_use]
    pub fn mac(self) -> [u8; 6] {
        let bytes = self.0.to_le_bytes();
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[..6]);
        mac
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mac();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Error returned when a MAC string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid device id `{0}`")]
pub struct ParseDeviceIdError(String);

impl FromStr for DeviceId {
    type Err = ParseDeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mac = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut mac {
            let part = parts
                .next()
                .ok_or_else(|| ParseDeviceIdError(s.to_string()))?;
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseDeviceIdError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseDeviceIdError(s.to_string()));
        }
        Ok(Self::from_mac(mac))
    }
}
