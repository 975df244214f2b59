//! Bulb state and device handles.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::id::DeviceId;

/// Power level a bulb reports or is asked to take.
///
/// Serialized as `"on"` / `"off"`. Deserialization also accepts the raw
/// 16-bit level older snapshot files store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    /// Interpret a raw 16-bit power level; anything non-zero is on.
    #[must_use]
    pub fn from_level(level: u16) -> Self {
        if level == 0 { Self::Off } else { Self::On }
    }

    /// Raw 16-bit level: `0xffff` for on, `0` for off.
    #[must_use]
    pub fn level(self) -> u16 {
        match self {
            Self::On => 0xffff,
            Self::Off => 0,
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl<'de> Deserialize<'de> for Power {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Level(u16),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Level(level) => Ok(Self::from_level(level)),
            Repr::Word(word) => match word.as_str() {
                "on" => Ok(Self::On),
                "off" => Ok(Self::Off),
                other => Err(de::Error::unknown_variant(other, &["on", "off"])),
            },
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Hue, saturation, brightness and color temperature as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

/// Snapshot of one bulb as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulbState {
    #[serde(rename = "bulbLabel")]
    pub label: String,
    pub power: Power,
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
    /// Transition-time hint the bulb reports, in milliseconds.
    #[serde(default, alias = "dim")]
    pub transition_ms: u16,
}

impl BulbState {
    #[must_use]
    pub fn color(&self) -> Hsbk {
        Hsbk {
            hue: self.hue,
            saturation: self.saturation,
            brightness: self.brightness,
            kelvin: self.kelvin,
        }
    }

    /// Copy of this state with a new color, keeping label, power and hint.
    #[must_use]
    pub fn with_color(&self, color: Hsbk) -> Self {
        Self {
            hue: color.hue,
            saturation: color.saturation,
            brightness: color.brightness,
            kelvin: color.kelvin,
            ..self.clone()
        }
    }
}

impl fmt::Display for BulbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {}, hsb {:#x} {:#x} {:#x}, white {:#x}, fade {}ms",
            self.label,
            self.power,
            self.hue,
            self.saturation,
            self.brightness,
            self.kelvin,
            self.transition_ms
        )
    }
}

/// A device seen by discovery: stable identity plus its human label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub id: DeviceId,
    pub label: String,
}

impl DeviceHandle {
    pub fn new(id: DeviceId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// An unsolicited or requested state broadcast, correlated by device id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateReport {
    pub device: DeviceId,
    pub state: BulbState,
}
