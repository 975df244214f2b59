//! Configuration of the simulated bulbs.

use serde::Deserialize;

use lampctl_domain::light::Power;

/// The `[virtual]` section: which bulbs to simulate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    pub bulbs: Vec<VirtualBulbConfig>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            bulbs: vec![
                VirtualBulbConfig {
                    label: "Kitchen".to_string(),
                    power: Power::On,
                    brightness: 0x8000,
                    ..VirtualBulbConfig::default()
                },
                VirtualBulbConfig {
                    label: "Hall".to_string(),
                    announce_after_ms: 120,
                    ..VirtualBulbConfig::default()
                },
            ],
        }
    }
}

/// One `[[virtual.bulbs]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VirtualBulbConfig {
    pub label: String,
    pub power: Power,
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
    /// Delay before the first announcement, and between repeats.
    pub announce_after_ms: u64,
    /// How many times discovery announces this bulb.
    pub announcements: u32,
    /// Delay before a state request is answered.
    pub latency_ms: u64,
    /// Number of state requests silently dropped before answering.
    pub ignore_requests: u32,
}

impl Default for VirtualBulbConfig {
    fn default() -> Self {
        Self {
            label: "Virtual Light".to_string(),
            power: Power::Off,
            hue: 0,
            saturation: 0,
            brightness: 0xffff,
            kelvin: 3500,
            announce_after_ms: 50,
            announcements: 1,
            latency_ms: 20,
            ignore_requests: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_missing_bulb_fields_with_defaults() {
        let config: VirtualConfig = toml::from_str(
            r#"
            [[bulbs]]
            label = "Porch"
            power = "on"
            latency_ms = 500
            ignore_requests = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.bulbs.len(), 1);
        let porch = &config.bulbs[0];
        assert_eq!(porch.label, "Porch");
        assert_eq!(porch.power, Power::On);
        assert_eq!(porch.latency_ms, 500);
        assert_eq!(porch.ignore_requests, 2);
        assert_eq!(porch.brightness, 0xffff);
        assert_eq!(porch.announcements, 1);
    }

    #[test]
    fn should_use_demo_bulbs_when_section_is_empty() {
        let config: VirtualConfig = toml::from_str("").unwrap();

        assert_eq!(config, VirtualConfig::default());
        assert_eq!(config.bulbs.len(), 2);
    }
}
