//! Brightness tuning shared by the dimming and color effects.

use serde::{Deserialize, Serialize};

use crate::command::Adverb;

/// Step unit and power-off threshold for brightness changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Unit multiplied by the adverb factor to get one brightness step.
    pub illumination_step_size: u16,
    /// Brightness below which a bulb is switched off rather than dimmed.
    pub turn_off_level: u16,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            illumination_step_size: 255,
            turn_off_level: 511,
        }
    }
}

impl Tuning {
    /// Brightness step for an optional adverb: `0x50`, `0x5` or `0x20` units.
    #[must_use]
    pub fn step_size(&self, adverb: Option<Adverb>) -> u32 {
        let factor = match adverb {
            Some(Adverb::Much) => 0x50,
            Some(Adverb::Little) => 0x5,
            None => 0x20,
        };
        factor * u32::from(self.illumination_step_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_default_step_without_adverb() {
        assert_eq!(Tuning::default().step_size(None), 0x20 * 255);
    }

    #[test]
    fn should_scale_step_with_adverb() {
        let tuning = Tuning::default();
        assert_eq!(tuning.step_size(Some(Adverb::Much)), 0x50 * 255);
        assert_eq!(tuning.step_size(Some(Adverb::Little)), 0x5 * 255);
    }

    #[test]
    fn should_follow_configured_step_unit() {
        let tuning = Tuning {
            illumination_step_size: 10,
            turn_off_level: 0,
        };
        assert_eq!(tuning.step_size(None), 320);
    }
}
