//! Per-verb decisions: given the state a bulb reports, which light commands
//! to send. Pure; the effects in the app crate feed these to a transport.

use crate::color::Hsv;
use crate::command::{Adverb, Transition};
use crate::light::{BulbState, Hsbk, Power};
use crate::tuning::Tuning;

const MAX_BRIGHTNESS: u16 = 0xffff;

/// A single control message for one bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    Power(Power),
    Color { color: Hsbk, transition_ms: u32 },
}

impl LightCommand {
    /// Apply this command to a locally held state, as a bulb would.
    pub fn apply_to(&self, state: &mut BulbState) {
        match self {
            Self::Power(power) => state.power = *power,
            Self::Color { color, .. } => *state = state.with_color(*color),
        }
    }
}

fn set_color(color: Hsbk, transition: Transition) -> LightCommand {
    LightCommand::Color {
        color,
        transition_ms: transition.millis(),
    }
}

/// `color` / `hsb`: apply `hsv`, switching off instead when it is too dim.
///
/// A white result clears hue and saturation and forces kelvin to 0; a color
/// keeps the bulb's current kelvin.
#[must_use]
pub fn plan_color(
    current: &BulbState,
    hsv: Hsv,
    transition: Transition,
    tuning: &Tuning,
) -> Vec<LightCommand> {
    let color = match hsv {
        Hsv::White(brightness) => Hsbk {
            hue: 0,
            saturation: 0,
            brightness,
            kelvin: 0,
        },
        Hsv::Color {
            hue,
            saturation,
            value,
        } => Hsbk {
            hue,
            saturation,
            brightness: value,
            kelvin: current.kelvin,
        },
    };

    if color.brightness < tuning.turn_off_level {
        return if current.power.is_on() {
            vec![LightCommand::Power(Power::Off)]
        } else {
            Vec::new()
        };
    }

    let mut commands = Vec::with_capacity(2);
    if !current.power.is_on() {
        commands.push(LightCommand::Power(Power::On));
    }
    commands.push(set_color(color, transition));
    commands
}

/// `darker`: one step down, or off once the result is at or below the threshold.
#[must_use]
pub fn plan_darker(
    current: &BulbState,
    adverb: Option<Adverb>,
    transition: Transition,
    tuning: &Tuning,
) -> Vec<LightCommand> {
    if current.brightness == 0 || !current.power.is_on() {
        return Vec::new();
    }

    let stepped = u32::from(current.brightness).saturating_sub(tuning.step_size(adverb));
    let brightness = u16::try_from(stepped).unwrap_or(MAX_BRIGHTNESS);
    if brightness <= tuning.turn_off_level {
        return vec![LightCommand::Power(Power::Off)];
    }

    vec![set_color(
        Hsbk {
            brightness,
            ..current.color()
        },
        transition,
    )]
}

/// `lighter`: one step up (clamped), powering the bulb on first if needed.
#[must_use]
pub fn plan_lighter(
    current: &BulbState,
    adverb: Option<Adverb>,
    transition: Transition,
    tuning: &Tuning,
) -> Vec<LightCommand> {
    if current.brightness == MAX_BRIGHTNESS && current.power.is_on() {
        return Vec::new();
    }

    let stepped = u32::from(current.brightness) + tuning.step_size(adverb);
    let brightness = u16::try_from(stepped.min(u32::from(MAX_BRIGHTNESS))).unwrap_or(MAX_BRIGHTNESS);

    let mut commands = Vec::with_capacity(2);
    if !current.power.is_on() {
        commands.push(LightCommand::Power(Power::On));
    }
    commands.push(set_color(
        Hsbk {
            brightness,
            ..current.color()
        },
        transition,
    ));
    commands
}

/// `restore`: reconcile power only when it differs, then always set the saved color.
#[must_use]
pub fn plan_restore(
    current: &BulbState,
    saved: &BulbState,
    transition: Transition,
) -> Vec<LightCommand> {
    let mut commands = Vec::with_capacity(2);
    if current.power != saved.power {
        commands.push(LightCommand::Power(saved.power));
    }
    commands.push(set_color(saved.color(), transition));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulb(power: Power, brightness: u16) -> BulbState {
        BulbState {
            label: "Kitchen".to_string(),
            power,
            hue: 0x4000,
            saturation: 0x8000,
            brightness,
            kelvin: 3500,
            transition_ms: 0,
        }
    }

    fn apply(state: &BulbState, commands: &[LightCommand]) -> BulbState {
        let mut state = state.clone();
        for command in commands {
            command.apply_to(&mut state);
        }
        state
    }

    #[test]
    fn should_power_on_before_setting_color() {
        let tuning = Tuning::default();
        let hsv = Hsv::Color {
            hue: 1,
            saturation: 2,
            value: 0x8000,
        };
        let commands = plan_color(&bulb(Power::Off, 0), hsv, Transition::QUICK, &tuning);
        assert_eq!(
            commands,
            vec![
                LightCommand::Power(Power::On),
                LightCommand::Color {
                    color: Hsbk {
                        hue: 1,
                        saturation: 2,
                        brightness: 0x8000,
                        kelvin: 3500
                    },
                    transition_ms: 0
                }
            ]
        );
    }

    #[test]
    fn should_force_kelvin_zero_for_white() {
        let commands = plan_color(
            &bulb(Power::On, 0x1000),
            Hsv::White(0xffff),
            Transition::NORMAL,
            &Tuning::default(),
        );
        assert_eq!(
            commands,
            vec![LightCommand::Color {
                color: Hsbk {
                    hue: 0,
                    saturation: 0,
                    brightness: 0xffff,
                    kelvin: 0
                },
                transition_ms: 3000
            }]
        );
    }

    #[test]
    fn should_switch_off_instead_of_too_dim_color() {
        let tuning = Tuning::default();
        let dim = Hsv::White(10);
        assert_eq!(
            plan_color(&bulb(Power::On, 0x8000), dim, Transition::NORMAL, &tuning),
            vec![LightCommand::Power(Power::Off)]
        );
        assert!(plan_color(&bulb(Power::Off, 0), dim, Transition::NORMAL, &tuning).is_empty());
    }

    #[test]
    fn should_power_on_at_exact_threshold() {
        let tuning = Tuning::default();
        let commands = plan_color(
            &bulb(Power::Off, 0),
            Hsv::White(tuning.turn_off_level),
            Transition::NORMAL,
            &tuning,
        );
        assert_eq!(commands[0], LightCommand::Power(Power::On));
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn should_step_brightness_down() {
        let tuning = Tuning::default();
        let current = bulb(Power::On, 0xffff);
        let commands = plan_darker(&current, None, Transition::NORMAL, &tuning);
        let after = apply(&current, &commands);
        assert_eq!(after.brightness, 0xffff - 0x20 * 255);
        assert_eq!(after.hue, current.hue);
        assert_eq!(after.kelvin, current.kelvin);
    }

    #[test]
    fn should_ignore_darker_on_dark_or_off_bulb() {
        let tuning = Tuning::default();
        assert!(plan_darker(&bulb(Power::On, 0), None, Transition::NORMAL, &tuning).is_empty());
        assert!(plan_darker(&bulb(Power::Off, 0x8000), None, Transition::NORMAL, &tuning).is_empty());
    }

    #[test]
    fn should_never_leave_bulb_on_below_threshold_when_darkening() {
        let tuning = Tuning::default();
        let threshold = tuning.turn_off_level;
        for adverb in [None, Some(Adverb::Much), Some(Adverb::Little)] {
            for brightness in (0..=u16::MAX).step_by(97) {
                let current = bulb(Power::On, brightness);
                let after = apply(
                    &current,
                    &plan_darker(&current, adverb, Transition::NORMAL, &tuning),
                );
                assert!(
                    !(after.power.is_on() && after.brightness > 0 && after.brightness < threshold),
                    "brightness {brightness} with {adverb:?} left bulb on at {}",
                    after.brightness
                );
            }
        }
    }

    #[test]
    fn should_switch_off_when_stepping_to_threshold() {
        let tuning = Tuning {
            illumination_step_size: 1,
            turn_off_level: 100,
        };
        let current = bulb(Power::On, 100 + 0x20);
        assert_eq!(
            plan_darker(&current, None, Transition::NORMAL, &tuning),
            vec![LightCommand::Power(Power::Off)]
        );
    }

    #[test]
    fn should_step_brightness_up_and_clamp() {
        let tuning = Tuning::default();
        let current = bulb(Power::On, 0xff00);
        let after = apply(
            &current,
            &plan_lighter(&current, Some(Adverb::Much), Transition::NORMAL, &tuning),
        );
        assert_eq!(after.brightness, 0xffff);
    }

    #[test]
    fn should_power_on_before_lightening() {
        let tuning = Tuning::default();
        let commands = plan_lighter(&bulb(Power::Off, 0), Some(Adverb::Little), Transition::QUICK, &tuning);
        assert_eq!(commands[0], LightCommand::Power(Power::On));
        assert_eq!(
            commands[1],
            LightCommand::Color {
                color: Hsbk {
                    hue: 0x4000,
                    saturation: 0x8000,
                    brightness: 5 * 255,
                    kelvin: 3500
                },
                transition_ms: 0
            }
        );
    }

    #[test]
    fn should_ignore_lighter_on_full_bulb() {
        let tuning = Tuning::default();
        assert!(plan_lighter(&bulb(Power::On, 0xffff), None, Transition::NORMAL, &tuning).is_empty());
        assert!(!plan_lighter(&bulb(Power::Off, 0xffff), None, Transition::NORMAL, &tuning).is_empty());
    }

    #[test]
    fn should_restore_exact_state() {
        let saved = BulbState {
            label: "Kitchen".to_string(),
            power: Power::Off,
            hue: 7,
            saturation: 8,
            brightness: 9,
            kelvin: 10,
            transition_ms: 0,
        };
        let current = bulb(Power::On, 0x8000);
        let after = apply(&current, &plan_restore(&current, &saved, Transition::NORMAL));
        assert_eq!(after.power, saved.power);
        assert_eq!(after.color(), saved.color());
    }

    #[test]
    fn should_not_toggle_power_on_second_restore() {
        let saved = bulb(Power::On, 0x1234);
        let current = bulb(Power::On, 0x1234);
        let commands = plan_restore(&current, &saved, Transition::NORMAL);
        assert_eq!(commands.len(), 1);
        assert_eq!(apply(&current, &commands), current);
    }
}
