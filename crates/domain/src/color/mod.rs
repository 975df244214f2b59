//! Color resolution: named colors and RGB → 16-bit HSV.
//!
//! Every channel in this module is normalized to `0..=0xffff`. Hue is the
//! usual 0–360° angle scaled to that range.

mod names;

use serde::{Deserialize, Serialize};

use names::NAMED_COLORS;

/// An RGB triple with 16 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb {
    #[must_use]
    pub fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Expand a packed `0xRRGGBB` value, shifting each 8-bit channel left by 8.
    #[must_use]
    pub fn from_packed(packed: u32) -> Self {
        let channel = |shift: u32| -> u16 {
            // masked to 8 bits, always fits
            let byte = u16::try_from((packed >> shift) & 0xff).unwrap_or(0);
            byte << 8
        };
        Self {
            red: channel(16),
            green: channel(8),
            blue: channel(0),
        }
    }
}

/// Result of an HSV conversion.
///
/// Grey levels (all channels equal) carry no hue, so they are kept apart as
/// [`White`](Hsv::White) holding only the brightness. Effects render a white
/// result as hue 0, saturation 0, kelvin 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hsv {
    Color {
        hue: u16,
        saturation: u16,
        value: u16,
    },
    White(u16),
}

impl Hsv {
    /// Brightness component, whichever variant this is.
    #[must_use]
    pub fn brightness(self) -> u16 {
        match self {
            Self::Color { value, .. } | Self::White(value) => value,
        }
    }

    #[must_use]
    pub fn is_white(self) -> bool {
        matches!(self, Self::White(_))
    }
}

/// Look up a CSS color keyword, ignoring ASCII case.
#[must_use]
pub fn name_to_rgb(name: &str) -> Option<Rgb> {
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, packed)| Rgb::from_packed(*packed))
}

/// Convert RGB to HSV, rounding every scaled component up.
///
/// Black and every other grey level come back as [`Hsv::White`] with the
/// shared channel value as brightness.
#[must_use]
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let Rgb { red, green, blue } = rgb;
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = i64::from(max - min);

    if max == 0 || delta == 0 {
        return Hsv::White(max);
    }

    let (r, g, b) = (i64::from(red), i64::from(green), i64::from(blue));
    // hue in degrees, expressed as degrees_num / delta
    let mut degrees_num = if red == max {
        60 * (g - b)
    } else if green == max {
        60 * (2 * delta + (b - r))
    } else {
        60 * (4 * delta + (r - g))
    };
    if degrees_num < 0 {
        degrees_num += 360 * delta;
    }

    let hue = ceil_div(degrees_num * 0xffff, 360 * delta);
    let saturation = ceil_div(delta * 0xffff, i64::from(max));

    Hsv::Color {
        hue: clamp_u16(hue),
        saturation: clamp_u16(saturation),
        value: max,
    }
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

fn clamp_u16(value: i64) -> u16 {
    u16::try_from(value.clamp(0, 0xffff)).unwrap_or(u16::MAX)
}
