//! Clause parsers. Each one scans the whole token sequence, not just the
//! target span.

use std::fmt;

use crate::color::{Hsv, Rgb, name_to_rgb, rgb_to_hsv};
use crate::error::CommandError;

use super::verb::Verb;

/// Transition time applied to color and brightness changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition(u32);

impl Transition {
    pub const QUICK: Self = Self(0);
    pub const SLOW: Self = Self(10_000);
    pub const NORMAL: Self = Self(3_000);

    /// `quickly` anywhere wins over `slowly`; otherwise the normal speed.
    pub fn from_tokens(tokens: &[&str]) -> Self {
        if contains(tokens, "quickly") {
            Self::QUICK
        } else if contains(tokens, "slowly") {
            Self::SLOW
        } else {
            Self::NORMAL
        }
    }

    #[must_use]
    pub fn millis(self) -> u32 {
        self.0
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

pub(super) fn contains(tokens: &[&str], keyword: &str) -> bool {
    position(tokens, keyword).is_some()
}

pub(super) fn position(tokens: &[&str], keyword: &str) -> Option<usize> {
    tokens.iter().position(|t| t.eq_ignore_ascii_case(keyword))
}

/// The token after `keyword`, if the keyword is present and not last.
pub(super) fn word_after<'a>(tokens: &[&'a str], keyword: &str) -> Option<&'a str> {
    position(tokens, keyword).and_then(|index| tokens.get(index + 1).copied())
}

/// Decimal or `0x`-prefixed hexadecimal, clamped to 16 bits.
pub(super) fn parse_component(token: &str) -> Result<u16, CommandError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    };
    let value = parsed.map_err(|_| CommandError::InvalidNumber(token.to_string()))?;
    Ok(u16::try_from(value.min(0xffff)).unwrap_or(u16::MAX))
}

/// Words that end a color name.
const NAME_STOPPERS: [&str; 4] = ["and", "then", "quickly", "slowly"];

/// What followed `in`: three literal components or a color name.
enum ColorClause {
    Components([u16; 3]),
    Named(String),
}

fn color_clause(tokens: &[&str], verb: Verb) -> Result<ColorClause, CommandError> {
    let missing = CommandError::MissingClause { verb: verb.name(), clause: "in" };
    let start = position(tokens, "in").ok_or_else(|| missing.clone())? + 1;
    let rest = &tokens[start..];
    let first = rest.first().ok_or_else(|| missing.clone())?;

    if first.starts_with(|c: char| c.is_ascii_digit()) {
        let [a, b, c, ..] = rest else {
            return Err(missing);
        };
        return Ok(ColorClause::Components([
            parse_component(a)?,
            parse_component(b)?,
            parse_component(c)?,
        ]));
    }

    // multi-word names ("light blue") are joined up to the first connective
    let name: String = rest
        .iter()
        .take_while(|t| !NAME_STOPPERS.iter().any(|s| t.eq_ignore_ascii_case(s)))
        .map(|t| t.to_ascii_lowercase())
        .collect();
    if name.is_empty() {
        return Err(missing);
    }
    Ok(ColorClause::Named(name))
}

fn named_rgb(name: String) -> Result<Rgb, CommandError> {
    name_to_rgb(&name).ok_or(CommandError::UnknownColor(name))
}

/// `in <r> <g> <b>` or `in <name>` for the `color` verb.
pub(super) fn rgb_clause(tokens: &[&str]) -> Result<Rgb, CommandError> {
    match color_clause(tokens, Verb::Color)? {
        ColorClause::Components([red, green, blue]) => Ok(Rgb::new(red, green, blue)),
        ColorClause::Named(name) => named_rgb(name),
    }
}

/// `in <h> <s> <b>` or `in <name>` for the `hsb` verb.
///
/// Literal components are taken as HSB directly; names go through RGB.
pub(super) fn hsb_clause(tokens: &[&str]) -> Result<Hsv, CommandError> {
    match color_clause(tokens, Verb::Hsb)? {
        ColorClause::Components([hue, saturation, value]) => Ok(Hsv::Color {
            hue,
            saturation,
            value,
        }),
        ColorClause::Named(name) => named_rgb(name).map(rgb_to_hsv),
    }
}
