//! Verb and adverb vocabulary.

use std::fmt;

/// The operation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    On,
    Off,
    Save,
    Restore,
    Color,
    Hsb,
    Darker,
    Lighter,
    Status,
}

impl Verb {
    /// Resolve a token (ASCII case-insensitive), following aliases such as `rgb` → `color`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let verb = match token.to_ascii_lowercase().as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            "save" => Self::Save,
            "restore" => Self::Restore,
            "color" | "rgb" => Self::Color,
            "hsb" => Self::Hsb,
            "darker" => Self::Darker,
            "lighter" => Self::Lighter,
            "status" => Self::Status,
            _ => return None,
        };
        Some(verb)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Save => "save",
            Self::Restore => "restore",
            Self::Color => "color",
            Self::Hsb => "hsb",
            Self::Darker => "darker",
            Self::Lighter => "lighter",
            Self::Status => "status",
        }
    }

    /// Token that ends the run of target names, if the verb has a trailing clause.
    #[must_use]
    pub fn noun_stopper(self) -> Option<&'static str> {
        match self {
            Self::Save => Some("to"),
            Self::Restore => Some("from"),
            Self::Color | Self::Hsb => Some("in"),
            Self::On | Self::Off | Self::Darker | Self::Lighter | Self::Status => None,
        }
    }

    #[must_use]
    pub fn accepts_adverb(self) -> bool {
        matches!(self, Self::Darker | Self::Lighter)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Intensity modifier for `darker` / `lighter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adverb {
    Much,
    Little,
}

impl Adverb {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("much") {
            Some(Self::Much)
        } else if token.eq_ignore_ascii_case("little") {
            Some(Self::Little)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Much => "much",
            Self::Little => "little",
        }
    }
}

impl fmt::Display for Adverb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
