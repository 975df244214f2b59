//! Commands: compiled form of a free-form token line such as
//! `much darker kitchen slowly` or `save entrance to evening`.
//!
//! ## Grammar
//! ```text
//! [adverb] verb [targets…] [stopper clause…]
//! ```
//! - `adverb`: `much` | `little`, only before `darker` / `lighter`
//! - `targets`: device names up to the verb's stopper (`to`, `from`, `in`);
//!   `and` is a separator; no names, or a leading `all`, means every device
//! - clauses are looked up anywhere in the line: `to <name>`, `from <name>`,
//!   `in <c1> <c2> <c3>` / `in <color name>`, `quickly` / `slowly`

mod params;
mod parser;
mod verb;

use std::fmt;
use std::str::FromStr;

use crate::color::{Hsv, Rgb, rgb_to_hsv};
use crate::error::CommandError;
use crate::target::{CanonicalKey, TargetSet};

pub use params::Transition;
pub use verb::{Adverb, Verb};

/// A verb with its parsed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    /// Capture current states, stored under `state_name` or the default slot.
    Save { state_name: Option<String> },
    /// Re-apply states captured by a previous save.
    Restore {
        state_name: Option<String>,
        transition: Transition,
    },
    /// Set an RGB color (literal or named).
    Color { rgb: Rgb, transition: Transition },
    /// Set an HSB color directly.
    Hsb { hsv: Hsv, transition: Transition },
    Darker {
        adverb: Option<Adverb>,
        transition: Transition,
    },
    Lighter {
        adverb: Option<Adverb>,
        transition: Transition,
    },
    Status,
}

impl Action {
    #[must_use]
    pub fn verb(&self) -> Verb {
        match self {
            Self::On => Verb::On,
            Self::Off => Verb::Off,
            Self::Save { .. } => Verb::Save,
            Self::Restore { .. } => Verb::Restore,
            Self::Color { .. } => Verb::Color,
            Self::Hsb { .. } => Verb::Hsb,
            Self::Darker { .. } => Verb::Darker,
            Self::Lighter { .. } => Verb::Lighter,
            Self::Status => Verb::Status,
        }
    }

    /// Color to apply for `color` / `hsb`, already converted to HSV.
    #[must_use]
    pub fn hsv(&self) -> Option<Hsv> {
        match self {
            Self::Color { rgb, .. } => Some(rgb_to_hsv(*rgb)),
            Self::Hsb { hsv, .. } => Some(*hsv),
            _ => None,
        }
    }

    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Self::Restore { transition, .. }
            | Self::Color { transition, .. }
            | Self::Hsb { transition, .. }
            | Self::Darker { transition, .. }
            | Self::Lighter { transition, .. } => Some(*transition),
            Self::On | Self::Off | Self::Save { .. } | Self::Status => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Darker {
                adverb: Some(adverb),
                ..
            }
            | Self::Lighter {
                adverb: Some(adverb),
                ..
            } => write!(f, "{adverb} {}", self.verb()),
            Self::Save {
                state_name: Some(name),
            } => write!(f, "save to {name}"),
            Self::Restore {
                state_name: Some(name),
                ..
            } => write!(f, "restore from {name}"),
            _ => write!(f, "{}", self.verb()),
        }
    }
}

/// A compiled command: what to do, to which devices, and the snapshot key
/// derived from the targets as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub targets: TargetSet,
    pub key: CanonicalKey,
}

impl Command {
    #[must_use]
    pub fn new(action: Action, targets: TargetSet) -> Self {
        let key = targets.canonical_key();
        Self {
            action,
            targets,
            key,
        }
    }

    /// Compile an already tokenized command line.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] when the verb is missing or unknown, an
    /// adverb is misplaced, or a required clause is absent or malformed.
    pub fn compile<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        parser::compile(&tokens)
    }

    /// Split a line on whitespace and compile it.
    ///
    /// # Errors
    ///
    /// Same as [`Command::compile`].
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        parser::compile(&tokens)
    }

    #[must_use]
    pub fn verb(&self) -> Verb {
        self.action.verb()
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.action, self.targets)
    }
}
