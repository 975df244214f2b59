//! Target sets: which devices a command applies to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The devices a command should act upon.
///
/// Names keep the spelling and order of first mention; matching against
/// discovered labels ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSet {
    All,
    Named(Vec<String>),
}

impl TargetSet {
    /// Build an explicit set, collapsing case-insensitive duplicates.
    ///
    /// An empty iterator yields [`TargetSet::All`].
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                unique.push(name);
            }
        }
        if unique.is_empty() {
            Self::All
        } else {
            Self::Named(unique)
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a discovered label is in scope.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.iter().any(|n| n.eq_ignore_ascii_case(label)),
        }
    }

    /// Remove a matched label from an explicit set. Returns whether it was in scope.
    ///
    /// `All` is never narrowed.
    pub fn take(&mut self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => {
                match names.iter().position(|n| n.eq_ignore_ascii_case(label)) {
                    Some(index) => {
                        names.remove(index);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// An explicit set with every name matched. Never true for `All`.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match self {
            Self::All => false,
            Self::Named(names) => names.is_empty(),
        }
    }

    /// Names still waiting to be matched.
    #[must_use]
    pub fn remaining(&self) -> &[String] {
        match self {
            Self::All => &[],
            Self::Named(names) => names,
        }
    }

    /// Persistence key for this set.
    ///
    /// `all` for [`TargetSet::All`]; otherwise each name with `_` doubled,
    /// followed by a single `_`.
    #[must_use]
    pub fn canonical_key(&self) -> CanonicalKey {
        match self {
            Self::All => CanonicalKey("all".to_string()),
            Self::Named(names) => {
                let mut key = String::new();
                for name in names {
                    key.push_str(&name.replace('_', "__"));
                    key.push('_');
                }
                CanonicalKey(key)
            }
        }
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(names) => f.write_str(&names.join(", ")),
        }
    }
}

/// Identity of a target set in the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.0
    }
}
