//! Human-readable summary of one command run.

use std::fmt;
use std::time::Duration;

use lampctl_domain::command::Verb;
use lampctl_domain::target::TargetSet;

use crate::effects::{DeviceOutcome, Outcome};

/// What a finished run did, device by device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub verb: Verb,
    pub targets: TargetSet,
    pub outcomes: Vec<DeviceOutcome>,
    pub unmatched: Vec<String>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of devices whose effect failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed(_)))
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        for name in &self.unmatched {
            writeln!(f, "{name}: not found")?;
        }
        write!(f, "finished {}", self.verb)
    }
}
