use lampctl_domain::error::LampError;
use lampctl_domain::light::DeviceHandle;
use lampctl_domain::target::CanonicalKey;

use super::{DeviceOutcome, Effect, EffectContext, Outcome};
use crate::ports::{LightTransport, SnapshotStore};
use crate::services::snapshot_service::SnapshotService;

/// `save`: capture each device's state, persist them together at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEffect {
    key: CanonicalKey,
    state_name: Option<String>,
}

impl SaveEffect {
    #[must_use]
    pub fn new(key: CanonicalKey, state_name: Option<String>) -> Self {
        Self { key, state_name }
    }
}

impl Effect for SaveEffect {
    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        match ctx.current_state(device).await {
            Ok(state) => Outcome::Captured(state),
            Err(err) => Outcome::failed(&err),
        }
    }

    async fn finalize<S: SnapshotStore>(
        &self,
        snapshots: &SnapshotService<S>,
        outcomes: &[DeviceOutcome],
    ) -> Result<(), LampError> {
        let states: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                Outcome::Captured(state) => Some(state.clone()),
                _ => None,
            })
            .collect();

        if states.is_empty() {
            tracing::warn!(key = %self.key, "no bulb state captured, nothing saved");
            return Ok(());
        }

        snapshots
            .store_states(self.key.clone(), self.state_name.clone(), states)
            .await
    }
}
