use std::collections::HashMap;

use lampctl_domain::command::Transition;
use lampctl_domain::error::LampError;
use lampctl_domain::light::{BulbState, DeviceHandle};
use lampctl_domain::plan::plan_restore;
use lampctl_domain::target::CanonicalKey;

use super::{Effect, EffectContext, Outcome};
use crate::ports::{LightTransport, SnapshotStore};
use crate::services::snapshot_service::SnapshotService;

/// `restore`: re-apply saved states, matched to devices by exact label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreEffect {
    key: CanonicalKey,
    state_name: Option<String>,
    transition: Transition,
    saved: Option<HashMap<String, BulbState>>,
}

impl RestoreEffect {
    #[must_use]
    pub fn new(key: CanonicalKey, state_name: Option<String>, transition: Transition) -> Self {
        Self {
            key,
            state_name,
            transition,
            saved: None,
        }
    }
}

impl Effect for RestoreEffect {
    async fn initialize<S: SnapshotStore>(
        &mut self,
        snapshots: &SnapshotService<S>,
    ) -> Result<(), LampError> {
        let states = snapshots
            .load_states(&self.key, self.state_name.as_deref())
            .await?;
        match states {
            Some(states) => {
                self.saved = Some(
                    states
                        .into_iter()
                        .map(|state| (state.label.clone(), state))
                        .collect(),
                );
            }
            None => {
                tracing::warn!(
                    key = %self.key,
                    state = self.state_name.as_deref().unwrap_or("default"),
                    "saved state not found, cannot restore"
                );
            }
        }
        Ok(())
    }

    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        let Some(saved) = &self.saved else {
            return Outcome::Skipped("nothing to restore".to_string());
        };
        let Some(target) = saved.get(&device.label) else {
            return Outcome::Skipped("no saved state for this bulb".to_string());
        };
        let current = match ctx.current_state(device).await {
            Ok(state) => state,
            Err(err) => return Outcome::failed(&err),
        };
        ctx.apply(device, plan_restore(&current, target, self.transition))
            .await
    }
}
