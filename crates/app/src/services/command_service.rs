//! Command service: compiles command lines and runs them across the network.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use lampctl_domain::command::Command;
use lampctl_domain::error::LampError;

use crate::effects::{ActionEffect, Effect, EffectContext};
use crate::orchestrator::Orchestrator;
use crate::ports::{LightTransport, SnapshotStore};
use crate::report::RunSummary;
use crate::services::snapshot_service::SnapshotService;

/// Exclusive right to run one command. Released on drop.
#[derive(Debug)]
pub struct RunPermit {
    _guard: OwnedMutexGuard<()>,
}

/// Application service running one command at a time.
pub struct CommandService<T, S> {
    context: Arc<EffectContext<T>>,
    snapshots: SnapshotService<S>,
    orchestrator: Orchestrator,
    run_lock: Arc<Mutex<()>>,
}

impl<T, S> CommandService<T, S>
where
    T: LightTransport + 'static,
    S: SnapshotStore,
{
    /// Create a new service from its collaborators.
    pub fn new(
        context: EffectContext<T>,
        snapshots: SnapshotService<S>,
        orchestrator: Orchestrator,
    ) -> Self {
        Self {
            context: Arc::new(context),
            snapshots,
            orchestrator,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The transport commands are sent through.
    pub fn transport(&self) -> &T {
        &self.context.transport
    }

    /// Compile a tokenized command line.
    ///
    /// # Errors
    ///
    /// Returns [`LampError::Command`] when the line does not compile.
    pub fn compile<I: AsRef<str>>(&self, tokens: &[I]) -> Result<Command, LampError> {
        Ok(Command::compile(tokens)?)
    }

    /// Take the run lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`LampError::Busy`] while another run holds the lock.
    pub fn reserve(&self) -> Result<RunPermit, LampError> {
        let guard = Arc::clone(&self.run_lock)
            .try_lock_owned()
            .map_err(|_| LampError::Busy)?;
        Ok(RunPermit { _guard: guard })
    }

    /// Whether a run currently holds the lock.
    pub fn is_busy(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Compile and execute a tokenized command line.
    ///
    /// # Errors
    ///
    /// See [`compile`](Self::compile) and [`execute`](Self::execute).
    pub async fn run<I: AsRef<str>>(&self, tokens: &[I]) -> Result<RunSummary, LampError> {
        let command = self.compile(tokens)?;
        self.execute(command).await
    }

    /// Execute a compiled command, failing fast if another run is active.
    ///
    /// # Errors
    ///
    /// Returns [`LampError::Busy`] when another run is active, or the errors
    /// of [`execute_with`](Self::execute_with).
    pub async fn execute(&self, command: Command) -> Result<RunSummary, LampError> {
        let permit = self.reserve()?;
        self.execute_with(permit, command).await
    }

    /// Execute a compiled command under an already reserved permit.
    ///
    /// Per-device failures end up in the summary; only failures that make
    /// the whole run meaningless are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns a storage error if snapshots cannot be read or written, or a
    /// transport error if discovery cannot start.
    #[tracing::instrument(skip_all, fields(action = %command.action, targets = %command.targets))]
    pub async fn execute_with(
        &self,
        permit: RunPermit,
        command: Command,
    ) -> Result<RunSummary, LampError> {
        let started = Instant::now();
        tracing::info!("starting action");

        let mut effect = ActionEffect::for_command(&command);
        effect.initialize(&self.snapshots).await?;
        let effect = Arc::new(effect);

        let result = self
            .orchestrator
            .run(Arc::clone(&self.context), Arc::clone(&effect), &command.targets)
            .await?;

        effect.finalize(&self.snapshots, &result.outcomes).await?;
        tracing::info!(devices = result.outcomes.len(), "finishing action");
        drop(permit);

        Ok(RunSummary {
            verb: command.verb(),
            targets: command.targets,
            outcomes: result.outcomes,
            unmatched: result.unmatched,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lampctl_domain::error::CommandError;
    use lampctl_domain::light::Power;
    use lampctl_domain::target::TargetSet;
    use lampctl_domain::tuning::Tuning;

    use crate::effects::Outcome;
    use crate::effects::testing::{Announcement, FakeTransport, MemoryStore, bulb, handle};
    use crate::query::QueryPolicy;

    fn service(transport: &FakeTransport, store: &MemoryStore) -> CommandService<FakeTransport, MemoryStore> {
        CommandService::new(
            EffectContext::new(transport.clone(), Tuning::default(), QueryPolicy::default()),
            SnapshotService::new(store.clone()),
            Orchestrator::default(),
        )
    }

    fn house() -> FakeTransport {
        let kitchen = handle(1, "Kitchen");
        let hall = handle(2, "Hall");
        FakeTransport::new(vec![
            Announcement {
                delay: Duration::from_millis(10),
                device: kitchen.clone(),
            },
            Announcement {
                delay: Duration::from_millis(10),
                device: hall.clone(),
            },
        ])
        .with_state(&kitchen, bulb("Kitchen", Power::On, 0x8000))
        .with_state(&hall, bulb("Hall", Power::Off, 0x4000))
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_bad_command_before_discovery() {
        let transport = house();
        let service = service(&transport, &MemoryStore::default());

        let err = service.run(&["dance", "Kitchen"]).await.unwrap_err();

        assert!(matches!(err, LampError::Command(CommandError::UnknownVerb(_))));
        assert_eq!(transport.discovery_counts(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_verb_on_named_device_only() {
        let transport = house();
        let service = service(&transport, &MemoryStore::default());

        let summary = service.run(&["off", "kitchen"]).await.unwrap();

        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].device.label, "Kitchen");
        assert_eq!(transport.state_of(&handle(1, "Kitchen")).unwrap().power, Power::Off);
        assert_eq!(transport.state_of(&handle(2, "Hall")).unwrap().power, Power::Off);
        assert!(summary.to_string().ends_with("finished off"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_roundtrip_save_and_restore() {
        let transport = house();
        let store = MemoryStore::default();
        let service = service(&transport, &store);
        let before = (
            transport.state_of(&handle(1, "Kitchen")).unwrap(),
            transport.state_of(&handle(2, "Hall")).unwrap(),
        );

        service.run(&["save", "Kitchen", "and", "Hall", "to", "Dinner"]).await.unwrap();
        service.run(&["much", "lighter", "Kitchen", "Hall"]).await.unwrap();
        assert_ne!(transport.state_of(&handle(2, "Hall")).unwrap(), before.1);

        let summary = service
            .run(&["restore", "Kitchen", "Hall", "from", "Dinner", "quickly"])
            .await
            .unwrap();

        assert!(summary.outcomes.iter().all(|o| o.outcome == Outcome::Applied));
        assert_eq!(transport.state_of(&handle(1, "Kitchen")).unwrap(), before.0);
        assert_eq!(transport.state_of(&handle(2, "Hall")).unwrap(), before.1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_persist_under_original_target_key() {
        let transport = house();
        let store = MemoryStore::default();
        let service = service(&transport, &store);

        service.run(&["save", "Kitchen", "Hall"]).await.unwrap();

        let key = TargetSet::named(["Kitchen", "Hall"]).canonical_key();
        let document = store.document.lock().unwrap().clone();
        let saved = document.lookup(&key, None).unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_restore_nothing_without_snapshot() {
        let transport = house();
        let service = service(&transport, &MemoryStore::default());

        let summary = service.run(&["restore", "from", "Nowhere"]).await.unwrap();

        assert!(summary.outcomes.iter().all(|o| matches!(o.outcome, Outcome::Skipped(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_refuse_concurrent_runs() {
        let transport = house();
        let service = service(&transport, &MemoryStore::default());

        let permit = service.reserve().unwrap();
        assert!(service.is_busy());
        let err = service.run(&["on"]).await.unwrap_err();
        assert!(matches!(err, LampError::Busy));

        drop(permit);
        assert!(!service.is_busy());
        service.run(&["on", "Hall"]).await.unwrap();
    }
}
