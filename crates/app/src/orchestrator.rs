//! Device orchestrator: dispatches an effect to every matching device
//! discovered on the network and decides when the run is over.
//!
//! The population of devices is unknown up front, so completion is
//! heuristic: an explicit target list ends the run as soon as every name
//! has been handled; otherwise the run ends once a full idle interval
//! passes with no new matching device and nothing in flight.
//!
//! All bookkeeping lives in [`RunSession`], owned by a single control loop;
//! per-device effects run as spawned tasks and report back through a
//! [`JoinSet`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::StreamExt;

use lampctl_domain::error::LampError;
use lampctl_domain::id::DeviceId;
use lampctl_domain::light::DeviceHandle;
use lampctl_domain::target::TargetSet;

use crate::effects::{DeviceOutcome, Effect, EffectContext};
use crate::ports::LightTransport;

/// Dedup, matching and liveness state of one run.
#[derive(Debug)]
pub struct RunSession {
    seen: HashSet<DeviceId>,
    working: TargetSet,
    in_flight: usize,
    active: bool,
}

impl RunSession {
    /// Start a session for `targets`; the liveness flag starts raised.
    #[must_use]
    pub fn new(targets: TargetSet) -> Self {
        Self {
            seen: HashSet::new(),
            working: targets,
            in_flight: 0,
            active: true,
        }
    }

    /// Decide whether a discovered device gets dispatched.
    ///
    /// A device is admitted at most once, and only if it is still in the
    /// working target set; admitting it removes it from an explicit list.
    pub fn admit(&mut self, device: &DeviceHandle) -> bool {
        if !self.seen.insert(device.id) {
            return false;
        }
        if !self.working.take(&device.label) {
            return false;
        }
        self.active = true;
        self.in_flight += 1;
        true
    }

    /// Record a finished dispatch. Returns `true` when an explicit target
    /// list has been fully handled.
    pub fn complete(&mut self) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.working.is_exhausted()
    }

    /// Periodic idle check. Returns `true` when nothing happened since the
    /// previous check and no dispatch is in flight; otherwise lowers the
    /// liveness flag for the next interval.
    pub fn idle_check(&mut self) -> bool {
        if !self.active && self.in_flight == 0 {
            return true;
        }
        self.active = false;
        false
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Explicit names never matched so far.
    #[must_use]
    pub fn unmatched(&self) -> &[String] {
        self.working.remaining()
    }
}

/// Result of one orchestrated run, before finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub outcomes: Vec<DeviceOutcome>,
    pub unmatched: Vec<String>,
}

/// Drives discovery and per-device dispatch for one command.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    idle_interval: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

/// Shortest idle interval a run accepts; a zero period cannot tick.
const MIN_IDLE_INTERVAL: Duration = Duration::from_millis(1);

impl Orchestrator {
    /// Orchestrator checking for idleness every `idle_interval`, clamped to
    /// at least one millisecond.
    #[must_use]
    pub fn new(idle_interval: Duration) -> Self {
        Self {
            idle_interval: idle_interval.max(MIN_IDLE_INTERVAL),
        }
    }

    #[must_use]
    pub fn idle_interval(&self) -> Duration {
        self.idle_interval
    }

    /// Run `effect` on every device matching `targets` until the run completes.
    ///
    /// Per-device failures are reported in the outcomes and never abort the
    /// run. Discovery is stopped and every dispatched effect has finished
    /// when this returns.
    ///
    /// # Errors
    ///
    /// Returns a transport error if discovery cannot be started.
    pub async fn run<T, E>(
        &self,
        ctx: Arc<EffectContext<T>>,
        effect: Arc<E>,
        targets: &TargetSet,
    ) -> Result<RunResult, LampError>
    where
        T: LightTransport + 'static,
        E: Effect + 'static,
    {
        let mut discovery = ctx.transport.start_discovery().await?;
        let mut session = RunSession::new(targets.clone());
        let mut tasks: JoinSet<DeviceOutcome> = JoinSet::new();
        let mut outcomes = Vec::new();

        let mut idle = time::interval_at(Instant::now() + self.idle_interval, self.idle_interval);
        idle.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut discovering = true;

        loop {
            tokio::select! {
                announced = discovery.next(), if discovering => {
                    let Some(device) = announced else {
                        tracing::debug!("discovery stream ended");
                        discovering = false;
                        continue;
                    };
                    if !session.admit(&device) {
                        tracing::debug!(device = %device, "ignoring device");
                        continue;
                    }
                    tracing::info!(device = %device.label, "running action on device");
                    let ctx = Arc::clone(&ctx);
                    let effect = Arc::clone(&effect);
                    tasks.spawn(async move {
                        let outcome = effect.run(&ctx, &device).await;
                        DeviceOutcome { device, outcome }
                    });
                }
                Some(joined) = tasks.join_next() => {
                    match joined {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(err) => tracing::warn!(error = %err, "device task aborted"),
                    }
                    if session.complete() {
                        tracing::debug!("every named target handled");
                        break;
                    }
                }
                _ = idle.tick() => {
                    if session.idle_check() {
                        tracing::debug!(interval = ?self.idle_interval, "no activity within idle interval");
                        break;
                    }
                }
            }
        }

        // draining
        drop(idle);
        if let Err(err) = ctx.transport.stop_discovery().await {
            tracing::warn!(error = %err, "failed to stop discovery");
        }
        drop(discovery);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => tracing::warn!(error = %err, "device task aborted"),
            }
        }

        let unmatched = session.unmatched().to_vec();
        for name in &unmatched {
            tracing::warn!(device = %name, "target never discovered");
        }
        Ok(RunResult {
            outcomes,
            unmatched,
        })
    }
}
