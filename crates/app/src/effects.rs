//! Action effects: what each verb does to one matched device.
//!
//! Every verb implements [`Effect`]: an optional `initialize` before
//! discovery starts, `run` once per matched device (possibly concurrently
//! with other devices), and an optional `finalize` once the run drains.
//! [`ActionEffect`] picks the implementation for a compiled [`Command`].

mod color;
mod dimming;
mod power;
mod restore;
mod save;
mod status;

use std::fmt;
use std::future::Future;

use lampctl_domain::color::rgb_to_hsv;
use lampctl_domain::command::{Action, Command};
use lampctl_domain::error::LampError;
use lampctl_domain::light::{BulbState, DeviceHandle, Power};
use lampctl_domain::plan::LightCommand;
use lampctl_domain::tuning::Tuning;

use crate::ports::{LightTransport, SnapshotStore};
use crate::query::{QueryPolicy, query_state};
use crate::services::snapshot_service::SnapshotService;

pub use color::ColorEffect;
pub use dimming::{Direction, DimmingEffect};
pub use power::PowerEffect;
pub use restore::RestoreEffect;
pub use save::SaveEffect;
pub use status::StatusEffect;

/// Everything an effect needs to talk to a device.
pub struct EffectContext<T> {
    pub transport: T,
    pub tuning: Tuning,
    pub query: QueryPolicy,
}

impl<T: LightTransport> EffectContext<T> {
    pub fn new(transport: T, tuning: Tuning, query: QueryPolicy) -> Self {
        Self {
            transport,
            tuning,
            query,
        }
    }

    /// Query the current state of `device` under this context's policy.
    ///
    /// # Errors
    ///
    /// See [`query_state`].
    pub async fn current_state(&self, device: &DeviceHandle) -> Result<BulbState, LampError> {
        query_state(&self.transport, device, &self.query).await
    }

    /// Send planned commands in order, stopping at the first failure.
    pub async fn apply(&self, device: &DeviceHandle, commands: Vec<LightCommand>) -> Outcome {
        if commands.is_empty() {
            return Outcome::Unchanged;
        }
        for command in commands {
            if let LightCommand::Power(power) = command {
                tracing::info!(device = %device.label, %power, "switching bulb");
            }
            if let Err(err) = self.transport.send(device, command).await {
                return Outcome::failed(&err);
            }
        }
        Outcome::Applied
    }
}

/// What happened to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Control commands were sent.
    Applied,
    /// The device was already where the verb would put it.
    Unchanged,
    /// State captured for a later save.
    Captured(BulbState),
    /// State read for a status report.
    Status(BulbState),
    /// Nothing to do for this device.
    Skipped(String),
    /// The device could not be handled; the run goes on without it.
    Failed(String),
}

impl Outcome {
    fn failed(err: &LampError) -> Self {
        Self::Failed(error_chain(err))
    }
}

/// `err` followed by every source not already part of its message.
fn error_chain(err: &LampError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Outcome tagged with the device it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub device: DeviceHandle,
    pub outcome: Outcome,
}

impl fmt::Display for DeviceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = &self.device.label;
        match &self.outcome {
            Outcome::Applied => write!(f, "{label}: done"),
            Outcome::Unchanged => write!(f, "{label}: unchanged"),
            Outcome::Captured(_) => write!(f, "{label}: state captured"),
            Outcome::Status(state) => write!(f, "{state}"),
            Outcome::Skipped(reason) => write!(f, "{label}: skipped ({reason})"),
            Outcome::Failed(reason) => write!(f, "{label}: failed ({reason})"),
        }
    }
}

/// A verb's behavior across one run.
pub trait Effect: Send + Sync {
    /// Runs once before discovery starts.
    fn initialize<S: SnapshotStore>(
        &mut self,
        _snapshots: &SnapshotService<S>,
    ) -> impl Future<Output = Result<(), LampError>> + Send {
        async { Ok(()) }
    }

    /// Runs once for each matched device.
    fn run<T: LightTransport>(
        &self,
        ctx: &EffectContext<T>,
        device: &DeviceHandle,
    ) -> impl Future<Output = Outcome> + Send;

    /// Runs once after every dispatched device has finished.
    fn finalize<S: SnapshotStore>(
        &self,
        _snapshots: &SnapshotService<S>,
        _outcomes: &[DeviceOutcome],
    ) -> impl Future<Output = Result<(), LampError>> + Send {
        async { Ok(()) }
    }
}

/// The effect for each verb, selected from a compiled command.
#[derive(Debug, Clone)]
pub enum ActionEffect {
    Power(PowerEffect),
    Color(ColorEffect),
    Dimming(DimmingEffect),
    Save(SaveEffect),
    Restore(RestoreEffect),
    Status(StatusEffect),
}

impl ActionEffect {
    #[must_use]
    pub fn for_command(command: &Command) -> Self {
        match &command.action {
            Action::On => Self::Power(PowerEffect::new(Power::On)),
            Action::Off => Self::Power(PowerEffect::new(Power::Off)),
            Action::Save { state_name } => {
                Self::Save(SaveEffect::new(command.key.clone(), state_name.clone()))
            }
            Action::Restore {
                state_name,
                transition,
            } => Self::Restore(RestoreEffect::new(
                command.key.clone(),
                state_name.clone(),
                *transition,
            )),
            Action::Color { rgb, transition } => {
                Self::Color(ColorEffect::new(rgb_to_hsv(*rgb), *transition))
            }
            Action::Hsb { hsv, transition } => Self::Color(ColorEffect::new(*hsv, *transition)),
            Action::Darker { adverb, transition } => Self::Dimming(DimmingEffect::new(
                Direction::Darker,
                *adverb,
                *transition,
            )),
            Action::Lighter { adverb, transition } => Self::Dimming(DimmingEffect::new(
                Direction::Lighter,
                *adverb,
                *transition,
            )),
            Action::Status => Self::Status(StatusEffect),
        }
    }
}

impl Effect for ActionEffect {
    async fn initialize<S: SnapshotStore>(
        &mut self,
        snapshots: &SnapshotService<S>,
    ) -> Result<(), LampError> {
        match self {
            Self::Restore(effect) => effect.initialize(snapshots).await,
            Self::Power(_) | Self::Color(_) | Self::Dimming(_) | Self::Save(_) | Self::Status(_) => {
                Ok(())
            }
        }
    }

    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        match self {
            Self::Power(effect) => effect.run(ctx, device).await,
            Self::Color(effect) => effect.run(ctx, device).await,
            Self::Dimming(effect) => effect.run(ctx, device).await,
            Self::Save(effect) => effect.run(ctx, device).await,
            Self::Restore(effect) => effect.run(ctx, device).await,
            Self::Status(effect) => effect.run(ctx, device).await,
        }
    }

    async fn finalize<S: SnapshotStore>(
        &self,
        snapshots: &SnapshotService<S>,
        outcomes: &[DeviceOutcome],
    ) -> Result<(), LampError> {
        match self {
            Self::Save(effect) => effect.finalize(snapshots, outcomes).await,
            Self::Power(_)
            | Self::Color(_)
            | Self::Dimming(_)
            | Self::Restore(_)
            | Self::Status(_) => Ok(()),
        }
    }
}
