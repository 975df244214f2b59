//! # lampctl-adapter-virtual
//!
//! Virtual/demo transport providing simulated bulbs for demonstration and
//! testing.
//!
//! ## Behaviour
//!
//! | Knob | Effect |
//! |------|--------|
//! | `announce_after_ms` | delay before (and between) discovery announcements |
//! | `announcements` | how many times the bulb is announced per discovery |
//! | `latency_ms` | delay before a state request is answered |
//! | `ignore_requests` | number of state requests dropped before answering |
//!
//! Every control message is applied to the bulb's state and recorded, so
//! callers can inspect what a run did.
//!
//! ## Dependency rule
//!
//! Depends on `lampctl-app` (port traits) and `lampctl-domain` only.

mod bulb;
mod config;
mod error;

pub use config::{VirtualBulbConfig, VirtualConfig};
pub use error::VirtualError;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use lampctl_app::ports::{DiscoveryStream, LightTransport};
use lampctl_domain::error::LampError;
use lampctl_domain::id::DeviceId;
use lampctl_domain::light::{BulbState, DeviceHandle, Hsbk, Power, StateReport};
use lampctl_domain::plan::LightCommand;

use bulb::VirtualBulb;

/// A control message the transport received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCall {
    pub device: DeviceHandle,
    pub command: LightCommand,
}

struct Inner {
    bulbs: Vec<VirtualBulb>,
    reports: broadcast::Sender<StateReport>,
    calls: Mutex<Vec<ControlCall>>,
    discovery: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self
            .discovery
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

/// Light transport backed by simulated bulbs. Cheap to clone.
#[derive(Clone)]
pub struct VirtualTransport {
    inner: Arc<Inner>,
}

impl Default for VirtualTransport {
    fn default() -> Self {
        Self::new(&VirtualConfig::default())
    }
}

impl VirtualTransport {
    /// Create the bulbs described by `config`, numbered from `00:…:01`.
    #[must_use]
    pub fn new(config: &VirtualConfig) -> Self {
        let bulbs = (1u64..)
            .zip(&config.bulbs)
            .map(|(raw, bulb)| VirtualBulb::new(DeviceId::from_raw(raw), bulb))
            .collect();
        let (reports, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                bulbs,
                reports,
                calls: Mutex::new(Vec::new()),
                discovery: Mutex::new(None),
            }),
        }
    }

    /// Handles of every simulated bulb.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceHandle> {
        self.inner.bulbs.iter().map(|b| b.handle().clone()).collect()
    }

    /// Current state of the bulb with this exact label.
    #[must_use]
    pub fn state_of(&self, label: &str) -> Option<BulbState> {
        self.inner
            .bulbs
            .iter()
            .find(|b| b.handle().label == label)
            .map(VirtualBulb::state)
    }

    /// Every control message received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ControlCall> {
        self.lock_calls().clone()
    }

    /// Whether a discovery is currently announcing bulbs.
    #[must_use]
    pub fn is_discovering(&self) -> bool {
        self.lock_discovery().is_some()
    }

    fn bulb(&self, device: &DeviceHandle) -> Result<usize, VirtualError> {
        self.inner
            .bulbs
            .iter()
            .position(|b| b.handle().id == device.id)
            .ok_or_else(|| VirtualError::UnknownDevice(device.label.clone()))
    }

    fn control(&self, device: &DeviceHandle, command: LightCommand) -> Result<(), LampError> {
        let index = self.bulb(device)?;
        self.inner.bulbs[index].apply(command);
        self.lock_calls().push(ControlCall {
            device: device.clone(),
            command,
        });
        tracing::debug!(device = %device.label, ?command, "virtual bulb updated");
        Ok(())
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<ControlCall>> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_discovery(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .discovery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl LightTransport for VirtualTransport {
    async fn start_discovery(&self) -> Result<DiscoveryStream, LampError> {
        let mut schedule: Vec<(Duration, DeviceHandle)> = self
            .inner
            .bulbs
            .iter()
            .flat_map(|b| b.announce_schedule().map(|at| (at, b.handle().clone())))
            .collect();
        schedule.sort_by_key(|(at, _)| *at);

        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            for (at, device) in schedule {
                tokio::time::sleep_until(started + at).await;
                if tx.send(device).await.is_err() {
                    return;
                }
            }
            tx.closed().await;
        });

        if let Some(previous) = self.lock_discovery().replace(task) {
            previous.abort();
        }
        tracing::debug!(bulbs = self.inner.bulbs.len(), "virtual discovery started");
        Ok(DiscoveryStream::new(rx))
    }

    async fn stop_discovery(&self) -> Result<(), LampError> {
        if let Some(task) = self.lock_discovery().take() {
            task.abort();
            tracing::debug!("virtual discovery stopped");
        }
        Ok(())
    }

    async fn set_power(&self, device: &DeviceHandle, power: Power) -> Result<(), LampError> {
        self.control(device, LightCommand::Power(power))
    }

    async fn set_color(
        &self,
        device: &DeviceHandle,
        color: Hsbk,
        transition_ms: u32,
    ) -> Result<(), LampError> {
        self.control(
            device,
            LightCommand::Color {
                color,
                transition_ms,
            },
        )
    }

    async fn request_state(&self, device: &DeviceHandle) -> Result<(), LampError> {
        let index = self.bulb(device)?;
        if !self.inner.bulbs[index].take_request() {
            tracing::debug!(device = %device.label, "virtual bulb ignored state request");
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let bulb = &inner.bulbs[index];
            tokio::time::sleep(bulb.latency()).await;
            let _ = inner.reports.send(StateReport {
                device: bulb.handle().id,
                state: bulb.state(),
            });
        });
        Ok(())
    }

    fn subscribe_states(&self) -> broadcast::Receiver<StateReport> {
        self.inner.reports.subscribe()
    }
}
