//! Simulated bulb: holds a state, applies control messages, answers queries.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lampctl_domain::id::DeviceId;
use lampctl_domain::light::{BulbState, DeviceHandle};
use lampctl_domain::plan::LightCommand;

use crate::config::VirtualBulbConfig;

pub(crate) struct VirtualBulb {
    handle: DeviceHandle,
    announce_after: Duration,
    announcements: u32,
    latency: Duration,
    state: Mutex<BulbState>,
    ignore_left: Mutex<u32>,
}

impl VirtualBulb {
    pub(crate) fn new(id: DeviceId, config: &VirtualBulbConfig) -> Self {
        let state = BulbState {
            label: config.label.clone(),
            power: config.power,
            hue: config.hue,
            saturation: config.saturation,
            brightness: config.brightness,
            kelvin: config.kelvin,
            transition_ms: 0,
        };
        Self {
            handle: DeviceHandle::new(id, config.label.clone()),
            announce_after: Duration::from_millis(config.announce_after_ms),
            announcements: config.announcements,
            latency: Duration::from_millis(config.latency_ms),
            state: Mutex::new(state),
            ignore_left: Mutex::new(config.ignore_requests),
        }
    }

    pub(crate) fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    pub(crate) fn latency(&self) -> Duration {
        self.latency
    }

    /// Offsets from discovery start at which this bulb announces itself.
    pub(crate) fn announce_schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.announcements).map(|n| self.announce_after * n)
    }

    pub(crate) fn state(&self) -> BulbState {
        self.lock_state().clone()
    }

    pub(crate) fn apply(&self, command: LightCommand) {
        command.apply_to(&mut self.lock_state());
    }

    /// Consume one state request; `false` while requests are still dropped.
    pub(crate) fn take_request(&self) -> bool {
        let mut left = self
            .ignore_left
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *left == 0 {
            true
        } else {
            *left -= 1;
            false
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, BulbState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
