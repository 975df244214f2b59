//! Light transport port: discovery, control and state reports.
//!
//! A transport bridges a network protocol (LIFX LAN, a simulation, …) into
//! lampctl. Discovery hands out [`DeviceHandle`]s as devices announce
//! themselves; state requests are answered asynchronously through the
//! [`subscribe_states`](LightTransport::subscribe_states) channel, correlated
//! by device id.

use std::future::Future;

use tokio::sync::broadcast;
use tokio_stream::wrappers::ReceiverStream;

use lampctl_domain::error::LampError;
use lampctl_domain::light::{DeviceHandle, Hsbk, Power, StateReport};
use lampctl_domain::plan::LightCommand;

/// Devices announced by a running discovery, in arrival order.
///
/// The same device may be announced more than once.
pub type DiscoveryStream = ReceiverStream<DeviceHandle>;

/// Sends control and query messages to lights and reports what they say.
pub trait LightTransport: Send + Sync {
    /// Begin announcing devices. Ends (or stalls) once [`stop_discovery`](Self::stop_discovery) is called.
    fn start_discovery(&self) -> impl Future<Output = Result<DiscoveryStream, LampError>> + Send;

    /// Stop announcing devices and release discovery resources.
    fn stop_discovery(&self) -> impl Future<Output = Result<(), LampError>> + Send;

    /// Switch a device on or off.
    fn set_power(
        &self,
        device: &DeviceHandle,
        power: Power,
    ) -> impl Future<Output = Result<(), LampError>> + Send;

    /// Set color, brightness and temperature with a transition time.
    fn set_color(
        &self,
        device: &DeviceHandle,
        color: Hsbk,
        transition_ms: u32,
    ) -> impl Future<Output = Result<(), LampError>> + Send;

    /// Ask exactly one device to report its state. The answer arrives on
    /// [`subscribe_states`](Self::subscribe_states), not as a return value.
    fn request_state(&self, device: &DeviceHandle)
    -> impl Future<Output = Result<(), LampError>> + Send;

    /// Receive every state report published after this call.
    fn subscribe_states(&self) -> broadcast::Receiver<StateReport>;

    /// Convenience: send one planned [`LightCommand`].
    fn send(
        &self,
        device: &DeviceHandle,
        command: LightCommand,
    ) -> impl Future<Output = Result<(), LampError>> + Send {
        async move {
            match command {
                LightCommand::Power(power) => self.set_power(device, power).await,
                LightCommand::Color {
                    color,
                    transition_ms,
                } => self.set_color(device, color, transition_ms).await,
            }
        }
    }
}
