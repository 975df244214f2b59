use lampctl_domain::light::DeviceHandle;

use super::{Effect, EffectContext, Outcome};
use crate::ports::LightTransport;

/// `status`: read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEffect;

impl Effect for StatusEffect {
    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        match ctx.current_state(device).await {
            Ok(state) => {
                tracing::info!(
                    device = %device.label,
                    power = %state.power,
                    hue = state.hue,
                    saturation = state.saturation,
                    brightness = state.brightness,
                    kelvin = state.kelvin,
                    transition_ms = state.transition_ms,
                    "bulb status"
                );
                Outcome::Status(state)
            }
            Err(err) => Outcome::failed(&err),
        }
    }
}
