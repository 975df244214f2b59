use lampctl_domain::light::{DeviceHandle, Power};
use lampctl_domain::plan::LightCommand;

use super::{Effect, EffectContext, Outcome};
use crate::ports::LightTransport;

/// `on` / `off`: unconditional, no state read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerEffect {
    power: Power,
}

impl PowerEffect {
    #[must_use]
    pub fn new(power: Power) -> Self {
        Self { power }
    }
}

impl Effect for PowerEffect {
    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        ctx.apply(device, vec![LightCommand::Power(self.power)]).await
    }
}
