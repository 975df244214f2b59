use lampctl_domain::color::Hsv;
use lampctl_domain::command::Transition;
use lampctl_domain::light::DeviceHandle;
use lampctl_domain::plan::plan_color;

use super::{Effect, EffectContext, Outcome};
use crate::ports::LightTransport;

/// `color` / `hsb`: apply a resolved HSV color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorEffect {
    hsv: Hsv,
    transition: Transition,
}

impl ColorEffect {
    #[must_use]
    pub fn new(hsv: Hsv, transition: Transition) -> Self {
        Self { hsv, transition }
    }

    #[must_use]
    pub fn hsv(&self) -> Hsv {
        self.hsv
    }
}

impl Effect for ColorEffect {
    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        let current = match ctx.current_state(device).await {
            Ok(state) => state,
            Err(err) => return Outcome::failed(&err),
        };
        if self.hsv.brightness() < ctx.tuning.turn_off_level {
            tracing::debug!(device = %device.label, "requested color is below the turn-off level");
        }
        let commands = plan_color(&current, self.hsv, self.transition, &ctx.tuning);
        ctx.apply(device, commands).await
    }
}
