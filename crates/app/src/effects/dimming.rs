use lampctl_domain::command::{Adverb, Transition};
use lampctl_domain::light::DeviceHandle;
use lampctl_domain::plan::{plan_darker, plan_lighter};

use super::{Effect, EffectContext, Outcome};
use crate::ports::LightTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Darker,
    Lighter,
}

/// `darker` / `lighter`: one brightness step from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimmingEffect {
    direction: Direction,
    adverb: Option<Adverb>,
    transition: Transition,
}

impl DimmingEffect {
    #[must_use]
    pub fn new(direction: Direction, adverb: Option<Adverb>, transition: Transition) -> Self {
        Self {
            direction,
            adverb,
            transition,
        }
    }
}

impl Effect for DimmingEffect {
    async fn run<T: LightTransport>(&self, ctx: &EffectContext<T>, device: &DeviceHandle) -> Outcome {
        let current = match ctx.current_state(device).await {
            Ok(state) => state,
            Err(err) => return Outcome::failed(&err),
        };
        let commands = match self.direction {
            Direction::Darker => plan_darker(&current, self.adverb, self.transition, &ctx.tuning),
            Direction::Lighter => plan_lighter(&current, self.adverb, self.transition, &ctx.tuning),
        };
        ctx.apply(device, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{FakeTransport, bulb, handle};
    use crate::query::QueryPolicy;
    use lampctl_domain::light::Power;
    use lampctl_domain::tuning::Tuning;

    fn context(transport: &FakeTransport) -> EffectContext<FakeTransport> {
        EffectContext::new(transport.clone(), Tuning::default(), QueryPolicy::default())
    }

    #[tokio::test]
    async fn should_dim_by_much_step() {
        let device = handle(1, "Kitchen");
        let transport =
            FakeTransport::new(vec![]).with_state(&device, bulb("Kitchen", Power::On, 0xffff));

        let effect = DimmingEffect::new(Direction::Darker, Some(Adverb::Much), Transition::NORMAL);
        let outcome = effect.run(&context(&transport), &device).await;

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            transport.state_of(&device).unwrap().brightness,
            0xffff - 0x50 * 255
        );
    }

    #[tokio::test]
    async fn should_switch_off_when_too_dark() {
        let device = handle(1, "Kitchen");
        let transport =
            FakeTransport::new(vec![]).with_state(&device, bulb("Kitchen", Power::On, 600));

        let effect = DimmingEffect::new(Direction::Darker, Some(Adverb::Little), Transition::NORMAL);
        effect.run(&context(&transport), &device).await;

        assert_eq!(transport.state_of(&device).unwrap().power, Power::Off);
    }

    #[tokio::test]
    async fn should_report_unchanged_for_full_bulb() {
        let device = handle(1, "Kitchen");
        let transport =
            FakeTransport::new(vec![]).with_state(&device, bulb("Kitchen", Power::On, 0xffff));

        let effect = DimmingEffect::new(Direction::Lighter, None, Transition::NORMAL);
        let outcome = effect.run(&context(&transport), &device).await;

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn should_power_on_when_lightening_off_bulb() {
        let device = handle(1, "Kitchen");
        let transport =
            FakeTransport::new(vec![]).with_state(&device, bulb("Kitchen", Power::Off, 0));

        let effect = DimmingEffect::new(Direction::Lighter, None, Transition::QUICK);
        effect.run(&context(&transport), &device).await;

        let state = transport.state_of(&device).unwrap();
        assert_eq!(state.power, Power::On);
        assert_eq!(state.brightness, 0x20 * 255);
    }
}
