use crate::error::CommandError;
use crate::target::TargetSet;

use super::params::{Transition, hsb_clause, position, rgb_clause, word_after};
use super::verb::{Adverb, Verb};
use super::{Action, Command};

pub(super) fn compile(tokens: &[&str]) -> Result<Command, CommandError> {
    let first = tokens.first().ok_or(CommandError::Empty)?;

    let (adverb, cursor) = match Adverb::from_token(first) {
        Some(adverb) => {
            if tokens.len() < 2 {
                return Err(CommandError::MissingVerb((*first).to_string()));
            }
            (Some(adverb), 1)
        }
        None => (None, 0),
    };

    let verb_token = tokens[cursor];
    let verb = Verb::from_token(verb_token)
        .ok_or_else(|| CommandError::UnknownVerb(verb_token.to_string()))?;

    if let Some(adverb) = adverb
        && !verb.accepts_adverb()
    {
        return Err(CommandError::AdverbNotApplicable {
            adverb: adverb.name(),
            verb: verb.name(),
        });
    }

    let action = parse_action(verb, adverb, tokens)?;
    let targets = parse_targets(tokens, cursor + 1, verb.noun_stopper());
    Ok(Command::new(action, targets))
}

fn parse_action(
    verb: Verb,
    adverb: Option<Adverb>,
    tokens: &[&str],
) -> Result<Action, CommandError> {
    let transition = Transition::from_tokens(tokens);
    let action = match verb {
        Verb::On => Action::On,
        Verb::Off => Action::Off,
        Verb::Status => Action::Status,
        Verb::Save => Action::Save {
            state_name: word_after(tokens, "to").map(str::to_string),
        },
        Verb::Restore => Action::Restore {
            state_name: word_after(tokens, "from").map(str::to_string),
            transition,
        },
        Verb::Color => Action::Color {
            rgb: rgb_clause(tokens)?,
            transition,
        },
        Verb::Hsb => Action::Hsb {
            hsv: hsb_clause(tokens)?,
            transition,
        },
        Verb::Darker => Action::Darker { adverb, transition },
        Verb::Lighter => Action::Lighter { adverb, transition },
    };
    Ok(action)
}

/// Names between the verb and the first stopper.
///
/// An empty span, or one opening with `all`, targets every device. Only the
/// leading position is checked for `all`.
fn parse_targets(tokens: &[&str], start: usize, stopper: Option<&str>) -> TargetSet {
    let stop = stopper
        .and_then(|s| position(tokens, s))
        .unwrap_or(tokens.len())
        .max(start);
    let span = &tokens[start.min(tokens.len())..stop];

    match span.first() {
        None => TargetSet::All,
        Some(first) if first.eq_ignore_ascii_case("all") => TargetSet::All,
        Some(_) => TargetSet::named(
            span.iter()
                .filter(|t| !t.eq_ignore_ascii_case("and"))
                .copied(),
        ),
    }
}
