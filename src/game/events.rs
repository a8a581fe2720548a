use serde::{Deserialize, Serialize};

use super::error::RuntimeError;
use super::query::{matches_any, Query};
use super::selection::{select_weighted_by, RandomSource};
use super::state::{EventCardId, WorldState};

/// A probabilistic trigger that interrupts the deck with a scripted event chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldEvent {
    pub probability: f64,
    pub is_available_when: Vec<Query>,
    pub initial_event_card_id: EventCardId,
}

impl WorldEvent {
    pub fn is_eligible(&self, world: &WorldState) -> bool {
        matches_any(world, &self.is_available_when)
    }
}

/// Decides whether an event starts this tick.
///
/// Matching events are narrowed to one with a uniform pick, then that single
/// event must pass its own probability roll (`rng() <= probability`). Both
/// draws come from `rng`, selection first. No match means no draw at all.
pub fn evaluate_event_trigger<'a, R>(
    world: &WorldState,
    events: &'a [WorldEvent],
    rng: &mut R,
) -> Result<Option<&'a WorldEvent>, RuntimeError>
where
    R: RandomSource + ?Sized,
{
    let candidates: Vec<&WorldEvent> = events
        .iter()
        .filter(|event| event.is_eligible(world))
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let index = select_weighted_by(&candidates, |_| 1.0, rng)?;
    let chosen = candidates[index];
    let roll = rng.next_unit();
    if roll <= chosen.probability {
        tracing::debug!(
            card = %chosen.initial_event_card_id,
            roll,
            probability = chosen.probability,
            "world event fired"
        );
        Ok(Some(chosen))
    } else {
        Ok(None)
    }
}
