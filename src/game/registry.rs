use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cards::{default_description, Card, CardAction, EventCard, EventCardAction};
use super::content::{StatDefinitionSpec, WorldDescription};
use super::error::LoadError;
use super::events::WorldEvent;
use super::state::{EventCardId, SwipeDirection, VarValue, WorldState};
use super::ticks::{compile_tick_modifiers, TickModifier};

/// Read accessor for a world variable displayed by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatDefinition {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<String>,
}

impl StatDefinition {
    pub fn value(&self, world: &WorldState) -> VarValue {
        world.var(&self.id)
    }

    pub fn read(&self, world: &WorldState) -> Stat {
        Stat {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            icon_size: self.icon_size.clone(),
            value: self.value(world),
        }
    }
}

impl From<StatDefinitionSpec> for StatDefinition {
    fn from(spec: StatDefinitionSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            icon: spec.icon,
            icon_size: spec.icon_size,
        }
    }
}

/// Current value of one stat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<String>,
    pub value: VarValue,
}

pub fn read_stats(definitions: &[StatDefinition], world: &WorldState) -> Vec<Stat> {
    definitions
        .iter()
        .map(|definition| definition.read(world))
        .collect()
}

/// Compiled, validated content of one world. Every `nextEventCardId` and
/// `initialEventCardId` it holds names an entry of the event-card table.
#[derive(Debug, Clone)]
pub struct CardRegistry {
    defaults: WorldState,
    cards: Vec<Card>,
    event_cards: BTreeMap<EventCardId, EventCard>,
    events: Vec<WorldEvent>,
    tick_modifiers: Vec<TickModifier>,
    stats: Vec<StatDefinition>,
}

impl CardRegistry {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let description: WorldDescription = serde_json::from_str(json)?;
        Self::load(description)
    }

    pub fn load(description: WorldDescription) -> Result<Self, LoadError> {
        let WorldDescription {
            default_state,
            cards,
            event_cards,
            events,
            world_state_modifiers,
            stats,
        } = description;

        let cards: Vec<Card> = cards
            .into_iter()
            .enumerate()
            .map(|(index, data)| Card {
                id: data.id.unwrap_or_else(|| format!("card-{index}")),
                face: data.face,
                weight: data.weight,
                is_available_when: data.is_available_when,
                actions: data.actions.map(|direction, action| CardAction {
                    description: action
                        .description
                        .unwrap_or_else(|| default_description(direction).to_string()),
                    modifier: action.modifier,
                }),
            })
            .collect();

        let event_cards: BTreeMap<EventCardId, EventCard> = event_cards
            .into_iter()
            .map(|(id, data)| {
                let card = EventCard {
                    id: id.clone(),
                    face: data.face,
                    actions: data.actions.map(|direction, action| EventCardAction {
                        description: action
                            .description
                            .unwrap_or_else(|| default_description(direction).to_string()),
                        modifier: action.modifier,
                        next_event_card_id: action.next_event_card_id,
                    }),
                };
                (id, card)
            })
            .collect();

        for card in event_cards.values() {
            for (direction, action) in [
                (SwipeDirection::Left, &card.actions.left),
                (SwipeDirection::Right, &card.actions.right),
            ] {
                if let Some(target) = &action.next_event_card_id {
                    if !event_cards.contains_key(target) {
                        return Err(LoadError::DanglingEventReference {
                            card_id: card.id.clone(),
                            direction,
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        let events = events
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                if !data.probability.is_finite() || !(0.0..=1.0).contains(&data.probability) {
                    return Err(LoadError::InvalidProbability {
                        index,
                        probability: data.probability,
                    });
                }
                if !event_cards.contains_key(&data.initial_event_card_id) {
                    return Err(LoadError::UnknownInitialEventCard {
                        index,
                        target: data.initial_event_card_id,
                    });
                }
                Ok(WorldEvent {
                    probability: data.probability,
                    is_available_when: data.is_available_when,
                    initial_event_card_id: data.initial_event_card_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tick_modifiers = compile_tick_modifiers(&world_state_modifiers)?;
        let stats = stats.into_iter().map(StatDefinition::from).collect();

        let registry = Self {
            defaults: default_state.clamped(),
            cards,
            event_cards,
            events,
            tick_modifiers,
            stats,
        };
        tracing::info!(
            cards = registry.cards.len(),
            event_cards = registry.event_cards.len(),
            events = registry.events.len(),
            tick_modifiers = registry.tick_modifiers.len(),
            "world loaded"
        );
        Ok(registry)
    }

    pub fn defaults(&self) -> &WorldState {
        &self.defaults
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn eligible_cards(&self, world: &WorldState) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| card.is_eligible(world))
            .collect()
    }

    pub fn event_card(&self, id: &str) -> Option<&EventCard> {
        self.event_cards.get(id)
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn tick_modifiers(&self) -> &[TickModifier] {
        &self.tick_modifiers
    }

    pub fn stat_definitions(&self) -> &[StatDefinition] {
        &self.stats
    }

    pub fn stats(&self, world: &WorldState) -> Vec<Stat> {
        read_stats(&self.stats, world)
    }
}
