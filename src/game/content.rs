//! Declarative world description, as authored and shipped to the engine.
//!
//! These types mirror the JSON content format. They are compiled into the
//! runtime registry by [`crate::game::registry::CardRegistry::load`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cards::{CardActions, CardFace};
use super::effects::ModifierSpec;
use super::query::Query;
use super::state::{EventCardId, VarValue, WorldState};

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldDescription {
    #[serde(default)]
    pub default_state: WorldState,
    #[serde(default)]
    pub cards: Vec<CardData>,
    #[serde(default)]
    pub event_cards: BTreeMap<EventCardId, EventCardData>,
    #[serde(default)]
    pub events: Vec<WorldEventData>,
    #[serde(default)]
    pub world_state_modifiers: Vec<TickModifierSpec>,
    #[serde(default)]
    pub stats: Vec<StatDefinitionSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardActionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub modifier: ModifierSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub face: CardFace,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub is_available_when: Vec<Query>,
    #[serde(default)]
    pub actions: CardActions<CardActionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventCardActionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub modifier: ModifierSpec,
    #[serde(default)]
    pub next_event_card_id: Option<EventCardId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventCardData {
    #[serde(flatten)]
    pub face: CardFace,
    #[serde(default)]
    pub actions: CardActions<EventCardActionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldEventData {
    pub probability: f64,
    #[serde(default, alias = "shouldTriggerWhen")]
    pub is_available_when: Vec<Query>,
    pub initial_event_card_id: EventCardId,
}

/// Raw tick modifier entry. Only `type` is common to every kind; the remaining
/// keys are checked per kind when the registry compiles it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TickModifierSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<VarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_ids: Option<Vec<String>>,
}

impl TickModifierSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn round() -> Self {
        Self::new("round")
    }

    pub fn cycle(id: impl Into<String>, length: VarValue) -> Self {
        Self {
            id: Some(id.into()),
            length: Some(length),
            ..Self::new("cycle")
        }
    }

    pub fn reduce(kind: &str, target_id: impl Into<String>, source_ids: &[&str]) -> Self {
        Self {
            target_id: Some(target_id.into()),
            source_ids: Some(source_ids.iter().map(|id| id.to_string()).collect()),
            ..Self::new(kind)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatDefinitionSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<String>,
}

impl StatDefinitionSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            icon_size: None,
        }
    }
}

impl CardActionData {
    pub fn new(description: impl Into<String>, modifier: ModifierSpec) -> Self {
        Self {
            description: Some(description.into()),
            modifier,
        }
    }
}

impl EventCardActionData {
    pub fn new(
        description: impl Into<String>,
        modifier: ModifierSpec,
        next_event_card_id: Option<&str>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            modifier,
            next_event_card_id: next_event_card_id.map(str::to_string),
        }
    }
}

impl WorldDescription {
    /// Small energy-policy scenario used by the host while real content is
    /// authored, and by the test suite.
    pub fn sample() -> Self {
        let default_state = WorldState::default()
            .with_var("environment", 50)
            .with_var("people", 50)
            .with_var("security", 50)
            .with_var("money", 50)
            .with_var("coal_plants", 0)
            .with_flag("solar_started", false);

        let power_shortage = CardData {
            id: Some("power-shortage".into()),
            face: CardFace::new(
                "https://images.unsplash.com/photo-1561623002-b3520705eccf",
                "We need power.",
                "The grid is at its limit. Where should the next megawatts come from?",
                "City hall",
            ),
            weight: 2.0,
            is_available_when: vec![
                Query::new().var("environment", 10, 100).var("money", 20, 100),
                Query::new().var("people", 10, 100).var("money", 20, 100),
            ],
            actions: CardActions::new(
                CardActionData::new(
                    "Ration it.",
                    ModifierSpec::add([("people", -10), ("security", -5)]),
                ),
                CardActionData::new(
                    "Buy from abroad.",
                    ModifierSpec::add([("money", -15), ("security", 5)]),
                ),
            ),
        };

        let solar_offer = CardData {
            id: Some("solar-offer".into()),
            face: CardFace::new(
                "https://images.unsplash.com/photo-1497435334941-8c899ee9e8e9",
                "Invest in solar?",
                "A consortium offers to cover the warehouse roofs with panels.",
                "The greener other side",
            ),
            weight: 1.0,
            is_available_when: vec![Query::new()
                .var("money", 30, 100)
                .flag("solar_started", false)],
            actions: CardActions::new(
                CardActionData::new("At what cost?", ModifierSpec::noop()),
                CardActionData::new(
                    "That's great!",
                    ModifierSpec::add([("environment", 15), ("money", -25)])
                        .with_flag("solar_started", true),
                ),
            ),
        };

        let brown_coal = CardData {
            id: Some("brown-coal".into()),
            face: CardFace::new(
                "https://images.pexels.com/photos/3044473/pexels-photo-3044473.jpeg",
                "Cheap but dirty brown coal for sale",
                "Buy a modern brown coal power plant cheaply. Deal?",
                "Working class district",
            ),
            weight: 1.0,
            is_available_when: vec![Query::new()
                .var("environment", 21, 100)
                .var("money", 15, 100)
                .var("coal_plants", 0, 0)],
            actions: CardActions::new(
                CardActionData::new(
                    "I have other offers to consider.",
                    ModifierSpec::add([("environment", 5), ("money", -5)]),
                ),
                CardActionData::new(
                    "Give me some of that!",
                    ModifierSpec::add([
                        ("environment", -20),
                        ("people", -15),
                        ("money", 40),
                        ("coal_plants", 1),
                    ]),
                ),
            ),
        };

        let quiet_day = CardData {
            id: Some("quiet-day".into()),
            face: CardFace::new(
                "https://images.unsplash.com/photo-1449824913935-59a10b8d2000",
                "A quiet day",
                "Nothing urgent on the agenda. How do you spend it?",
                "City hall",
            ),
            weight: 1.0,
            is_available_when: vec![Query::new()],
            actions: CardActions::new(
                CardActionData::new("Visit the districts.", ModifierSpec::add([("people", 5)])),
                CardActionData::new("Balance the books.", ModifierSpec::add([("money", 5)])),
            ),
        };

        let mut event_cards = BTreeMap::new();
        event_cards.insert(
            "envira-protest".to_string(),
            EventCardData {
                face: CardFace::new(
                    "https://images.unsplash.com/photo-1569163139394-de4e5f43e5ca",
                    "Envira is at the gates",
                    "Climate activists block the coal plant entrance.",
                    "Coal plant",
                ),
                actions: CardActions::new(
                    EventCardActionData::new(
                        "Call the police.",
                        ModifierSpec::add([("security", 10), ("people", -10)]),
                        Some("envira-press"),
                    ),
                    EventCardActionData::new(
                        "Hear them out.",
                        ModifierSpec::add([("people", 5)]),
                        Some("envira-deal"),
                    ),
                ),
            },
        );
        event_cards.insert(
            "envira-press".to_string(),
            EventCardData {
                face: CardFace::new(
                    "https://images.unsplash.com/photo-1504711434969-e33886168f5c",
                    "The press got photos",
                    "Tomorrow's front page is not going to be kind.",
                    "Newsroom",
                ),
                actions: CardActions::new(
                    EventCardActionData::new(
                        "No comment.",
                        ModifierSpec::add([("people", -10)]),
                        None,
                    ),
                    EventCardActionData::new(
                        "Announce a review.",
                        ModifierSpec::add([("money", -10), ("people", 5)]),
                        Some("envira-deal"),
                    ),
                ),
            },
        );
        event_cards.insert(
            "envira-deal".to_string(),
            EventCardData {
                face: CardFace::new(
                    "https://images.unsplash.com/photo-1521791136064-7986c2920216",
                    "Envira proposes a deal",
                    "Shut the plant down and they will back your next campaign.",
                    "Coal plant",
                ),
                actions: CardActions::new(
                    EventCardActionData::new("Not a chance.", ModifierSpec::noop(), None),
                    EventCardActionData::new(
                        "Deal.",
                        ModifierSpec::set([("coal_plants", 0)])
                            .with_vars([("environment", 70)]),
                        None,
                    ),
                ),
            },
        );

        let events = vec![WorldEventData {
            probability: 0.35,
            is_available_when: vec![Query::new().var("coal_plants", 1, 100)],
            initial_event_card_id: "envira-protest".into(),
        }];

        let world_state_modifiers = vec![
            TickModifierSpec::round(),
            TickModifierSpec::cycle("season", 4),
            TickModifierSpec::reduce("min", "weakest", &["environment", "people", "security", "money"]),
        ];

        let stats = vec![
            StatDefinitionSpec::new("environment", "Environment", "leaf"),
            StatDefinitionSpec::new("people", "People", "users"),
            StatDefinitionSpec::new("security", "Security", "shield"),
            StatDefinitionSpec::new("money", "Money", "coins"),
        ];

        Self {
            default_state,
            cards: vec![power_shortage, solar_offer, brown_coal, quiet_day],
            event_cards,
            events,
            world_state_modifiers,
            stats,
        }
    }
}
