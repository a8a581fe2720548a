use serde::{Deserialize, Serialize};

use super::effects::ModifierSpec;
use super::query::{matches_any, Query};
use super::selection::Weighted;
use super::state::{CardId, EventCardId, SwipeDirection, WorldState};

pub const DEFAULT_LEFT_DESCRIPTION: &str = "No";
pub const DEFAULT_RIGHT_DESCRIPTION: &str = "Yes";

/// Presentation fields. The engine passes them through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardFace {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub location: String,
}

impl CardFace {
    pub fn new(
        image: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            title: title.into(),
            text: text.into(),
            location: location.into(),
        }
    }
}

/// The pair of actions offered by a card, one per swipe direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardActions<A> {
    pub left: A,
    pub right: A,
}

impl<A> CardActions<A> {
    pub fn new(left: A, right: A) -> Self {
        Self { left, right }
    }

    pub fn get(&self, direction: SwipeDirection) -> &A {
        match direction {
            SwipeDirection::Left => &self.left,
            SwipeDirection::Right => &self.right,
        }
    }

    pub fn map<B>(self, mut f: impl FnMut(SwipeDirection, A) -> B) -> CardActions<B> {
        CardActions {
            left: f(SwipeDirection::Left, self.left),
            right: f(SwipeDirection::Right, self.right),
        }
    }
}

pub fn default_description(direction: SwipeDirection) -> &'static str {
    match direction {
        SwipeDirection::Left => DEFAULT_LEFT_DESCRIPTION,
        SwipeDirection::Right => DEFAULT_RIGHT_DESCRIPTION,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardAction {
    pub description: String,
    pub modifier: ModifierSpec,
}

impl CardAction {
    pub fn new(description: impl Into<String>, modifier: ModifierSpec) -> Self {
        Self {
            description: description.into(),
            modifier,
        }
    }
}

/// An ordinary card, drawn at random whenever one of its queries matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    #[serde(flatten)]
    pub face: CardFace,
    pub weight: f64,
    pub is_available_when: Vec<Query>,
    pub actions: CardActions<CardAction>,
}

impl Card {
    pub fn is_eligible(&self, world: &WorldState) -> bool {
        matches_any(world, &self.is_available_when)
    }
}

impl Weighted for Card {
    fn weight(&self) -> f64 {
        self.weight
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventCardAction {
    pub description: String,
    pub modifier: ModifierSpec,
    /// Event card forced next, or `None` to hand control back to the deck.
    pub next_event_card_id: Option<EventCardId>,
}

/// A card that is only reachable through an event trigger or a preceding event card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventCard {
    pub id: EventCardId,
    #[serde(flatten)]
    pub face: CardFace,
    pub actions: CardActions<EventCardAction>,
}

/// The card currently in front of the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CurrentCard {
    Card(Card),
    Event(EventCard),
}

impl CurrentCard {
    pub fn id(&self) -> &str {
        match self {
            CurrentCard::Card(card) => &card.id,
            CurrentCard::Event(card) => &card.id,
        }
    }

    pub fn face(&self) -> &CardFace {
        match self {
            CurrentCard::Card(card) => &card.face,
            CurrentCard::Event(card) => &card.face,
        }
    }

    pub fn description(&self, direction: SwipeDirection) -> &str {
        match self {
            CurrentCard::Card(card) => &card.actions.get(direction).description,
            CurrentCard::Event(card) => &card.actions.get(direction).description,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, CurrentCard::Event(_))
    }
}
