use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{EventCardId, SwipeDirection};

/// Rejections raised while compiling a world description. An engine is never
/// built from a description that produced one of these.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum LoadError {
    #[error("event card `{card_id}` ({direction}) points at unknown event card `{target}`")]
    DanglingEventReference {
        card_id: EventCardId,
        direction: SwipeDirection,
        target: EventCardId,
    },
    #[error("world event #{index} starts with unknown event card `{target}`")]
    UnknownInitialEventCard { index: usize, target: EventCardId },
    #[error("unknown world state modifier type `{kind}`")]
    InvalidModifierType { kind: String },
    #[error("world state modifier `{kind}` is missing `{field}`")]
    MissingModifierField { kind: String, field: String },
    #[error("cycle modifier for `{id}` needs a length between 1 and 101, got {length}")]
    InvalidCycleLength { id: String, length: i64 },
    #[error("reduction into `{target_id}` has no source variables")]
    EmptyReduction { target_id: String },
    #[error("world event #{index} has probability {probability} outside [0, 1]")]
    InvalidProbability { index: usize, probability: f64 },
    #[error("malformed world description: {message}")]
    Parse { message: String },
}

impl From<serde_json::Error> for LoadError {
    fn from(error: serde_json::Error) -> Self {
        LoadError::Parse {
            message: error.to_string(),
        }
    }
}

/// Failures of a single swipe. The engine keeps its last committed snapshot.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RuntimeError {
    #[error("no card is eligible for the current world state")]
    NoEligibleContent,
    #[error("none of the {candidates} candidates has a positive weight")]
    InvalidWeight { candidates: usize },
    #[error("event card `{id}` is not registered")]
    UnknownEventCard { id: EventCardId },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "stage", content = "error", rename_all = "lowercase")]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
