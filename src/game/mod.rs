//! Card-game rules core: world state, content registry and the swipe state machine.

pub mod cards;
pub mod content;
pub mod effects;
pub mod error;
pub mod events;
pub mod query;
pub mod registry;
pub mod rules;
pub mod selection;
pub mod state;
pub mod ticks;

pub use cards::{Card, CardAction, CardActions, CardFace, CurrentCard, EventCard, EventCardAction};
pub use content::{
    CardActionData, CardData, EventCardActionData, EventCardData, StatDefinitionSpec,
    TickModifierSpec, WorldDescription, WorldEventData,
};
pub use effects::{apply_modifier, ModifierSpec, ModifierType};
pub use error::{EngineError, LoadError, RuntimeError};
pub use events::{evaluate_event_trigger, WorldEvent};
pub use query::{matches_any, Query, VarRange};
pub use registry::{CardRegistry, Stat, StatDefinition};
pub use rules::{EngineConfig, EnginePhase, GameEngine, Snapshot};
pub use selection::{
    select_weighted, select_weighted_by, FnRandom, RandomSource, SequenceRandom, Weighted,
};
pub use state::{CardId, EventCardId, SwipeDirection, VarValue, WorldState, VAR_MAX, VAR_MIN};
pub use ticks::{run_tick_modifiers, TickModifier, ROUNDS_VAR};
