use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::cards::{Card, CurrentCard, EventCard};
use super::content::WorldDescription;
use super::effects::apply_modifier;
use super::error::{EngineError, RuntimeError};
use super::events::evaluate_event_trigger;
use super::registry::{CardRegistry, Stat};
use super::selection::{select_weighted, RandomSource};
use super::state::{SwipeDirection, WorldState};
use super::ticks::run_tick_modifiers;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EnginePhase {
    Idle,
    InEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seeds the session generator. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub world_state: WorldState,
    pub current_card: CurrentCard,
    pub rounds: u32,
}

impl Snapshot {
    pub fn phase(&self) -> EnginePhase {
        if self.current_card.is_event() {
            EnginePhase::InEvent
        } else {
            EnginePhase::Idle
        }
    }
}

/// Any error from a swipe leaves the previous snapshot in place.
pub struct GameEngine<R = SmallRng> {
    registry: CardRegistry,
    rng: R,
    snapshot: Snapshot,
}

impl GameEngine<SmallRng> {
    pub fn with_config(
        description: WorldDescription,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        Self::initialize(description, config.rng())
    }

    pub fn from_json(json: &str, config: &EngineConfig) -> Result<Self, EngineError> {
        let registry = CardRegistry::from_json(json)?;
        Self::from_registry(registry, config.rng())
    }
}

impl<R: RandomSource> GameEngine<R> {
    pub fn initialize(description: WorldDescription, rng: R) -> Result<Self, EngineError> {
        let registry = CardRegistry::load(description)?;
        Self::from_registry(registry, rng)
    }

    pub fn from_registry(registry: CardRegistry, mut rng: R) -> Result<Self, EngineError> {
        let world_state = registry.defaults().clone();
        let card = draw_ordinary(&registry, &world_state, &mut rng)?;
        let snapshot = Snapshot {
            world_state,
            current_card: CurrentCard::Card(card),
            rounds: 0,
        };
        Ok(Self {
            registry,
            rng,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> EnginePhase {
        self.snapshot.phase()
    }

    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    pub fn stats(&self) -> Vec<Stat> {
        self.registry.stats(&self.snapshot.world_state)
    }

    pub fn swipe(&mut self, direction: SwipeDirection) -> Result<&Snapshot, RuntimeError> {
        let next = self.resolve(direction).map_err(|error| {
            tracing::warn!(
                %error,
                card = self.snapshot.current_card.id(),
                %direction,
                "swipe rejected"
            );
            error
        })?;
        tracing::debug!(
            from = self.snapshot.current_card.id(),
            to = next.current_card.id(),
            %direction,
            rounds = next.rounds,
            "swipe resolved"
        );
        self.snapshot = next;
        Ok(&self.snapshot)
    }

    fn resolve(&mut self, direction: SwipeDirection) -> Result<Snapshot, RuntimeError> {
        let current = &self.snapshot;
        let (modifier, chain) = match &current.current_card {
            CurrentCard::Card(card) => (&card.actions.get(direction).modifier, None),
            CurrentCard::Event(card) => {
                let action = card.actions.get(direction);
                (&action.modifier, Some(action.next_event_card_id.as_deref()))
            }
        };

        let acted = apply_modifier(&current.world_state, modifier, self.registry.defaults());
        let world_state = run_tick_modifiers(&acted, self.registry.tick_modifiers());

        let current_card = match chain {
            Some(Some(next_id)) => {
                CurrentCard::Event(lookup_event_card(&self.registry, next_id)?)
            }
            // Chain finished: back to the deck, no trigger roll this swipe.
            Some(None) => CurrentCard::Card(draw_ordinary(
                &self.registry,
                &world_state,
                &mut self.rng,
            )?),
            None => {
                match evaluate_event_trigger(&world_state, self.registry.events(), &mut self.rng)? {
                    Some(event) => CurrentCard::Event(lookup_event_card(
                        &self.registry,
                        &event.initial_event_card_id,
                    )?),
                    None => CurrentCard::Card(draw_ordinary(
                        &self.registry,
                        &world_state,
                        &mut self.rng,
                    )?),
                }
            }
        };

        Ok(Snapshot {
            world_state,
            current_card,
            rounds: current.rounds.saturating_add(1),
        })
    }
}

fn lookup_event_card(registry: &CardRegistry, id: &str) -> Result<EventCard, RuntimeError> {
    registry
        .event_card(id)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownEventCard { id: id.to_string() })
}

fn draw_ordinary<R: RandomSource + ?Sized>(
    registry: &CardRegistry,
    world: &WorldState,
    rng: &mut R,
) -> Result<Card, RuntimeError> {
    let eligible = registry.eligible_cards(world);
    select_weighted(&eligible, rng).map(|card| (*card).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{CardActions, CardFace};
    use crate::game::content::{
        CardActionData, CardData, EventCardActionData, EventCardData, TickModifierSpec,
        WorldEventData,
    };
    use crate::game::effects::ModifierSpec;
    use crate::game::error::LoadError;
    use crate::game::query::Query;
    use crate::game::selection::SequenceRandom;
    use crate::game::ticks::ROUNDS_VAR;

    fn card(id: &str, query: Query, left: ModifierSpec, right: ModifierSpec) -> CardData {
        CardData {
            id: Some(id.into()),
            face: CardFace::new("", id, "", ""),
            weight: 1.0,
            is_available_when: vec![query],
            actions: CardActions::new(
                CardActionData::new("No", left),
                CardActionData::new("Yes", right),
            ),
        }
    }

    fn event_card(next: Option<&str>) -> EventCardData {
        EventCardData {
            face: CardFace::default(),
            actions: CardActions::new(
                EventCardActionData::new("Stop", ModifierSpec::noop(), None),
                EventCardActionData::new("Go on", ModifierSpec::add([("money", 1)]), next),
            ),
        }
    }

    fn base_world() -> WorldDescription {
        WorldDescription {
            default_state: WorldState::default()
                .with_var("money", 50)
                .with_var("people", 50),
            cards: vec![card(
                "deck",
                Query::new(),
                ModifierSpec::add([("money", -10)]),
                ModifierSpec::add([("money", 10)]),
            )],
            ..WorldDescription::default()
        }
    }

    fn chain_world() -> WorldDescription {
        let mut world = base_world();
        world.event_cards.insert("first".into(), event_card(Some("second")));
        world.event_cards.insert("second".into(), event_card(Some("third")));
        world.event_cards.insert("third".into(), event_card(None));
        world.events.push(WorldEventData {
            probability: 1.0,
            is_available_when: vec![Query::new()],
            initial_event_card_id: "first".into(),
        });
        world
    }

    fn engine(world: WorldDescription) -> GameEngine<SequenceRandom> {
        GameEngine::initialize(world, SequenceRandom::new(vec![0.0]))
            .expect("engine should initialize")
    }

    #[test]
    fn initial_snapshot_uses_defaults() {
        let engine = engine(base_world());
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.rounds, 0);
        assert_eq!(snapshot.current_card.id(), "deck");
        assert_eq!(&snapshot.world_state, engine.registry().defaults());
        assert_eq!(engine.phase(), EnginePhase::Idle);
    }

    #[test]
    fn swipe_applies_the_chosen_side() {
        let mut engine = engine(base_world());
        let snapshot = engine
            .swipe(SwipeDirection::Left)
            .expect("swipe should succeed");
        assert_eq!(snapshot.world_state.var("money"), 40);
        assert_eq!(snapshot.rounds, 1);

        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");
        assert_eq!(snapshot.world_state.var("money"), 50);
        assert_eq!(snapshot.rounds, 2);
    }

    #[test]
    fn event_chain_runs_to_completion() {
        let mut engine = engine(chain_world());
        let mut phases = vec![engine.phase()];
        let mut cards = vec![engine.snapshot().current_card.id().to_string()];
        for _ in 0..4 {
            let snapshot = engine
                .swipe(SwipeDirection::Right)
                .expect("swipe should succeed");
            phases.push(snapshot.phase());
            cards.push(snapshot.current_card.id().to_string());
        }

        assert_eq!(
            phases,
            vec![
                EnginePhase::Idle,
                EnginePhase::InEvent,
                EnginePhase::InEvent,
                EnginePhase::InEvent,
                EnginePhase::Idle,
            ]
        );
        assert_eq!(cards, vec!["deck", "first", "second", "third", "deck"]);
        // +10 from the deck card, +1 from each of the three event cards.
        assert_eq!(engine.snapshot().world_state.var("money"), 63);

        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");
        assert_eq!(snapshot.current_card.id(), "first", "ordinary cards re-arm triggers");
    }

    #[test]
    fn null_next_card_ends_the_chain_early() {
        let mut engine = engine(chain_world());
        engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");
        assert_eq!(engine.phase(), EnginePhase::InEvent);

        let snapshot = engine
            .swipe(SwipeDirection::Left)
            .expect("swipe should succeed");
        assert_eq!(snapshot.phase(), EnginePhase::Idle);
        assert_eq!(snapshot.current_card.id(), "deck");
    }

    #[test]
    fn event_that_fails_its_roll_falls_back_to_the_deck() {
        let mut world = chain_world();
        world.events[0].probability = 0.5;
        // opening draw, event pick, failed roll, deck draw
        let rng = SequenceRandom::new(vec![0.0, 0.0, 0.9, 0.0]);
        let mut engine = GameEngine::initialize(world, rng).expect("engine should initialize");
        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");
        assert_eq!(snapshot.current_card.id(), "deck");
    }

    #[test]
    fn missing_content_keeps_the_committed_snapshot() {
        let mut world = base_world();
        world.cards = vec![card(
            "only-when-poor",
            Query::new().var("money", 0, 50),
            ModifierSpec::noop(),
            ModifierSpec::add([("money", 10)]),
        )];
        let mut engine = engine(world);
        let before = engine.snapshot().clone();

        assert_eq!(
            engine.swipe(SwipeDirection::Right),
            Err(RuntimeError::NoEligibleContent)
        );
        assert_eq!(engine.snapshot(), &before);

        let snapshot = engine
            .swipe(SwipeDirection::Left)
            .expect("the other side keeps content reachable");
        assert_eq!(snapshot.rounds, 1);
    }

    #[test]
    fn initialization_reports_missing_content() {
        let mut world = base_world();
        world.cards[0].is_available_when = vec![Query::new().var("money", 90, 100)];
        assert_eq!(
            GameEngine::initialize(world, SequenceRandom::new(vec![0.0])).err(),
            Some(EngineError::Runtime(RuntimeError::NoEligibleContent))
        );
    }

    #[test]
    fn zero_weight_deck_is_rejected() {
        let mut world = base_world();
        world.cards[0].weight = 0.0;
        assert_eq!(
            GameEngine::initialize(world, SequenceRandom::new(vec![0.0])).err(),
            Some(EngineError::Runtime(RuntimeError::InvalidWeight {
                candidates: 1
            }))
        );
    }

    #[test]
    fn dangling_reference_prevents_startup() {
        let mut world = chain_world();
        world.event_cards.insert("third".into(), event_card(Some("fourth")));
        assert!(matches!(
            GameEngine::initialize(world, SequenceRandom::new(vec![0.0])),
            Err(EngineError::Load(LoadError::DanglingEventReference { .. }))
        ));
    }

    #[test]
    fn tick_modifiers_run_after_the_action_and_limiter_runs_last() {
        let mut world = base_world();
        world.cards[0].actions.right.modifier = ModifierSpec::add([("money", 30)]);
        world.world_state_modifiers = vec![
            TickModifierSpec::round(),
            TickModifierSpec::reduce("sum", "total", &["money", "people"]),
        ];
        let mut engine = engine(world);
        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");

        assert_eq!(snapshot.world_state.var("money"), 80);
        assert_eq!(snapshot.world_state.var(ROUNDS_VAR), 1);
        assert_eq!(snapshot.world_state.var("total"), 100, "80 + 50 clamped");
    }

    #[test]
    fn triggers_see_the_post_tick_state() {
        let mut world = chain_world();
        world.world_state_modifiers = vec![TickModifierSpec::round()];
        world.events[0].is_available_when = vec![Query::new().var(ROUNDS_VAR, 1, 1)];
        let mut engine = engine(world);
        let snapshot = engine
            .swipe(SwipeDirection::Left)
            .expect("swipe should succeed");
        assert_eq!(snapshot.current_card.id(), "first");
    }

    #[test]
    fn replace_action_resets_to_defaults() {
        let mut world = base_world();
        world.cards[0].actions.left.modifier = ModifierSpec::add([("money", -30), ("people", 20)]);
        world.cards[0].actions.right.modifier = ModifierSpec::replace([("money", 5)]);
        let mut engine = engine(world);
        engine
            .swipe(SwipeDirection::Left)
            .expect("swipe should succeed");
        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed");
        assert_eq!(snapshot.world_state.var("money"), 5);
        assert_eq!(snapshot.world_state.var("people"), 50);
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let config = EngineConfig::seeded(99);
        let mut first = GameEngine::with_config(WorldDescription::sample(), &config)
            .expect("sample should start");
        let mut second = GameEngine::with_config(WorldDescription::sample(), &config)
            .expect("sample should start");
        assert_eq!(first.snapshot(), second.snapshot());

        for step in 0..200 {
            let direction = if step % 3 == 0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            };
            let a = first.swipe(direction).expect("sample never runs dry").clone();
            let b = second.swipe(direction).expect("sample never runs dry").clone();
            assert_eq!(a, b);
            assert!(a.world_state.is_within_bounds());
        }
    }

    #[test]
    fn stats_follow_the_snapshot() {
        let mut engine = GameEngine::with_config(WorldDescription::sample(), &EngineConfig::seeded(1))
            .expect("sample should start");
        let before = engine.stats();
        assert_eq!(before.len(), 4);
        assert!(before.iter().all(|stat| stat.value == 50));

        let snapshot = engine
            .swipe(SwipeDirection::Right)
            .expect("swipe should succeed")
            .clone();
        for stat in engine.stats() {
            assert_eq!(stat.value, snapshot.world_state.var(&stat.id));
        }
    }

    #[test]
    fn snapshot_serializes_for_the_host() {
        let engine = engine(chain_world());
        let json = serde_json::to_value(engine.snapshot()).expect("snapshot should serialize");
        assert_eq!(json["rounds"], 0);
        assert_eq!(json["currentCard"]["kind"], "card");
        assert_eq!(json["currentCard"]["id"], "deck");
        assert_eq!(json["worldState"]["vars"]["money"], 50);
    }
}
