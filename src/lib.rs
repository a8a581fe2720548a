pub mod game;

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use web_sys::js_sys::Function;

pub use game::{
    apply_modifier, evaluate_event_trigger, matches_any, select_weighted, CardRegistry,
    CurrentCard, EngineConfig, EngineError, EnginePhase, GameEngine, LoadError, ModifierSpec,
    Query, RandomSource, RuntimeError, Snapshot, Stat, SwipeDirection, WorldDescription,
    WorldState,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

/// Serializes structured values as plain JS objects rather than `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_js(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_world(world_json: Option<String>) -> Result<WorldDescription, JsValue> {
    match world_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|error| to_js_error(EngineError::from(LoadError::from(error)))),
        None => Ok(WorldDescription::sample()),
    }
}

/// Draws from a host-supplied `() => number`.
struct JsRandom {
    function: Function,
}

impl RandomSource for JsRandom {
    fn next_unit(&mut self) -> f64 {
        match self.function.call0(&JsValue::NULL) {
            Ok(value) => match value.as_f64() {
                Some(unit) if unit.is_finite() => unit.clamp(0.0, 1.0),
                _ => 0.0,
            },
            Err(error) => {
                web_sys::console::warn_2(&"random source threw".into(), &error);
                0.0
            }
        }
    }
}

#[wasm_bindgen]
pub struct SwipeEngine {
    inner: GameEngine<Box<dyn RandomSource>>,
}

#[wasm_bindgen]
impl SwipeEngine {
    /// Loads a world (the built-in sample when omitted) and draws the opening card.
    #[wasm_bindgen(constructor)]
    pub fn new(world_json: Option<String>, seed: Option<u32>) -> Result<SwipeEngine, JsValue> {
        let description = parse_world(world_json)?;
        let config = EngineConfig {
            seed: seed.map(u64::from),
        };
        let rng: Box<dyn RandomSource> = Box::new(config.rng());
        let inner = GameEngine::initialize(description, rng).map_err(to_js_error)?;
        Ok(SwipeEngine { inner })
    }

    /// Same as the constructor, but every draw calls `random()` on the host.
    #[wasm_bindgen(js_name = "withRandom")]
    pub fn with_random(
        world_json: Option<String>,
        random: Function,
    ) -> Result<SwipeEngine, JsValue> {
        let description = parse_world(world_json)?;
        let rng: Box<dyn RandomSource> = Box::new(JsRandom { function: random });
        let inner = GameEngine::initialize(description, rng).map_err(to_js_error)?;
        Ok(SwipeEngine { inner })
    }

    #[wasm_bindgen(js_name = "snapshotJson")]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.snapshot()).map_err(serde_to_js_error)
    }

    /// Accepts `"left"`/`"right"` (or `"no"`/`"yes"`) and returns the new snapshot JSON.
    pub fn swipe(&mut self, direction: &str) -> Result<String, JsValue> {
        let direction = SwipeDirection::from_str(direction).map_err(|_| {
            JsValue::from_str(&format!("unknown swipe direction: {direction}"))
        })?;
        let snapshot = self
            .inner
            .swipe(direction)
            .map_err(|error| to_js_error(EngineError::from(error)))?;
        serde_json::to_string(snapshot).map_err(serde_to_js_error)
    }

    #[wasm_bindgen(js_name = "statsJson")]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.stats()).map_err(serde_to_js_error)
    }

    pub fn phase(&self) -> String {
        match self.inner.phase() {
            EnginePhase::Idle => "idle".to_string(),
            EnginePhase::InEvent => "inEvent".to_string(),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.inner.snapshot().rounds
    }
}

/// Checks a world description without starting a session.
#[wasm_bindgen(js_name = "validateWorld")]
pub fn validate_world(world: JsValue) -> Result<(), JsValue> {
    let description: WorldDescription = from_value(world).map_err(JsValue::from)?;
    CardRegistry::load(description).map_err(to_js_error)?;
    Ok(())
}

#[wasm_bindgen(js_name = "matchesQueries")]
pub fn matches_queries(world: JsValue, queries: JsValue) -> Result<bool, JsValue> {
    let world: WorldState = from_value(world).map_err(JsValue::from)?;
    let queries: Vec<Query> = from_value(queries).map_err(JsValue::from)?;
    Ok(matches_any(&world, &queries))
}

/// Applies one action modifier; `defaults` only matters for `replace`.
#[wasm_bindgen(js_name = "applyModifier")]
pub fn apply_modifier_js(
    world: JsValue,
    modifier: JsValue,
    defaults: JsValue,
) -> Result<JsValue, JsValue> {
    let world: WorldState = from_value(world).map_err(JsValue::from)?;
    let modifier: ModifierSpec = from_value(modifier).map_err(JsValue::from)?;
    let defaults: WorldState = if defaults.is_undefined() || defaults.is_null() {
        WorldState::default()
    } else {
        from_value(defaults).map_err(JsValue::from)?
    };
    to_js(&apply_modifier(&world, &modifier, &defaults))
}

/// Built-in sample world, handy for the host while content is authored.
#[wasm_bindgen(js_name = "sampleWorld")]
pub fn sample_world() -> Result<JsValue, JsValue> {
    to_js(&WorldDescription::sample())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
