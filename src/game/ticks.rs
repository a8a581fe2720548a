use std::collections::BTreeMap;

use super::content::TickModifierSpec;
use super::error::LoadError;
use super::state::{VarValue, WorldState, VAR_MAX, VAR_MIN};

/// Variable incremented by the `round` tick modifier.
pub const ROUNDS_VAR: &str = "rounds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Min,
    Max,
    Sum,
}

/// Ambient world transform run once per swipe, independent of the player's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickModifier {
    Round,
    Cycle {
        id: String,
        length: VarValue,
    },
    Reduce {
        op: ReduceOp,
        target_id: String,
        source_ids: Vec<String>,
    },
    DebugLog {
        state_ids: Option<Vec<String>>,
        flag_ids: Option<Vec<String>>,
    },
    /// Clamps every variable into `[min, max]`. The registry always appends one last.
    Limit {
        min: VarValue,
        max: VarValue,
    },
}

fn required<T: Clone>(
    spec: &TickModifierSpec,
    field: &str,
    value: &Option<T>,
) -> Result<T, LoadError> {
    value.clone().ok_or_else(|| LoadError::MissingModifierField {
        kind: spec.kind.clone(),
        field: field.to_string(),
    })
}

impl TickModifier {
    pub fn limiter() -> Self {
        TickModifier::Limit {
            min: VAR_MIN,
            max: VAR_MAX,
        }
    }

    pub fn compile(spec: &TickModifierSpec) -> Result<Self, LoadError> {
        let reduce = |op: ReduceOp| -> Result<Self, LoadError> {
            let target_id = required(spec, "targetId", &spec.target_id)?;
            let source_ids = required(spec, "sourceIds", &spec.source_ids)?;
            if source_ids.is_empty() && op != ReduceOp::Sum {
                return Err(LoadError::EmptyReduction { target_id });
            }
            Ok(TickModifier::Reduce {
                op,
                target_id,
                source_ids,
            })
        };

        match spec.kind.as_str() {
            "round" => Ok(TickModifier::Round),
            "cycle" => {
                let id = required(spec, "id", &spec.id)?;
                let length = required(spec, "length", &spec.length)?;
                if length <= 0 || length > VAR_MAX - VAR_MIN + 1 {
                    return Err(LoadError::InvalidCycleLength { id, length });
                }
                Ok(TickModifier::Cycle { id, length })
            }
            "min" => reduce(ReduceOp::Min),
            "max" => reduce(ReduceOp::Max),
            "sum" => reduce(ReduceOp::Sum),
            "debug" => Ok(TickModifier::DebugLog {
                state_ids: spec.state_ids.clone(),
                flag_ids: spec.flag_ids.clone(),
            }),
            other => Err(LoadError::InvalidModifierType {
                kind: other.to_string(),
            }),
        }
    }

    pub fn apply(&self, world: &WorldState) -> WorldState {
        match self {
            TickModifier::Round => {
                let mut next = world.clone();
                next.vars
                    .insert(ROUNDS_VAR.to_string(), world.var(ROUNDS_VAR).saturating_add(1));
                next
            }
            TickModifier::Cycle { id, length } => {
                let mut next = world.clone();
                let value = world.var(id).saturating_add(1).rem_euclid(*length);
                next.vars.insert(id.clone(), value);
                next
            }
            TickModifier::Reduce {
                op,
                target_id,
                source_ids,
            } => {
                let values = source_ids.iter().map(|id| world.var(id));
                let result = match op {
                    ReduceOp::Min => values.min(),
                    ReduceOp::Max => values.max(),
                    ReduceOp::Sum => Some(values.fold(0, VarValue::saturating_add)),
                };
                let mut next = world.clone();
                if let Some(result) = result {
                    next.vars.insert(target_id.clone(), result);
                }
                next
            }
            TickModifier::DebugLog {
                state_ids,
                flag_ids,
            } => {
                let vars: BTreeMap<&str, VarValue> = match state_ids {
                    Some(ids) => ids.iter().map(|id| (id.as_str(), world.var(id))).collect(),
                    None => world
                        .vars
                        .iter()
                        .map(|(id, value)| (id.as_str(), *value))
                        .collect(),
                };
                let flags: BTreeMap<&str, bool> = match flag_ids {
                    Some(ids) => ids.iter().map(|id| (id.as_str(), world.flag(id))).collect(),
                    None => world
                        .flags
                        .iter()
                        .map(|(id, value)| (id.as_str(), *value))
                        .collect(),
                };
                if !vars.is_empty() {
                    tracing::debug!(?vars, "world vars");
                }
                if !flags.is_empty() {
                    tracing::debug!(?flags, "world flags");
                }
                world.clone()
            }
            TickModifier::Limit { min, max } => WorldState::new(
                world
                    .vars
                    .iter()
                    .map(|(id, value)| (id.clone(), (*value).clamp(*min, *max)))
                    .collect(),
                world.flags.clone(),
            ),
        }
    }
}

/// Folds `world` through `modifiers` in order.
pub fn run_tick_modifiers(world: &WorldState, modifiers: &[TickModifier]) -> WorldState {
    modifiers
        .iter()
        .fold(world.clone(), |acc, modifier| modifier.apply(&acc))
}

/// Compiles specs in declaration order and appends the range limiter.
pub fn compile_tick_modifiers(specs: &[TickModifierSpec]) -> Result<Vec<TickModifier>, LoadError> {
    let mut modifiers = specs
        .iter()
        .map(TickModifier::compile)
        .collect::<Result<Vec<_>, _>>()?;
    modifiers.push(TickModifier::limiter());
    Ok(modifiers)
}
