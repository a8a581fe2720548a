use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{VarValue, WorldState};

/// Inclusive `[min, max]` bound on a world variable. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VarRange(pub VarValue, pub VarValue);

impl VarRange {
    pub fn new(min: VarValue, max: VarValue) -> Self {
        Self(min, max)
    }

    pub fn min(&self) -> VarValue {
        self.0
    }

    pub fn max(&self) -> VarValue {
        self.1
    }

    pub fn contains(&self, value: VarValue) -> bool {
        value >= self.0 && value <= self.1
    }
}

/// A conjunction of variable ranges and flag values.
///
/// Variables and flags the query does not mention are unconstrained, so an
/// empty query matches every world state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    #[serde(default, alias = "state", skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, VarRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, bool>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(mut self, name: impl Into<String>, min: VarValue, max: VarValue) -> Self {
        self.vars.insert(name.into(), VarRange::new(min, max));
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    pub fn matches(&self, world: &WorldState) -> bool {
        self.vars
            .iter()
            .all(|(name, range)| {
                world
                    .vars
                    .get(name)
                    .is_some_and(|value| range.contains(*value))
            })
            && self
                .flags
                .iter()
                .all(|(name, expected)| world.flag(name) == *expected)
    }
}

/// True when at least one query matches. An empty list never matches: content
/// without any eligibility query is unreachable.
pub fn matches_any(world: &WorldState, queries: &[Query]) -> bool {
    queries.iter().any(|query| query.matches(world))
}
