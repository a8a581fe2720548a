use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{clamp_var, VarValue, WorldState};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    Add,
    Set,
    /// Starts from the defaults instead of the current world.
    Replace,
}

impl Default for ModifierType {
    fn default() -> Self {
        ModifierType::Add
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModifierSpec {
    #[serde(default, rename = "type")]
    pub kind: ModifierType,
    #[serde(default, alias = "state", skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, VarValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, bool>,
}

impl ModifierSpec {
    pub fn new(kind: ModifierType) -> Self {
        Self {
            kind,
            vars: BTreeMap::new(),
            flags: BTreeMap::new(),
        }
    }

    pub fn noop() -> Self {
        Self::new(ModifierType::Add)
    }

    pub fn add<K: Into<String>>(vars: impl IntoIterator<Item = (K, VarValue)>) -> Self {
        Self::new(ModifierType::Add).with_vars(vars)
    }

    pub fn set<K: Into<String>>(vars: impl IntoIterator<Item = (K, VarValue)>) -> Self {
        Self::new(ModifierType::Set).with_vars(vars)
    }

    pub fn replace<K: Into<String>>(vars: impl IntoIterator<Item = (K, VarValue)>) -> Self {
        Self::new(ModifierType::Replace).with_vars(vars)
    }

    pub fn with_vars<K: Into<String>>(
        mut self,
        vars: impl IntoIterator<Item = (K, VarValue)>,
    ) -> Self {
        self.vars
            .extend(vars.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }
}

/// Each variable the modifier names is clamped right after it is computed.
pub fn apply_modifier(
    world: &WorldState,
    modifier: &ModifierSpec,
    defaults: &WorldState,
) -> WorldState {
    let base = match modifier.kind {
        ModifierType::Replace => defaults,
        ModifierType::Add | ModifierType::Set => world,
    };

    let mut vars = base.vars.clone();
    for (name, value) in &modifier.vars {
        let next = match modifier.kind {
            ModifierType::Add => vars.get(name).copied().unwrap_or(0).saturating_add(*value),
            ModifierType::Set | ModifierType::Replace => *value,
        };
        vars.insert(name.clone(), clamp_var(next));
    }

    let mut flags = base.flags.clone();
    flags.extend(
        modifier
            .flags
            .iter()
            .map(|(name, value)| (name.clone(), *value)),
    );

    WorldState::new(vars, flags)
}
