use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lower bound every world variable is clamped to.
pub const VAR_MIN: VarValue = 0;
/// Upper bound every world variable is clamped to.
pub const VAR_MAX: VarValue = 100;

/// Numeric world variable. Wide enough that extreme authored deltas never overflow
/// before clamping.
pub type VarValue = i64;
pub type CardId = String;
pub type EventCardId = String;

pub fn clamp_var(value: VarValue) -> VarValue {
    value.clamp(VAR_MIN, VAR_MAX)
}

/// The simulation state shared by every card: numeric resources and boolean flags.
///
/// Treated as a value type. Transitions build a new `WorldState` instead of
/// editing the previous one, so a committed snapshot never changes under a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldState {
    #[serde(default, alias = "state")]
    pub vars: BTreeMap<String, VarValue>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl WorldState {
    pub fn new(vars: BTreeMap<String, VarValue>, flags: BTreeMap<String, bool>) -> Self {
        Self { vars, flags }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: VarValue) -> Self {
        self.vars.insert(name.into(), value);
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Current value of `name`, `0` when the variable was never written.
    pub fn var(&self, name: &str) -> VarValue {
        self.vars.get(name).copied().unwrap_or(0)
    }

    /// Current value of `name`, `false` when the flag was never written.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn clamped(&self) -> Self {
        Self {
            vars: self
                .vars
                .iter()
                .map(|(name, value)| (name.clone(), clamp_var(*value)))
                .collect(),
            flags: self.flags.clone(),
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        self.vars
            .values()
            .all(|value| (VAR_MIN..=VAR_MAX).contains(value))
    }
}

/// Direction the player swiped the current card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "no" => Ok(SwipeDirection::Left),
            "right" | "yes" => Ok(SwipeDirection::Right),
            _ => Err(()),
        }
    }
}
