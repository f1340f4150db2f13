//! Resource status strings and their classification
//!
//! The control plane reports lifecycle state as a free-form string. Only a
//! handful of values matter for deletion; everything else means "not yet".

use serde::Serialize;
use std::fmt;

/// Statuses meaning the resource is already on its way out
pub const TERMINATING_STATES: &[&str] = &["Terminating", "Terminated"];

/// Statuses from which a delete call is accepted
pub const DELETABLE_STATES: &[&str] = &["Ready", "InitializationFailed"];

/// How a status affects deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StateClass {
    /// Deletion already in progress
    Terminating,
    /// A delete call can be issued now
    Deletable,
    /// Anything else: initializing, scaling, upgrading, unknown
    Other,
}

/// Opaque status string as reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceState(String);

impl ResourceState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the status. Matching is exact, values are case sensitive.
    pub fn class(&self) -> StateClass {
        let state = self.0.as_str();
        if TERMINATING_STATES.contains(&state) {
            StateClass::Terminating
        } else if DELETABLE_STATES.contains(&state) {
            StateClass::Deletable
        } else {
            StateClass::Other
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceState {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminating_family() {
        for s in TERMINATING_STATES {
            assert_eq!(ResourceState::from(*s).class(), StateClass::Terminating);
        }
    }

    #[test]
    fn deletable_family() {
        for s in DELETABLE_STATES {
            assert_eq!(ResourceState::from(*s).class(), StateClass::Deletable);
        }
    }

    #[test]
    fn everything_else_is_other() {
        for s in ["Initializing", "ScalingUp", "Pending", "", "ready", "TERMINATING"] {
            assert_eq!(
                ResourceState::from(s).class(),
                StateClass::Other,
                "Expected Other for state: {s:?}"
            );
        }
    }

    #[test]
    fn display_is_raw_string() {
        assert_eq!(ResourceState::new("ScalingDown").to_string(), "ScalingDown");
    }
}
