//! Work/break phase

use serde::{Deserialize, Serialize};

/// One of the two timer phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "WORK",
            Phase::Break => "BREAK",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
