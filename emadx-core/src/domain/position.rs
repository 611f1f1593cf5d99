//! Directional stance produced by the signal engine.

use serde::{Deserialize, Serialize};

/// Per-bar position. There is no flat state: every bar is long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Long,
    Short,
}

impl Position {
    /// Signed exposure: +1 for long, -1 for short.
    pub fn sign(self) -> i8 {
        match self {
            Position::Long => 1,
            Position::Short => -1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.sign())
    }

    pub fn is_long(self) -> bool {
        matches!(self, Position::Long)
    }
}
