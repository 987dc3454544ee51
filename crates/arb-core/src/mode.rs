//! Mode state: which game piece the operator has selected.

use std::fmt;
use std::str::FromStr;

use crate::ArbError;

/// The single piece of shared mode state.
///
/// Owned by the scheduler and passed by reference into trigger sampling and
/// behavior contexts.  `Cone` is the primary mode and the startup default.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GamePiece {
    #[default]
    Cone,
    Cube,
}

impl GamePiece {
    /// The other selection.
    pub fn other(self) -> GamePiece {
        match self {
            GamePiece::Cone => GamePiece::Cube,
            GamePiece::Cube => GamePiece::Cone,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GamePiece::Cone => "cone",
            GamePiece::Cube => "cube",
        }
    }
}

impl fmt::Display for GamePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePiece {
    type Err = ArbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cone" => Ok(GamePiece::Cone),
            "cube" => Ok(GamePiece::Cube),
            other => Err(ArbError::Parse(format!(
                "invalid game piece {other:?}: expected \"cone\" or \"cube\""
            ))),
        }
    }
}
