//! Move records - one twist of the puzzle as the user performed it

use mc4d_core::{Error, Grip, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single recorded twist: which grip, which way, which slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub grip: Grip,
    /// Signed turn direction; never zero.
    pub direction: i32,
    /// Bit `k` set means slice `k` turns; never zero.
    pub slices: u32,
}

impl MoveRecord {
    pub fn new(grip: Grip, direction: i32, slices: u32) -> Result<Self> {
        if direction == 0 {
            return Err(Error::invalid_move("direction must be non-zero"));
        }
        // must stay negatable for reflections and inverses
        if direction == i32::MIN {
            return Err(Error::invalid_move("direction out of range"));
        }
        if slices == 0 {
            return Err(Error::invalid_move("slices mask selects no slices"));
        }
        Ok(Self {
            grip,
            direction,
            slices,
        })
    }

    /// The same twist turned the other way.
    pub fn inverse(&self) -> Self {
        Self {
            direction: self.direction.saturating_neg(),
            ..*self
        }
    }
}

/// Text form used in macro files: `g0 g1 g2 g3 direction slices`.
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.grip, self.direction, self.slices)
    }
}

/// Which way a macro is played back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayDirection {
    #[default]
    Forward,
    /// Undo the macro: last move first, each one inverted.
    Reverse,
}

impl PlayDirection {
    /// Non-negative means forward.
    pub fn from_sign(dir: i32) -> Self {
        if dir < 0 {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_moves() {
        let grip = Grip::new([3, 0, 0, 0]);
        assert!(MoveRecord::new(grip, 0, 1).is_err());
        assert!(MoveRecord::new(grip, 1, 0).is_err());
        assert!(MoveRecord::new(grip, -1, 0b101).is_ok());
        let err = MoveRecord::new(grip, i32::MIN, 1).unwrap_err();
        assert!(err.message.contains("out of range"));
        assert_eq!(MoveRecord::new(grip, i32::MAX, 1).unwrap().inverse().direction, -i32::MAX);
    }

    #[test]
    fn display_is_whitespace_delimited() {
        let m = MoveRecord::new(Grip::new([0, -2, 3, 2]), -1, 5).unwrap();
        assert_eq!(m.to_string(), "0 -2 3 2 -1 5");
        assert_eq!(m.inverse().direction, 1);
    }

    #[test]
    fn play_direction_from_sign() {
        assert_eq!(PlayDirection::from_sign(1), PlayDirection::Forward);
        assert_eq!(PlayDirection::from_sign(0), PlayDirection::Forward);
        assert_eq!(PlayDirection::from_sign(-2).sign(), -1);
    }
}
