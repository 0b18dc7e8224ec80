use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::position::Position;

/// A single move: the path of the moving piece and the pieces it captures.
///
/// The path always starts at the square of the moving piece and contains every
/// landing square of a jump chain, so it holds at least two positions.
///
/// Moves are produced by a [`Rules`](crate::Rules) implementation or read back from a
/// [`GameRecord`](crate::GameRecord).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMove")]
pub struct Move {
    path: Vec<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    captured: Vec<Position>,
    #[serde(default)]
    promotes: bool,
}

/// Error returned when a deserialized move has a path that is too short.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("move path must contain at least 2 positions, got {len}")]
pub struct ShortPathError {
    pub len: usize,
}

/// Serialized form of [`Move`], validated on deserialization.
#[derive(Deserialize)]
struct RawMove {
    path: Vec<Position>,
    #[serde(default)]
    captured: Vec<Position>,
    #[serde(default)]
    promotes: bool,
}

impl TryFrom<RawMove> for Move {
    type Error = ShortPathError;

    fn try_from(raw: RawMove) -> Result<Self, Self::Error> {
        if raw.path.len() < 2 {
            return Err(ShortPathError {
                len: raw.path.len(),
            });
        }
        Ok(Self {
            path: raw.path,
            captured: raw.captured,
            promotes: raw.promotes,
        })
    }
}

impl Move {
    /// Creates a move.
    ///
    /// # Panics
    ///
    /// Panics if `path` has fewer than two positions.
    #[must_use]
    pub fn new(path: Vec<Position>, captured: Vec<Position>, promotes: bool) -> Self {
        assert!(path.len() >= 2, "move path must contain at least 2 positions");
        Self {
            path,
            captured,
            promotes,
        }
    }

    /// Creates a plain one-step move without captures.
    #[must_use]
    pub fn step(from: Position, to: Position, promotes: bool) -> Self {
        Self::new(vec![from, to], vec![], promotes)
    }

    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    #[must_use]
    pub fn from(&self) -> Position {
        self.path[0]
    }

    #[must_use]
    pub fn to(&self) -> Position {
        self.path[self.path.len() - 1]
    }

    #[must_use]
    pub fn captured(&self) -> &[Position] {
        &self.captured
    }

    #[must_use]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Returns `true` if the moving man becomes a king.
    #[must_use]
    pub fn promotes(&self) -> bool {
        self.promotes
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { "x" } else { "-" };
        for (i, pos) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{pos}")?;
        }
        if self.promotes {
            f.write_str("=K")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mv = Move::step(Position::new(1, 2), Position::new(0, 3), false);
        assert_eq!(mv.to_string(), "(1,2)-(0,3)");

        let jump = Move::new(
            vec![Position::new(2, 5), Position::new(4, 3), Position::new(6, 1)],
            vec![Position::new(3, 4), Position::new(5, 2)],
            false,
        );
        assert_eq!(jump.to_string(), "(2,5)x(4,3)x(6,1)");
    }

    #[test]
    #[should_panic(expected = "at least 2 positions")]
    fn test_short_path_rejected() {
        let _ = Move::new(vec![Position::new(1, 0)], vec![], false);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mv = Move::new(
            vec![Position::new(2, 1), Position::new(0, 3)],
            vec![Position::new(1, 2)],
            true,
        );
        let json = serde_json::to_string(&mv).unwrap();
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
    }

    #[test]
    fn test_deserialize_rejects_short_path() {
        let empty = serde_json::from_str::<Move>(r#"{"path":[]}"#).unwrap_err();
        assert!(empty.to_string().contains("got 0"), "{empty}");

        let single = serde_json::from_str::<Move>(r#"{"path":[{"column":1,"row":0}]}"#);
        assert!(single.is_err());
    }
}
