//! Finished games and their replay.

use serde::{Deserialize, Serialize};

use crate::{
    Rules,
    core::{BoardState, Move, PieceColor},
};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum GameOutcome {
    /// The other side had no legal move.
    Win(PieceColor),
    /// The move limit for a tie was reached.
    Tie,
    /// The game was cancelled before it finished.
    Terminated,
}

impl GameOutcome {
    #[must_use]
    pub fn winner(self) -> Option<PieceColor> {
        match self {
            Self::Win(color) => Some(color),
            Self::Tie | Self::Terminated => None,
        }
    }
}

/// Move list and outcome of a game.
///
/// A record can be replayed against the rules it was played under to reproduce every
/// intermediate position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    moves: Vec<Move>,
    outcome: GameOutcome,
}

impl GameRecord {
    #[must_use]
    pub fn new(moves: Vec<Move>, outcome: GameOutcome) -> Self {
        Self { moves, outcome }
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Iterates over the positions of the game, starting with the initial state.
    pub fn replay<'a>(&'a self, rules: &dyn Rules) -> impl Iterator<Item = BoardState> + use<'a> {
        let initial = rules.initial_state();
        std::iter::once(initial).chain(self.moves.iter().scan(initial, |state, mv| {
            *state = state.apply_move(mv);
            Some(*state)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnglishDraughts;

    #[test]
    fn test_replay_reproduces_positions() {
        let rules = EnglishDraughts::new();
        let mut state = rules.initial_state();
        let mut moves = vec![];
        let mut states = vec![state];
        for _ in 0..6 {
            let mv = rules.available_moves(&state).pop().unwrap();
            state = state.apply_move(&mv);
            moves.push(mv);
            states.push(state);
        }
        let record = GameRecord::new(moves, GameOutcome::Tie);
        assert_eq!(record.replay(&rules).collect::<Vec<_>>(), states);
    }

    #[test]
    fn test_serde_roundtrip() {
        let rules = EnglishDraughts::new();
        let mv = rules.available_moves(&rules.initial_state()).remove(0);
        let record = GameRecord::new(vec![mv], GameOutcome::Win(PieceColor::Black));
        let json = serde_json::to_string(&record).unwrap();
        let back: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.outcome().winner(), Some(PieceColor::Black));
    }
}
