//! Game playing and match statistics.
//!
//! [`play_game`] runs a single game between two [`Player`]s until the side to move has
//! no legal move (it loses), the rules' move limit is reached (tie), or the game is
//! cancelled. [`simulate_matches`] plays a series of such games with alternating
//! colours and aggregates the results from the first player's perspective.
//!
//! Games share nothing but the players themselves, whose search state is per call.

use std::fmt;

use draughts_engine::{GameOutcome, GameRecord, PieceColor, Rules};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{cancel::CancellationToken, minimax::Player};

/// Aggregated results of a match, from the first player's perspective.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub wins_as_white: u32,
    pub wins_as_black: u32,
    pub ties: u32,
    pub losses_as_white: u32,
    pub losses_as_black: u32,
}

impl MatchStats {
    #[must_use]
    pub fn wins(&self) -> u32 {
        self.wins_as_white + self.wins_as_black
    }

    #[must_use]
    pub fn losses(&self) -> u32 {
        self.losses_as_white + self.losses_as_black
    }

    #[must_use]
    pub fn games(&self) -> u32 {
        self.wins() + self.ties + self.losses()
    }

    /// Training fitness: wins with either colour. Ties and losses count nothing.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        f64::from(self.wins())
    }

    /// Adds a finished game in which the first player played `color`.
    ///
    /// Terminated games are not counted.
    pub fn record(&mut self, color: PieceColor, outcome: GameOutcome) {
        match (outcome, color) {
            (GameOutcome::Win(winner), PieceColor::White) if winner == color => {
                self.wins_as_white += 1;
            }
            (GameOutcome::Win(winner), PieceColor::Black) if winner == color => {
                self.wins_as_black += 1;
            }
            (GameOutcome::Win(_), PieceColor::White) => self.losses_as_white += 1,
            (GameOutcome::Win(_), PieceColor::Black) => self.losses_as_black += 1,
            (GameOutcome::Tie, _) => self.ties += 1,
            (GameOutcome::Terminated, _) => {}
        }
    }
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wins: {} (w:{} b:{}) | ties: {} | losses: {} (w:{} b:{})",
            self.wins(),
            self.wins_as_white,
            self.wins_as_black,
            self.ties,
            self.losses(),
            self.losses_as_white,
            self.losses_as_black,
        )
    }
}

/// Plays one game from the rules' initial position.
pub fn play_game(
    rules: &dyn Rules,
    white: &dyn Player,
    black: &dyn Player,
    rng: &mut dyn RngCore,
    cancel: &CancellationToken,
) -> GameRecord {
    let mut state = rules.initial_state();
    let mut moves = vec![];

    let outcome = loop {
        if cancel.is_cancelled() {
            break GameOutcome::Terminated;
        }
        if moves.len() >= rules.move_limit_for_tie() {
            break GameOutcome::Tie;
        }

        let player = match state.on_move() {
            PieceColor::White => white,
            PieceColor::Black => black,
        };
        let Some(mv) = player.select_move(rules, &state, rng, cancel) else {
            if cancel.is_cancelled() {
                break GameOutcome::Terminated;
            }
            break GameOutcome::Win(state.on_move().opponent());
        };
        state = state.apply_move(&mv);
        moves.push(mv);
    };

    log::trace!(
        "{} (white) vs {} (black): {outcome:?} after {} plies",
        white.id(),
        black.id(),
        moves.len(),
    );
    GameRecord::new(moves, outcome)
}

/// Plays `count` games between `player_a` and `player_b`.
///
/// `player_a` plays White in even-numbered games and Black in odd-numbered ones. The
/// match stops early, without counting the interrupted game, once `cancel` is set.
pub fn simulate_matches(
    rules: &dyn Rules,
    player_a: &dyn Player,
    player_b: &dyn Player,
    count: usize,
    rng: &mut dyn RngCore,
    cancel: &CancellationToken,
) -> MatchStats {
    let mut stats = MatchStats::default();
    for game in 0..count {
        if cancel.is_cancelled() {
            break;
        }
        let (color, record) = if game % 2 == 0 {
            let record = play_game(rules, player_a, player_b, rng, cancel);
            (PieceColor::White, record)
        } else {
            let record = play_game(rules, player_b, player_a, rng, cancel);
            (PieceColor::Black, record)
        };
        stats.record(color, record.outcome());
    }
    log::debug!("{} vs {}: {stats}", player_a.id(), player_b.id());
    stats
}
