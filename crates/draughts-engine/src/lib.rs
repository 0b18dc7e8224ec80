//! Board model for draughts-family games.
//!
//! This crate provides the compact state encoding shared by the search engine and the
//! trainer, plus the rules components that generate legal moves:
//!
//! - [`BoardState`] - Bit-packed board (presence, rank and color planes) and side to move
//! - [`Move`] - Path of landing squares with captured squares and promotion marker
//! - [`PieceType`] - Piece on a square, decomposable into [`PieceColor`] and [`PieceRank`]
//! - [`Rules`] - Move generator contract, implemented by [`EnglishDraughts`]
//! - [`GameRecord`] - Move list and outcome of a finished game, usable for replays
//!
//! # Example
//!
//! ```
//! use draughts_engine::{EnglishDraughts, Rules};
//!
//! let rules = EnglishDraughts::new();
//! let state = rules.initial_state();
//! let moves = rules.available_moves(&state);
//! assert_eq!(moves.len(), 7);
//!
//! let next = state.apply_move(&moves[0]);
//! assert_ne!(next.on_move(), state.on_move());
//! ```

pub use self::{core::*, record::*, rules::*};

pub mod core;
pub mod record;
pub mod rules;

/// Error returned when a board layout cannot be encoded in the bit-planes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LayoutError {
    #[display("board must have an even number of columns, got {columns}")]
    OddColumns { columns: u8 },
    #[display("board has {squares} playable squares, at most 64 are supported")]
    TooManySquares { squares: usize },
    #[display("board must not be empty")]
    Empty,
}
