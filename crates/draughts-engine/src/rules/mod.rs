//! Rules components: legal move generation and game setup.
//!
//! The search engine and the match simulator only depend on the [`Rules`] trait. A
//! rules component must guarantee that every move it returns can be applied with
//! [`BoardState::apply_move`] without violating its preconditions.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::core::{BoardLayout, BoardState, Move, PieceColor, RulesVariant};

pub use self::english::EnglishDraughts;

mod english;

/// Move generator and game setup for one draughts variant.
pub trait Rules: fmt::Debug + Send + Sync {
    /// Identifier of the variant, recorded in every board state.
    fn variant(&self) -> RulesVariant;

    /// Board dimensions.
    fn layout(&self) -> BoardLayout;

    /// Position at the start of a game.
    fn initial_state(&self) -> BoardState;

    /// Side that moves first.
    fn starting_color(&self) -> PieceColor;

    /// Number of plies after which an unfinished game is a tie.
    fn move_limit_for_tie(&self) -> usize;

    /// Lists the legal moves for the side to move, in a stable order.
    ///
    /// An empty list means the side to move has lost.
    fn available_moves(&self, state: &BoardState) -> Vec<Move>;
}

/// Selects a built-in rules implementation by name.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
pub enum RulesKind {
    #[default]
    English,
}

impl RulesKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn Rules> {
        match self {
            Self::English => Arc::new(EnglishDraughts::new()),
        }
    }
}
