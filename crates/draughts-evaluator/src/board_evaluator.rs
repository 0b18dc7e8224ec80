//! Static board evaluation.
//!
//! A [`BoardEvaluator`] assigns a single score to a position, from White's point of
//! view: positive values favour White, negative values favour Black. The search engine
//! maximises this score on White's turns and minimises it on Black's turns.
//!
//! Evaluators must be pure functions of the board state. The search engine caches
//! scores per position within one search, which is only valid if evaluating the same
//! state twice yields the same score.
//!
//! # Variants
//!
//! - [`BasicEvaluator`] - Material count (man = 1, king = 3)
//! - [`ProgressiveEvaluator`] - Material with a cubic bonus for men close to promotion
//! - [`NetworkEvaluator`] - Neural network fed with the occupied dark squares

use std::fmt;

use draughts_engine::{BoardState, PieceColor, PieceRank, PieceType};
use serde::{Deserialize, Serialize};

use crate::network::{Network, NetworkError};

/// Scores board positions from White's point of view.
pub trait BoardEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a position. Higher is better for White.
    fn evaluate(&self, state: &BoardState) -> f64;
}

/// Material-only evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEvaluator;

impl BasicEvaluator {
    const MAN: f64 = 1.0;
    const KING: f64 = 3.0;
}

impl BoardEvaluator for BasicEvaluator {
    fn evaluate(&self, state: &BoardState) -> f64 {
        [PieceColor::White, PieceColor::Black]
            .into_iter()
            .map(|color| {
                let kings = state.count_kings(color);
                let men = state.count(color) - kings;
                color.sign() * (f64::from(men) * Self::MAN + f64::from(kings) * Self::KING)
            })
            .sum()
    }
}

/// Material evaluation rewarding men that advance towards promotion.
///
/// A man is worth `2 + ((p - 1)³ + 1)`, where `p ∈ [0, 1]` is its progress from its
/// own home row to the promotion row, so the bonus grows quickly at the start and
/// flattens out close to promotion. A king is worth 5.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressiveEvaluator;

impl ProgressiveEvaluator {
    const MAN: f64 = 2.0;
    const KING: f64 = 5.0;
}

impl BoardEvaluator for ProgressiveEvaluator {
    fn evaluate(&self, state: &BoardState) -> f64 {
        let last_row = f64::from(state.layout().rows().saturating_sub(1).max(1));
        state
            .iter_pieces()
            .map(|(pos, piece)| {
                let (Some(color), Some(rank)) = (piece.color(), piece.rank()) else {
                    return 0.0;
                };
                let value = match rank {
                    PieceRank::Man => {
                        let row = f64::from(pos.row()) / last_row;
                        let progress = match color {
                            PieceColor::White => 1.0 - row,
                            PieceColor::Black => row,
                        };
                        Self::MAN + (progress - 1.0).powi(3) + 1.0
                    }
                    PieceRank::King => Self::KING,
                };
                color.sign() * value
            })
            .sum()
    }
}

/// Evaluation by a neural network with a single output.
///
/// The input vector has one entry per playable square in bit-index order: `±1` for a
/// man, `±2` for a king (positive for White) and `0` for an empty square.
#[derive(Debug, Clone)]
pub struct NetworkEvaluator {
    network: Network,
}

impl NetworkEvaluator {
    const MAN_INPUT: f64 = 1.0;
    const KING_INPUT: f64 = 2.0;

    pub fn new(network: Network) -> Result<Self, NetworkError> {
        let outputs = network.output_count();
        if outputs != 1 {
            return Err(NetworkError::OutputCount { outputs });
        }
        Ok(Self { network })
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Encodes a board as network input.
    #[must_use]
    pub fn encode(state: &BoardState) -> Vec<f64> {
        state
            .iter()
            .map(|(_, piece)| match piece {
                PieceType::None => 0.0,
                PieceType::WhiteMan => Self::MAN_INPUT,
                PieceType::WhiteKing => Self::KING_INPUT,
                PieceType::BlackMan => -Self::MAN_INPUT,
                PieceType::BlackKing => -Self::KING_INPUT,
            })
            .collect()
    }
}

impl BoardEvaluator for NetworkEvaluator {
    fn evaluate(&self, state: &BoardState) -> f64 {
        self.network.feed_forward(&Self::encode(state))[0]
    }
}

/// Built-in static evaluators, selectable by name.
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
pub enum StaticEvaluatorKind {
    #[default]
    Basic,
    Progressive,
}

impl StaticEvaluatorKind {
    #[must_use]
    pub fn build(self) -> Box<dyn BoardEvaluator> {
        match self {
            Self::Basic => Box::new(BasicEvaluator),
            Self::Progressive => Box::new(ProgressiveEvaluator),
        }
    }
}
