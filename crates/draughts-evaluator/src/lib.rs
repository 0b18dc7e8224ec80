//! Move selection for draughts: board evaluation, minimax search and match play.
//!
//! This crate builds players on top of the board model in `draughts-engine`:
//!
//! 1. **Board Evaluation** ([`board_evaluator`]) - Scores a single position from White's
//!    point of view, either with a hand-written heuristic or with a neural [`network`].
//!
//! 2. **Search** ([`minimax`]) - Selects a move by searching the game tree to a fixed
//!    depth and scoring the leaves with a board evaluator.
//!
//! 3. **Match Play** ([`match_simulator`]) - Plays series of games between two players
//!    and aggregates the results, which the trainer turns into fitness.
//!
//! # Architecture
//!
//! ```text
//! Match Simulator (games between two players)
//!     ↓ asks
//! Player / MinimaxBot (select a move)
//!     ↓ scores leaves with
//! BoardEvaluator (basic, progressive, network)
//! ```
//!
//! Long-running work polls a shared [`CancellationToken`], so a controller can stop a
//! search, a game or a whole training run cooperatively.
//!
//! # Example
//!
//! ```
//! use draughts_engine::{EnglishDraughts, Rules};
//! use draughts_evaluator::{
//!     CancellationToken,
//!     board_evaluator::StaticEvaluatorKind,
//!     minimax::{MinimaxBot, Player},
//! };
//!
//! let rules = EnglishDraughts::new();
//! let bot = MinimaxBot::new("progressive", 2, StaticEvaluatorKind::Progressive.build());
//! let state = rules.initial_state();
//!
//! let mv = bot
//!     .select_move(&rules, &state, &mut rand::rng(), &CancellationToken::new())
//!     .unwrap();
//! assert!(rules.available_moves(&state).contains(&mv));
//! ```

pub use self::cancel::CancellationToken;

pub mod board_evaluator;
pub mod cancel;
pub mod match_simulator;
pub mod minimax;
pub mod network;
