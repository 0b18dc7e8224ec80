//! Neuro-evolution of draughts board evaluators.
//!
//! This crate evolves the weights of [`Network`](draughts_evaluator::network::Network)
//! evaluators with a genetic algorithm. Fitness is measured by play: every candidate
//! network drives a minimax player through a series of games against a reference
//! opponent, and the number of games won decides its share of the next generation.
//!
//! # How Training Works
//!
//! 1. **Population** - Random networks with Gaussian weights
//! 2. **Evaluation** - Each network plays `match_count` games against the opponent
//! 3. **Fitness** - Wins with either colour; ties and losses count nothing
//! 4. **Selection** - Roulette-wheel sampling plus elitism
//! 5. **Reproduction** - Neuron-wise crossover and Gaussian mutation
//! 6. **Escalation** - A dominating network replaces the opponent
//!
//! # Architecture
//!
//! ```text
//! Trainer (genetic)
//!     ↓ evolves
//! Networks (weights)
//!     ↓ wrapped in
//! NetworkEvaluator + MinimaxBot (draughts-evaluator)
//!     ↓ played by
//! Match Simulator against the current Opponent
//!     ↓ produces
//! Fitness
//! ```
//!
//! # Modules
//!
//! - [`config`] - Run parameters and their validation
//! - [`genetic`] - Population lifecycle, selection, elitism and opponent escalation
//! - [`weights`] - Initialization, crossover and mutation of network weights
//!
//! # Example
//!
//! ```rust,no_run
//! use draughts_engine::EnglishDraughts;
//! use draughts_evaluator::CancellationToken;
//! use draughts_training::{
//!     config::TrainingConfig,
//!     genetic::{NoopObserver, Trainer},
//! };
//!
//! let rules = EnglishDraughts::new();
//! let config = TrainingConfig {
//!     hidden_layers: vec![16],
//!     ..TrainingConfig::default()
//! };
//! let mut trainer = Trainer::new("example", config, &rules, CancellationToken::new())?;
//! let history = trainer.run(&mut NoopObserver)?;
//! let best = &history.last().unwrap()[0];
//! println!("best fitness: {}", best.fitness());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Current Limitations
//!
//! - **Fixed opponent per generation**: fitness is measured against a single opponent,
//!   so a population can overfit to its weaknesses
//! - **Noisy fitness**: tie-breaks in the search are random and the number of games is
//!   small, so equally strong networks can receive quite different fitness values

pub mod config;
pub mod genetic;
pub mod weights;
