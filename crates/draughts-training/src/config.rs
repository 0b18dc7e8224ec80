//! Training run parameters.

use draughts_evaluator::board_evaluator::StaticEvaluatorKind;
use serde::{Deserialize, Serialize};

/// Parameters of an evolutionary training run.
///
/// Every field has a default, so a JSON file only needs to list the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Neuron counts of the hidden layers. Input and output layers are derived from the
    /// board layout.
    pub hidden_layers: Vec<usize>,
    /// Probability that a non-elite network is mutated at all.
    pub mutation_rate: f64,
    /// Probability that a single weight of a mutated network is perturbed.
    pub mutation_bit_rate: f64,
    /// Standard deviation of the Gaussian noise added by mutation.
    pub mutation_scatter: f64,
    /// Probability that a pair of non-elite networks is recombined.
    pub crossover_rate: f64,
    pub population_size: usize,
    /// Fittest networks carried over unchanged into the next generation.
    pub elite_count: usize,
    pub generation_count: usize,
    /// Games played by every candidate against the current opponent.
    pub match_count: usize,
    /// The best network becomes the new opponent once its fitness exceeds
    /// `opponent_replace_threshold * match_count`. A value below 1 additionally promotes
    /// the best network of the first generation unconditionally.
    pub opponent_replace_threshold: f64,
    pub minimax_depth: usize,
    /// Heuristic played against until a network takes over.
    pub initial_opponent: StaticEvaluatorKind,
    /// Mean of the initial weight distribution.
    pub init_mean: f64,
    /// Standard deviation of the initial weight distribution.
    pub init_spread: f64,
    /// Worker threads used to evaluate candidates. 1 evaluates sequentially.
    pub parallelism: usize,
    /// Seed of the trainer's random generator. A fresh seed is drawn when unset.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![],
            mutation_rate: 1.0,
            mutation_bit_rate: 0.01,
            mutation_scatter: 1.0,
            crossover_rate: 0.2,
            population_size: 30,
            elite_count: 5,
            generation_count: 10,
            match_count: 50,
            opponent_replace_threshold: 1.0,
            minimax_depth: 3,
            initial_opponent: StaticEvaluatorKind::Basic,
            init_mean: 1.0,
            init_spread: 0.2,
            parallelism: 1,
            seed: None,
        }
    }
}

/// Error returned for an unusable [`TrainingConfig`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population must not be empty")]
    EmptyPopulation,
    #[display("{elites} elites do not fit into a population of {population}")]
    TooManyElites { elites: usize, population: usize },
    #[display("{name} must be a probability in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[display("{name} must be a finite non-negative spread, got {value}")]
    InvalidSpread { name: &'static str, value: f64 },
    #[display("init_mean must be finite, got {value}")]
    InvalidMean { value: f64 },
    #[display("hidden layer {index} has no neurons")]
    EmptyHiddenLayer { index: usize },
    #[display("match count must be positive")]
    NoMatches,
    #[display("generation count must be positive")]
    NoGenerations,
    #[display("parallelism must be at least 1")]
    NoWorkers,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elite_count > self.population_size {
            return Err(ConfigError::TooManyElites {
                elites: self.elite_count,
                population: self.population_size,
            });
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("mutation_bit_rate", self.mutation_bit_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        for (name, value) in [
            ("mutation_scatter", self.mutation_scatter),
            ("init_spread", self.init_spread),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSpread { name, value });
            }
        }
        if !self.init_mean.is_finite() {
            return Err(ConfigError::InvalidMean {
                value: self.init_mean,
            });
        }
        if let Some(index) = self.hidden_layers.iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyHiddenLayer { index });
        }
        if self.match_count == 0 {
            return Err(ConfigError::NoMatches);
        }
        if self.generation_count == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.parallelism == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}
