//! Genetic algorithm evolving neural-network board evaluators.
//!
//! A population of networks is evaluated by letting each network, wrapped in a
//! [`NetworkEvaluator`] and a [`MinimaxBot`], play a fixed number of games against the
//! current opponent. The generation is then bred into the next one.
//!
//! # Algorithm Overview
//!
//! 1. **Init** - `population_size` networks with Gaussian random weights
//! 2. **Fitness** - Every candidate plays `match_count` games against the opponent;
//!    fitness is the number of games won with either colour
//! 3. **Opponent Escalation** - Once the best candidate dominates the opponent, it
//!    becomes the opponent for all following generations
//! 4. **Sort** - Candidates are sorted by descending fitness
//! 5. **Roulette Selection** - A mating pool of the population size is drawn with
//!    fitness-proportionate probability, with replacement
//! 6. **Elitism** - The last `elite_count` pool slots are replaced by the fittest networks
//! 7. **Crossover** - Consecutive non-elite pairs are recombined neuron by neuron
//! 8. **Mutation** - Non-elite networks receive Gaussian noise on random weights
//! 9. Repeat from step 2 until `generation_count` generations have been evaluated
//!
//! # Opponent Escalation
//!
//! Before breeding generation `N` (`N >= 1`), the best network of generation `N - 1`
//! replaces the opponent if its fitness exceeds
//! `opponent_replace_threshold * match_count`. With a threshold below 1 the best network
//! of generation 0 always replaces the initial heuristic opponent, which turns the run
//! into a self-play ratchet. The new opponent is identified as
//! `{run_id}/gen{N-1}_net0`, matching the snapshot the CLI writes for it.
//!
//! # Parallelization
//!
//! Candidates are evaluated on `parallelism` scoped threads. Each candidate gets its own
//! random generator, seeded from the trainer's generator in population order, so a run is
//! reproducible from its seed no matter how many threads evaluate it.

use std::{
    iter, mem,
    sync::{Mutex, PoisonError},
    thread,
};

use draughts_engine::Rules;
use draughts_evaluator::{
    CancellationToken,
    board_evaluator::{NetworkEvaluator, StaticEvaluatorKind},
    match_simulator::{MatchStats, simulate_matches},
    minimax::MinimaxBot,
    network::{Network, NetworkError},
};
use rand::{Rng, SeedableRng as _};
use rand_distr::Normal;
use rand_pcg::Pcg64Mcg;

use crate::{
    config::{ConfigError, TrainingConfig},
    weights,
};

/// Error aborting a training run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid training configuration: {_0}")]
    Config(ConfigError),
    #[display("invalid network: {_0}")]
    Network(NetworkError),
}

/// A network and the results it achieved against the opponent.
#[derive(Debug, Clone)]
pub struct Candidate {
    network: Network,
    stats: MatchStats,
    fitness: f64,
}

impl Candidate {
    #[must_use]
    pub fn new(network: Network, stats: MatchStats) -> Self {
        Self {
            network,
            fitness: stats.fitness(),
            stats,
        }
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// Evaluated candidates of one generation, sorted by descending fitness.
pub type Generation = Vec<Candidate>;

/// The player candidates are measured against.
#[derive(Debug, Clone)]
pub enum Opponent {
    /// Minimax with a hand-written evaluator.
    Heuristic(StaticEvaluatorKind),
    /// Minimax with a network promoted from an earlier generation.
    Network {
        id: String,
        evaluator: NetworkEvaluator,
    },
}

impl Opponent {
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Heuristic(StaticEvaluatorKind::Basic) => "minimax_basic".to_owned(),
            Self::Heuristic(StaticEvaluatorKind::Progressive) => "minimax_progressive".to_owned(),
            Self::Network { id, .. } => id.clone(),
        }
    }

    /// Builds a fresh player searching to `depth`.
    #[must_use]
    pub fn build(&self, depth: usize) -> MinimaxBot {
        match self {
            Self::Heuristic(kind) => MinimaxBot::new(self.id(), depth, kind.build()),
            Self::Network { id, evaluator } => {
                MinimaxBot::new(id.clone(), depth, Box::new(evaluator.clone()))
            }
        }
    }
}

/// Summary of an evaluated generation, passed to a [`TrainingObserver`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport<'a> {
    pub generation: usize,
    pub opponent_id: &'a str,
    pub candidates: &'a [Candidate],
}

/// Receives progress notifications from a [`Trainer`].
///
/// Notifications have no effect on the run itself.
pub trait TrainingObserver: Sync {
    /// Called from worker threads whenever a candidate has finished its games.
    fn on_candidate_done(&self, _done: usize, _total: usize) {}

    /// Called after every generation has been evaluated and sorted.
    fn on_generation(&mut self, _report: &GenerationReport<'_>) {}
}

/// Observer ignoring every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {}

/// Runs the genetic algorithm.
#[derive(Debug)]
pub struct Trainer<'a> {
    run_id: String,
    config: TrainingConfig,
    rules: &'a dyn Rules,
    layout: Vec<usize>,
    init: Normal<f64>,
    noise: Normal<f64>,
    seed: u64,
    rng: Pcg64Mcg,
    cancel: CancellationToken,
    opponent: Opponent,
}

impl<'a> Trainer<'a> {
    /// Creates a trainer after validating `config`.
    ///
    /// The network layout is `[playable squares, hidden layers..., 1]`.
    pub fn new(
        run_id: impl Into<String>,
        config: TrainingConfig,
        rules: &'a dyn Rules,
        cancel: CancellationToken,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let init = Normal::new(config.init_mean, config.init_spread).map_err(|_| {
            ConfigError::InvalidSpread {
                name: "init_spread",
                value: config.init_spread,
            }
        })?;
        let noise = Normal::new(0.0, config.mutation_scatter).map_err(|_| {
            ConfigError::InvalidSpread {
                name: "mutation_scatter",
                value: config.mutation_scatter,
            }
        })?;
        let layout = iter::once(rules.layout().playable_squares())
            .chain(config.hidden_layers.iter().copied())
            .chain(iter::once(1))
            .collect();
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let opponent = Opponent::Heuristic(config.initial_opponent);
        Ok(Self {
            run_id: run_id.into(),
            config,
            rules,
            layout,
            init,
            noise,
            seed,
            rng: Pcg64Mcg::seed_from_u64(seed),
            cancel,
            opponent,
        })
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Seed of the run, drawn at creation unless configured.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Neuron counts of the evolved networks, inputs first.
    #[must_use]
    pub fn layout(&self) -> &[usize] {
        &self.layout
    }

    #[must_use]
    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    /// Runs all generations and returns their history, oldest first.
    ///
    /// If the run is cancelled, the generation being evaluated is discarded and the
    /// history of the completed ones is returned.
    pub fn run(
        &mut self,
        observer: &mut dyn TrainingObserver,
    ) -> Result<Vec<Generation>, TrainingError> {
        let mut population = (0..self.config.population_size)
            .map(|_| weights::random_network(&self.layout, &self.init, &mut self.rng))
            .collect::<Result<Vec<_>, _>>()?;
        let mut history: Vec<Generation> = vec![];

        for number in 0..self.config.generation_count {
            if let Some(previous) = history.last() {
                self.escalate_opponent(previous, number)?;
                population = self.breed(previous);
            }

            let generation = self.evaluate(mem::take(&mut population), &*observer)?;
            if self.cancel.is_cancelled() {
                log::info!("{}: cancelled in generation {number}", self.run_id);
                break;
            }

            let opponent_id = self.opponent.id();
            log::debug!(
                "{}: gen{number} best {}/{} against {opponent_id}",
                self.run_id,
                generation[0].fitness,
                self.config.match_count,
            );
            observer.on_generation(&GenerationReport {
                generation: number,
                opponent_id: &opponent_id,
                candidates: &generation,
            });
            history.push(generation);
        }

        Ok(history)
    }

    /// Promotes the best network of `previous` to opponent if it qualifies.
    #[expect(clippy::cast_precision_loss)]
    fn escalate_opponent(
        &mut self,
        previous: &[Candidate],
        number: usize,
    ) -> Result<(), NetworkError> {
        let Some(best) = previous.first() else {
            return Ok(());
        };
        let threshold = self.config.opponent_replace_threshold;
        let dominates = best.fitness > threshold * self.config.match_count as f64;
        let first_promotion = number == 1 && threshold < 1.0;
        if !dominates && !first_promotion {
            return Ok(());
        }

        let id = format!("{}/gen{}_net0", self.run_id, number - 1);
        log::info!("{}: new opponent {id} (fitness {})", self.run_id, best.fitness);
        self.opponent = Opponent::Network {
            id,
            evaluator: NetworkEvaluator::new(best.network.clone())?,
        };
        Ok(())
    }

    /// Produces the unevaluated population following `previous`.
    pub(crate) fn breed(&mut self, previous: &[Candidate]) -> Vec<Network> {
        let mut pool = select_roulette(previous, &mut self.rng);

        let elites = self.config.elite_count.min(pool.len());
        let breeding = pool.len() - elites;
        pool.truncate(breeding);
        pool.extend(previous[..elites].iter().map(|c| c.network.clone()));

        for pair in pool[..breeding].chunks_exact_mut(2) {
            if self.rng.random_bool(self.config.crossover_rate) {
                let (a, b) = weights::crossover(&pair[0], &pair[1], &mut self.rng);
                pair[0] = a;
                pair[1] = b;
            }
        }
        for network in &mut pool[..breeding] {
            if self.rng.random_bool(self.config.mutation_rate) {
                weights::mutate(
                    network,
                    self.config.mutation_bit_rate,
                    &self.noise,
                    &mut self.rng,
                );
            }
        }
        pool
    }

    /// Plays every network against the opponent and sorts the results.
    fn evaluate(
        &mut self,
        networks: Vec<Network>,
        observer: &dyn TrainingObserver,
    ) -> Result<Generation, TrainingError> {
        let evaluators = networks
            .into_iter()
            .map(NetworkEvaluator::new)
            .collect::<Result<Vec<_>, _>>()?;
        let seeds: Vec<u64> = evaluators.iter().map(|_| self.rng.random()).collect();
        let mut stats = vec![MatchStats::default(); evaluators.len()];

        let total = evaluators.len();
        let workers = self.config.parallelism.clamp(1, total.max(1));
        let chunk_size = total.div_ceil(workers).max(1);
        let done = Mutex::new(0);
        let depth = self.config.minimax_depth;
        let match_count = self.config.match_count;
        let rules = self.rules;
        let opponent = &self.opponent;
        let cancel = &self.cancel;

        thread::scope(|s| {
            let jobs = iter::zip(
                iter::zip(evaluators.chunks(chunk_size), seeds.chunks(chunk_size)),
                stats.chunks_mut(chunk_size),
            );
            for ((evaluators, seeds), slots) in jobs {
                let done = &done;
                s.spawn(move || {
                    let jobs = iter::zip(iter::zip(evaluators, seeds), slots);
                    for ((evaluator, seed), slot) in jobs {
                        let player =
                            MinimaxBot::new("network", depth, Box::new(evaluator.clone()));
                        let opponent = opponent.build(depth);
                        let mut rng = Pcg64Mcg::seed_from_u64(*seed);
                        *slot = simulate_matches(
                            rules,
                            &player,
                            &opponent,
                            match_count,
                            &mut rng,
                            cancel,
                        );

                        let finished = {
                            let mut done = done.lock().unwrap_or_else(PoisonError::into_inner);
                            *done += 1;
                            *done
                        };
                        observer.on_candidate_done(finished, total);
                    }
                });
            }
        });

        let mut generation: Generation = iter::zip(evaluators, stats)
            .map(|(evaluator, stats)| Candidate::new(evaluator.into_network(), stats))
            .collect();
        generation.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(generation)
    }
}

/// Draws a mating pool of the same size with fitness-proportionate probability.
///
/// Falls back to uniform selection when no candidate has positive fitness.
fn select_roulette<R>(generation: &[Candidate], rng: &mut R) -> Vec<Network>
where
    R: Rng + ?Sized,
{
    let wheel: Vec<f64> = generation
        .iter()
        .scan(0.0, |sum, c| {
            *sum += c.fitness.max(0.0);
            Some(*sum)
        })
        .collect();
    let total = wheel.last().copied().unwrap_or(0.0);

    (0..generation.len())
        .map(|_| {
            let index = if total > 0.0 {
                let r = rng.random::<f64>() * total;
                wheel.partition_point(|&sum| sum <= r).min(generation.len() - 1)
            } else {
                rng.random_range(0..generation.len())
            };
            generation[index].network.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use draughts_engine::EnglishDraughts;

    use super::*;

    fn config(seed: u64) -> TrainingConfig {
        TrainingConfig {
            population_size: 4,
            elite_count: 1,
            generation_count: 1,
            match_count: 2,
            minimax_depth: 1,
            seed: Some(seed),
            ..TrainingConfig::default()
        }
    }

    fn candidates(trainer: &mut Trainer<'_>, wins: &[u32]) -> Vec<Candidate> {
        wins.iter()
            .map(|&w| {
                let network =
                    weights::random_network(&trainer.layout, &trainer.init, &mut trainer.rng)
                        .unwrap();
                let stats = MatchStats {
                    wins_as_white: w,
                    ..MatchStats::default()
                };
                Candidate::new(network, stats)
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        generations: Vec<(usize, String, Vec<f64>)>,
        done: Mutex<usize>,
    }

    impl TrainingObserver for Recorder {
        fn on_candidate_done(&self, _done: usize, _total: usize) {
            *self.done.lock().unwrap() += 1;
        }

        fn on_generation(&mut self, report: &GenerationReport<'_>) {
            self.generations.push((
                report.generation,
                report.opponent_id.to_owned(),
                report.candidates.iter().map(Candidate::fitness).collect(),
            ));
        }
    }

    #[test]
    fn test_layout_from_rules() {
        let rules = EnglishDraughts::new();
        let config = TrainingConfig {
            hidden_layers: vec![8, 4],
            ..TrainingConfig::default()
        };
        let trainer = Trainer::new("run", config, &rules, CancellationToken::new()).unwrap();
        assert_eq!(trainer.layout(), &[32, 8, 4, 1]);
        assert_eq!(trainer.opponent().id(), "minimax_basic");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let rules = EnglishDraughts::new();
        let config = TrainingConfig {
            population_size: 0,
            elite_count: 0,
            ..TrainingConfig::default()
        };
        assert_eq!(
            Trainer::new("run", config, &rules, CancellationToken::new()).unwrap_err(),
            ConfigError::EmptyPopulation
        );
    }

    #[test]
    fn test_fittest_survive_unchanged() {
        let rules = EnglishDraughts::new();
        let config = TrainingConfig {
            population_size: 6,
            elite_count: 2,
            crossover_rate: 1.0,
            mutation_rate: 1.0,
            mutation_bit_rate: 1.0,
            ..config(5)
        };
        let mut trainer = Trainer::new("run", config, &rules, CancellationToken::new()).unwrap();
        let previous = candidates(&mut trainer, &[9, 7, 3, 2, 1, 0]);

        let next = trainer.breed(&previous);
        assert_eq!(next.len(), 6);
        assert_eq!(next[4], *previous[0].network());
        assert_eq!(next[5], *previous[1].network());
        // everything else was mutated at full rate
        for network in &next[..4] {
            assert!(previous.iter().all(|c| c.network() != network));
        }
    }

    #[test]
    fn test_roulette_skips_zero_fitness() {
        let rules = EnglishDraughts::new();
        let mut trainer = Trainer::new("run", config(6), &rules, CancellationToken::new()).unwrap();
        let previous = candidates(&mut trainer, &[0, 5, 0, 0]);
        let pool = select_roulette(&previous, &mut trainer.rng);
        assert_eq!(pool.len(), 4);
        assert!(pool.iter().all(|n| n == previous[1].network()));
    }

    #[test]
    fn test_roulette_without_fitness_is_uniform() {
        let rules = EnglishDraughts::new();
        let mut trainer = Trainer::new("run", config(7), &rules, CancellationToken::new()).unwrap();
        let previous = candidates(&mut trainer, &[0, 0, 0]);
        let pool = select_roulette(&previous, &mut trainer.rng);
        assert_eq!(pool.len(), 3);
        assert!(
            pool.iter()
                .all(|n| previous.iter().any(|c| c.network() == n))
        );
    }

    #[test]
    fn test_escalation_threshold() {
        let rules = EnglishDraughts::new();
        let config = TrainingConfig {
            opponent_replace_threshold: 0.5,
            ..config(8)
        };
        let mut trainer = Trainer::new("run", config, &rules, CancellationToken::new()).unwrap();
        let weak = candidates(&mut trainer, &[1, 0]);
        // a threshold below 1 always promotes in the first generation
        trainer.escalate_opponent(&weak, 1).unwrap();
        assert_eq!(trainer.opponent().id(), "run/gen0_net0");

        trainer.escalate_opponent(&weak, 2).unwrap();
        assert_eq!(trainer.opponent().id(), "run/gen0_net0");

        let strong = candidates(&mut trainer, &[2, 0]);
        trainer.escalate_opponent(&strong, 3).unwrap();
        assert_eq!(trainer.opponent().id(), "run/gen2_net0");
    }

    #[test]
    fn test_single_generation_run() {
        let rules = EnglishDraughts::new();
        let mut trainer = Trainer::new("run", config(42), &rules, CancellationToken::new()).unwrap();
        let mut recorder = Recorder::default();
        let history = trainer.run(&mut recorder).unwrap();

        assert_eq!(history.len(), 1);
        let generation = &history[0];
        assert_eq!(generation.len(), 4);
        assert!(generation.is_sorted_by(|a, b| a.fitness() >= b.fitness()));
        for candidate in generation {
            assert_eq!(candidate.stats().games(), 2);
        }
        assert_eq!(*recorder.done.lock().unwrap(), 4);
        assert_eq!(recorder.generations.len(), 1);
        assert_eq!(recorder.generations[0].1, "minimax_basic");
    }

    #[test]
    fn test_parallel_run_is_reproducible() {
        let rules = EnglishDraughts::new();
        let run = |parallelism| {
            let config = TrainingConfig {
                generation_count: 2,
                parallelism,
                ..config(9)
            };
            let mut trainer =
                Trainer::new("run", config, &rules, CancellationToken::new()).unwrap();
            trainer.run(&mut NoopObserver).unwrap()
        };
        let sequential = run(1);
        let parallel = run(3);
        assert_eq!(sequential.len(), 2);
        for (a, b) in iter::zip(&sequential, &parallel) {
            for (ca, cb) in iter::zip(a, b) {
                assert_eq!(ca.network(), cb.network());
                assert_eq!(ca.stats(), cb.stats());
            }
        }
    }

    #[test]
    fn test_cancelled_run_returns_completed_generations() {
        let rules = EnglishDraughts::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut trainer = Trainer::new("run", config(10), &rules, cancel).unwrap();
        let history = trainer.run(&mut NoopObserver).unwrap();
        assert!(history.is_empty());
    }
}
