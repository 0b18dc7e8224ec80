use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use chrono::Utc;
use draughts_engine::RulesKind;
use draughts_evaluator::{CancellationToken, board_evaluator::StaticEvaluatorKind};
use draughts_training::{
    config::TrainingConfig,
    genetic::{GenerationReport, Trainer, TrainingObserver},
};

use crate::{schema::run_settings::RunSettings, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Run identifier, used as the name of the run directory
    id: String,
    /// Directory receiving run directories
    #[arg(long, default_value = "runs")]
    output: PathBuf,
    #[arg(long, default_value = "english")]
    rules: RulesKind,
    /// Training configuration JSON file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Hidden layer sizes, comma separated
    #[arg(long, value_delimiter = ',')]
    hidden: Option<Vec<usize>>,
    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    elites: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// Games per candidate and generation
    #[arg(long)]
    matches: Option<usize>,
    #[arg(long)]
    depth: Option<usize>,
    /// Heuristic opponent of the first generations
    #[arg(long)]
    opponent: Option<StaticEvaluatorKind>,
    #[arg(long)]
    replace_threshold: Option<f64>,
    /// Worker threads evaluating candidates
    #[arg(long)]
    parallelism: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl TrainArg {
    fn load_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => crate::util::read_json_file("training config", path)?,
            None => TrainingConfig::default(),
        };
        if let Some(hidden) = &self.hidden {
            config.hidden_layers.clone_from(hidden);
        }
        let overrides = [
            (self.population, &mut config.population_size),
            (self.elites, &mut config.elite_count),
            (self.generations, &mut config.generation_count),
            (self.matches, &mut config.match_count),
            (self.depth, &mut config.minimax_depth),
            (self.parallelism, &mut config.parallelism),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(opponent) = self.opponent {
            config.initial_opponent = opponent;
        }
        if let Some(threshold) = self.replace_threshold {
            config.opponent_replace_threshold = threshold;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let rules = arg.rules.build();
    let cancel = CancellationToken::new();
    let mut trainer = Trainer::new(&arg.id, config, &*rules, cancel.clone())
        .context("Invalid training configuration")?;

    fs::create_dir_all(&arg.output)
        .with_context(|| format!("Failed to create directory: {}", arg.output.display()))?;
    let run_dir = arg.output.join(&arg.id);
    if let Err(e) = fs::create_dir(&run_dir) {
        if e.kind() == io::ErrorKind::AlreadyExists {
            anyhow::bail!("Run ID {} already used: {}", arg.id, run_dir.display());
        }
        return Err(e)
            .with_context(|| format!("Failed to create run directory: {}", run_dir.display()));
    }

    let settings = RunSettings {
        id: arg.id.clone(),
        started_at: Utc::now(),
        rules: arg.rules,
        layout: trainer.layout().to_vec(),
        seed: trainer.seed(),
        config: trainer.config().clone(),
    };
    Output::save_json(&settings, Some(run_dir.join("settings.json")))?;
    log::info!(
        "{}: training {:?} networks, seed {}, writing to {}",
        arg.id,
        settings.layout,
        settings.seed,
        run_dir.display()
    );

    let mut observer = RunRecorder {
        run_dir: run_dir.clone(),
        run_id: arg.id.clone(),
        match_count: settings.config.match_count,
        cancel,
        error: None,
    };
    let history = trainer.run(&mut observer)?;
    if let Some(e) = observer.error {
        return Err(e);
    }

    let Some(last) = history.last() else {
        eprintln!("[{}] no generation completed", arg.id);
        return Ok(());
    };
    let last_number = history.len() - 1;
    eprintln!();
    eprintln!("Final generation (against {}):", trainer.opponent().id());
    for (i, candidate) in last.iter().enumerate().take(5) {
        eprintln!("  net{i}: {}", candidate.stats());
    }
    eprintln!(
        "Best network: {}",
        run_dir.join(format!("gen{last_number}_net0.json")).display()
    );
    Ok(())
}

/// Persists every generation into the run directory and reports it on stderr.
///
/// The first I/O failure is kept and cancels the run.
#[derive(Debug)]
struct RunRecorder {
    run_dir: PathBuf,
    run_id: String,
    match_count: usize,
    cancel: CancellationToken,
    error: Option<anyhow::Error>,
}

impl RunRecorder {
    fn save_generation(&self, report: &GenerationReport<'_>) -> anyhow::Result<()> {
        let mut entry = String::new();
        writeln!(entry, "Generation: {}", report.generation)?;
        writeln!(entry, "opponent: {}", report.opponent_id)?;
        for (i, candidate) in report.candidates.iter().enumerate() {
            writeln!(entry, "net{i} - {}", candidate.stats())?;
        }
        writeln!(entry, "{}", "-".repeat(40))?;

        let log_path = self.run_dir.join("log.txt");
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .with_context(|| format!("Failed to append to {}", log_path.display()))?;

        for (i, candidate) in report.candidates.iter().enumerate() {
            let path = self
                .run_dir
                .join(format!("gen{}_net{i}.json", report.generation));
            Output::save_json(candidate.network(), Some(path))?;
        }
        Ok(())
    }
}

impl TrainingObserver for RunRecorder {
    fn on_candidate_done(&self, done: usize, total: usize) {
        eprint!("\r[{}] {done}/{total} networks evaluated", self.run_id);
    }

    fn on_generation(&mut self, report: &GenerationReport<'_>) {
        let best = report.candidates.first().map_or(0.0, |c| c.fitness());
        eprint!("\r\x1b[2K");
        eprintln!(
            "[{}] gen{} | best: {best}/{} (opponent: {})",
            self.run_id, report.generation, self.match_count, report.opponent_id
        );
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.save_generation(report) {
            log::error!("{}: {e:#}", self.run_id);
            self.error = Some(e);
            self.cancel.cancel();
        }
    }
}
