use chrono::{DateTime, Utc};
use draughts_engine::RulesKind;
use draughts_training::config::TrainingConfig;
use serde::{Deserialize, Serialize};

/// Contents of `settings.json`, written once when a training run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub rules: RulesKind,
    /// Neuron counts of the evolved networks, inputs first.
    pub layout: Vec<usize>,
    /// Seed actually used, so that the run can be repeated.
    pub seed: u64,
    pub config: TrainingConfig,
}
