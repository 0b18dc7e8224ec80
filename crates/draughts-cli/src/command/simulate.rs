use std::path::PathBuf;

use draughts_engine::RulesKind;
use draughts_evaluator::{CancellationToken, match_simulator};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use crate::{player::PlayerSpec, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// First player: `basic`, `progressive` or a network JSON file
    player_a: PlayerSpec,
    /// Second player, in the same form as the first
    player_b: PlayerSpec,
    /// Number of games; the first player takes White in even-numbered games
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Search depth of both players
    #[arg(long, default_value_t = 3)]
    depth: usize,
    #[arg(long, default_value = "english")]
    rules: RulesKind,
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the statistics of the first player (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        player_a,
        player_b,
        games,
        depth,
        rules: kind,
        seed,
        output,
    } = arg;

    let rules = kind.build();
    let a = player_a.build(*depth)?;
    let b = player_b.build(*depth)?;
    let mut rng = match seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(*seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };

    eprintln!("Playing {games} games of {kind} draughts at depth {depth}...");
    let stats = match_simulator::simulate_matches(
        &*rules,
        &a,
        &b,
        *games,
        &mut rng,
        &CancellationToken::new(),
    );
    eprintln!("{stats}");
    eprintln!("fitness: {}/{}", stats.fitness(), stats.games());

    Output::save_json(&stats, output.clone())?;
    Ok(())
}
