use std::path::PathBuf;

use draughts_engine::{BoardState, GameOutcome, Move, Rules, RulesKind};
use draughts_evaluator::{
    CancellationToken,
    match_simulator,
    minimax::{MinimaxBot, Player},
};
use rand::{RngCore, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

use crate::{player::PlayerSpec, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// White player: `basic`, `progressive` or a network JSON file
    #[arg(long, default_value = "progressive")]
    white: PlayerSpec,
    /// Black player, in the same form as White
    #[arg(long, default_value = "basic")]
    black: PlayerSpec,
    /// Search depth of both players
    #[arg(long, default_value_t = 5)]
    depth: usize,
    #[arg(long, default_value = "english")]
    rules: RulesKind,
    #[arg(long)]
    seed: Option<u64>,
    /// Save the game record as JSON
    #[arg(long)]
    record: Option<PathBuf>,
}

/// Prints every move it selects together with the resulting position.
#[derive(Debug)]
struct Narrated(MinimaxBot);

impl Player for Narrated {
    fn id(&self) -> &str {
        self.0.id()
    }

    fn select_move(
        &self,
        rules: &dyn Rules,
        state: &BoardState,
        rng: &mut dyn RngCore,
        cancel: &CancellationToken,
    ) -> Option<Move> {
        let id = self.id();
        let progress = |percent: f64| eprint!("\r{id} thinking... {percent:5.1}%");
        let mv = self
            .0
            .select_move_with_progress(rules, state, rng, cancel, Some(&progress));
        eprint!("\r\x1b[2K");
        if let Some(mv) = &mv {
            println!("{} {id}: {mv}", state.on_move());
            println!("{}", state.apply_move(mv));
            println!();
        }
        mv
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        white,
        black,
        depth,
        rules,
        seed,
        record,
    } = arg;

    let rules = rules.build();
    let white = Narrated(white.build(*depth)?);
    let black = Narrated(black.build(*depth)?);
    let mut rng = match seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(*seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };

    println!("{}", rules.initial_state());
    println!();
    let game = match_simulator::play_game(
        &*rules,
        &white,
        &black,
        &mut rng,
        &CancellationToken::new(),
    );

    match game.outcome() {
        GameOutcome::Win(color) => eprintln!("{color} wins after {} moves", game.moves().len()),
        GameOutcome::Tie => eprintln!("Tie after {} moves", game.moves().len()),
        GameOutcome::Terminated => eprintln!("Game terminated"),
    }

    if let Some(path) = record {
        Output::save_json(&game, Some(path.clone()))?;
        eprintln!("Game record saved to {}", path.display());
    }
    Ok(())
}
