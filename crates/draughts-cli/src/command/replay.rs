use std::{iter, path::PathBuf};

use draughts_engine::{GameRecord, RulesKind};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the game record file (JSON format)
    record_file: PathBuf,
    /// Rules the game was played under
    #[arg(long, default_value = "english")]
    rules: RulesKind,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { record_file, rules } = arg;

    eprintln!("Loading game record from {}", record_file.display());
    let record: GameRecord = util::read_json_file("game record", record_file)?;
    eprintln!("Loaded {} moves", record.moves().len());

    let rules = rules.build();
    let mut state = rules.initial_state();
    for (ply, mv) in record.moves().iter().enumerate() {
        anyhow::ensure!(
            rules.available_moves(&state).contains(mv),
            "Move #{} ({mv}) is not legal in the recorded position",
            ply + 1
        );
        state = state.apply_move(mv);
    }

    let moves = iter::once(None).chain(record.moves().iter().map(Some));
    for (ply, (mv, state)) in iter::zip(moves, record.replay(&*rules)).enumerate() {
        match mv {
            Some(mv) => println!("#{ply}: {mv}"),
            None => println!("#{ply}: initial position"),
        }
        println!("{state}");
        println!();
    }
    println!("Outcome: {:?}", record.outcome());
    Ok(())
}
