use clap::{Parser, Subcommand};

use self::{play::PlayArg, replay::ReplayArg, simulate::SimulateArg, train::TrainArg};

mod play;
mod replay;
mod simulate;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve board evaluation networks with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play a series of games between two players and report the statistics
    Simulate(#[clap(flatten)] SimulateArg),
    /// Play a single game between two bots, printing every position
    Play(#[clap(flatten)] PlayArg),
    /// Print the positions of a recorded game
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}
