use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;

mod auto;
mod config;
mod play;

use auto::{AutoArgs, run_auto};
use config::GameArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sliding tile merge puzzle in the terminal")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively, one move per line (w/a/s/d, h/j/k/l or up/down/left/right)
    Play {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Let a simple policy play a batch of games and report the results
    Auto(AutoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .init();

    match cli.command {
        Command::Play { game } => {
            let (config, seed) = game.resolve()?;
            log::info!("starting {}x{} game with seed {}", config.size, config.size, seed);
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            let score = play::run(config, seed, stdin, stdout)?;
            log::info!("finished with score {}", score);
            Ok(())
        }
        Command::Auto(args) => run_auto(args, io::stdout().lock()),
    }
}
