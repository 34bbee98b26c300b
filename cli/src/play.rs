use std::io::{BufRead, Write};

use anyhow::Result;
use twofold_core::*;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Command {
    Quit,
    Restart,
    Continue,
    Move(Direction),
    Ignored,
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "q" | "quit" => Command::Quit,
        "r" | "restart" => Command::Restart,
        "c" | "continue" => Command::Continue,
        other => match other.parse::<Direction>() {
            Ok(direction) => Command::Move(direction),
            Err(err) => {
                log::trace!("ignoring input {:?}: {}", other, err);
                Command::Ignored
            }
        },
    }
}

fn print_board<S: TileSpawner, W: Write>(engine: &PlayEngine<S>, output: &mut W) -> Result<()> {
    writeln!(output, "score: {}", engine.score())?;
    write!(output, "{}", engine.grid())?;
    Ok(())
}

/// Reads commands line by line until `q` or end of input, returns the final score.
pub fn run<R: BufRead, W: Write>(
    config: GameConfig,
    seed: u64,
    input: R,
    mut output: W,
) -> Result<Score> {
    let mut engine = PlayEngine::with_seed(config, seed)?;
    print_board(&engine, &mut output)?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Command::Quit => break,
            Command::Restart => {
                engine.restart()?;
                print_board(&engine, &mut output)?;
            }
            Command::Continue => {
                engine.keep_playing();
            }
            Command::Move(_) if engine.is_finished() => {
                if engine.is_over() {
                    writeln!(output, "game over, 'r' to restart or 'q' to quit")?;
                } else {
                    writeln!(output, "target reached, 'c' to keep playing")?;
                }
            }
            Command::Move(direction) => {
                let report = engine.play(direction)?;
                match report.outcome {
                    MoveOutcome::NoChange => continue,
                    MoveOutcome::Moved => print_board(&engine, &mut output)?,
                    MoveOutcome::ReachedTarget => {
                        print_board(&engine, &mut output)?;
                        writeln!(output, "target reached! 'c' to keep playing")?;
                    }
                    MoveOutcome::GameOver => {
                        print_board(&engine, &mut output)?;
                        writeln!(output, "game over! final score {}", engine.score())?;
                    }
                }
            }
            Command::Ignored => {}
        }
        output.flush()?;
    }

    Ok(engine.score())
}
