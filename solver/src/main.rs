use std::process::ExitCode;
use std::time::Instant;

use starbattle::builder::BoardBuilder;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // an 8x8 puzzle with one star per row, column, and area
    let board = BoardBuilder::from_region_rows(1, &[
        "AAABBBCC",
        "AAABBBCC",
        "DDEEEECC",
        "DDEEEEFF",
        "DDEEFFFF",
        "GGGGHHHF",
        "GGGGHHHH",
        "GGGGGHHH",
    ]).build();

    let board = match board {
        Ok(board) => board,
        Err(reason) => {
            eprintln!("bad puzzle: {reason}");
            return ExitCode::FAILURE;
        }
    };

    print!("{board}");

    let started = Instant::now();
    match board.solve() {
        Ok(solution) => {
            print!("{solution}");
            println!("solved in {:?}", started.elapsed());
            ExitCode::SUCCESS
        }
        Err(failure) => {
            println!("{failure} (determined in {:?})", started.elapsed());
            ExitCode::FAILURE
        }
    }
}
