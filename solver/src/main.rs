use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use linkbone::{deduct, solve, Outcome, Puzzle, Report, Status};

/// Solve or deduce on a path-drawing grid puzzle saved by the editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log at debug level; RUST_LOG takes precedence when set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find one solution and print its lines
    Solve(Target),
    /// Find the lines and crosses shared by every solution
    Deduct(Target),
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Puzzle file: a JSON array of entity records
    file: PathBuf,

    /// Print the input puzzle with the results merged in, instead of a report
    #[arg(long)]
    merge: bool,
}

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_target(false);

    // RUST_LOG overrides our defaults if explicitly set
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match try_main(cli) {
        Ok(Status::Unsolvable) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<Status, Box<dyn std::error::Error>> {
    let (target, (puzzle, outcome)) = match &cli.command {
        Command::Solve(target) => (target, run(target, solve)?),
        Command::Deduct(target) => (target, run(target, deduct)?),
    };
    let status = outcome.status();
    log::info!("{}: {status:?}", target.file.display());

    let json = if target.merge {
        let mut puzzle = puzzle;
        if let Outcome::Solved(marks) = &outcome {
            let added = puzzle.merge_marks(marks);
            log::info!("merged {added} new marks");
        }
        to_json(&puzzle.to_records(), cli.pretty)?
    } else {
        to_json(&Report::from(outcome), cli.pretty)?
    };
    println!("{json}");

    Ok(status)
}

fn run(
    target: &Target,
    operation: fn(&[linkbone::Entity]) -> Result<Outcome, linkbone::SolverFailure>,
) -> Result<(Puzzle, Outcome), Box<dyn std::error::Error>> {
    let puzzle = Puzzle::from_json(&std::fs::read_to_string(&target.file)?)?;
    let outcome = operation(puzzle.entities())?;
    Ok((puzzle, outcome))
}

fn to_json(value: &impl serde::Serialize, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
