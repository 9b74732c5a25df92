use crate::models::grid::Grid;
use crate::models::lexicon::Lexicon;
use crate::models::pattern_index::PatternIndex;
use crate::sink::ArtifactSink;
use crate::solver::Solver;
use anyhow::Error;
use std::path::PathBuf;
use structopt::StructOpt;

/// Build the pattern index from a word list and search for a fully filled
/// grid
#[derive(Debug, StructOpt)]
pub struct Generate {
    /// The word list: newline-delimited UTF-8 text, one token per line.
    /// Tokens are lowercased and stripped of whitespace; tokens with
    /// characters outside the alphabet are ignored.
    dictionary: PathBuf,
    /// Seed for the pseudo-random generator. Derived from the clock when
    /// absent; pass a fixed value to reproduce a run.
    #[structopt(long)]
    seed: Option<u64>,
    /// Ceiling on the number of search attempts before giving up
    #[structopt(long, default_value = "50000")]
    max_attempts: u64,
    /// Directory receiving near-complete grids that decompose into valid
    /// words
    #[structopt(long, default_value = "solvables")]
    solvables: PathBuf,
    /// Directory receiving near-complete grids that do not decompose yet
    #[structopt(long, default_value = "close_calls")]
    close_calls: PathBuf,
}

pub fn generate(cmd: Generate) -> Result<(), Error> {
    let lexicon = Lexicon::load(&cmd.dictionary)?;
    let index = PatternIndex::build(lexicon);
    let sink = ArtifactSink::new(cmd.solvables, cmd.close_calls)?;

    let mut solver = Solver::new(&index, &sink, cmd.max_attempts, cmd.seed);
    match solver.solve() {
        Ok(Some(grid)) => report_solution(&grid),
        Ok(None) => println!("No solution found: every branch was explored."),
        Err(exhausted) => println!("No solution found: {}.", exhausted),
    }

    Ok(())
}

fn report_solution(grid: &Grid) {
    println!("{}", grid);
    println!("Placed words:");
    for (i, placement) in grid.placements().iter().enumerate() {
        println!("{:2}. {}", i + 1, placement);
    }
}
