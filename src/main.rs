use crate::commands::generate::{generate, Generate};
use crate::commands::stats::{stats, Stats};
use anyhow::Error;
use jemallocator::Jemalloc;
use std::env;
use std::env::VarError;
use structopt::StructOpt;

mod commands;
mod config;
mod models;
mod sink;
mod solver;
mod utils;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "bulmaca",
    about = "CLI for generating crossword-style letter grids from a word list."
)]
enum Opt {
    Generate(Generate),
    Stats(Stats),
}

fn main() -> Result<(), Error> {
    if let Err(VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    env_logger::init();
    log::info!("Starting");

    match Opt::from_args() {
        Opt::Generate(cmd) => generate(cmd)?,
        Opt::Stats(cmd) => stats(cmd)?,
    };

    log::info!("Done");
    Ok(())
}
