use crate::models::lexicon::Lexicon;
use crate::models::pattern_index::PatternIndex;
use crate::utils::create_file;
use anyhow::Error;
use std::path::PathBuf;
use structopt::StructOpt;

/// Build the pattern index and report its statistics
#[derive(Debug, StructOpt)]
pub struct Stats {
    /// The word list: newline-delimited UTF-8 text, one token per line
    dictionary: PathBuf,
    /// Also write the statistics as JSON to this file
    #[structopt(long)]
    output: Option<PathBuf>,
}

pub fn stats(cmd: Stats) -> Result<(), Error> {
    let lexicon = Lexicon::load(&cmd.dictionary)?;
    let index = PatternIndex::build(lexicon);
    let stats = index.stats();

    log::info!("Placeable words: {}", stats.placeable_words);
    log::info!("Checkable words: {}", stats.checkable_words);
    log::info!("Full-length words: {}", stats.full_length_words);
    log::info!("Real intermediaries: {}", stats.intermediaries);
    log::info!(
        "Connected intermediaries: {} (avg {:.1} words each)",
        stats.connected_intermediaries,
        stats.avg_words_per_intermediary
    );
    log::info!(
        "Liners: {} (avg {:.1} intermediaries each)",
        stats.liners,
        stats.avg_intermediaries_per_liner
    );

    if let Some(output) = &cmd.output {
        serde_json::to_writer_pretty(create_file(output)?, &stats)?;
        log::info!("Wrote statistics to {}", output.display());
    }

    Ok(())
}
