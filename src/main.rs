//! Command-line driver: reads a corpus document, runs the build pipeline,
//! and writes the word list and compact dictionary together.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chaindict::{BuildOptions, build, parse_units};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{info, warn};
use rayon::ThreadPoolBuilder;

const DEFAULT_WORDLIST: &str = "ContentWordList.txt";
const DEFAULT_DICT: &str = "ContentIntDict.txt";

#[derive(Parser, Debug)]
#[command(author, version, about = "Compact Markov dictionary builder", long_about = None)]
struct Cli {
    /// Corpus document: a JSON array of token lists or labeled segment objects
    corpus: PathBuf,

    /// Output path for the word list
    #[arg(long, value_name = "PATH", default_value = DEFAULT_WORDLIST)]
    wordlist: PathBuf,

    /// Output path for the compact dictionary
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DICT)]
    dict: PathBuf,

    /// Fail when the corpus contains no real tokens
    #[arg(long)]
    require_words: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Some(threads) = cli.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    let text = fs::read_to_string(&cli.corpus)
        .with_context(|| format!("failed to read {}", cli.corpus.display()))?;
    let units = parse_units(&text)
        .with_context(|| format!("failed to parse {}", cli.corpus.display()))?;
    info!("loaded {} corpus units", units.len());

    let options = BuildOptions {
        show_progress: !cli.no_progress,
        require_words: cli.require_words,
    };
    let output = build(&units, options).context("dictionary build failed")?;

    if output.vocabulary.word_count() == 0 {
        warn!("corpus held no real tokens; artifacts contain sentinels only");
    }

    // Both artifacts are written together: the dictionary's identifiers are
    // meaningless without the matching word list.
    fs::write(&cli.wordlist, output.vocabulary.word_list())
        .with_context(|| format!("failed to write {}", cli.wordlist.display()))?;
    fs::write(&cli.dict, output.dictionary.to_text())
        .with_context(|| format!("failed to write {}", cli.dict.display()))?;

    let keys = output.dictionary.key_count();
    let saving_mib = (keys * 8) as f64 / (1024.0 * 1024.0);
    println!(
        "✅ wrote {} and {}",
        cli.wordlist.display(),
        cli.dict.display()
    );
    println!(
        "   words {} | keys {} | candidates {} | est. saving {saving_mib:.2} MiB",
        output.vocabulary.len(),
        keys,
        output.dictionary.candidate_count(),
    );

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}
