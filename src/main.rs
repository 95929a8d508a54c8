use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lexdex::graph::{WordGraph, checksum};
use lexdex::index::{IndexBuilder, SqliteIndex, WordInfo};
use lexdex::lexicon::{Lexicon, WordEngine, import};
use lexdex::output::{self, WordDetails};
use lexdex::query::parse_search;
use lexdex::utils::{EngineConfig, Spinner, get_config_path};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LEXICON: &str = "default";

#[derive(Parser)]
#[command(name = "lexdex")]
#[command(about = "Lexicon search engine for word-game study")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hide progress spinners
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Where a lexicon comes from
#[derive(clap::Args)]
struct LexiconArgs {
    /// Word list, or serialized graph (`.dawg`)
    #[arg(short, long)]
    lexicon: PathBuf,

    /// The serialized graph spells words back to front
    #[arg(long)]
    reversed: bool,

    /// Expected CRC-16 of the serialized graph, in hex
    #[arg(long)]
    checksum: Option<String>,

    /// Attribute database built with `build-index`
    #[arg(long)]
    db: Option<PathBuf>,

    /// Stem lists for the stem-based study sets
    #[arg(long)]
    stems: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a word list into a serialized graph
    Compile {
        /// Word list
        words: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Store words back to front, for suffix searches
        #[arg(long)]
        reverse: bool,
    },
    /// Build the attribute database for a word list
    BuildIndex {
        /// Word list, with optional definitions after each word
        words: PathBuf,

        /// Output database
        #[arg(short, long)]
        output: PathBuf,

        /// `SYMBOL=PATH`: words missing from PATH get SYMBOL
        #[arg(long)]
        reference: Vec<String>,
    },
    /// Search a lexicon
    Search {
        /// Query, e.g. `pattern:C?T -set:hook-words`
        query: String,

        #[command(flatten)]
        source: LexiconArgs,

        /// Show hooks, probability and definitions
        #[arg(long)]
        long: bool,

        /// Print attribute rows as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Print letters filled in by wildcards in lower case
        #[arg(long)]
        show_wildcards: bool,
    },
    /// Check whether words are acceptable
    Judge {
        words: Vec<String>,

        #[command(flatten)]
        source: LexiconArgs,
    },
    /// Show word attributes
    Info {
        words: Vec<String>,

        #[command(flatten)]
        source: LexiconArgs,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LEXDEX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };

    match cli.command {
        Commands::Compile {
            words,
            output,
            reverse,
        } => compile(&config, &words, &output, reverse, cli.quiet)?,
        Commands::BuildIndex {
            words,
            output,
            reference,
        } => build_index(&config, &words, &output, &reference, cli.quiet)?,
        Commands::Search {
            query,
            source,
            long,
            json,
            no_color,
            show_wildcards,
        } => {
            let engine = load(&config, &source, cli.quiet)?;
            let spec = parse_search(&query)?;
            let words = engine.search(LEXICON, &spec, !show_wildcards);
            if json {
                let infos: Vec<WordInfo> = words.iter().map(|w| engine.word_info(LEXICON, w)).collect();
                output::print_json(&infos)?;
            } else if long {
                output::print_details(&details(&engine, &words), !no_color)?;
            } else {
                output::print_words(&words, !no_color)?;
            }
        }
        Commands::Judge { words, source } => {
            let engine = load(&config, &source, cli.quiet)?;
            let results: Vec<(String, bool)> = words
                .into_iter()
                .map(|w| {
                    let ok = engine.is_acceptable(LEXICON, &w);
                    (w.to_ascii_uppercase(), ok)
                })
                .collect();
            output::print_judgement(&results, true)?;
        }
        Commands::Info { words, source } => {
            let engine = load(&config, &source, cli.quiet)?;
            let (known, unknown): (Vec<String>, Vec<String>) = words
                .iter()
                .map(|w| w.to_ascii_uppercase())
                .partition(|w| engine.is_acceptable(LEXICON, w));
            output::print_info(&details(&engine, &known), &unknown, true)?;
        }
        Commands::Config { init } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if init {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => {
                        config.save()?;
                        get_config_path()?
                    }
                };
                eprintln!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

fn compile(config: &EngineConfig, words: &Path, output: &Path, reverse: bool, quiet: bool) -> Result<()> {
    let spinner = Spinner::start(&format!("Reading {}", words.display()), quiet);
    let mut lexicon = Lexicon::new(LEXICON, config)?;
    lexicon.import_entries(import::read_word_list(words)?, false);

    let bytes = if reverse {
        let mut reversed = WordGraph::new();
        reversed.import_words(
            lexicon
                .graph()
                .words()
                .iter()
                .map(|w| w.chars().rev().collect::<String>()),
        );
        reversed.to_bytes()?
    } else {
        lexicon.graph().to_bytes()?
    };

    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    spinner.finish(&format!(
        "Compiled {} words to {}",
        lexicon.num_words(),
        output.display()
    ));
    println!("checksum: {:04x}", checksum(&bytes));
    Ok(())
}

fn build_index(
    config: &EngineConfig,
    words: &Path,
    output: &Path,
    references: &[String],
    quiet: bool,
) -> Result<()> {
    let spinner = Spinner::start(&format!("Reading {}", words.display()), quiet);
    let bag = config.letter_bag()?;

    let mut lexicon = Lexicon::new(LEXICON, config)?;
    lexicon.import_entries(import::read_word_list(words)?, true);

    let mut reference_graphs = Vec::new();
    for reference in references {
        let Some((symbol, path)) = reference.split_once('=') else {
            bail!("reference must be SYMBOL=PATH: '{}'", reference);
        };
        let mut graph = WordGraph::new();
        graph.import_words(import::read_word_list(Path::new(path))?.into_iter().map(|e| e.word));
        reference_graphs.push((symbol.to_string(), graph));
    }

    if output.exists() {
        fs::remove_file(output).with_context(|| format!("Failed to replace {}", output.display()))?;
    }
    let index = SqliteIndex::create(output)?;

    spinner.update("Computing word attributes");
    let mut builder =
        IndexBuilder::new(lexicon.graph(), bag).with_definitions(lexicon.definitions());
    for (symbol, graph) in &reference_graphs {
        builder = builder.with_reference(symbol, graph);
    }
    let rows = builder.write_to(&index)?;
    spinner.finish(&format!("Wrote {} rows to {}", rows, output.display()));
    Ok(())
}

/// Load the lexicon described on the command line
fn load(config: &EngineConfig, source: &LexiconArgs, quiet: bool) -> Result<WordEngine> {
    let spinner = Spinner::start(&format!("Loading {}", source.lexicon.display()), quiet);
    let engine = WordEngine::new(config.clone());

    let is_graph = source.lexicon.extension().is_some_and(|ext| ext == "dawg");
    if is_graph {
        let expected = source
            .checksum
            .as_deref()
            .map(|hex| u16::from_str_radix(hex.trim_start_matches("0x"), 16))
            .transpose()
            .context("checksum must be hexadecimal")?;
        engine.import_serialized_file(LEXICON, &source.lexicon, source.reversed, expected)?;
    } else {
        engine.import_text_file(LEXICON, &source.lexicon, true)?;
    }

    for stems in &source.stems {
        engine.import_stems(LEXICON, stems)?;
    }
    if let Some(db) = &source.db {
        engine.connect_database(LEXICON, db)?;
    }

    spinner.finish(&format!("Loaded {} words", engine.num_words(LEXICON)));
    Ok(engine)
}

fn details(engine: &WordEngine, words: &[String]) -> Vec<WordDetails> {
    words
        .iter()
        .map(|word| WordDetails {
            word: word.clone(),
            front_hooks: engine.front_hook_letters(LEXICON, word),
            back_hooks: engine.back_hook_letters(LEXICON, word),
            probability_order: engine.probability_order(LEXICON, word),
            definition: engine.definition(LEXICON, word, true),
        })
        .collect()
}
