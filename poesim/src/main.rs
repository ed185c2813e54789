use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use poesim_core::{
    json_report, print_report, summarize, CompressionLevel, Corpus, Sample, SampleStore,
    SimConfig, Simulator, TransitionTable,
};
use poetxt::{Item, ItemParser};

#[derive(Parser)]
#[command(name = "poesim")]
#[command(about = "Simulate recombinator outcomes from recorded crafts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the outcome of recombining two items
    Simulate {
        /// Directory of recorded samples
        #[arg(long, env = "POESIM_CORPUS")]
        corpus: PathBuf,

        /// JSON config with the valuable modifiers
        #[arg(long)]
        config: PathBuf,

        /// Item text file of the first input
        left: PathBuf,

        /// Item text file of the second input
        right: PathBuf,

        /// Compression level: 0 raw states .. 3 one line per class
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
        level: u8,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse one item text file and show the result
    Parse {
        /// Item text file
        path: PathBuf,

        /// Output the item as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the transition table built from the corpus
    Table {
        /// Directory of recorded samples
        #[arg(long, env = "POESIM_CORPUS")]
        corpus: PathBuf,

        /// Output the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a new sample (two inputs and the output) in the corpus
    Record {
        /// Directory of recorded samples
        #[arg(long, env = "POESIM_CORPUS")]
        corpus: PathBuf,

        input1: PathBuf,
        input2: PathBuf,
        output: PathBuf,
    },
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read item text {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

fn parse_item(parser: &mut ItemParser, path: &Path) -> Result<Item> {
    let lines = read_lines(path)?;
    let item = parser.parse(&lines, &path.display().to_string())?;
    Ok(item)
}

fn load_table(corpus_dir: &Path, parser: &mut ItemParser) -> Result<TransitionTable> {
    let store = SampleStore::new(corpus_dir);
    let corpus = Corpus::load(&store, parser)?;
    if corpus.is_empty() {
        anyhow::bail!("No usable samples in {}", corpus_dir.display());
    }
    Ok(TransitionTable::from_corpus(&corpus))
}

fn print_item(item: &Item) {
    println!("\n=== {} ===", item.name.as_deref().unwrap_or(&item.base));
    println!("Class: {} | Rarity: {} | Base: {}", item.class, item.rarity, item.base);
    println!(
        "Item Level: {} | Requirements: level {} str {} dex {} int {}",
        item.item_level,
        item.requirements.level,
        item.requirements.str,
        item.requirements.dex,
        item.requirements.int
    );
    if !item.sockets.is_empty() {
        println!("Sockets: {}", item.sockets);
    }
    let mut traits: Vec<_> = item.traits.iter().collect();
    traits.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in traits {
        println!("  {}: {}", name, value);
    }
    println!();
    for m in &item.mods {
        println!("[{}] T{} {}", m.slot, m.tier, m.description());
    }
    if let Some(special) = &item.special_types {
        println!();
        println!("Special: {}", special.join(", "));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut parser = ItemParser::new();

    match cli.command {
        Commands::Simulate {
            corpus,
            config,
            left,
            right,
            level,
            json,
        } => {
            let level = CompressionLevel::try_from(level).map_err(anyhow::Error::msg)?;
            let config = SimConfig::load(&config)?;
            let table = load_table(&corpus, &mut parser)?;

            let left = parse_item(&mut parser, &left)?;
            let right = parse_item(&mut parser, &right)?;

            let distribution = Simulator::new(&table, &config)
                .simulate(&left, &right, &config.valuable_mods)
                .context("Simulation failed")?;
            let report = summarize(
                &distribution,
                (
                    left.valuable_count(&config.valuable_mods),
                    right.valuable_count(&config.valuable_mods),
                ),
            );

            if json {
                println!("{}", json_report(&report, level)?);
            } else {
                print_report(&report, level, &mut std::io::stdout())?;
            }
        }

        Commands::Parse { path, json } => {
            let item = parse_item(&mut parser, &path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                print_item(&item);
            }
        }

        Commands::Table { corpus, json } => {
            let table = load_table(&corpus, &mut parser)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                println!("\n=== Transition Table ===");
                for (pool, dist) in table.iter() {
                    let outcomes: Vec<String> = dist
                        .iter()
                        .map(|(k, p)| format!("{}: {:.3}", k, p))
                        .collect();
                    println!(
                        "{:>2} -> {{{}}} ({} observations)",
                        pool,
                        outcomes.join(", "),
                        table.observations(pool)
                    );
                }
            }
        }

        Commands::Record {
            corpus,
            input1,
            input2,
            output,
        } => {
            let sample = Sample {
                input1: read_lines(&input1)?,
                input2: read_lines(&input2)?,
                output: read_lines(&output)?,
            };
            // Reject text the corpus loader would skip later
            for (label, lines) in [
                ("input1", &sample.input1),
                ("input2", &sample.input2),
                ("output", &sample.output),
            ] {
                parser
                    .parse(lines, label)
                    .with_context(|| format!("Refusing to record unparsable {}", label))?;
            }
            let path = SampleStore::new(&corpus).record(&sample)?;
            println!("Recorded {}", path.display());
        }
    }

    Ok(())
}
