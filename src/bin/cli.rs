use clap::{Parser, Subcommand};
use place_match::config::{delimiter_byte, FileConfig, DEFAULT_DELIMITER};
use place_match::io::project_columns;
use place_match::ranking::try_score_title;
use place_match::{CsvSink, CsvSource, MatchEngine, Query, StreetMatcher};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "place-match")]
#[command(about = "Place record match scoring and tier classification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an input table into confirmed, review and rejected files
    Resolve {
        /// Input CSV file
        input: PathBuf,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum title score for OK
        #[arg(long, env = "TITLE_SIMILARITY_THRESHOLD")]
        threshold: Option<f64>,

        /// Required margin between best and runner-up
        #[arg(long, env = "DYNAMIC_THRESHOLD_GAP")]
        gap: Option<f64>,

        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Worker threads for group resolution
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Original columns to keep in the outputs (comma separated)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score one title against a query
    Score {
        /// Raw query, optionally "name, street"
        query: String,

        /// Candidate title
        title: String,

        /// Candidate street
        street: Option<String>,
    },

    /// Keep only the given columns of a CSV file
    Filter {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file
        output: PathBuf,

        /// Columns to keep (comma separated)
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Field delimiter
        #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
        delimiter: char,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Resolve {
            input,
            config,
            threshold,
            gap,
            delimiter,
            workers,
            output_dir,
            columns,
            json,
        } => {
            let file = match config {
                Some(path) => FileConfig::load(path)?,
                None => FileConfig::default(),
            };
            let match_config = file.match_config(threshold, gap)?;
            let delimiter = file.delimiter_byte(delimiter)?;

            let mut engine = MatchEngine::new(match_config);
            if let Some(workers) = workers.or(file.workers) {
                engine = engine.with_workers(workers);
            }

            let source = CsvSource::new(&input).with_delimiter(delimiter);
            let mut sink = CsvSink::for_input(&input).with_delimiter(delimiter);
            if let Some(dir) = output_dir {
                sink = sink.in_dir(dir);
            }
            if let Some(columns) = columns.or(file.columns) {
                sink = sink.with_columns(columns);
            }

            println!("🔍 Resolving: {}", input.display());
            let report = engine.run(&source, &mut sink)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\n✅ {}", report.display());
                println!("   Groups: {}", report.groups);
                if report.unkeyed > 0 {
                    println!("   Without customer key: {}", report.unkeyed);
                }
                println!("   Scoring errors: {}", report.scoring_errors);
                println!("   Duplicates removed: {}", report.duplicates_removed);

                if !report.written.is_empty() {
                    println!("\n💾 Written:");
                    for written in &report.written {
                        println!(
                            "   {} ({} rows) -> {}",
                            written.partition, written.rows, written.destination
                        );
                    }
                }
                if !report.failed.is_empty() {
                    println!("\n❌ Failed:");
                    for failed in &report.failed {
                        println!("   {} -> {}: {}", failed.partition, failed.destination, failed.error);
                    }
                }
            }

            if !report.is_success() {
                anyhow::bail!("{} partition(s) could not be written", report.failed.len());
            }
        }

        Commands::Score { query, title, street } => {
            let query = Query::parse(&query);
            println!("🔍 Query: {} ({:?})", query.core_name, query.scenario());

            match try_score_title(&query, &title) {
                Ok(score) => {
                    println!("   Title: {}", title);
                    println!("   Core: {:.0}", score.core);
                    println!("   Full: {:.0}", score.full);
                    println!("   Total: {:.1}", score.total);
                }
                Err(e) => println!("⚠️ {} (score 0)", e),
            }

            if let (Some(hint), Some(street)) = (query.street_hint.as_deref(), street.as_deref()) {
                let matcher = StreetMatcher::new(hint);
                println!(
                    "   Street: {:.0} ({})",
                    matcher.similarity(street),
                    if matcher.matches(street) { "match" } else { "no match" }
                );
            }
        }

        Commands::Filter {
            input,
            output,
            columns,
            delimiter,
        } => {
            println!("🧹 Filtering columns of: {}", input.display());
            let kept = project_columns(&input, &output, &columns, delimiter_byte(delimiter)?)?;
            println!("✅ Kept {} columns -> {}", kept.len(), output.display());
        }
    }

    Ok(())
}
