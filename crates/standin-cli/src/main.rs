use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

/// Top-level CLI argument parser for the `standin` command
#[derive(Parser)]
#[command(
    name = "standin",
    about = "standin: build-time test-double generation for Kotlin contracts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `standin` CLI
#[derive(Subcommand)]
enum Commands {
    /// Validate a YAML declaration document
    Validate {
        /// Path to the declaration YAML file
        declaration: PathBuf,
    },
    /// Print a declaration's generation-cache signature
    Signature {
        /// Path to the declaration YAML file
        declaration: PathBuf,
        /// Hash the whole source instead of the structural model
        #[arg(long)]
        content: bool,
    },
    /// Generate fakes for a directory of declarations
    Generate {
        /// Directory containing declaration YAML files
        #[arg(default_value = "declarations")]
        declaration_dir: PathBuf,
        /// Output directory for generated Kotlin files
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,
        /// Generation cache store (skips unchanged declarations)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Emit a call counter per member
        #[arg(long)]
        counters: bool,
        /// Use the whole-source content signature strategy
        #[arg(long)]
        content: bool,
        /// Model snapshot path (skips re-analysis of unchanged batches)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Show batch status (declarations, members, generics, cache)
    Status {
        /// Directory containing declaration YAML files
        #[arg(default_value = "declarations")]
        declaration_dir: PathBuf,
        /// Generation cache store to report on
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Drop every record from a generation cache store
    CacheWipe {
        /// Generation cache store to wipe
        cache: PathBuf,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Validate { declaration } => commands::validate::run(&declaration),
        Commands::Signature {
            declaration,
            content,
        } => commands::signature::run(&declaration, content),
        Commands::Generate {
            declaration_dir,
            output,
            cache,
            counters,
            content,
            snapshot,
        } => commands::generate::run(
            &declaration_dir,
            &output,
            cache.as_deref(),
            counters,
            content,
            snapshot,
        ),
        Commands::Status {
            declaration_dir,
            cache,
        } => commands::status::run(&declaration_dir, cache.as_deref()),
        Commands::CacheWipe { cache } => commands::cache::wipe(&cache),
    }
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
