mod config;
mod definitions;
mod encoding;
mod error;
mod map;
mod output;
mod provinces;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use config::Config;
use definitions::DefinitionsTable;
use error::Result;
use map::DefaultMap;
use provinces::HistoryResolver;

/// pdxhist: province history timelines from PDX script
///
/// Parse province history files and coalesce their dated entries into
/// per-province culture/religion/temple timelines.
#[derive(Parser)]
#[command(name = "pdxhist", version, about, long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build timelines for every land province and write the output file
    Run {
        /// Config file (defaults to ./pdxhist.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Primary (mod) root
        #[arg(long)]
        root: Option<PathBuf>,
        /// Secondary (vanilla) root for history files
        #[arg(long)]
        vanilla: Option<PathBuf>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Ignore history entries after this year
        #[arg(long)]
        cutoff: Option<u32>,
        /// Write JSON instead of PDX script
        #[arg(long)]
        json: bool,
        /// Skip provinces that fail instead of halting
        #[arg(long)]
        keep_going: bool,
    },

    /// Parse a PDX file and print it back in normalized layout
    Parse {
        /// Path to PDX script file
        file: PathBuf,
    },

    /// Build and print the timeline of a single history file
    Timeline {
        /// Path to a province history file
        file: PathBuf,
        /// Config file for cutoff year and unplayable ranges
        #[arg(long)]
        config: Option<PathBuf>,
        /// Ignore history entries after this year
        #[arg(long)]
        cutoff: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the definitions table against default.map, optionally rewriting it
    Definitions {
        /// Game or mod root containing map/default.map
        root: PathBuf,
        /// Write the normalized table here
        #[arg(long)]
        write: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdx_core={level},pdxhist={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let exit_code = match execute(cli.command, quiet) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            1
        }
    };

    process::exit(exit_code);
}

fn execute(command: Commands, quiet: bool) -> Result<()> {
    match command {
        Commands::Run {
            config,
            root,
            vanilla,
            output,
            cutoff,
            json,
            keep_going,
        } => {
            let mut cfg = Config::resolve(config.as_deref())?;
            if let Some(root) = root {
                cfg.primary_root = root;
            }
            if vanilla.is_some() {
                cfg.secondary_root = vanilla;
            }
            if let Some(output) = output {
                cfg.output = output;
            }
            if let Some(cutoff) = cutoff {
                cfg.cutoff_year = cutoff;
            }
            run(&cfg, json, keep_going, quiet)
        }
        Commands::Parse { file } => {
            let block = pdx_core::parse_file(&file)?;
            print!("{}", block);
            Ok(())
        }
        Commands::Timeline {
            file,
            config,
            cutoff,
            json,
        } => {
            let mut cfg = Config::resolve(config.as_deref())?;
            if let Some(cutoff) = cutoff {
                cfg.cutoff_year = cutoff;
            }
            print_timeline(&file, &cfg, json)
        }
        Commands::Definitions { root, write } => check_definitions(&root, write.as_deref(), quiet),
        Commands::Version => {
            println!(
                "pdxhist {} (pdx-core {})",
                env!("CARGO_PKG_VERSION"),
                pdx_core::VERSION
            );
            Ok(())
        }
    }
}

fn run(cfg: &Config, json: bool, keep_going: bool, quiet: bool) -> Result<()> {
    let opts = cfg.history_options()?;
    let map = DefaultMap::load(&cfg.primary_root)?;
    let table = DefinitionsTable::load(&map)?;
    let candidates = provinces::land_provinces(&map, &table);
    tracing::info!(
        root = %cfg.primary_root.display(),
        candidates = candidates.len(),
        "loaded province definitions"
    );

    let resolver = HistoryResolver::new(&cfg.primary_root, cfg.secondary_root.as_deref());
    let done = provinces::process_all(&candidates, &resolver, &opts, keep_going)?;

    let text = if json {
        output::render_json(&done)?
    } else {
        output::render_pdx(&done)
    };
    output::write(&cfg.output, &text)?;

    if !quiet {
        println!(
            "{} wrote {} province timelines to {}",
            "✓".green(),
            done.len(),
            cfg.output.display()
        );
    }
    Ok(())
}

fn print_timeline(file: &Path, cfg: &Config, json: bool) -> Result<()> {
    let opts = cfg.history_options()?;
    let block = pdx_core::parse_file(file)?;
    let timeline = pdx_core::build_timeline(&block, &opts).map_err(|e| e.with_path(file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    match timeline {
        None => println!("{}: no title statement; not a province", file.display()),
        Some(entries) => {
            println!("{:>4} | {:>17} | {:>18} | HOLY?", "YEAR", "CULTURE", "RELIGION");
            for e in entries {
                println!(
                    "{:>4} | {:>17} | {:>18} | {}",
                    e.start_year,
                    e.culture,
                    e.religion,
                    if e.has_temple { "Y" } else { "N" }
                );
            }
        }
    }
    Ok(())
}

fn check_definitions(root: &Path, write: Option<&Path>, quiet: bool) -> Result<()> {
    let map = DefaultMap::load(root)?;
    let table = DefinitionsTable::load(&map)?;
    let land = provinces::land_provinces(&map, &table);

    if !quiet {
        println!(
            "{} provinces defined, {} named land provinces",
            table.rows.len(),
            land.len()
        );
    }

    if let Some(path) = write {
        table.write(path)?;
        if !quiet {
            println!("{} wrote {}", "✓".green(), path.display());
        }
    }
    Ok(())
}
