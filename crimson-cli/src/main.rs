use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod fasta;
mod paf;
mod stats;

use commands::map::MapArgs;
use config::Config;

#[derive(Parser)]
#[command(name = "crimson")]
#[command(about = "crimson - minimizer-based DNA fragment mapper")]
#[command(version)]
#[command(long_about = "
crimson maps DNA fragments against a reference genome. Fragments are sketched
into minimizers, chained against an index of the reference and optionally
aligned base by base.

Examples:
  crimson map genome.fa reads.fa > mappings.paf
  crimson map genome.fa reads.fq -c -a local -m 2 -n -4 -g -4
  crimson config --example > crimson.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: ./crimson.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map fragments against a reference and write PAF records
    Map(MapArgs),

    /// Print the configuration
    Config {
        /// Print the default configuration instead of the effective one
        #[arg(long)]
        example: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(verbose, quiet)))
        .format_timestamp_secs()
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<error::CliError>() {
            Some(cli_err) if err.chain().count() > 1 => {
                eprintln!("Error: {}: {}", err, error::format_error_with_suggestions(cli_err))
            }
            Some(cli_err) => eprintln!("Error: {}", error::format_error_with_suggestions(cli_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Map(args) => {
            commands::map::execute(&config, args)?;
        }
        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}
