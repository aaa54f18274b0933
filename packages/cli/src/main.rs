mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, init, inspect, ApplyArgs, InitArgs, InspectArgs};
use tracing_subscriber::EnvFilter;

/// Campaign CLI - edit campaign documents from the command line
#[derive(Parser, Debug)]
#[command(name = "campaign")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every mutation (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new campaign project
    Init(InitArgs),

    /// Apply a script of edits to a campaign document
    Apply(ApplyArgs),

    /// Print the block outline of a campaign document
    Inspect(InspectArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Apply(args) => apply(args, &cwd).await,
                Command::Inspect(args) => inspect(args, &cwd),
            }
        }
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
