mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, inspect, replay, InitArgs, InspectArgs, ReplayArgs};
use std::path::PathBuf;

/// Canvas CLI - inspect and replay builder documents
#[derive(Parser, Debug)]
#[command(name = "canvas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine config file (defaults to ./canvas.config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine and surface activity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config and an empty page store
    Init(InitArgs),

    /// Print the pages and element trees of a page store
    Inspect(InspectArgs),

    /// Run a scripted editing session against the engine and a render surface
    Replay(ReplayArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Inspect(args) => inspect(args, cli.config.as_deref(), &cwd),
            Command::Replay(args) => replay(args, cli.config.as_deref(), &cwd).await,
        },
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {}", e)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
