//! sitecache CLI - Command-line interface
//!
//! Operates a persistent caching gateway from the command line: install a
//! cache generation, fetch URLs through it, inspect and trim the store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod logging;

use commands::common::CliContext;

#[derive(Parser)]
#[command(name = "sitecache")]
#[command(version = sitecache::VERSION)]
#[command(about = "Offline-first caching gateway over a persistent store", long_about = None)]
struct Cli {
    /// Site origin that relative paths resolve against
    #[arg(long, global = true, default_value = "https://www.example.com")]
    origin: String,

    /// Cache store directory (default: the user cache directory)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Enable debug-level logging regardless of RUST_LOG
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install a new cache generation: pre-warm and activate
    Install(commands::install::InstallArgs),
    /// Fetch one URL through the gateway
    Fetch(commands::fetch::FetchArgs),
    /// Show cache store statistics
    Stats,
    /// Delete caches from the store
    Clear(commands::clear::ClearArgs),
    /// Run one maintenance pass
    Maintain,
    /// Keep the gateway resident, running periodic maintenance
    Run(commands::run::RunArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.debug) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let ctx = CliContext::new(cli.origin, cli.cache_dir);

    let result = match cli.command {
        Command::Install(args) => commands::install::run(&ctx, args).await,
        Command::Fetch(args) => commands::fetch::run(&ctx, args).await,
        Command::Stats => commands::stats::run(&ctx),
        Command::Clear(args) => commands::clear::run(&ctx, args),
        Command::Maintain => commands::maintain::run(&ctx),
        Command::Run(args) => commands::run::run(&ctx, args).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
