//! Fetch command - route one URL through the gateway.

use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sitecache::request::FetchRequest;
use sitecache::store::NoOpStore;
use sitecache::strategies::{FetchOutcome, ServedSource};

use crate::commands::common::{format_size, CliContext};
use crate::error::CliError;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL or same-origin path to fetch
    pub url: String,

    /// Treat the request as a page navigation (enables the offline page)
    #[arg(long)]
    pub navigate: bool,

    /// Skip the persistent store: network only, nothing cached
    #[arg(long)]
    pub no_cache: bool,

    /// Write the response body to a file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Run the fetch command.
pub async fn run(ctx: &CliContext, args: FetchArgs) -> Result<(), CliError> {
    let service = if args.no_cache {
        // The generation does not matter when nothing is stored
        ctx.service(ctx.config("ephemeral"), Arc::new(NoOpStore::new()))?
    } else {
        let build = ctx.require_deployment()?;
        ctx.service(ctx.config(&build), ctx.open_store()?)?
    };
    service.resume().map_err(CliError::ServiceCreation)?;

    let request = if args.navigate {
        FetchRequest::navigate(&args.url)
    } else {
        FetchRequest::get(&args.url)
    };

    let outcome = service.handle(&request).await.map_err(CliError::Fetch)?;

    match outcome {
        FetchOutcome::Served { response, source } => {
            println!(
                "{} {} ({}, {})",
                response.status,
                args.url,
                describe_source(source),
                format_size(response.body.len() as u64)
            );

            if let Some(path) = args.output {
                fs::write(&path, &response.body).map_err(|e| CliError::FileWrite {
                    path: path.display().to_string(),
                    error: e,
                })?;
                println!("Saved body to {}", path.display());
            }
        }
        FetchOutcome::NotIntercepted => {
            println!(
                "{}: not intercepted (bypass list or non-GET); the request goes straight to the network",
                args.url
            );
        }
        FetchOutcome::Unavailable => {
            println!("{}: unavailable (network failed, nothing cached)", args.url);
        }
    }
    Ok(())
}

fn describe_source(source: ServedSource) -> &'static str {
    match source {
        ServedSource::Cache => "cache hit",
        ServedSource::Network { stored: true } => "network, stored",
        ServedSource::Network { stored: false } => "network, not stored",
        ServedSource::StaleCache => "stale cache",
        ServedSource::OfflinePage => "offline page",
        ServedSource::Synthetic => "synthetic offline response",
    }
}
