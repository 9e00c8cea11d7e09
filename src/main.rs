use std::sync::Arc;

use anyhow::{Context, Result};
use bazaar::aggregator::{Aggregator, AggregatorConfig};
use bazaar::api::create_router;
use bazaar::config::CONFIG;
use bazaar::data_models::Source;
use bazaar::fetcher::HttpFetcher;
use bazaar::query::SearchQuery;
use bazaar::shutdown::cancel_on;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "bazaar", about = "Search several shop sites at once")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search API and static UI
    Serve {
        /// Listen address, overrides BAZAAR_BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Run one search and print the merged result as JSON
    Search {
        query: String,
        /// Comma separated site ids, overrides BAZAAR_SITES
        #[arg(long, value_delimiter = ',')]
        sites: Vec<Source>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = AggregatorConfig::from(&*CONFIG);
    let fetcher = Arc::new(HttpFetcher::new()?);

    match cli.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| CONFIG.bind_addr.clone());
            let aggregator = Arc::new(Aggregator::new(fetcher, config));
            let app = create_router(aggregator, &CONFIG.static_dir);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            log::info!("listening on {addr}");
            axum::serve(listener, app).await.context("Server error")?;
        }
        Command::Search { query, sites } => {
            if !sites.is_empty() {
                config.sites = sites;
            }
            let query = SearchQuery::parse(&query)?;
            let aggregator = Aggregator::new(fetcher, config);
            let token = CancellationToken::new();
            let watcher = cancel_on(token.clone(), tokio::signal::ctrl_c());
            let result = aggregator.search(&query, &token).await;
            watcher.abort();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
