use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use photosearch::{
    listing, viewer, Config, HttpTransport, SearchCoordinator, SearchOutcome, SearchQuery,
};

const LISTING_WIDTH: usize = 100;

#[derive(Parser)]
#[command(name = "photosearch")]
#[command(about = "Search the public photo feed by tag", long_about = None)]
struct Cli {
    /// Feed endpoint, overrides PHOTOSEARCH_ENDPOINT
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds, overrides PHOTOSEARCH_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the results
    Search {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Run one search and open the detail screen for one result
    View {
        #[arg(required = true)]
        tags: Vec<String>,
        /// 1-based position in the result list
        #[arg(short, long, default_value_t = 1)]
        index: usize,
    },
    /// Read queries from stdin, one per line
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?.with_overrides(cli.endpoint, cli.timeout);

    let transport = HttpTransport::new(&config)?;
    let coordinator = SearchCoordinator::new(Arc::new(transport));

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Search { tags } => {
            let query = parse_query(&tags)?;
            if coordinator.search(query).await == SearchOutcome::Failed {
                return Err(anyhow!("Search failed, see the log above (RUST_LOG=debug for more)"));
            }
            print_listing(&coordinator).await;
        }
        Commands::View { tags, index } => {
            let query = parse_query(&tags)?;
            if coordinator.search(query).await == SearchOutcome::Failed {
                return Err(anyhow!("Search failed, see the log above (RUST_LOG=debug for more)"));
            }
            let items = coordinator.items().await;
            let item = index
                .checked_sub(1)
                .and_then(|i| items.get(i))
                .ok_or_else(|| anyhow!("No result at position {} ({} found)", index, items.len()))?;
            viewer::run_viewer(item)?;
        }
        Commands::Interactive => run_interactive(coordinator).await?,
    }

    Ok(())
}

fn parse_query(tags: &[String]) -> Result<SearchQuery> {
    SearchQuery::parse(&tags.join(" ")).ok_or_else(|| anyhow!("Search tags must not be empty"))
}

async fn print_listing(coordinator: &SearchCoordinator) {
    let items = coordinator.items().await;
    if items.is_empty() {
        println!("No photos found");
        return;
    }
    for line in listing::format_listing(&items, LISTING_WIDTH) {
        println!("{}", line);
    }
}

async fn run_interactive(coordinator: SearchCoordinator) -> Result<()> {
    println!("Type tags to search, ':view N' to open a result, ':quit' to exit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read from stdin")? == 0 {
            break;
        }
        let line = line.trim();

        if line == ":quit" || line == ":q" {
            break;
        }

        if let Some(position) = line.strip_prefix(":view") {
            let items = coordinator.items().await;
            let item = position
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| items.get(i));
            match item {
                Some(item) => {
                    viewer::run_viewer(item)?;
                }
                None => println!("Usage: :view N (1-{})", items.len()),
            }
            continue;
        }

        let Some(query) = SearchQuery::parse(line) else {
            continue;
        };
        if coordinator.cached(&query).await.is_none() {
            println!("Loading...");
        }
        match coordinator.search(query).await {
            SearchOutcome::Failed => println!("Search failed"),
            SearchOutcome::CacheHit(_) | SearchOutcome::Fetched(_) => {
                print_listing(&coordinator).await
            }
        }
    }

    Ok(())
}
