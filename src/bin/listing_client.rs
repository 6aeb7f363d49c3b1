use clap::{Parser, Subcommand};
use listing_service::utils::error::{ListingError, Result};
use listing_service::utils::logger;
use listing_service::{ListingApiClient, ListingId, ListingQueryParams, ListingUpdate, NewListing};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "listing_client")]
#[command(about = "Command-line client for the listing API")]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the service is up
    Health,
    /// Search listings
    Search {
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        start_index: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, help = "asc or desc")]
        order: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        listing_id: Option<String>,
    },
    /// Show one listing
    Get { id: String },
    /// Create a listing from a JSON file
    Create { file: PathBuf },
    /// Apply a partial update from a JSON file
    Update { id: String, file: PathBuf },
    /// Delete a listing
    Delete { id: String },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn run(cli: Cli) -> Result<()> {
    let client = ListingApiClient::new(&cli.base_url)?;

    match cli.command {
        Command::Health => {
            let health = client.health().await?;
            println!(
                "✅ healthy={} version={} backend={}",
                health.healthy, health.version, health.backend
            );
        }
        Command::Search {
            term,
            start_index,
            limit,
            order,
            user_id,
            listing_id,
        } => {
            let params = ListingQueryParams {
                search_term: term,
                start_index: start_index.map(|v| v.to_string()),
                limit: limit.map(|v| v.to_string()),
                order,
                user_id,
                listing_id,
                ..Default::default()
            };
            let listings = client.search(&params).await?;
            println!("{}", serde_json::to_string_pretty(&listings)?);
            let requested = limit.unwrap_or(9);
            if listings.len() >= requested {
                println!("📄 {} listings (more may be available)", listings.len());
            } else {
                println!("📄 {} listings", listings.len());
            }
        }
        Command::Get { id } => {
            let listing = client.get(&ListingId::from(id)).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Create { file } => {
            let listing: NewListing = read_json(&file)?;
            let id = client.create(&listing).await?;
            println!("✅ Created listing {}", id);
        }
        Command::Update { id, file } => {
            let fields: ListingUpdate = read_json(&file)?;
            let id = client.update(&ListingId::from(id), &fields).await?;
            println!("✅ Updated listing {}", id);
        }
        Command::Delete { id } => {
            let message = client.delete(&ListingId::from(id)).await?;
            println!("✅ {}", message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!("Client error: {:?}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        let code = match e {
            ListingError::Api { status, .. } if status < 500 => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
