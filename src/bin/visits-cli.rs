use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use visit_aggregator::config::{self, AggregatorConfig};
use visit_aggregator::http::VISITS_PATH;
use visit_aggregator::visits::fetcher::UpstreamClient;
use visit_aggregator::visits::LocationSet;

#[derive(Parser)]
#[command(name = "visits-cli")]
#[command(about = "Management CLI for the visit aggregator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the aggregation job now and print the stored records
    Trigger,
    /// Check the aggregator is up
    Health,
    /// List configured locations and their upstream URLs
    Locations {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate a config file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Trigger => {
            let res = client.post(format!("{}{}", cli.url, VISITS_PATH)).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Locations { config } => {
            // Listing does not need store credentials, so skip validation.
            let config = match config {
                Some(path) => config::loader::parse_config(&std::fs::read_to_string(path)?)?,
                None => AggregatorConfig::default(),
            };
            let upstream = UpstreamClient::new(&config.upstream)?;
            let locations = LocationSet::resolve(&config.upstream.locations)?;
            for location in locations.iter() {
                println!("{:<20} {}", location, upstream.location_url(location));
            }
        }
        Commands::CheckConfig { config } => match config::load_config(&config) {
            Ok(cfg) => println!(
                "OK: {} locations, table '{}', listening on {}",
                LocationSet::resolve(&cfg.upstream.locations)?.len(),
                cfg.store.table,
                cfg.listener.bind_address
            ),
            Err(e) => {
                eprintln!("Invalid config: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: aggregator returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
