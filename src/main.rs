use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use closeescape::api::{ApiSuggestResponse, AppState};
use closeescape::{
    CloseEscapeConfig, Location, SuggestionRequest, SuggestionService, telemetry, web,
};

/// Nearby getaway suggestions from a budget, a distance and a location
#[derive(Parser)]
#[command(name = "closeescape", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ask for suggestions once and print them as JSON
    Suggest {
        #[arg(long)]
        budget: f64,
        /// Maximum distance in km
        #[arg(long)]
        distance: f64,
        #[arg(long)]
        city: Option<String>,
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CloseEscapeConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    tracing::debug!("Loaded configuration: {:?}", config);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let service = SuggestionService::from_config(&config)?;
            web::run(&config.server, AppState::new(service)).await
        }
        Command::Suggest {
            budget,
            distance,
            city,
            lat,
            lon,
        } => {
            let (latitude, longitude) = (lat.unwrap_or_default(), lon.unwrap_or_default());
            let location = match city {
                Some(city) => Location::with_city(latitude, longitude, city),
                None if lat.is_some() => Location::new(latitude, longitude),
                None => anyhow::bail!("Provide --city or both --lat and --lon"),
            };
            let service = SuggestionService::from_config(&config)?;
            let batch = service
                .suggest(SuggestionRequest::from_location(budget, distance, &location))
                .await
                .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))?;

            let response = ApiSuggestResponse::from(batch);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
