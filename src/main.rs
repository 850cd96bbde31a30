use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use travelguide::api::AppState;
use travelguide::{
    AppConfig, Catalog, DeepSeekClient, GeocodingClient, JsonFileSource, MapLinkResolver,
    TravelAssistant, logging, web,
};

/// Travel question assistant backed by local spot data and a language model
#[derive(Debug, Parser)]
#[command(name = "travelguide", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "TRAVELGUIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the configured one
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    logging::init(&config.logging);
    tracing::info!("Starting travelguide {}", travelguide::VERSION);

    let catalog = Arc::new(Catalog::load_all(&JsonFileSource::from_config(&config.data)));

    let resolver =
        MapLinkResolver::with_base_url(config.map.api_key.as_deref(), &config.map.link_base_url)?;
    let geocoder = GeocodingClient::new(resolver.api_key(), &config.map)?;
    let model = Arc::new(DeepSeekClient::new(&config.model)?);

    let assistant = TravelAssistant::new(
        Arc::clone(&catalog),
        resolver,
        model,
        config.search.limit,
    );

    let state = Arc::new(AppState {
        assistant,
        catalog,
        geocoder,
    });

    web::run(state, &config.server)
        .await
        .context("Server failed")
}
